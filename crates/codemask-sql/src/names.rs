//! Relation, alias and column namespaces for one run.
//!
//! Relations draw from the word alphabet, table aliases are `t<n>`, output
//! column aliases `c<n>`, and columns are spreadsheet letters. Column
//! identity is keyed by (named subquery, name): each named subquery numbers
//! its own columns from `A`, everything else shares one run-wide counter.

use crate::literal;
use crate::token::Ident;
use codemask_core::namer::is_alphabet_word;
use codemask_core::{
    AlphabetNamer, CountedNamer, FrontEndConfig, LetterNamer, LiteralMasker, ReservedSet,
};
use rustc_hash::{FxHashMap, FxHashSet};

/// `<prefix><digits>`, case-insensitive.
fn is_counted(word: &str, prefix: char) -> bool {
    let mut chars = word.chars();
    chars.next().is_some_and(|c| c.eq_ignore_ascii_case(&prefix))
        && word.len() > 1
        && chars.all(|c| c.is_ascii_digit())
}

/// A single letter with an optional lap number: `A`, `b`, `C2`.
fn is_letter(word: &str) -> bool {
    let mut chars = word.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic()) && chars.all(|c| c.is_ascii_digit())
}

pub struct Names<'c> {
    reserved: &'c ReservedSet,
    alphabet: &'c [String],
    phrases: &'c [String],

    relations: FxHashMap<String, String>,
    relation_namer: AlphabetNamer<'c>,
    ctes: FxHashSet<String>,

    aliases: FxHashMap<String, String>,
    alias_namer: CountedNamer,
    /// Alias key to the relation key it stands for; `None` for derived tables.
    alias_targets: FxHashMap<String, Option<String>>,

    column_aliases: FxHashMap<String, String>,
    column_alias_namer: CountedNamer,

    columns: FxHashMap<(Option<String>, String), String>,
    letters: LetterNamer,
    scoped_letters: FxHashMap<String, LetterNamer>,

    literals: LiteralMasker<'c>,
}

impl<'c> Names<'c> {
    pub fn new(config: &'c FrontEndConfig) -> Self {
        Self {
            reserved: &config.reserved,
            alphabet: &config.alphabet,
            phrases: &config.phrases,
            relations: FxHashMap::default(),
            relation_namer: AlphabetNamer::new(&config.alphabet, config.overflow),
            ctes: FxHashSet::default(),
            aliases: FxHashMap::default(),
            alias_namer: CountedNamer::new("t"),
            alias_targets: FxHashMap::default(),
            column_aliases: FxHashMap::default(),
            column_alias_namer: CountedNamer::new("c"),
            columns: FxHashMap::default(),
            letters: LetterNamer::new(),
            scoped_letters: FxHashMap::default(),
            literals: LiteralMasker::new(&config.phrases),
        }
    }

    pub fn is_reserved(&self, word: &str) -> bool {
        self.reserved.contains(word)
    }

    /// Tokens that already look like output are never renamed again.
    pub fn is_output_shaped(&self, word: &str) -> bool {
        is_counted(word, 't')
            || is_counted(word, 'c')
            || is_letter(word)
            || is_alphabet_word(word, self.alphabet)
    }

    pub fn is_alias_shaped(&self, word: &str) -> bool {
        is_counted(word, 't')
    }

    // =========================================================================
    // Relations
    // =========================================================================

    /// The name for one relation part (database, schema, table or CTE).
    pub fn relation(&mut self, ident: &Ident<'_>) -> String {
        if ident.wrap.is_none() && is_alphabet_word(ident.value, self.alphabet) {
            return ident.value.to_string();
        }
        let namer = &mut self.relation_namer;
        let name = self
            .relations
            .entry(ident.key())
            .or_insert_with(|| {
                let name = namer.next_name();
                tracing::trace!(%name, "allocated relation");
                name
            })
            .clone();
        ident.render(&name)
    }

    pub fn declare_cte(&mut self, ident: &Ident<'_>) -> String {
        self.ctes.insert(ident.key());
        self.relation(ident)
    }

    pub fn is_cte(&self, key: &str) -> bool {
        self.ctes.contains(key)
    }

    pub fn known_relation(&self, key: &str) -> Option<&str> {
        self.relations.get(key).map(String::as_str)
    }

    // =========================================================================
    // Aliases
    // =========================================================================

    /// The name for a table alias, bound to `target`.
    pub fn alias(&mut self, ident: &Ident<'_>, target: Option<String>) -> String {
        let key = ident.key();
        self.alias_targets.insert(key.clone(), target);
        if is_counted(ident.value, 't') {
            self.aliases.insert(key, ident.value.to_string());
            return ident.value.to_string();
        }
        let namer = &mut self.alias_namer;
        self.aliases
            .entry(key)
            .or_insert_with(|| namer.next_name())
            .clone()
    }

    pub fn known_alias(&self, key: &str) -> Option<&str> {
        self.aliases.get(key).map(String::as_str)
    }

    /// The relation an alias was last bound to.
    pub fn alias_target(&self, key: &str) -> Option<String> {
        self.alias_targets.get(key).cloned().flatten()
    }

    /// The name for an output column alias (`AS total`).
    pub fn column_alias(&mut self, ident: &Ident<'_>) -> String {
        if is_counted(ident.value, 'c') {
            return ident.value.to_string();
        }
        let namer = &mut self.column_alias_namer;
        let name = self
            .column_aliases
            .entry(ident.key())
            .or_insert_with(|| namer.next_name())
            .clone();
        ident.render(&name)
    }

    pub fn known_column_alias(&self, key: &str) -> Option<&str> {
        self.column_aliases.get(key).map(String::as_str)
    }

    // =========================================================================
    // Columns and literals
    // =========================================================================

    /// The name for a column in `scope` (a named subquery's key, or none).
    pub fn column(&mut self, ident: &Ident<'_>, scope: Option<&str>) -> String {
        if self.is_output_shaped(ident.value) {
            return ident.render(ident.value);
        }
        let key = (scope.map(String::from), ident.key());
        let letters = match scope {
            Some(scope) => self.scoped_letters.entry(scope.to_string()).or_default(),
            None => &mut self.letters,
        };
        let name = self.columns.entry(key).or_insert_with(|| letters.next_name()).clone();
        ident.render(&name)
    }

    pub fn literal(&mut self, raw: &str) -> String {
        literal::mask(raw, self.phrases, &mut self.literals)
    }

    /// Total identities handed out, literals excluded.
    pub fn issued(&self) -> usize {
        self.relations.len() + self.aliases.len() + self.column_aliases.len() + self.columns.len()
    }

    pub fn literals_masked(&self) -> usize {
        self.literals.len()
    }
}
