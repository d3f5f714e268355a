//! Clause-level rewrite over the token stream.
//!
//! Statements split at top-level `;`, bodies at set operators, and each
//! query block is handled in two passes:
//!
//! 1. **Sources.** Relations and aliases after `FROM`, `JOIN`, `UPDATE`,
//!    `INTO`, `TABLE` and `REFERENCES`. Derived tables are rewritten
//!    recursively right here, so their columns are numbered before the
//!    outer block mentions them.
//! 2. **Expressions.** Everything else in textual order: qualified and
//!    bare column references, output aliases, literals, and nested
//!    subqueries (recursively).
//!
//! Named subqueries (`WITH name AS (...)`) are rewritten before the
//! statement that follows them, with columns scoped to the subquery.

use crate::names::Names;
use crate::token::{Token, TokenKind};

/// Keywords that end a `SELECT` list at the top level of a block.
const CLAUSES: [&str; 15] = [
    "FROM", "WHERE", "GROUP", "HAVING", "ORDER", "LIMIT", "OFFSET", "ON", "USING", "SET", "VALUES",
    "RETURNING", "JOIN", "INTO", "WINDOW",
];

/// Words that may follow a relation but are not in the reserved list.
const ALIAS_STOP: [&str; 6] = ["FOR", "FETCH", "TABLESAMPLE", "QUALIFY", "PIVOT", "UNPIVOT"];

/// One relation a query block reads from.
#[derive(Debug, Clone)]
struct Source {
    /// Relation key; `None` for a derived table.
    relation: Option<String>,
    /// Alias key, explicit or synthesized.
    alias: Option<String>,
    /// A one-part relation name, eligible for a synthesized alias.
    simple: bool,
    /// Index of the source's last relation token.
    end: usize,
}

#[derive(Debug, Default)]
struct Block {
    /// The named subquery this block belongs to.
    cte: Option<String>,
    sources: Vec<Source>,
}

impl Block {
    /// Scope for unqualified columns: the enclosing named subquery, or the
    /// single named subquery this block reads from.
    fn column_scope(&self, names: &Names<'_>) -> Option<String> {
        if self.cte.is_some() {
            return self.cte.clone();
        }
        match self.sources.as_slice() {
            [Source {
                relation: Some(key),
                ..
            }] if names.is_cte(key) => Some(key.clone()),
            _ => None,
        }
    }
}

pub struct Rewriter<'s, 'c> {
    tokens: Vec<Token<'s>>,
    /// Replacement text per token; `None` copies the token.
    replaced: Vec<Option<String>>,
    /// Text inserted after a token.
    suffix: Vec<Option<String>>,
    /// Tokens already handled by the sources pass.
    claimed: Vec<bool>,
    blocks: Vec<Block>,
    names: Names<'c>,
}

impl<'s, 'c> Rewriter<'s, 'c> {
    pub fn new(tokens: Vec<Token<'s>>, names: Names<'c>) -> Self {
        let len = tokens.len();
        Self {
            tokens,
            replaced: vec![None; len],
            suffix: vec![None; len],
            claimed: vec![false; len],
            blocks: Vec::new(),
            names,
        }
    }

    pub fn names(&self) -> &Names<'c> {
        &self.names
    }

    /// Rewrite every statement.
    pub fn run(&mut self) {
        let len = self.tokens.len();
        let mut start = 0;
        let mut i = 0;
        while i < len {
            if self.tokens[i].is_symbol("(") {
                i = self.matching_paren(i, len) + 1;
                continue;
            }
            if self.tokens[i].is_symbol(";") {
                self.statement(start, i, None);
                start = i + 1;
            }
            i += 1;
        }
        self.statement(start, len, None);
    }

    /// The rewritten text: comments dropped, layout kept, ends trimmed.
    pub fn output(&self) -> String {
        let mut out = String::with_capacity(self.tokens.iter().map(|t| t.text.len()).sum());
        let mut squeeze = false;
        for (i, token) in self.tokens.iter().enumerate() {
            let after_comment = std::mem::take(&mut squeeze);
            match token.kind {
                TokenKind::LineComment => {
                    let kept = out.trim_end_matches([' ', '\t']).len();
                    out.truncate(kept);
                }
                TokenKind::BlockComment => {
                    let next_is_trivia = self.tokens.get(i + 1).map_or(true, Token::is_trivia);
                    if out.ends_with(char::is_whitespace) {
                        squeeze = true;
                    } else if !next_is_trivia && !out.is_empty() {
                        out.push(' ');
                    }
                }
                TokenKind::Whitespace if after_comment => {
                    if token.text.contains('\n') {
                        let kept = out.trim_end_matches([' ', '\t']).len();
                        out.truncate(kept);
                        out.push_str(token.text);
                    }
                }
                _ => out.push_str(self.replaced[i].as_deref().unwrap_or(token.text)),
            }
            if let Some(suffix) = &self.suffix[i] {
                out.push_str(suffix);
            }
        }
        out.trim().to_string()
    }

    // =========================================================================
    // Navigation
    // =========================================================================

    fn next_sig(&self, mut i: usize, hi: usize) -> Option<usize> {
        while i < hi {
            if !self.tokens[i].is_trivia() {
                return Some(i);
            }
            i += 1;
        }
        None
    }

    fn prev_sig(&self, i: usize) -> Option<usize> {
        (0..i).rev().find(|&k| !self.tokens[k].is_trivia())
    }

    fn next_is_symbol(&self, i: usize, hi: usize, symbol: &str) -> bool {
        self.next_sig(i, hi)
            .is_some_and(|k| self.tokens[k].is_symbol(symbol))
    }

    /// Index of the `)` closing the `(` at `open`, or `hi` when unbalanced.
    fn matching_paren(&self, open: usize, hi: usize) -> usize {
        let mut depth = 0usize;
        for k in open..hi {
            let token = &self.tokens[k];
            if token.is_symbol("(") {
                depth += 1;
            } else if token.is_symbol(")") {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return k;
                }
            }
        }
        hi
    }

    fn skip_words(&self, mut i: usize, hi: usize, words: &[&str]) -> usize {
        while let Some(k) = self.next_sig(i, hi) {
            if !words.iter().any(|w| self.tokens[k].is_word(w)) {
                break;
            }
            i = k + 1;
        }
        i
    }

    /// Indices of the parts of a dotted name starting at `at`, including a
    /// trailing `*`.
    fn chain(&self, at: usize, hi: usize) -> Vec<usize> {
        let mut parts = vec![at];
        let mut k = at;
        while k + 2 < hi && self.tokens[k + 1].is_symbol(".") {
            let next = self.tokens[k + 2];
            if next.is_symbol("*") {
                parts.push(k + 2);
                break;
            }
            if next.ident().is_none() {
                break;
            }
            parts.push(k + 2);
            k += 2;
        }
        parts
    }

    fn is_keyword(&self, token: &Token<'_>) -> bool {
        token.kind == TokenKind::Word && self.names.is_reserved(token.text)
    }

    fn set(&mut self, i: usize, text: String) {
        self.replaced[i] = Some(text);
    }

    fn claim(&mut self, from: usize, to: usize) {
        let to = to.min(self.claimed.len());
        for claimed in &mut self.claimed[from..to] {
            *claimed = true;
        }
    }

    fn current_cte(&self) -> Option<String> {
        self.blocks.last().and_then(|b| b.cte.clone())
    }

    fn column_scope(&self) -> Option<String> {
        self.blocks.last().and_then(|b| b.column_scope(&self.names))
    }

    /// The relation behind an alias visible from the current block,
    /// searching enclosing blocks for correlated references.
    fn visible_alias(&self, key: &str) -> Option<Option<String>> {
        self.blocks.iter().rev().find_map(|block| {
            block
                .sources
                .iter()
                .find(|s| s.alias.as_deref() == Some(key))
                .map(|s| s.relation.clone())
        })
    }

    // =========================================================================
    // Statements
    // =========================================================================

    fn statement(&mut self, lo: usize, hi: usize, cte: Option<String>) {
        let Some(first) = self.next_sig(lo, hi) else {
            return;
        };
        let start = if self.tokens[first].is_word("WITH") {
            self.named_subqueries(first + 1, hi)
        } else {
            first
        };
        self.body(start, hi, cte);
    }

    /// `[RECURSIVE] name [(columns)] AS [[NOT] MATERIALIZED] (query), ...`.
    /// Returns where the main statement starts.
    fn named_subqueries(&mut self, lo: usize, hi: usize) -> usize {
        let mut i = self.skip_words(lo, hi, &["RECURSIVE"]);
        loop {
            let Some(name_at) = self.next_sig(i, hi) else {
                return hi;
            };
            let token = self.tokens[name_at];
            let Some(ident) = token.ident().filter(|_| !self.is_keyword(&token)) else {
                return name_at;
            };
            let key = ident.key();
            let rendered = self.names.declare_cte(&ident);
            self.set(name_at, rendered);

            let Some(mut at) = self.next_sig(name_at + 1, hi) else {
                return hi;
            };
            if self.tokens[at].is_symbol("(") && !self.opens_query(at, hi) {
                let close = self.matching_paren(at, hi);
                for k in at + 1..close.min(hi) {
                    if let Some(column) = self.tokens[k].ident() {
                        let name = self.names.column(&column, Some(&key));
                        self.set(k, name);
                    }
                }
                let Some(next) = self.next_sig(close + 1, hi) else {
                    return hi;
                };
                at = next;
            }

            at = self.skip_words(at, hi, &["AS", "NOT", "MATERIALIZED"]);
            let Some(open) = self.next_sig(at, hi).filter(|&k| self.tokens[k].is_symbol("(")) else {
                return at;
            };
            let close = self.matching_paren(open, hi);
            tracing::trace!(cte = %key, "entering named subquery");
            self.statement(open + 1, close, Some(key));

            match self.next_sig(close + 1, hi) {
                Some(next) if self.tokens[next].is_symbol(",") => i = next + 1,
                Some(next) => return next,
                None => return hi,
            }
        }
    }

    /// Whether the `(` at `open` starts a subquery.
    fn opens_query(&self, open: usize, hi: usize) -> bool {
        self.next_sig(open + 1, hi)
            .is_some_and(|k| self.tokens[k].is_word("SELECT") || self.tokens[k].is_word("WITH"))
    }

    /// Split at top-level `UNION`, `EXCEPT` and `INTERSECT`.
    fn body(&mut self, lo: usize, hi: usize, cte: Option<String>) {
        let mut start = lo;
        let mut i = lo;
        while i < hi {
            let token = self.tokens[i];
            if token.is_symbol("(") {
                i = self.matching_paren(i, hi) + 1;
                continue;
            }
            if token.is_word("UNION") || token.is_word("EXCEPT") || token.is_word("INTERSECT") {
                self.block(start, i, cte.clone());
                start = i + 1;
            }
            i += 1;
        }
        self.block(start, hi, cte);
    }

    fn block(&mut self, lo: usize, hi: usize, cte: Option<String>) {
        let mut block = Block {
            cte,
            sources: Vec::new(),
        };
        self.sources(lo, hi, &mut block);
        self.implicit_aliases(lo, hi, &mut block);

        self.blocks.push(block);
        self.expressions(lo, hi);
        self.blocks.pop();
    }

    // =========================================================================
    // Pass 1: sources
    // =========================================================================

    fn sources(&mut self, lo: usize, hi: usize, block: &mut Block) {
        let mut i = lo;
        while i < hi {
            let token = self.tokens[i];
            if token.is_symbol("(") {
                i = self.matching_paren(i, hi) + 1;
                continue;
            }
            if token.kind != TokenKind::Word {
                i += 1;
                continue;
            }
            let keyword = token.text.to_ascii_uppercase();
            i = match keyword.as_str() {
                // `IS DISTINCT FROM` compares values.
                "FROM" if self.prev_sig(i).is_some_and(|k| self.tokens[k].is_word("DISTINCT")) => i + 1,
                "FROM" | "UPDATE" | "INTO" => self.source_list(i + 1, hi, block),
                "JOIN" | "REFERENCES" => self.source(i + 1, hi, block),
                "TABLE" => {
                    let start = self.skip_words(i + 1, hi, &["IF", "NOT", "EXISTS"]);
                    self.source(start, hi, block)
                }
                "USING" if !self.next_is_symbol(i + 1, hi, "(") => self.source_list(i + 1, hi, block),
                _ => i + 1,
            };
        }
    }

    fn source_list(&mut self, mut i: usize, hi: usize, block: &mut Block) -> usize {
        loop {
            i = self.source(i, hi, block);
            match self.next_sig(i, hi) {
                Some(k) if self.tokens[k].is_symbol(",") => i = k + 1,
                _ => return i,
            }
        }
    }

    /// One relation or derived table, with its alias.
    fn source(&mut self, i: usize, hi: usize, block: &mut Block) -> usize {
        let Some(at) = self.next_sig(i, hi) else {
            return hi;
        };
        let token = self.tokens[at];

        if token.is_symbol("(") {
            let close = self.matching_paren(at, hi);
            self.statement(at + 1, close, block.cte.clone());
            self.claim(at, close + 1);
            let (alias, next) = self.alias_after(close + 1, hi, None);
            block.sources.push(Source {
                relation: None,
                alias,
                simple: false,
                end: at,
            });
            return next.max(close + 1).min(hi);
        }

        if token.ident().is_none() || self.is_keyword(&token) {
            return at;
        }
        let parts = self.chain(at, hi);
        let mut key = None;
        for &k in &parts {
            if let Some(ident) = self.tokens[k].ident() {
                let name = self.names.relation(&ident);
                self.set(k, name);
                key = Some(ident.key());
            }
        }
        let end = parts.last().copied().unwrap_or(at);
        self.claim(at, end + 1);

        let (alias, next) = self.alias_after(end + 1, hi, key.clone());
        block.sources.push(Source {
            relation: key,
            alias,
            simple: parts.len() == 1,
            end,
        });
        next
    }

    /// An optional `[AS] alias` starting at `i`, bound to `target`.
    /// Returns the alias key and where scanning continues.
    fn alias_after(&mut self, i: usize, hi: usize, target: Option<String>) -> (Option<String>, usize) {
        let Some(first) = self.next_sig(i, hi) else {
            return (None, i);
        };
        let explicit = self.tokens[first].is_word("AS");
        let at = if explicit {
            match self.next_sig(first + 1, hi) {
                Some(k) => k,
                None => return (None, i),
            }
        } else {
            first
        };

        let token = self.tokens[at];
        let Some(ident) = token.ident() else {
            return (None, i);
        };
        if self.is_keyword(&token) || ALIAS_STOP.iter().any(|w| token.is_word(w)) {
            return (None, i);
        }

        let name = self.names.alias(&ident, target);
        self.set(at, ident.render(&name));
        self.claim(first, at + 1);
        (Some(ident.key()), at + 1)
    }

    /// A relation named in a qualifier (`users.id`) with no alias of its
    /// own gets one, inserted after its source occurrence.
    fn implicit_aliases(&mut self, lo: usize, hi: usize, block: &mut Block) {
        for k in lo..hi {
            if self.claimed[k] || k + 1 >= hi || !self.tokens[k + 1].is_symbol(".") {
                continue;
            }
            if k > 0 && self.tokens[k - 1].is_symbol(".") {
                continue;
            }
            let Some(ident) = self.tokens[k].ident() else {
                continue;
            };
            let key = ident.key();
            let Some(source) = block
                .sources
                .iter_mut()
                .find(|s| s.simple && s.alias.is_none() && s.relation.as_deref() == Some(key.as_str()))
            else {
                continue;
            };
            let alias = self.names.alias(&ident, Some(key.clone()));
            self.suffix[source.end] = Some(format!(" {alias}"));
            source.alias = Some(key);
        }
    }

    // =========================================================================
    // Pass 2: expressions
    // =========================================================================

    fn expressions(&mut self, lo: usize, hi: usize) {
        let mut depth = 0usize;
        let mut select_list = false;
        let mut i = lo;
        while i < hi {
            if self.claimed[i] {
                i += 1;
                continue;
            }
            let token = self.tokens[i];
            match token.kind {
                TokenKind::Symbol if token.text == "(" => {
                    if self.opens_query(i, hi) {
                        let close = self.matching_paren(i, hi);
                        let cte = self.current_cte();
                        self.statement(i + 1, close, cte);
                        i = close + 1;
                        continue;
                    }
                    depth += 1;
                }
                TokenKind::Symbol if token.text == ")" => depth = depth.saturating_sub(1),
                TokenKind::String => {
                    let masked = self.names.literal(token.text);
                    self.set(i, masked);
                }
                TokenKind::Word if self.names.is_reserved(token.text) => {
                    if depth == 0 {
                        if token.is_word("SELECT") {
                            select_list = true;
                        } else if CLAUSES.iter().any(|c| token.is_word(c)) {
                            select_list = false;
                        } else if select_list && token.is_word("AS") {
                            i = self.column_alias(i + 1, hi);
                            continue;
                        }
                    }
                }
                TokenKind::Word | TokenKind::Quoted(_) => {
                    i = self.reference(i, hi);
                    continue;
                }
                _ => {}
            }
            i += 1;
        }
    }

    fn column_alias(&mut self, i: usize, hi: usize) -> usize {
        let Some(at) = self.next_sig(i, hi) else {
            return hi;
        };
        let token = self.tokens[at];
        match token.ident() {
            Some(ident) if !self.is_keyword(&token) => {
                let name = self.names.column_alias(&ident);
                self.set(at, name);
                at + 1
            }
            _ => i,
        }
    }

    fn reference(&mut self, at: usize, hi: usize) -> usize {
        let parts = self.chain(at, hi);
        match parts.split_last() {
            Some((&last, qualifier)) if !qualifier.is_empty() => {
                self.qualified(qualifier, last);
                last + 1
            }
            _ => {
                self.bare(at, hi);
                at + 1
            }
        }
    }

    fn bare(&mut self, at: usize, hi: usize) {
        let token = self.tokens[at];
        let Some(ident) = token.ident() else {
            return;
        };
        if token.kind == TokenKind::Word {
            // Function names and `::type` casts.
            if self.next_is_symbol(at + 1, hi, "(") {
                return;
            }
            if self.prev_sig(at).is_some_and(|k| self.tokens[k].is_symbol("::")) {
                return;
            }
        }
        if self.names.is_output_shaped(ident.value) {
            return;
        }

        let key = ident.key();
        let rendered = if let Some(name) = self.names.known_relation(&key) {
            ident.render(name)
        } else if let Some(name) = self.names.known_alias(&key) {
            ident.render(name)
        } else if let Some(name) = self.names.known_column_alias(&key) {
            name.to_string()
        } else {
            let scope = self.column_scope();
            self.names.column(&ident, scope.as_deref())
        };
        self.set(at, rendered);
    }

    fn qualified(&mut self, qualifier: &[usize], last: usize) {
        let target = match qualifier {
            [single] => self.qualifier(*single),
            _ => {
                let mut key = None;
                for &k in qualifier {
                    if let Some(ident) = self.tokens[k].ident() {
                        let name = self.names.relation(&ident);
                        self.set(k, name);
                        key = Some(ident.key());
                    }
                }
                key
            }
        };

        let column = self.tokens[last];
        let Some(ident) = column.ident() else {
            return;
        };
        if self.is_keyword(&column) {
            return;
        }
        let subquery = target.as_deref().map_or(true, |key| self.names.is_cte(key));
        if subquery {
            if let Some(name) = self.names.known_column_alias(&ident.key()).map(str::to_string) {
                self.set(last, name);
                return;
            }
        }
        let scope = target
            .filter(|key| self.names.is_cte(key))
            .or_else(|| self.current_cte());
        let name = self.names.column(&ident, scope.as_deref());
        self.set(last, name);
    }

    /// Rewrite a one-part qualifier; returns the relation key behind it.
    fn qualifier(&mut self, at: usize) -> Option<String> {
        let ident = self.tokens[at].ident()?;
        let key = ident.key();

        if let Some(target) = self.visible_alias(&key) {
            if let Some(name) = self.names.known_alias(&key).map(str::to_string) {
                self.set(at, ident.render(&name));
            }
            return target;
        }
        if let Some(name) = self.names.known_alias(&key).map(str::to_string) {
            self.set(at, ident.render(&name));
            return self.names.alias_target(&key);
        }
        if self.names.is_alias_shaped(ident.value) {
            return None;
        }
        let name = self.names.relation(&ident);
        self.set(at, name);
        Some(key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;
    use codemask_core::FrontEndConfig;

    fn rewrite(sql: &str) -> String {
        let config = FrontEndConfig::sql();
        let mut rewriter = Rewriter::new(Lexer::new(sql).tokenize(), Names::new(&config));
        rewriter.run();
        rewriter.output()
    }

    #[test]
    fn test_relations_columns_and_dates() {
        assert_eq!(
            rewrite("SELECT first_name, last_name FROM users WHERE created_at > '2023-01-01'"),
            "SELECT A, B FROM Alpha WHERE C > '2023-01-01'"
        );
    }

    #[test]
    fn test_explicit_aliases() {
        assert_eq!(
            rewrite("SELECT u.name, o.total FROM users u JOIN orders AS o ON o.user_id = u.id WHERE o.total > 100"),
            "SELECT t1.A, t2.B FROM Alpha t1 JOIN Bravo AS t2 ON t2.C = t1.D WHERE t2.B > 100"
        );
    }

    #[test]
    fn test_implicit_alias_injected() {
        assert_eq!(
            rewrite("SELECT users.name FROM users WHERE users.id = 1"),
            "SELECT t1.A FROM Alpha t1 WHERE t1.B = 1"
        );
    }

    #[test]
    fn test_named_subquery_scopes_columns() {
        assert_eq!(
            rewrite("WITH recent AS (SELECT user_id, total FROM orders WHERE total > 10) SELECT r.user_id FROM recent r"),
            "WITH Alpha AS (SELECT A, B FROM Bravo WHERE B > 10) SELECT t1.A FROM Alpha t1"
        );
    }

    #[test]
    fn test_unqualified_columns_of_single_named_subquery() {
        assert_eq!(
            rewrite("WITH recent AS (SELECT id, total FROM orders) SELECT total FROM recent"),
            "WITH Alpha AS (SELECT A, B FROM Bravo) SELECT B FROM Alpha"
        );
    }

    #[test]
    fn test_derived_table_columns_first() {
        assert_eq!(
            rewrite("SELECT d.total, d.region FROM (SELECT SUM(amount) AS total, region FROM payments) d"),
            "SELECT t1.c1, t1.B FROM (SELECT SUM(A) AS c1, B FROM Alpha) t1"
        );
    }

    #[test]
    fn test_from_list_and_schema_names() {
        assert_eq!(
            rewrite("SELECT a.id FROM sales.accounts a, owners o WHERE a.owner_id = o.id"),
            "SELECT t1.A FROM Alpha.Bravo t1, Charlie t2 WHERE t1.B = t2.A"
        );
    }

    #[test]
    fn test_subquery_in_where() {
        assert_eq!(
            rewrite("SELECT name FROM users WHERE id IN (SELECT user_id FROM orders WHERE total > 100)"),
            "SELECT A FROM Alpha WHERE B IN (SELECT C FROM Bravo WHERE D > 100)"
        );
    }

    #[test]
    fn test_insert_update_delete() {
        assert_eq!(
            rewrite("INSERT INTO users (name, email) VALUES ('Ann', 'ann@example.com')"),
            "INSERT INTO Alpha (A, B) VALUES ('lorem ipsum', 'lorem 2')"
        );
        assert_eq!(
            rewrite("UPDATE users SET name = 'x' WHERE id = 1"),
            "UPDATE Alpha SET A = 'lorem ipsum' WHERE B = 1"
        );
        assert_eq!(
            rewrite("DELETE FROM sessions s WHERE s.expires_at < NOW()"),
            "DELETE FROM Alpha t1 WHERE t1.A < NOW()"
        );
    }

    #[test]
    fn test_create_table_guard() {
        assert_eq!(
            rewrite("CREATE TABLE IF NOT EXISTS accounts (id INT PRIMARY KEY, email VARCHAR(255) NOT NULL)"),
            "CREATE TABLE IF NOT EXISTS Alpha (A INT PRIMARY KEY, B VARCHAR(255) NOT NULL)"
        );
        assert_eq!(rewrite("DROP TABLE IF EXISTS accounts"), "DROP TABLE IF EXISTS Alpha");
    }

    #[test]
    fn test_join_using_columns() {
        assert_eq!(
            rewrite("SELECT * FROM orders JOIN payments USING (account_id)"),
            "SELECT * FROM Alpha JOIN Bravo USING (A)"
        );
    }

    #[test]
    fn test_output_aliases_and_order_by() {
        assert_eq!(
            rewrite("SELECT COUNT(*) AS orders_count FROM orders GROUP BY region ORDER BY orders_count DESC"),
            "SELECT COUNT(*) AS c1 FROM Alpha GROUP BY A ORDER BY c1 DESC"
        );
    }

    #[test]
    fn test_wildcards_placeholders_and_functions() {
        assert_eq!(
            rewrite("SELECT u.*, lower(email) FROM users u WHERE email = :email AND id = $1 OR code = ?"),
            "SELECT t1.*, lower(A) FROM Alpha t1 WHERE A = :email AND B = $1 OR C = ?"
        );
    }

    #[test]
    fn test_comments_removed_layout_kept() {
        assert_eq!(
            rewrite("-- report\nSELECT id -- the key\nFROM users /* main */ WHERE id = 1;\n"),
            "SELECT A\nFROM Alpha WHERE A = 1;"
        );
    }

    #[test]
    fn test_quoted_identifiers() {
        assert_eq!(
            rewrite("SELECT \"First Name\" FROM [Order Lines]"),
            "SELECT \"A\" FROM [Alpha]"
        );
    }

    #[test]
    fn test_statements_share_names() {
        assert_eq!(
            rewrite("SELECT id FROM users; SELECT id FROM users"),
            "SELECT A FROM Alpha; SELECT A FROM Alpha"
        );
    }

    #[test]
    fn test_unbalanced_input_does_not_panic() {
        for sql in ["SELECT (", "FROM", "WITH x AS (", "SELECT a. FROM", ")))", "INSERT INTO", "'open"] {
            let _ = rewrite(sql);
        }
    }
}
