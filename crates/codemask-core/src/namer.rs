//! Deterministic name generators.
//!
//! Each role draws from its own generator so that a rendered name alone
//! reveals what kind of symbol it stands for: variables come from a word
//! alphabet, functions and classes from counted tags.

use serde::{Deserialize, Serialize};

/// The NATO phonetic alphabet, the default variable alphabet.
pub const NATO: [&str; 26] = [
    "Alpha", "Bravo", "Charlie", "Delta", "Echo", "Foxtrot", "Golf", "Hotel", "India", "Juliett",
    "Kilo", "Lima", "Mike", "November", "Oscar", "Papa", "Quebec", "Romeo", "Sierra", "Tango",
    "Uniform", "Victor", "Whiskey", "Xray", "Yankee", "Zulu",
];

/// Symbol roles. Several roles may share a generator, but every role
/// belongs to exactly one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Variables and parameters.
    Variable,
    /// Receiver fields (`this.x`, `self.x`).
    Field,
    /// Accessor-decorated definitions.
    Property,
    /// Free functions and call targets.
    Function,
    /// Class methods.
    Method,
    /// Classes.
    Class,
}

/// What an [`AlphabetNamer`] does once every base word has been used.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Overflow {
    /// Start again from the first word.
    #[default]
    Cycle,
    /// Switch to `Var<n>`, where `n` is the 1-based allocation count.
    Counted,
    /// Append the lap number: `Alpha1`, `Bravo1`, ...
    Lapped,
}

/// Allocates names from a word list.
#[derive(Debug, Clone)]
pub struct AlphabetNamer<'a> {
    words: &'a [String],
    overflow: Overflow,
    issued: usize,
}

impl<'a> AlphabetNamer<'a> {
    pub fn new(words: &'a [String], overflow: Overflow) -> Self {
        Self {
            words,
            overflow,
            issued: 0,
        }
    }

    /// Allocate the next name.
    pub fn next_name(&mut self) -> String {
        let index = self.issued;
        self.issued += 1;

        if self.words.is_empty() {
            return format!("Var{}", index + 1);
        }

        let len = self.words.len();
        match self.overflow {
            Overflow::Cycle => self.words[index % len].clone(),
            Overflow::Counted => match self.words.get(index) {
                Some(word) => word.clone(),
                None => format!("Var{}", index + 1),
            },
            Overflow::Lapped => {
                let lap = index / len;
                let word = &self.words[index % len];
                if lap == 0 {
                    word.clone()
                } else {
                    format!("{word}{lap}")
                }
            }
        }
    }

    /// Number of names handed out so far.
    pub fn issued(&self) -> usize {
        self.issued
    }
}

/// Allocates `<prefix><n>` tags, counting from 1.
#[derive(Debug, Clone)]
pub struct CountedNamer {
    prefix: &'static str,
    issued: u32,
}

impl CountedNamer {
    pub const fn new(prefix: &'static str) -> Self {
        Self { prefix, issued: 0 }
    }

    pub fn next_name(&mut self) -> String {
        self.issued += 1;
        format!("{}{}", self.prefix, self.issued)
    }

    pub fn issued(&self) -> u32 {
        self.issued
    }
}

/// Allocates spreadsheet-style column letters: `A`..`Z`, then `A1`..`Z1`.
#[derive(Debug, Clone, Default)]
pub struct LetterNamer {
    issued: usize,
}

impl LetterNamer {
    pub const fn new() -> Self {
        Self { issued: 0 }
    }

    pub fn next_name(&mut self) -> String {
        let name = Self::letter(self.issued);
        self.issued += 1;
        name
    }

    /// The name for a zero-based index.
    pub fn letter(index: usize) -> String {
        let base = u8::try_from(index % 26).unwrap_or(0);
        let lap = index / 26;
        let letter = char::from(b'A' + base);
        if lap == 0 {
            letter.to_string()
        } else {
            format!("{letter}{lap}")
        }
    }
}

/// The per-run generator set for the role-based front ends.
#[derive(Debug, Clone)]
pub struct Namers<'a> {
    variables: AlphabetNamer<'a>,
    functions: CountedNamer,
    classes: CountedNamer,
}

impl<'a> Namers<'a> {
    pub fn new(alphabet: &'a [String], overflow: Overflow) -> Self {
        Self {
            variables: AlphabetNamer::new(alphabet, overflow),
            functions: CountedNamer::new("Function"),
            classes: CountedNamer::new("Class"),
        }
    }

    /// Allocate a fresh name for `role`.
    pub fn next(&mut self, role: Role) -> String {
        let name = match role {
            Role::Variable | Role::Field | Role::Property => self.variables.next_name(),
            Role::Function | Role::Method => self.functions.next_name(),
            Role::Class => self.classes.next_name(),
        };
        tracing::trace!(?role, %name, "allocated name");
        name
    }

    /// Total names allocated across all roles.
    pub fn total_issued(&self) -> usize {
        self.variables.issued() + self.functions.issued() as usize + self.classes.issued() as usize
    }
}

/// The default alphabet as owned strings.
pub fn nato_alphabet() -> Vec<String> {
    NATO.iter().map(|w| (*w).to_string()).collect()
}

/// Strip a trailing lap number and check the base against `alphabet`
/// case-insensitively (`Alpha`, `bravo2`).
pub fn is_alphabet_word(word: &str, alphabet: &[String]) -> bool {
    let base = word.trim_end_matches(|c: char| c.is_ascii_digit());
    !base.is_empty() && alphabet.iter().any(|w| w.eq_ignore_ascii_case(base))
}
