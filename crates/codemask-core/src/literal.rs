//! Content-addressed literal replacement.

use rustc_hash::FxHashMap;

/// Default placeholder phrases, handed out in order.
pub const LOREM: [&str; 20] = [
    "Lorem Ipsum",
    "Dolor sit amet",
    "Consectetur adipiscing elit",
    "Sed do eiusmod",
    "Tempor incididunt",
    "Ut labore et dolore",
    "Magna aliqua",
    "Ut enim ad minim",
    "Veniam quis nostrud",
    "Exercitation ullamco",
    "Laboris nisi ut",
    "Aliquip ex ea",
    "Commodo consequat",
    "Duis aute irure",
    "Dolor in reprehenderit",
    "In voluptate velit",
    "Esse cillum dolore",
    "Eu fugiat nulla",
    "Pariatur excepteur",
    "Sint occaecat cupidatat",
];

pub fn lorem_phrases() -> Vec<String> {
    LOREM.iter().map(|p| (*p).to_string()).collect()
}

/// Maps literal content to placeholder phrases. The same content always
/// yields the same phrase within one masker; distinct content never shares
/// one.
#[derive(Debug, Clone)]
pub struct LiteralMasker<'a> {
    phrases: &'a [String],
    assigned: FxHashMap<String, String>,
    issued: usize,
}

impl<'a> LiteralMasker<'a> {
    pub fn new(phrases: &'a [String]) -> Self {
        Self {
            phrases,
            assigned: FxHashMap::default(),
            issued: 0,
        }
    }

    /// The placeholder for `content`.
    pub fn mask(&mut self, content: &str) -> String {
        if let Some(existing) = self.assigned.get(content) {
            return existing.clone();
        }
        let phrase = self.next_phrase();
        self.assigned.insert(content.to_string(), phrase.clone());
        phrase
    }

    /// Number of distinct literals seen.
    pub fn len(&self) -> usize {
        self.assigned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assigned.is_empty()
    }

    fn next_phrase(&mut self) -> String {
        let index = self.issued;
        self.issued += 1;
        match self.phrases.get(index) {
            Some(phrase) => phrase.clone(),
            None => format!("{} {}", self.stem(), index + 1),
        }
    }

    /// First word of the first phrase, used once the list runs out.
    fn stem(&self) -> &str {
        self.phrases
            .first()
            .and_then(|p| p.split_whitespace().next())
            .unwrap_or("Lorem")
    }
}
