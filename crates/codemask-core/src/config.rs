use crate::error::{Error, Result};
use crate::language::Language;
use crate::literal::lorem_phrases;
use crate::namer::{nato_alphabet, Overflow};
use crate::reserved::ReservedSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Default input-size guard, in characters.
pub const DEFAULT_MAX_INPUT_CHARS: usize = 3000;

/// Per-front-end configuration. Everything a front end renames or inserts
/// comes from here, so none of it is baked into engine logic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrontEndConfig {
    /// Identifiers that are never renamed.
    pub reserved: ReservedSet,

    /// Placeholder phrases for literal text.
    pub phrases: Vec<String>,

    /// Base alphabet for variable-role names.
    pub alphabet: Vec<String>,

    /// What the alphabet does once exhausted.
    pub overflow: Overflow,
}

impl FrontEndConfig {
    /// Defaults for the JavaScript front end.
    #[must_use]
    pub fn javascript() -> Self {
        Self {
            reserved: ReservedSet::javascript(),
            phrases: lorem_phrases(),
            alphabet: nato_alphabet(),
            overflow: Overflow::Cycle,
        }
    }

    /// Defaults for the Python front end.
    #[must_use]
    pub fn python() -> Self {
        Self {
            reserved: ReservedSet::python(),
            phrases: lorem_phrases(),
            alphabet: nato_alphabet(),
            overflow: Overflow::Counted,
        }
    }

    /// Defaults for the SQL front end.
    #[must_use]
    pub fn sql() -> Self {
        Self {
            reserved: ReservedSet::sql(),
            phrases: vec!["lorem ipsum".to_string()],
            alphabet: nato_alphabet(),
            overflow: Overflow::Lapped,
        }
    }

    #[must_use]
    pub fn for_language(language: Language) -> Self {
        match language {
            Language::JavaScript => Self::javascript(),
            Language::Python => Self::python(),
            Language::Sql => Self::sql(),
        }
    }

    /// Replace the reserved set.
    #[must_use]
    pub fn with_reserved(mut self, reserved: ReservedSet) -> Self {
        self.reserved = reserved;
        self
    }

    /// Add names to the reserved set.
    #[must_use]
    pub fn extend_reserved<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.reserved.extend(names);
        self
    }

    /// Set the placeholder phrase list.
    #[must_use]
    pub fn with_phrases(mut self, phrases: Vec<String>) -> Self {
        self.phrases = phrases;
        self
    }

    /// Set the variable alphabet.
    #[must_use]
    pub fn with_alphabet(mut self, alphabet: Vec<String>) -> Self {
        self.alphabet = alphabet;
        self
    }

    /// Apply a partial override from a settings file.
    #[must_use]
    pub fn apply(mut self, overrides: &FrontEndOverrides) -> Self {
        if let Some(reserved) = &overrides.reserved {
            self.reserved.replace(reserved.iter().cloned());
        }
        self.reserved.extend(overrides.extra_reserved.iter().cloned());
        if let Some(phrases) = &overrides.phrases {
            self.phrases.clone_from(phrases);
        }
        if let Some(alphabet) = &overrides.alphabet {
            self.alphabet.clone_from(alphabet);
        }
        self
    }
}

/// Partial front-end configuration as written in a settings file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrontEndOverrides {
    /// Replaces the default reserved set.
    pub reserved: Option<Vec<String>>,
    /// Added to the (default or replaced) reserved set.
    pub extra_reserved: Vec<String>,
    pub phrases: Option<Vec<String>>,
    pub alphabet: Option<Vec<String>>,
}

/// Settings file contents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Input-size guard; `0` disables it.
    pub max_input_chars: usize,
    pub javascript: FrontEndOverrides,
    pub python: FrontEndOverrides,
    pub sql: FrontEndOverrides,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            max_input_chars: DEFAULT_MAX_INPUT_CHARS,
            javascript: FrontEndOverrides::default(),
            python: FrontEndOverrides::default(),
            sql: FrontEndOverrides::default(),
        }
    }
}

impl Settings {
    /// Load settings from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load settings if `path` is given, defaults otherwise.
    pub fn load_optional(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    #[must_use]
    pub fn overrides(&self, language: Language) -> &FrontEndOverrides {
        match language {
            Language::JavaScript => &self.javascript,
            Language::Python => &self.python,
            Language::Sql => &self.sql,
        }
    }

    /// The effective configuration for `language`.
    #[must_use]
    pub fn config_for(&self, language: Language) -> FrontEndConfig {
        FrontEndConfig::for_language(language).apply(self.overrides(language))
    }

    /// Check `source` against the input-size guard.
    pub fn check_input(&self, source: &str) -> Result<()> {
        if self.max_input_chars == 0 {
            return Ok(());
        }
        let len = source.chars().count();
        if len > self.max_input_chars {
            return Err(Error::InputTooLarge {
                len,
                limit: self.max_input_chars,
            });
        }
        Ok(())
    }

    #[must_use]
    pub fn with_max_input_chars(mut self, limit: usize) -> Self {
        self.max_input_chars = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_extend_reserved() {
        let overrides = FrontEndOverrides {
            extra_reserved: vec!["React".to_string()],
            ..Default::default()
        };
        let config = FrontEndConfig::javascript().apply(&overrides);
        assert!(config.reserved.contains("React"));
        assert!(config.reserved.contains("console"));
    }

    #[test]
    fn test_overrides_replace_reserved() {
        let overrides = FrontEndOverrides {
            reserved: Some(vec!["only".to_string()]),
            ..Default::default()
        };
        let config = FrontEndConfig::javascript().apply(&overrides);
        assert!(config.reserved.contains("only"));
        assert!(!config.reserved.contains("console"));
    }

    #[test]
    fn test_check_input_guard() {
        let settings = Settings::default().with_max_input_chars(5);
        assert!(settings.check_input("abcde").is_ok());
        assert!(matches!(
            settings.check_input("abcdef"),
            Err(Error::InputTooLarge { len: 6, limit: 5 })
        ));
        assert!(Settings::default().with_max_input_chars(0).check_input(&"x".repeat(10_000)).is_ok());
    }

    #[test]
    fn test_partial_settings_json() {
        let settings: Settings =
            serde_json::from_str(r#"{"python": {"phrases": ["one", "two"]}}"#).unwrap();
        assert_eq!(settings.max_input_chars, DEFAULT_MAX_INPUT_CHARS);
        let config = settings.config_for(Language::Python);
        assert_eq!(config.phrases, vec!["one", "two"]);
        assert!(config.reserved.contains("def"));
    }

    #[test]
    fn test_with_reserved_replaces_defaults() {
        let config = FrontEndConfig::javascript().with_reserved(ReservedSet::new(["jQuery"]));
        assert!(config.reserved.contains("jQuery"));
        assert!(!config.reserved.contains("console"));
    }
}
