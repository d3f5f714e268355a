use crate::error::Error;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Supported source grammars.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[serde(alias = "js", alias = "jsx")]
    JavaScript,
    #[serde(alias = "py")]
    Python,
    Sql,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::JavaScript, Language::Python, Language::Sql];

    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::JavaScript => "javascript",
            Self::Python => "python",
            Self::Sql => "sql",
        }
    }

    /// Guess the language from a file extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        match ext.as_str() {
            "js" | "mjs" | "cjs" | "jsx" => Some(Self::JavaScript),
            "py" | "pyw" => Some(Self::Python),
            "sql" => Some(Self::Sql),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "js" | "jsx" | "javascript" => Ok(Self::JavaScript),
            "py" | "python" => Ok(Self::Python),
            "sql" => Ok(Self::Sql),
            _ => Err(Error::UnknownLanguage(s.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("JS".parse::<Language>().unwrap(), Language::JavaScript);
        assert_eq!("py".parse::<Language>().unwrap(), Language::Python);
        assert_eq!("sql".parse::<Language>().unwrap(), Language::Sql);
        assert!("cobol".parse::<Language>().is_err());
    }

    #[test]
    fn test_from_path() {
        assert_eq!(Language::from_path(Path::new("a/b.jsx")), Some(Language::JavaScript));
        assert_eq!(Language::from_path(Path::new("query.SQL")), Some(Language::Sql));
        assert_eq!(Language::from_path(Path::new("Makefile")), None);
    }

    #[test]
    fn test_serde_names() {
        let json = serde_json::to_string(&Language::JavaScript).unwrap();
        assert_eq!(json, "\"javascript\"");
        let lang: Language = serde_json::from_str("\"py\"").unwrap();
        assert_eq!(lang, Language::Python);
    }
}
