use std::path::PathBuf;
use thiserror::Error;

/// Core error type for codemask operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read config at {path}: {source}")]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config at {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The input could not be turned into a structural view.
    #[error("{message} ({line}:{column})")]
    Syntax {
        message: String,
        line: u32,
        column: u32,
    },

    #[error("Input is {len} characters, over the limit of {limit}")]
    InputTooLarge { len: usize, limit: usize },

    #[error("Unknown language '{0}' (expected javascript, python or sql)")]
    UnknownLanguage(String),

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// The in-band text a front end returns in place of its output.
    #[must_use]
    pub fn diagnostic(&self) -> String {
        match self {
            Self::Syntax { .. } => format!("// Syntax Error: {self}"),
            other => format!("// Error: {other}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_syntax_diagnostic() {
        let err = Error::Syntax {
            message: "Unexpected token".to_string(),
            line: 3,
            column: 7,
        };
        assert_eq!(err.diagnostic(), "// Syntax Error: Unexpected token (3:7)");
    }

    #[test]
    fn test_input_too_large_message() {
        let err = Error::InputTooLarge { len: 4000, limit: 3000 };
        assert!(err.to_string().contains("4000"));
        assert!(err.to_string().contains("3000"));
    }
}
