#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::too_many_lines)]

//! codemask-sql: clause-level SQL anonymizer.
//!
//! Relations become words from the alphabet, table aliases `t<n>`, output
//! aliases `c<n>`, columns spreadsheet letters, and string literals
//! placeholder phrases. Dates, numbers, bind parameters, keywords and
//! function names are kept. Running the output through again changes
//! nothing.
//!
//! # Example
//!
//! ```
//! let output = codemask_sql::anonymize(
//!     "SELECT first_name, last_name FROM users WHERE created_at > '2023-01-01'",
//! );
//! assert_eq!(output, "SELECT A, B FROM Alpha WHERE C > '2023-01-01'");
//! ```

mod lexer;
mod literal;
mod names;
mod rewriter;
mod token;

pub use lexer::Lexer;
pub use token::{Ident, Token, TokenKind, Wrap};

use codemask_core::{Anonymize, FrontEndConfig, Language};
use names::Names;
use rewriter::Rewriter;
use tracing::debug;

/// Anonymize `source` with the default SQL configuration.
pub fn anonymize(source: &str) -> String {
    anonymize_with(source, &FrontEndConfig::sql())
}

/// Anonymize `source` with `config`.
pub fn anonymize_with(source: &str, config: &FrontEndConfig) -> String {
    debug!(input_chars = source.chars().count(), "sql run started");

    let text = source.replace("\r\n", "\n");
    let tokens = Lexer::new(&text).tokenize();
    debug!(tokens = tokens.len(), "tokenized");

    let mut rewriter = Rewriter::new(tokens, Names::new(config));
    rewriter.run();
    let output = rewriter.output();

    debug!(
        output_chars = output.chars().count(),
        names = rewriter.names().issued(),
        literals = rewriter.names().literals_masked(),
        "sql run finished"
    );
    output
}

/// The SQL front end as a reusable value.
#[derive(Debug, Clone)]
pub struct SqlAnonymizer {
    config: FrontEndConfig,
}

impl SqlAnonymizer {
    pub fn new(config: FrontEndConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrontEndConfig {
        &self.config
    }
}

impl Default for SqlAnonymizer {
    fn default() -> Self {
        Self::new(FrontEndConfig::sql())
    }
}

impl Anonymize for SqlAnonymizer {
    fn language(&self) -> Language {
        Language::Sql
    }

    fn anonymize(&self, source: &str) -> String {
        anonymize_with(source, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_is_a_fixed_point() {
        let source = "SELECT first_name, last_name FROM users WHERE created_at > '2023-01-01'";
        let once = anonymize(source);
        assert_eq!(anonymize(&once), once);
    }

    #[test]
    fn test_crlf_normalized() {
        assert_eq!(anonymize("SELECT id\r\nFROM users"), "SELECT A\nFROM Alpha");
    }

    #[test]
    fn test_extra_reserved() {
        let config = FrontEndConfig::sql().extend_reserved(["tenant_id"]);
        assert_eq!(
            anonymize_with("SELECT tenant_id FROM users", &config),
            "SELECT tenant_id FROM Alpha"
        );
    }

    #[test]
    fn test_trait_object() {
        let front: Box<dyn Anonymize> = Box::new(SqlAnonymizer::default());
        assert_eq!(front.language(), Language::Sql);
        assert_eq!(front.anonymize("SELECT id FROM users"), "SELECT A FROM Alpha");
    }
}
