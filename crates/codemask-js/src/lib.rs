#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::too_many_lines)]

//! codemask-js: scope-aware JavaScript and JSX anonymizer.
//!
//! The front end works in three passes over a fully parsed program:
//!
//! 1. **Parse** with an on-demand lexer and a recursive-descent parser
//!    (regex and JSX tokenization depend on parser context).
//! 2. **Rename** in place: identifiers by scope, class members by a
//!    run-wide namespace, string and template text by content.
//! 3. **Generate** canonical source: comments dropped, double-quoted
//!    strings, two-space indentation.
//!
//! # Example
//!
//! ```
//! let output = codemask_js::anonymize("let secret = 'token';");
//! assert_eq!(output, "let Alpha = \"Lorem Ipsum\";");
//! ```

mod anonymizer;
pub mod ast;
mod codegen;
mod jsx;
pub mod lexer;
mod parser;
pub mod span;
pub mod token;

pub use codegen::Codegen;
pub use lexer::Lexer;
pub use parser::{ParseError, Parser};
pub use span::{LineIndex, Span};
pub use token::{Token, TokenKind};

use anonymizer::Anonymizer;
use codemask_core::{Anonymize, Error, FrontEndConfig, Language};
use tracing::{debug, warn};

/// Anonymize `source` with the default JavaScript configuration.
pub fn anonymize(source: &str) -> String {
    anonymize_with(source, &FrontEndConfig::javascript())
}

/// Anonymize `source`; a parse failure becomes the diagnostic text.
pub fn anonymize_with(source: &str, config: &FrontEndConfig) -> String {
    match try_anonymize(source, config) {
        Ok(output) => output,
        Err(err) => {
            warn!(%err, "javascript input rejected");
            err.diagnostic()
        }
    }
}

/// Anonymize `source`, returning parse failures as [`Error::Syntax`].
pub fn try_anonymize(source: &str, config: &FrontEndConfig) -> Result<String, Error> {
    debug!(input_chars = source.chars().count(), "javascript run started");

    let mut program = Parser::new(source).parse().map_err(|err| {
        let (line, column) = LineIndex::new(source).line_col(source, err.span.start);
        Error::Syntax {
            message: err.message,
            line,
            column,
        }
    })?;

    let mut run = Anonymizer::new(config);
    run.run(&mut program);
    let output = Codegen::new(&program).generate();

    debug!(
        output_chars = output.chars().count(),
        names = run.names_issued(),
        literals = run.literals_masked(),
        "javascript run finished"
    );
    Ok(output)
}

/// The structural front end as a reusable value.
#[derive(Debug, Clone)]
pub struct JsAnonymizer {
    config: FrontEndConfig,
}

impl JsAnonymizer {
    pub fn new(config: FrontEndConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrontEndConfig {
        &self.config
    }
}

impl Default for JsAnonymizer {
    fn default() -> Self {
        Self::new(FrontEndConfig::javascript())
    }
}

impl Anonymize for JsAnonymizer {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn anonymize(&self, source: &str) -> String {
        anonymize_with(source, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_function() {
        let source = "function greet(name) {\n  const message = `Hello ${name}, welcome`;\n  console.log(message);\n}\ngreet('John Smith');";
        let expected = "function Function1(Alpha) {\n  const Bravo = `Lorem Ipsum${Alpha}Dolor sit amet`;\n  console.log(Bravo);\n}\nFunction1(\"Consectetur adipiscing elit\");";
        assert_eq!(anonymize(source), expected);
    }

    #[test]
    fn test_syntax_error_diagnostic() {
        let output = anonymize("let x = ;");
        assert!(output.starts_with("// Syntax Error: Unexpected token"));
        assert!(output.ends_with("(1:9)"));
    }

    #[test]
    fn test_try_anonymize_typed_error() {
        let err = try_anonymize("a\n  +", &FrontEndConfig::javascript()).unwrap_err();
        match err {
            Error::Syntax { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_deep_nesting_is_a_syntax_error() {
        let source = format!("x = {}1{};", "(".repeat(3000), ")".repeat(3000));
        let output = anonymize(&source);
        assert!(output.starts_with("// Syntax Error: Nesting too deep"), "{output}");

        let source = format!("x = {}1;", "!".repeat(3000));
        assert!(matches!(
            try_anonymize(&source, &FrontEndConfig::javascript()),
            Err(Error::Syntax { .. })
        ));
    }

    #[test]
    fn test_moderate_nesting_parses() {
        let source = format!("x = {}1{};", "(".repeat(30), ")".repeat(30));
        assert_eq!(anonymize(&source), "Alpha = 1;");
    }

    #[test]
    fn test_extra_reserved() {
        let config = FrontEndConfig::javascript().extend_reserved(["secretName"]);
        assert_eq!(anonymize_with("let secretName = 1;", &config), "let secretName = 1;");
    }

    #[test]
    fn test_trait_object() {
        let front: Box<dyn Anonymize> = Box::new(JsAnonymizer::default());
        assert_eq!(front.language(), Language::JavaScript);
        assert_eq!(front.anonymize("x;"), "Alpha;");
    }
}
