#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

//! codemask-python: indentation-aware Python anonymizer.
//!
//! There is no parser here. The front end strips comments and docstrings,
//! collects import bindings, then makes a single pass that classifies each
//! identifier from a small state machine (decorators, headers, `case`
//! patterns) and an indentation-keyed scope stack. Any input produces
//! output.
//!
//! # Example
//!
//! ```
//! let output = codemask_python::anonymize("def f(x):\n    return x\n");
//! assert_eq!(output, "def Function1(Alpha):\n    return Alpha\n");
//! ```

mod comments;
mod fsm;
mod fstring;
mod imports;
mod scanner;

pub use comments::strip as strip_comments;

use codemask_core::{Anonymize, FrontEndConfig, Language};
use scanner::{Run, Scanner};
use tracing::debug;

/// Anonymize `source` with the default Python configuration.
pub fn anonymize(source: &str) -> String {
    anonymize_with(source, &FrontEndConfig::python())
}

/// Anonymize `source` with `config`.
pub fn anonymize_with(source: &str, config: &FrontEndConfig) -> String {
    debug!(input_chars = source.chars().count(), "python run started");

    let text = comments::strip(source);
    let imports = imports::collect(&text);
    debug!(imports = imports.len(), "collected import bindings");

    let mut run = Run::new(config, imports);
    let output = Scanner::new(&text, &mut run).scan();

    debug!(
        output_chars = output.chars().count(),
        names = run.names_issued(),
        literals = run.literals_masked(),
        "python run finished"
    );
    output
}

/// The indentation-aware front end as a reusable value.
#[derive(Debug, Clone)]
pub struct PyAnonymizer {
    config: FrontEndConfig,
}

impl PyAnonymizer {
    pub fn new(config: FrontEndConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrontEndConfig {
        &self.config
    }
}

impl Default for PyAnonymizer {
    fn default() -> Self {
        Self::new(FrontEndConfig::python())
    }
}

impl Anonymize for PyAnonymizer {
    fn language(&self) -> Language {
        Language::Python
    }

    fn anonymize(&self, source: &str) -> String {
        anonymize_with(source, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_example_two_functions() {
        let source = "def add(a):\n    # identity for now\n    return a\n\ndef sub(b):\n    \"\"\"Docs.\"\"\"\n    return b\n";
        let expected = "def Function1(Alpha):\n    return Alpha\n\ndef Function2(Bravo):\n    return Bravo\n";
        assert_eq!(anonymize(source), expected);
    }

    #[test]
    fn test_counted_overflow_by_default() {
        let source: String = (0..27).map(|i| format!("v{i} = {i}\n")).collect();
        let output = anonymize(&source);
        assert!(output.starts_with("Alpha = 0\n"));
        assert!(output.ends_with("Var27 = 26\n"));
    }

    #[test]
    fn test_extra_reserved() {
        let config = FrontEndConfig::python().extend_reserved(["request"]);
        assert_eq!(anonymize_with("request = 1", &config), "request = 1");
    }

    #[test]
    fn test_trait_object() {
        let front: Box<dyn Anonymize> = Box::new(PyAnonymizer::default());
        assert_eq!(front.language(), Language::Python);
        assert_eq!(front.anonymize("x = 1\n"), "Alpha = 1\n");
    }
}
