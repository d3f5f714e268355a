#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]

//! Shared primitives for the codemask front ends.
//!
//! Every front end drives the same three pieces over its own view of the
//! input: a [`ScopeStack`] of renaming frames, a set of per-role
//! [`Namers`], and a content-addressed [`LiteralMasker`]. All of them are
//! created fresh for each run and borrow their word lists from a
//! [`FrontEndConfig`], so a front end value can be reused and shared freely.

pub mod config;
pub mod error;
pub mod language;
pub mod literal;
pub mod namer;
pub mod reserved;
pub mod scope;

pub use config::{FrontEndConfig, FrontEndOverrides, Settings};
pub use error::{Error, Result};
pub use language::Language;
pub use literal::LiteralMasker;
pub use namer::{AlphabetNamer, CountedNamer, LetterNamer, Namers, Overflow, Role};
pub use reserved::ReservedSet;
pub use scope::{Frame, FrameKind, ScopeStack};

/// A front end that rewrites source text of one language.
///
/// `anonymize` never fails: malformed input is reported as diagnostic text
/// in the returned string. Implementations keep only immutable
/// configuration, so concurrent and interleaved calls are independent.
pub trait Anonymize {
    /// The grammar this front end handles.
    fn language(&self) -> Language;

    /// Rewrite `source`, returning the scrubbed text or a diagnostic.
    fn anonymize(&self, source: &str) -> String;
}
