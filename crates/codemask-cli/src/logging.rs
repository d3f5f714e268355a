//! Logging initialization for the CLI.
//!
//! Logging is owned by the CLI crate; the front-end libraries only emit
//! `tracing` events. Logs always go to stderr so stdout carries nothing but
//! the anonymized text (or the `--json` report).

use tracing::Level;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize the tracing subscriber.
///
/// * `verbosity` - 0 = INFO, 1 = DEBUG, 2+ = TRACE for the codemask crates
/// * `json` - emit JSON lines instead of human-readable text
///
/// JSON line shape:
/// ```json
/// {"timestamp":"...","level":"DEBUG","fields":{"message":"sql run finished","names":4},"target":"codemask_sql"}
/// ```
///
/// # Panics
/// Panics if a global subscriber is already installed.
pub fn init(verbosity: u8, json: bool) {
    let level = match verbosity {
        0 => Level::INFO,
        1 => Level::DEBUG,
        _ => Level::TRACE,
    };

    // RUST_LOG sets the baseline; the verbosity flag raises our own crates.
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    for krate in ["codemask", "codemask_core", "codemask_js", "codemask_python", "codemask_sql"] {
        if let Ok(directive) = format!("{krate}={level}").parse() {
            filter = filter.add_directive(directive);
        }
    }

    let subscriber = tracing_subscriber::registry().with(filter);

    if json {
        subscriber
            .with(
                fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_span_list(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        subscriber
            .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
            .init();
    }
}
