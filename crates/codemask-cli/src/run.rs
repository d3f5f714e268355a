//! The anonymize command: read, guard, dispatch, write.

use codemask_core::{FrontEndConfig, Language, Settings};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Everything the command needs, already parsed from the command line.
#[derive(Debug, Default)]
pub struct Options {
    pub language: String,
    pub file: Option<PathBuf>,
    pub max_chars: Option<usize>,
    pub config: Option<PathBuf>,
    pub reserved: Vec<String>,
    pub output: Option<PathBuf>,
    pub json: bool,
}

/// `--json` output (stable contract).
#[derive(Debug, Serialize)]
struct Report<'a> {
    language: Language,
    /// False when `output` is a syntax diagnostic.
    ok: bool,
    input_chars: usize,
    output: &'a str,
}

pub fn run(options: &Options) -> Result<()> {
    let file = options.file.as_deref().filter(|p| *p != Path::new("-"));
    let language = resolve_language(&options.language, file)?;

    let mut settings = Settings::load_optional(options.config.as_deref()).into_diagnostic()?;
    if let Some(limit) = options.max_chars {
        settings = settings.with_max_input_chars(limit);
    }

    let source = read_input(file)?;
    let input_chars = source.chars().count();
    settings.check_input(&source).into_diagnostic()?;

    let config = settings
        .config_for(language)
        .extend_reserved(options.reserved.iter().cloned());
    debug!(%language, input_chars, reserved = config.reserved.len(), "dispatching");

    let (output, ok) = anonymize(language, &source, &config);
    if ok {
        info!(%language, input_chars, "anonymized");
    } else {
        warn!(%language, "input did not parse; emitting diagnostic");
    }

    let rendered = if options.json {
        let report = Report {
            language,
            ok,
            input_chars,
            output: &output,
        };
        serde_json::to_string(&report).into_diagnostic()?
    } else {
        output
    };
    write_output(options.output.as_deref(), &rendered)
}

/// Run the front end for `language`; the flag is false for a diagnostic.
pub fn anonymize(language: Language, source: &str, config: &FrontEndConfig) -> (String, bool) {
    match language {
        Language::JavaScript => match codemask_js::try_anonymize(source, config) {
            Ok(output) => (output, true),
            Err(err) => (err.diagnostic(), false),
        },
        Language::Python => (codemask_python::anonymize_with(source, config), true),
        Language::Sql => (codemask_sql::anonymize_with(source, config), true),
    }
}

/// `auto` detects from the file extension; anything else must name a language.
fn resolve_language(name: &str, file: Option<&Path>) -> Result<Language> {
    if !name.eq_ignore_ascii_case("auto") {
        return name.parse().into_diagnostic();
    }
    file.and_then(Language::from_path).ok_or_else(|| {
        miette::miette!("Cannot detect the language from the input; pass js, python or sql")
    })
}

fn read_input(file: Option<&Path>) -> Result<String> {
    match file {
        Some(path) => std::fs::read_to_string(path)
            .map_err(|e| miette::miette!("Failed to read {}: {}", path.display(), e)),
        None => {
            let mut source = String::new();
            io::stdin()
                .read_to_string(&mut source)
                .into_diagnostic()?;
            Ok(source)
        }
    }
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    let newline = if text.ends_with('\n') { "" } else { "\n" };
    match path {
        Some(path) => std::fs::write(path, format!("{text}{newline}"))
            .map_err(|e| miette::miette!("Failed to write {}: {}", path.display(), e)),
        None => {
            let mut out = io::stdout().lock();
            write!(out, "{text}{newline}").into_diagnostic()?;
            out.flush().into_diagnostic()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_language() {
        assert_eq!(resolve_language("jsx", None).unwrap(), Language::JavaScript);
        assert_eq!(
            resolve_language("auto", Some(Path::new("q.sql"))).unwrap(),
            Language::Sql
        );
        assert!(resolve_language("auto", None).is_err());
        assert!(resolve_language("auto", Some(Path::new("notes.txt"))).is_err());
        assert!(resolve_language("cobol", None).is_err());
    }

    #[test]
    fn test_anonymize_flags_diagnostics() {
        let config = FrontEndConfig::javascript();
        let (output, ok) = anonymize(Language::JavaScript, "let x = ;", &config);
        assert!(!ok);
        assert!(output.starts_with("// Syntax Error:"));

        let config = FrontEndConfig::sql();
        let (output, ok) = anonymize(Language::Sql, "SELECT id FROM users", &config);
        assert!(ok);
        assert_eq!(output, "SELECT A FROM Alpha");
    }

    #[test]
    fn test_report_shape() {
        let report = Report {
            language: Language::Python,
            ok: true,
            input_chars: 5,
            output: "Alpha = 1",
        };
        let json: serde_json::Value = serde_json::to_value(&report).unwrap();
        assert_eq!(json["language"], "python");
        assert_eq!(json["ok"], true);
        assert_eq!(json["input_chars"], 5);
        assert_eq!(json["output"], "Alpha = 1");
    }
}
