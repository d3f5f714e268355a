//! Integration tests for loading settings files.

use codemask_core::{Error, Language, Settings};
use std::io::Write;

#[test]
fn test_load_settings_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(
        file,
        r#"{{
            "max_input_chars": 120,
            "javascript": {{ "extra_reserved": ["React", "useState"] }},
            "sql": {{ "alphabet": ["Red", "Green"] }}
        }}"#
    )
    .unwrap();

    let settings = Settings::load(file.path()).unwrap();
    assert_eq!(settings.max_input_chars, 120);

    let js = settings.config_for(Language::JavaScript);
    assert!(js.reserved.contains("React"));
    assert!(js.reserved.contains("useState"));
    assert!(js.reserved.contains("console"));

    let sql = settings.config_for(Language::Sql);
    assert_eq!(sql.alphabet, vec!["Red", "Green"]);
    assert!(sql.reserved.contains("select"));
}

#[test]
fn test_missing_settings_file() {
    let dir = tempfile::tempdir().unwrap();
    let err = Settings::load(&dir.path().join("nope.json")).unwrap_err();
    assert!(matches!(err, Error::ConfigRead { .. }));
}

#[test]
fn test_malformed_settings_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    write!(file, "{{ not json").unwrap();
    let err = Settings::load(file.path()).unwrap_err();
    assert!(matches!(err, Error::ConfigParse { .. }));
    assert!(err.to_string().contains("Failed to parse config"));
}

#[test]
fn test_load_optional_defaults() {
    let settings = Settings::load_optional(None).unwrap();
    assert_eq!(settings, Settings::default());
}
