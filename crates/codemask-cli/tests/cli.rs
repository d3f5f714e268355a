//! Integration tests for the `codemask` binary.

use std::io::Write;
use std::process::{Command, Output, Stdio};

fn cargo_bin() -> Command {
    let mut cmd = Command::new(env!("CARGO"));
    cmd.args(["run", "-q", "-p", "codemask-cli", "--bin", "codemask", "--"]);
    cmd.env_remove("CODEMASK_CONFIG");
    cmd
}

fn run_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = cargo_bin()
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn codemask");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    child.wait_with_output().expect("Failed to wait for codemask")
}

fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write fixture");
    path
}

const QUERY: &str = "SELECT first_name, last_name FROM users WHERE created_at > '2023-01-01'";

#[test]
fn test_sql_file_to_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "query.sql", QUERY);

    let output = cargo_bin()
        .args(["sql", path.to_str().unwrap()])
        .output()
        .expect("Failed to run codemask");

    assert!(output.status.success(), "stderr: {}", String::from_utf8_lossy(&output.stderr));
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "SELECT A, B FROM Alpha WHERE C > '2023-01-01'\n"
    );
}

#[test]
fn test_stdin_with_dash() {
    let output = run_with_stdin(&["python", "-"], "def f(x):\n    return x\n");
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "def Function1(Alpha):\n    return Alpha\n"
    );
}

#[test]
fn test_auto_detects_from_extension() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_file(&dir, "service.py", "total = 1\n");

    let output = cargo_bin()
        .args(["auto", path.to_str().unwrap()])
        .output()
        .expect("Failed to run codemask");

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "Alpha = 1\n");
}

#[test]
fn test_auto_without_file_fails() {
    let output = run_with_stdin(&["auto"], "x = 1\n");
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
}

#[test]
fn test_json_report() {
    let output = run_with_stdin(&["--json", "sql"], QUERY);
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let json: serde_json::Value =
        serde_json::from_str(&stdout).expect("stdout should be valid JSON");
    assert_eq!(json["language"], "sql");
    assert_eq!(json["ok"], true);
    assert_eq!(json["input_chars"].as_u64(), Some(QUERY.chars().count() as u64));
    assert_eq!(json["output"], "SELECT A, B FROM Alpha WHERE C > '2023-01-01'");
}

#[test]
fn test_json_report_flags_syntax_errors() {
    let output = run_with_stdin(&["--json", "js"], "let x = ;");
    assert!(output.status.success());

    let json: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(json["language"], "javascript");
    assert_eq!(json["ok"], false);
    assert!(json["output"].as_str().unwrap().starts_with("// Syntax Error:"));
}

#[test]
fn test_input_guard() {
    let output = run_with_stdin(&["--max-chars", "10", "sql"], QUERY);
    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("over the limit of 10"));

    let output = run_with_stdin(&["--max-chars", "0", "sql"], &QUERY.repeat(100));
    assert!(output.status.success());
}

#[test]
fn test_config_file_overrides() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_file(
        &dir,
        "codemask.json",
        r#"{"sql": {"phrases": ["redacted"], "extra_reserved": ["tenant_id"]}}"#,
    );

    let output = run_with_stdin(
        &["--config", config.to_str().unwrap(), "sql"],
        "SELECT tenant_id FROM users WHERE name = 'Ann'",
    );
    assert!(output.status.success());
    assert_eq!(
        String::from_utf8_lossy(&output.stdout),
        "SELECT tenant_id FROM Alpha WHERE A = 'redacted'\n"
    );
}

#[test]
fn test_malformed_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let config = write_file(&dir, "codemask.json", "{ not json");

    let output = run_with_stdin(&["--config", config.to_str().unwrap(), "sql"], QUERY);
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Failed to parse config"));
}

#[test]
fn test_reserved_flag() {
    let output = run_with_stdin(&["--reserved", "request,response", "py"], "request = response\n");
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "request = response\n");
}

#[test]
fn test_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.sql");

    let output = run_with_stdin(&["-o", target.to_str().unwrap(), "sql"], QUERY);
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    assert_eq!(
        std::fs::read_to_string(&target).unwrap(),
        "SELECT A, B FROM Alpha WHERE C > '2023-01-01'\n"
    );
}

#[test]
fn test_logs_stay_off_stdout() {
    let output = run_with_stdin(&["-vv", "--json", "sql"], QUERY);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1, "stdout: {stdout}");
    serde_json::from_str::<serde_json::Value>(&stdout).expect("stdout should be one JSON object");
}
