//! Integration tests running the `time-machine` demo and the `help-doc` tool.

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn time_machine(cwd: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_time-machine"))
        .args(args)
        .current_dir(cwd)
        .env_remove("COMMAND_OPTIONS_HELP_FILE")
        .output()
        .expect("failed to run time-machine")
}

fn help_doc(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_help-doc"))
        .args(args)
        .env_remove("COMMAND_OPTIONS_HELP_FILE")
        .output()
        .expect("failed to run help-doc")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout).unwrap_or_else(|e| panic!("Invalid JSON output: {e}\n{stdout}"))
}

const DOCUMENT: &str = "\
## Time Machine

Required:

* `-t, --time TIME` When to travel

Optional:

* `--location PLACE` Where to go (default: X)

## General Options

Optional:

* `-h, --help` Show this help
";

// ---- time-machine ----

#[test]
fn test_top_level_values() {
    let dir = tempfile::tempdir().unwrap();
    let output = time_machine(
        dir.path(),
        &["--time", "June 28, 2009", "--traveler", "A", "--traveler", "B"],
    );
    assert!(
        output.status.success(),
        "time-machine failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json = stdout_json(&output);
    assert_eq!(json["command"], "");
    assert_eq!(json["options"]["time"], "June 28, 2009");
    assert_eq!(json["options"]["traveler"], serde_json::json!(["A", "B"]));
    assert_eq!(json["options"]["location"], "X");
}

#[test]
fn test_advanced_command_values() {
    let dir = tempfile::tempdir().unwrap();
    let work = dir.path().join("project");
    fs::create_dir_all(&work).unwrap();

    let output = time_machine(
        &work,
        &["advanced", "--speed", "4000", "--backup-location", "../backups/"],
    );
    assert!(
        output.status.success(),
        "time-machine failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let json = stdout_json(&output);
    assert_eq!(json["command"], "advanced");
    assert_eq!(json["options"]["speed"], 4000.0);
    let backup = json["options"]["backup-location"].as_str().unwrap();
    assert!(backup.starts_with("file://"), "unexpected URL: {backup}");
    assert!(backup.ends_with("/backups/"), "unexpected URL: {backup}");
    assert!(!backup.contains("/project/"), "unexpected URL: {backup}");
}

#[test]
fn test_missing_required_option_exits_with_validation_code() {
    let dir = tempfile::tempdir().unwrap();
    let output = time_machine(dir.path(), &["--traveler", "A"]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        stderr.contains("error: missing required option -t, --time (When to travel)"),
        "stderr: {stderr}"
    );
}

#[test]
fn test_invalid_number_in_command() {
    let dir = tempfile::tempdir().unwrap();
    let output = time_machine(dir.path(), &["advanced", "--speed", "fast"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("invalid number for --speed"), "stderr: {stderr}");
}

#[test]
fn test_help_lists_every_context() {
    let dir = tempfile::tempdir().unwrap();
    let output = time_machine(dir.path(), &["--help"]);
    assert_eq!(output.status.code(), Some(0));

    let stdout = String::from_utf8_lossy(&output.stdout);
    for expected in [
        "Advanced Travel",
        "Time Machine",
        "Output",
        "General Options",
        "--backup-location",
        "--pretty",
    ] {
        assert!(stdout.contains(expected), "missing {expected}: {stdout}");
    }
    assert!(!stdout.contains("generate-help"));
}

#[test]
fn test_generate_help_writes_document_and_help_reads_it() {
    let dir = tempfile::tempdir().unwrap();
    let output = time_machine(dir.path(), &["--generate-help"]);
    assert_eq!(
        output.status.code(),
        Some(3),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );

    let path = dir.path().join("RUN.md");
    let document = fs::read_to_string(&path).expect("RUN.md should be written");
    assert!(document.contains("## Time Machine"));
    assert!(document.contains("### advanced"));
    assert!(document.contains("* `--speed MPH` Travel speed (default: 100)"));

    // A marker only present in the document proves --help was answered from it
    fs::write(&path, document.replace("When to travel", "When to travel (cached)")).unwrap();
    let output = time_machine(dir.path(), &["--help"]);
    assert_eq!(output.status.code(), Some(0));
    assert!(String::from_utf8_lossy(&output.stdout).contains("When to travel (cached)"));
}

#[test]
fn test_help_file_env_override() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("docs").join("HELP.md");
    let output = Command::new(env!("CARGO_BIN_EXE_time-machine"))
        .arg("--generate-help")
        .current_dir(dir.path())
        .env("COMMAND_OPTIONS_HELP_FILE", &target)
        .output()
        .expect("failed to run time-machine");

    assert_eq!(output.status.code(), Some(3));
    assert!(target.exists());
    assert!(!dir.path().join("RUN.md").exists());
}

// ---- help-doc ----

#[test]
fn test_render_markdown_is_stable() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("RUN.md");
    fs::write(&input, DOCUMENT).unwrap();

    let output = help_doc(&["render", "--format", "markdown", "--input", input.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "render failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert_eq!(String::from_utf8_lossy(&output.stdout), DOCUMENT);
}

#[test]
fn test_render_terminal_aligns_descriptions() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("RUN.md");
    fs::write(&input, DOCUMENT).unwrap();

    let output = help_doc(&["render", "--input", input.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("    -t, --time TIME   When to travel\n"), "stdout: {stdout}");
    assert!(stdout.contains("    --location PLACE  Where to go (default: X)\n"), "stdout: {stdout}");
    assert!(stdout.contains("    -h, --help        Show this help\n"), "stdout: {stdout}");
}

#[test]
fn test_render_json() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("RUN.md");
    fs::write(&input, DOCUMENT).unwrap();

    let output = help_doc(&["render", "--format", "json", "--input", input.to_str().unwrap()]);
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["contexts"][0]["name"], "Time Machine");
    assert_eq!(
        json["contexts"][0]["commands"][0]["required"][0]["names"],
        serde_json::json!(["-t", "--time"])
    );
    assert_eq!(json["contexts"][1]["name"], "General Options");
}

#[test]
fn test_check_reports_counts() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("RUN.md");
    fs::write(&input, DOCUMENT).unwrap();

    let output = help_doc(&["check", "--input", input.to_str().unwrap()]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Contexts: 2"));
    assert!(stdout.contains("Commands: 0"));
    assert!(stdout.contains("Options: 3"));
    assert!(stdout.contains("  Time Machine: 2"));
}

#[test]
fn test_check_rejects_malformed_document() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("RUN.md");
    fs::write(&input, "## Time Machine\n\n* `--time`\n\nnot an entry\n").unwrap();

    let output = help_doc(&["check", "--input", input.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("malformed static help file"), "stderr: {stderr}");
}

#[test]
fn test_check_missing_file() {
    let output = help_doc(&["check", "--input", "/nonexistent/RUN.md"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_config_file_sets_default_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("RUN.md");
    fs::write(&input, DOCUMENT).unwrap();
    let config = dir.path().join("options.yml");
    fs::write(&config, format!("help_file: {}\ncolor: never\n", input.display())).unwrap();

    let output = help_doc(&["check", "--config", config.to_str().unwrap()]);
    assert!(
        output.status.success(),
        "check failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("Contexts: 2"));
}
