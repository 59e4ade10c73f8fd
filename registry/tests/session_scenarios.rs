//! End-to-end declaration and resolution flows across several contexts.

use std::path::PathBuf;

use command_options_core::{OptionConfig, OptionSet};
use command_options_registry::{
    Capture, ConfigError, EXIT_GENERATED_HELP, EXIT_HELP, Mode, OptionsError, Session,
    SessionConfig, ValidationError, help::strip_ansi,
};

fn session(args: &[&str]) -> Session {
    Session::new(
        args.iter().map(|a| a.to_string()).collect(),
        PathBuf::from("/home/user/project"),
        SessionConfig::default(),
    )
}

fn time_machine_options() -> OptionSet {
    OptionSet::new()
        .with(
            "time",
            OptionConfig::string()
                .with_alias("t")
                .with_description("When to travel")
                .required(),
        )
        .with(
            "traveler",
            OptionConfig::string()
                .with_description("Who is travelling")
                .required()
                .multiple(),
        )
        .with(
            "location",
            OptionConfig::string()
                .with_description("Where to go")
                .with_default("X"),
        )
}

fn advanced_options() -> OptionSet {
    OptionSet::new()
        .with(
            "speed",
            OptionConfig::number()
                .with_description("Travel speed")
                .with_default(100),
        )
        .with(
            "backup-location",
            OptionConfig::url().with_description("Where to keep backups"),
        )
}

#[test]
fn test_top_level_and_command_from_separate_contexts() {
    let mut s = session(&[
        "--time",
        "June 28, 2009",
        "--traveler",
        "A",
        "--traveler",
        "B",
    ]);
    let time_machine = s.context("Time Machine");
    let advanced = s.context("Advanced Travel");

    let values = s
        .options(time_machine, "", &time_machine_options(), true)
        .unwrap()
        .unwrap();
    assert_eq!(values.str("time"), Some("June 28, 2009"));
    assert_eq!(values.strings("traveler"), vec!["A", "B"]);
    assert_eq!(values.str("location"), Some("X"));

    let command = s.options(advanced, "advanced", &advanced_options(), false).unwrap();
    assert!(command.is_none());
    assert!(s.warnings().is_empty());
}

#[test]
fn test_command_invocation_resolves_urls_against_cwd() {
    let mut s = session(&["advanced", "--speed", "4000", "--backup-location", "../backups/"]);
    let advanced = s.context("Advanced Travel");
    let values = s
        .options(advanced, "advanced", &advanced_options(), false)
        .unwrap()
        .unwrap();

    assert_eq!(values.number("speed"), Some(4000.0));
    assert_eq!(
        values.url("backup-location").unwrap().to_file_path().unwrap(),
        PathBuf::from("/home/user/backups/")
    );
}

#[test]
fn test_lock_law() {
    let mut s = session(&[]);
    let a = s.context("A");
    let b = s.context("B");
    s.declare(a, "", &OptionSet::new(), false).unwrap();

    let err = s
        .register_option(b, "", "verbose", &OptionConfig::boolean())
        .unwrap_err();
    assert!(matches!(
        err,
        OptionsError::Config(ConfigError::ScopeLocked { .. })
    ));
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn test_locked_command_rejects_other_contexts() {
    let mut s = session(&["advanced", "--speed", "1"]);
    let a = s.context("A");
    let b = s.context("B");
    s.options(a, "advanced", &advanced_options(), false).unwrap();

    let err = s
        .options(b, "advanced", &OptionSet::new().with("mode", OptionConfig::string()), true)
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        "cannot add mode to command advanced from B: command is locked by A"
    );
}

#[test]
fn test_strict_context_reports_the_typed_alias() {
    let mut s = session(&["-t", "now", "--traveler", "A", "--speed", "4"]);
    let ctx = s.context("Time Machine");
    let err = s.options(ctx, "", &time_machine_options(), false).unwrap_err();
    assert!(matches!(
        err,
        OptionsError::Validation(ValidationError::UnknownOption(ref token)) if token == "--speed"
    ));
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_invalid_number_names_supplied_alias() {
    let mut s = session(&["-s", "fast"]);
    let ctx = s.context("A");
    let options = OptionSet::new().with("speed", OptionConfig::number().with_alias("s"));
    let err = s.options(ctx, "", &options, true).unwrap_err();
    assert_eq!(err.to_string(), "invalid number for -s: \"fast\"");
}

#[test]
fn test_repeated_declarations_merge_across_calls() {
    let mut s = session(&["--time", "now", "--traveler", "A"]);
    let ctx = s.context("Time Machine");
    s.declare(
        ctx,
        "",
        &OptionSet::new().with("time", OptionConfig::string().with_alias("when")),
        true,
    )
    .unwrap();

    let values = s.options(ctx, "", &time_machine_options(), true).unwrap().unwrap();
    assert_eq!(values.str("time"), Some("now"));

    let time = s.get(ctx).option("", "time").unwrap();
    assert_eq!(time.aliases, vec!["when".to_string(), "t".to_string()]);
    assert_eq!(time.description.as_deref(), Some("When to travel"));
}

#[test]
fn test_duplicate_names_warn_but_continue() {
    let mut s = session(&["--verbose"]);
    let a = s.context("Logging");
    let b = s.context("Diagnostics");
    let verbose = OptionSet::new().with("verbose", OptionConfig::boolean().with_alias("v"));

    assert!(s.options(a, "", &verbose, true).unwrap().unwrap().flag("verbose"));
    assert!(s.options(b, "", &verbose, true).unwrap().unwrap().flag("verbose"));

    let warned: Vec<_> = s.warnings().iter().map(|w| w.name.as_str()).collect();
    assert_eq!(warned, vec!["verbose", "v"]);
}

#[test]
fn test_help_mode_collects_without_failing() {
    let mut s = session(&["--help"]);
    assert_eq!(s.mode(), Mode::ShowHelp);
    s.set_description("Travel through time.");

    let ctx = s.context("Time Machine");
    let values = s.options(ctx, "", &time_machine_options(), false).unwrap().unwrap();
    assert!(values.str("time").is_none());

    s.defer(|s| {
        let advanced = s.context("Advanced Travel");
        s.declare(advanced, "advanced", &advanced_options(), true)
    });

    let Capture::Exit { code, output } = s.capture().unwrap() else {
        panic!("help mode must exit");
    };
    assert_eq!(code, EXIT_HELP);
    let output = strip_ansi(output.as_deref().unwrap()).into_owned();
    assert!(output.starts_with("Travel through time.\n"));

    let advanced = output.find("Advanced Travel").unwrap();
    let time_machine = output.find("Time Machine").unwrap();
    let general = output.find("General Options").unwrap();
    assert!(advanced < time_machine && time_machine < general);
    assert!(output.contains("-t, --time"));
    assert!(output.contains("(default: 100)"));
    assert!(!output.contains("generate-help"));
}

#[test]
fn test_generate_mode_writes_document_once() {
    let dir = tempfile::tempdir().unwrap();
    let config = SessionConfig::default()
        .with_help_file_override(Some(dir.path().join("RUN.md").display().to_string()));
    let mut s = Session::new(vec!["--generate-help".into()], dir.path().to_path_buf(), config);

    let ctx = s.context("Time Machine");
    s.options(ctx, "", &time_machine_options(), true).unwrap();
    s.options(ctx, "advanced", &advanced_options(), true).unwrap();
    assert!(s.generation_pending());

    let capture = s.capture().unwrap();
    assert_eq!(
        capture,
        Capture::Exit {
            code: EXIT_GENERATED_HELP,
            output: None
        }
    );
    assert!(!s.generation_pending());

    let text = std::fs::read_to_string(dir.path().join("RUN.md")).unwrap();
    assert!(text.starts_with("## Time Machine\n"));
    assert!(text.contains("### advanced"));
    assert!(text.contains("* `--speed` Travel speed (default: 100)"));
}
