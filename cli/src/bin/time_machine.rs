//! Demo program declaring its options from several contexts.
//!
//! ```text
//! time-machine --time "June 28, 2009" --traveler A --traveler B
//! time-machine advanced --speed 4000 --backup-location ../backups/
//! time-machine --help
//! time-machine --generate-help
//! ```
//!
//! Resolved values are printed as JSON.

use command_options_core::{OptionConfig, OptionSet};
use command_options_registry::{
    Capture, EXIT_HELP, Mode, OptionsError, ResolvedOptions, Session, SessionConfig,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn travel_options() -> OptionSet {
    OptionSet::new()
        .with(
            "time",
            OptionConfig::string()
                .with_alias("t")
                .with_placeholder("TIME")
                .with_description("When to travel")
                .required(),
        )
        .with(
            "traveler",
            OptionConfig::string()
                .with_placeholder("NAME")
                .with_description("Who is travelling, repeat for every traveler")
                .required()
                .multiple(),
        )
        .with(
            "location",
            OptionConfig::string()
                .with_alias("l")
                .with_placeholder("PLACE")
                .with_description("Where to go")
                .with_default("X"),
        )
}

fn advanced_options() -> OptionSet {
    OptionSet::new()
        .with(
            "speed",
            OptionConfig::number()
                .with_placeholder("MPH")
                .with_description("Travel speed")
                .with_default(100),
        )
        .with(
            "backup-location",
            OptionConfig::url()
                .with_placeholder("PATH")
                .with_description("Where to keep backups of the timeline"),
        )
}

fn output_options() -> OptionSet {
    OptionSet::new().with(
        "pretty",
        OptionConfig::boolean().with_description("Pretty-print the resolved values"),
    )
}

fn print_values(command: &str, values: &ResolvedOptions, pretty: bool) -> Result<(), OptionsError> {
    let output = serde_json::json!({ "command": command, "options": values });
    let text = if pretty {
        serde_json::to_string_pretty(&output)?
    } else {
        serde_json::to_string(&output)?
    };
    println!("{text}");
    Ok(())
}

fn run(session: &mut Session) -> Result<(), OptionsError> {
    session.set_description("Travel through time. Options are declared by several parts of the program.");

    let travel = session.context("Time Machine");
    session.describe(travel, "Where, when and with whom to travel.");
    session.declare(travel, "", &travel_options(), true)?;

    let advanced = session.context("Advanced Travel");
    session.declare(advanced, "advanced", &advanced_options(), false)?;

    // Output settings are only known once the program reaches its output phase.
    session.defer(|s| {
        let output = s.context("Output");
        s.declare(output, "", &output_options(), true)
    });

    if let Capture::Exit { code, output } = session.capture()? {
        if let Some(output) = output {
            print!("{output}");
        }
        std::process::exit(code);
    }

    session.run_deferred()?;
    let output = session.context("Output");
    let pretty = session
        .resolve(output, "", &output_options(), false)?
        .is_some_and(|values| values.flag("pretty"));

    if let Some(values) = session.resolve(advanced, "advanced", &advanced_options(), true)? {
        debug!(options = values.len(), "Running advanced travel");
        return print_values("advanced", &values, pretty);
    }

    let values = session
        .resolve(travel, "", &travel_options(), false)?
        .unwrap_or_default();
    print_values("", &values, pretty)
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let mut session = Session::from_env(SessionConfig::default()).unwrap_or_else(|err| err.exit());

    if session.mode() == Mode::ShowHelp {
        if let Some(help) = session.try_static_help() {
            print!("{help}");
            std::process::exit(EXIT_HELP);
        }
    }

    if let Err(err) = run(&mut session) {
        err.exit();
    }

    for warning in session.warnings() {
        eprintln!("warning: {warning}");
    }
}
