use std::fs;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use command_options_registry::{
    HelpDocument, OptionsError, SessionConfig, format_help, parse_markdown,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// CLI-specific output format enum with clap argument parsing support.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Markdown,
    Json,
}

impl From<CliOutputFormat> for command_options_registry::OutputFormat {
    fn from(fmt: CliOutputFormat) -> Self {
        match fmt {
            CliOutputFormat::Terminal => Self::Terminal,
            CliOutputFormat::Markdown => Self::Markdown,
            CliOutputFormat::Json => Self::Json,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "help-doc")]
#[command(about = "Inspect and re-render static help documents")]
struct Cli {
    /// Session configuration YAML (help file location, colors).
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Parse a static help document and print it in another format.
    Render(RenderArgs),
    /// Parse a static help document and report what it declares.
    Check(CheckArgs),
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// Static help document (default: the configured help file).
    #[arg(long)]
    input: Option<PathBuf>,
    /// Output format.
    #[arg(long, default_value = "terminal")]
    format: CliOutputFormat,
    /// Force colored terminal output.
    #[arg(long)]
    color: bool,
}

#[derive(Debug, Args)]
struct CheckArgs {
    /// Static help document (default: the configured help file).
    #[arg(long)]
    input: Option<PathBuf>,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = load_config(cli.config).and_then(|config| match cli.command {
        Command::Render(args) => run_render(&config, args),
        Command::Check(args) => run_check(&config, args),
    });

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn load_config(path: Option<PathBuf>) -> Result<SessionConfig, String> {
    let config = match path {
        Some(path) => SessionConfig::load(&path)
            .map_err(|err| format!("Failed to load config '{}': {err}", path.display()))?,
        None => SessionConfig::default(),
    };
    Ok(config.from_env())
}

fn read_document(config: &SessionConfig, input: Option<PathBuf>) -> Result<HelpDocument, String> {
    let path = input.unwrap_or_else(|| config.help_file.clone());
    debug!(path = %path.display(), "Reading static help document");
    let text = fs::read_to_string(&path)
        .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
    parse_markdown(&text).map_err(|err| format!("{}: {err}", path.display()))
}

fn run_render(config: &SessionConfig, args: RenderArgs) -> Result<(), String> {
    let doc = read_document(config, args.input)?;
    let color = args.color || config.color.enabled();
    let text = format_help(&doc, args.format.into(), color).map_err(|err: OptionsError| err.to_string())?;
    print!("{text}");
    Ok(())
}

fn run_check(config: &SessionConfig, args: CheckArgs) -> Result<(), String> {
    let doc = read_document(config, args.input)?;
    let commands: usize = doc
        .contexts
        .iter()
        .map(|c| c.commands.iter().filter(|cmd| !cmd.name.is_empty()).count())
        .sum();

    println!("Contexts: {}", doc.contexts.len());
    println!("Commands: {commands}");
    println!("Options: {}", doc.entry_count());
    for context in &doc.contexts {
        let entries: usize = context
            .commands
            .iter()
            .map(|c| c.required.len() + c.optional.len())
            .sum();
        println!("  {}: {entries}", context.name);
    }
    Ok(())
}
