//! Option registration, argv resolution and help documents.
//!
//! Independent parts of a program declare their options under named
//! contexts of one [`Session`]. Declarations of the same option merge, a
//! context may close its scope to the others, and every batch can be
//! resolved against argv into typed values.
//!
//! The same metadata drives `--help`. It is rendered for the terminal or
//! written as a Markdown document by `--generate-help`, and that document
//! can be parsed back so a later `--help` does not need to run the program.
//!
//! # Example
//!
//! ```
//! use command_options_core::{OptionConfig, OptionSet};
//! use command_options_registry::{Session, SessionConfig};
//!
//! let argv = ["advanced", "--speed", "4000"].map(String::from).to_vec();
//! let mut session = Session::new(argv, "/home/user/project".into(), SessionConfig::default());
//!
//! let ctx = session.context("Advanced Travel");
//! let options = OptionSet::new()
//!     .with("speed", OptionConfig::number().with_default(100))
//!     .with("backup-location", OptionConfig::url());
//!
//! let values = session.options(ctx, "advanced", &options, true).unwrap().unwrap();
//! assert_eq!(values.number("speed"), Some(4000.0));
//! assert!(values.url("backup-location").is_none());
//!
//! // Not invoked: the first bare argument is another command
//! let basic = OptionSet::new().with("speed", OptionConfig::number().required());
//! assert!(session.options(ctx, "basic", &basic, true).unwrap().is_none());
//! ```

pub mod config;
pub mod context;
pub mod debounce;
pub mod error;
pub mod help;
pub mod output;
pub mod persist;
pub mod resolve;
pub mod session;
pub mod tokenizer;

pub use config::{ColorChoice, DEFAULT_CONTEXT, DEFAULT_HELP_FILE, HELP_FILE_ENV, SessionConfig};
pub use context::{Context, ContextId, HelpLocation, Partition};
pub use debounce::Debouncer;
pub use error::{
    ConfigError, EXIT_CONFIG_ERROR, EXIT_GENERATED_HELP, EXIT_HELP, EXIT_VALIDATION_ERROR,
    OptionsError, Result, StaticHelpError, ValidationError,
};
pub use help::{HelpDocument, HelpRenderer, MarkdownRenderer, RenderedHelp, TerminalRenderer, render};
pub use output::{OutputFormat, format_help};
pub use persist::{generate_markdown, parse_markdown};
pub use resolve::ResolvedOptions;
pub use session::{Capture, Mode, Session, Warning};
pub use tokenizer::{DefaultTokenizer, ParserDefinition, RawArgs, Tokenizer, UnknownToken};
