//! Error types for option registration, resolution and static help files.
//!
//! Errors fall into three families that the host program treats
//! differently:
//!
//! - [`ConfigError`]: programmer mistakes in declarations, always fatal.
//! - [`ValidationError`]: bad user input, fatal in normal runs.
//! - [`StaticHelpError`]: soft failures around the static help document.

use std::path::PathBuf;

use command_options_core::{CoercionError, ConfigIssue};
use thiserror::Error;
use url::Url;

/// Exit code for invalid user input.
pub const EXIT_VALIDATION_ERROR: i32 = 1;
/// Exit code for declaration mistakes.
pub const EXIT_CONFIG_ERROR: i32 = 2;
/// Exit code after `--generate-help` wrote the static help document.
pub const EXIT_GENERATED_HELP: i32 = 3;
/// Exit code after `--help` printed the rendered help.
pub const EXIT_HELP: i32 = 0;

/// Declaration mistakes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// The declaration itself is malformed.
    #[error("invalid declaration of {name} in {context}: {issue}")]
    InvalidOption {
        context: String,
        name: String,
        issue: ConfigIssue,
    },
    /// A second option wants to collect bare arguments.
    #[error("{context} declares {name} to collect bare arguments, but {existing} already does")]
    DuplicateCollector {
        context: String,
        name: String,
        existing: String,
    },
    /// Top-level options were closed by another context.
    #[error("cannot add {name} from {context}: options are locked by {locked_by}")]
    ScopeLocked {
        context: String,
        name: String,
        locked_by: String,
    },
    /// The command's options were closed by another context.
    #[error("cannot add {name} to command {command} from {context}: command is locked by {locked_by}")]
    CommandLocked {
        context: String,
        command: String,
        name: String,
        locked_by: String,
    },
}

/// Bad user input found while resolving argv.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Coercion(#[from] CoercionError),
    /// More than one bare argument for a single-valued collector.
    #[error("too many arguments: {value:?} ({option} takes a single value)")]
    TooManyBareArguments { option: String, value: String },
    /// Unrecognised token in a context that does not accept other options.
    #[error("invalid option: {0}")]
    UnknownOption(String),
}

/// Soft failures around the static help document.
#[derive(Debug, Error)]
pub enum StaticHelpError {
    #[error("no static help file found at {}", .0.display())]
    NotFound(PathBuf),
    #[error("malformed static help file: {0}")]
    Malformed(String),
    #[error("no contexts registered")]
    NoContexts,
    #[error("help file location is not a local file: {0}")]
    NotLocal(Url),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Unified error type of this crate.
#[derive(Debug, Error)]
pub enum OptionsError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    StaticHelp(#[from] StaticHelpError),
    /// Session configuration file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<CoercionError> for OptionsError {
    fn from(err: CoercionError) -> Self {
        Self::Validation(ValidationError::Coercion(err))
    }
}

impl OptionsError {
    /// Process exit code used when the error terminates the program.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => EXIT_VALIDATION_ERROR,
            _ => EXIT_CONFIG_ERROR,
        }
    }

    /// Reports the error to the operator and terminates the process.
    pub fn exit(self) -> ! {
        eprintln!("error: {self}");
        std::process::exit(self.exit_code())
    }
}

/// Convenience alias for results with [`OptionsError`].
pub type Result<T> = std::result::Result<T, OptionsError>;
