//! Session configuration.
//!
//! Controls where the static help document lives, how long generation
//! requests are coalesced, which context is treated as the general-options
//! context and whether terminal help is colored.
//!
//! # Example YAML
//!
//! ```yaml
//! help_file: docs/RUN.md
//! coalesce_window_ms: 500
//! default_context: General Options
//! color: never
//! ```

use std::io::{BufReader, BufWriter, IsTerminal};
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Environment variable that overrides [`SessionConfig::help_file`].
pub const HELP_FILE_ENV: &str = "COMMAND_OPTIONS_HELP_FILE";

/// Default static help document name, relative to the working directory.
pub const DEFAULT_HELP_FILE: &str = "RUN.md";

/// Name of the context that is always rendered last.
pub const DEFAULT_CONTEXT: &str = "General Options";

/// When the terminal renderer emits color codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Color when stdout is a terminal.
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    pub fn enabled(&self) -> bool {
        match self {
            Self::Auto => std::io::stdout().is_terminal(),
            Self::Always => true,
            Self::Never => false,
        }
    }
}

/// Settings for a [`Session`](crate::Session).
///
/// # Examples
///
/// ```
/// use command_options_registry::SessionConfig;
///
/// let config: SessionConfig = serde_yaml::from_str("help_file: docs/RUN.md").unwrap();
/// assert_eq!(config.help_file.to_str(), Some("docs/RUN.md"));
/// assert_eq!(config.coalesce_window_ms, 1000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Static help document, relative paths resolve against the working directory.
    pub help_file: PathBuf,
    /// Window in which repeated generation requests collapse into one write.
    pub coalesce_window_ms: u64,
    /// Context rendered after all others.
    pub default_context: String,
    pub color: ColorChoice,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            help_file: PathBuf::from(DEFAULT_HELP_FILE),
            coalesce_window_ms: 1000,
            default_context: DEFAULT_CONTEXT.to_string(),
            color: ColorChoice::Auto,
        }
    }
}

impl SessionConfig {
    /// Loads configuration from a YAML file. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`Io`](crate::OptionsError::Io) if the file cannot be read, or
    /// [`Yaml`](crate::OptionsError::Yaml) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Applies overrides from the process environment.
    pub fn from_env(self) -> Self {
        self.with_help_file_override(std::env::var(HELP_FILE_ENV).ok())
    }

    /// Replaces the help file when `value` is a non-empty path.
    pub fn with_help_file_override(mut self, value: Option<String>) -> Self {
        if let Some(path) = value.filter(|v| !v.trim().is_empty()) {
            self.help_file = PathBuf::from(path);
        }
        self
    }

    pub fn coalesce_window(&self) -> Duration {
        Duration::from_millis(self.coalesce_window_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
help_file: docs/RUN.md
coalesce_window_ms: 250
default_context: Common
color: always
"#
    }

    #[test]
    fn test_deserialize_complete() {
        let config: SessionConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.help_file, PathBuf::from("docs/RUN.md"));
        assert_eq!(config.coalesce_window(), Duration::from_millis(250));
        assert_eq!(config.default_context, "Common");
        assert_eq!(config.color, ColorChoice::Always);
    }

    #[test]
    fn test_deserialize_empty_uses_defaults() {
        let config: SessionConfig = serde_yaml::from_str("{}").unwrap();
        assert_eq!(config, SessionConfig::default());
        assert_eq!(config.help_file, PathBuf::from("RUN.md"));
        assert_eq!(config.default_context, "General Options");
    }

    #[test]
    fn test_help_file_override() {
        let config = SessionConfig::default().with_help_file_override(Some("HELP.md".into()));
        assert_eq!(config.help_file, PathBuf::from("HELP.md"));

        let config = SessionConfig::default().with_help_file_override(Some("  ".into()));
        assert_eq!(config.help_file, PathBuf::from("RUN.md"));
    }

    #[test]
    fn test_load_save_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("options.yml");

        let original: SessionConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        original.save(&path).unwrap();

        let loaded = SessionConfig::load(&path).unwrap();
        assert_eq!(loaded, original);
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = SessionConfig::load("/nonexistent/options.yml").unwrap_err();
        assert!(matches!(err, crate::OptionsError::Io(_)));
    }
}
