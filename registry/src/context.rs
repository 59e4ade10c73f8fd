//! Registration contexts.
//!
//! A [`Context`] is the named scope one component of a program declares its
//! options under. It owns one option partition per sub-command; the empty
//! command name is the partition of top-level options and always exists.

use std::fmt;
use std::path::{Path, PathBuf};

use command_options_core::OptionConfig;
use indexmap::IndexMap;
use url::Url;

/// Handle to a context owned by a [`Session`](crate::Session).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContextId(pub(crate) usize);

/// Options of one sub-command partition, in declaration order.
pub type Partition = IndexMap<String, OptionConfig>;

/// Where a context's static help document is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HelpLocation {
    /// A file on the local file system.
    File(PathBuf),
    /// Anything else, e.g. a documentation page served over HTTP.
    Remote(Url),
}

impl HelpLocation {
    /// Interprets `value` as a URL or as a path relative to `cwd`.
    ///
    /// ```
    /// use std::path::{Path, PathBuf};
    /// use command_options_registry::HelpLocation;
    ///
    /// let cwd = Path::new("/work");
    /// assert_eq!(
    ///     HelpLocation::parse("docs/RUN.md", cwd),
    ///     HelpLocation::File(PathBuf::from("/work/docs/RUN.md")),
    /// );
    /// assert!(matches!(
    ///     HelpLocation::parse("https://example.com/RUN.md", cwd),
    ///     HelpLocation::Remote(_),
    /// ));
    /// ```
    pub fn parse(value: &str, cwd: &Path) -> Self {
        match Url::parse(value) {
            // One-letter schemes are Windows drive letters.
            Ok(url) if url.scheme().len() > 1 => match url.to_file_path() {
                Ok(path) if url.scheme() == "file" => Self::File(path),
                _ => Self::Remote(url),
            },
            _ => Self::File(cwd.join(value)),
        }
    }

    pub fn local_path(&self) -> Option<&Path> {
        match self {
            Self::File(path) => Some(path),
            Self::Remote(_) => None,
        }
    }
}

impl fmt::Display for HelpLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => write!(f, "{url}"),
        }
    }
}

/// A named registration scope.
#[derive(Debug, Clone)]
pub struct Context {
    name: String,
    description: Option<String>,
    declared_at: Option<String>,
    help_location: HelpLocation,
    commands: IndexMap<String, Partition>,
}

impl Context {
    pub(crate) fn new(name: &str, help_location: HelpLocation, declared_at: Option<String>) -> Self {
        let mut commands = IndexMap::new();
        commands.insert(String::new(), Partition::new());
        Self {
            name: name.to_string(),
            description: None,
            declared_at,
            help_location,
            commands,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub(crate) fn set_description(&mut self, description: &str) {
        self.description = Some(description.to_string());
    }

    /// Source location (`file:line`) of the call that created the context.
    pub fn declared_at(&self) -> Option<&str> {
        self.declared_at.as_deref()
    }

    pub fn help_location(&self) -> &HelpLocation {
        &self.help_location
    }

    /// Partitions in declaration order, top-level (`""`) first.
    pub fn commands(&self) -> impl Iterator<Item = (&str, &Partition)> {
        self.commands.iter().map(|(name, p)| (name.as_str(), p))
    }

    pub fn partition(&self, command: &str) -> Option<&Partition> {
        self.commands.get(command)
    }

    pub fn option(&self, command: &str, name: &str) -> Option<&OptionConfig> {
        self.commands.get(command)?.get(name)
    }

    /// Primary name of the option that `candidate` names or aliases.
    pub fn find_option(&self, command: &str, candidate: &str) -> Option<&str> {
        self.commands
            .get(command)?
            .iter()
            .find(|(name, config)| config.answers_to(name, candidate))
            .map(|(name, _)| name.as_str())
    }

    /// The option of `command` that collects bare arguments, if any.
    pub fn collector(&self, command: &str) -> Option<&str> {
        self.commands
            .get(command)?
            .iter()
            .find(|(_, config)| config.collects_bare_args())
            .map(|(name, _)| name.as_str())
    }

    /// Whether the partition holds an option that is shown in help.
    pub fn has_visible_options(&self) -> bool {
        self.commands
            .values()
            .flat_map(|p| p.values())
            .any(|config| !config.is_dev())
    }

    /// Merges a declaration into the partition, creating it on first use.
    pub(crate) fn merge_option(&mut self, command: &str, name: &str, config: &OptionConfig) {
        let partition = self.commands.entry(command.to_string()).or_default();
        match partition.get_mut(name) {
            Some(existing) => existing.merge_from(config),
            None => {
                partition.insert(name.to_string(), config.clone());
            }
        }
    }
}
