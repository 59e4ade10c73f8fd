//! The CLI session: every registration context of a program plus the
//! process-wide state shared between them.
//!
//! A [`Session`] is created once from argv and threaded through the
//! program's start-up sequence. Any component may create a context and
//! declare options at any time; declarations of the same option merge.
//!
//! Besides the contexts, the session owns:
//!
//! - the run [`Mode`] detected from argv (`--help`, `--generate-help`),
//! - the scope locks set by contexts that close their options to others,
//! - duplicate-declaration [`Warning`]s,
//! - deferred declarations and the coalesced help-generation request.

use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Instant;

use command_options_core::{CoercionMode, OptionConfig, OptionSet, validate_config};
use indexmap::IndexMap;
use tracing::{debug, info, warn};

use crate::config::SessionConfig;
use crate::context::{Context, ContextId, HelpLocation};
use crate::debounce::Debouncer;
use crate::error::{
    ConfigError, EXIT_GENERATED_HELP, EXIT_HELP, OptionsError, Result, StaticHelpError,
};
use crate::resolve::ResolvedOptions;
use crate::tokenizer::{DefaultTokenizer, Tokenizer};

/// What the process was started to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Normal execution.
    Run,
    /// `--help` / `-h`: collect option metadata and print it.
    ShowHelp,
    /// `--generate-help`: collect option metadata and write the static help document.
    GenerateHelp,
}

impl Mode {
    /// Detects the mode from argv. `--generate-help` wins over `--help`.
    pub fn from_args(argv: &[String]) -> Self {
        if argv.iter().any(|a| a == "--generate-help") {
            Self::GenerateHelp
        } else if argv.iter().any(|a| a == "--help" || a == "-h") {
            Self::ShowHelp
        } else {
            Self::Run
        }
    }

    /// Whether the process only collects metadata.
    pub fn is_collecting(&self) -> bool {
        !matches!(self, Self::Run)
    }

    pub fn coercion_mode(&self) -> CoercionMode {
        match self {
            Self::Run => CoercionMode::Execute,
            _ => CoercionMode::CollectMetadata,
        }
    }
}

/// An option name or alias claimed by two different contexts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// The form both declarations answer to.
    pub name: String,
    pub command: String,
    pub context: String,
    pub existing_context: String,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "option {} declared by {} is already declared by {}",
            command_options_core::display_form(&self.name),
            self.context,
            self.existing_context
        )?;
        if !self.command.is_empty() {
            write!(f, " (command {})", self.command)?;
        }
        Ok(())
    }
}

/// Outcome of [`Session::capture`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Capture {
    /// Normal run, carry on with the program.
    Continue,
    /// Metadata was collected; print `output` (if any) and exit with `code`.
    Exit { code: i32, output: Option<String> },
}

type Deferred = Box<dyn FnOnce(&mut Session) -> Result<()>>;

/// Owned state of one program run.
///
/// # Examples
///
/// ```
/// use command_options_core::{OptionConfig, OptionSet};
/// use command_options_registry::{Session, SessionConfig};
///
/// let argv = ["--time", "now"].map(String::from).to_vec();
/// let mut session = Session::new(argv, "/work".into(), SessionConfig::default());
/// let ctx = session.context("Time Machine");
///
/// let options = OptionSet::new().with("time", OptionConfig::string().required());
/// let values = session.options(ctx, "", &options, true).unwrap().unwrap();
/// assert_eq!(values.str("time"), Some("now"));
/// ```
pub struct Session {
    pub(crate) config: SessionConfig,
    pub(crate) mode: Mode,
    pub(crate) argv: Vec<String>,
    pub(crate) cwd: PathBuf,
    pub(crate) description: Option<String>,
    pub(crate) contexts: IndexMap<String, Context>,
    pub(crate) default_context: ContextId,
    global_lock: Option<String>,
    command_locks: HashMap<String, String>,
    warnings: Vec<Warning>,
    pub(crate) tokenizer: Box<dyn Tokenizer>,
    pub(crate) generation: Debouncer<()>,
    deferred: VecDeque<Deferred>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("mode", &self.mode)
            .field("argv", &self.argv)
            .field("cwd", &self.cwd)
            .field("contexts", &self.contexts.keys().collect::<Vec<_>>())
            .field("global_lock", &self.global_lock)
            .field("command_locks", &self.command_locks)
            .field("deferred", &self.deferred.len())
            .finish()
    }
}

impl Session {
    /// Creates a session for `argv` (without the program name).
    ///
    /// The general-options context is created first, holding the built-in
    /// `--help`/`-h` switch and the hidden `--generate-help` switch.
    pub fn new(argv: Vec<String>, cwd: PathBuf, config: SessionConfig) -> Self {
        let mode = Mode::from_args(&argv);
        let window = config.coalesce_window();
        let mut session = Self {
            config,
            mode,
            argv,
            cwd,
            description: None,
            contexts: IndexMap::new(),
            default_context: ContextId(0),
            global_lock: None,
            command_locks: HashMap::new(),
            warnings: Vec::new(),
            tokenizer: Box::new(DefaultTokenizer),
            generation: Debouncer::new(window),
            deferred: VecDeque::new(),
        };

        let name = session.config.default_context.clone();
        let general = session.context(&name);
        session.default_context = general;
        let builtins = [
            (
                "help",
                OptionConfig::boolean()
                    .with_alias("h")
                    .with_description("Show this help")
                    .overload(),
            ),
            (
                "generate-help",
                OptionConfig::boolean()
                    .with_description("Write the static help document")
                    .dev()
                    .overload(),
            ),
        ];
        for (name, config) in builtins {
            session.context_mut(general).merge_option("", name, &config);
        }

        debug!(mode = ?session.mode, cwd = %session.cwd.display(), "Session created");
        session
    }

    /// Creates a session from the process arguments and working directory.
    pub fn from_env(config: SessionConfig) -> Result<Self> {
        let argv = std::env::args().skip(1).collect();
        let cwd = std::env::current_dir()?;
        Ok(Self::new(argv, cwd, config.from_env()))
    }

    /// Replaces the argv tokenizer.
    pub fn with_tokenizer(mut self, tokenizer: Box<dyn Tokenizer>) -> Self {
        self.tokenizer = tokenizer;
        self
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn argv(&self) -> &[String] {
        &self.argv
    }

    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Program description shown before all contexts.
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn set_description(&mut self, description: &str) {
        self.description = Some(description.to_string());
    }

    /// Returns the context called `name`, creating it on first use.
    ///
    /// New contexts write their static help document to the configured
    /// help file.
    #[track_caller]
    pub fn context(&mut self, name: &str) -> ContextId {
        let location = self.default_help_location();
        self.context_with_help_location(name, location)
    }

    /// Like [`context`](Self::context), but a newly created context writes
    /// its static help document to `location`.
    #[track_caller]
    pub fn context_with_help_location(&mut self, name: &str, location: HelpLocation) -> ContextId {
        if let Some(index) = self.contexts.get_index_of(name) {
            return ContextId(index);
        }

        let caller = std::panic::Location::caller();
        let declared_at = format!("{}:{}", caller.file(), caller.line());
        debug!(context = name, declared_at = %declared_at, help = %location, "Context created");

        let (index, _) = self.contexts.insert_full(
            name.to_string(),
            Context::new(name, location, Some(declared_at)),
        );
        ContextId(index)
    }

    pub fn find_context(&self, name: &str) -> Option<ContextId> {
        self.contexts.get_index_of(name).map(ContextId)
    }

    /// Looks up a context by handle.
    ///
    /// # Panics
    ///
    /// Panics if `id` was issued by a different session.
    pub fn get(&self, id: ContextId) -> &Context {
        &self.contexts[id.0]
    }

    pub(crate) fn context_mut(&mut self, id: ContextId) -> &mut Context {
        &mut self.contexts[id.0]
    }

    /// Contexts in declaration order.
    pub fn contexts(&self) -> impl Iterator<Item = &Context> {
        self.contexts.values()
    }

    pub fn default_context(&self) -> ContextId {
        self.default_context
    }

    /// Sets the description shown under the context's title.
    pub fn describe(&mut self, id: ContextId, description: &str) {
        self.context_mut(id).set_description(description);
    }

    pub fn warnings(&self) -> &[Warning] {
        &self.warnings
    }

    /// Context that closed top-level options to others, if any.
    pub fn global_lock(&self) -> Option<&str> {
        self.global_lock.as_deref()
    }

    /// Context that closed `command` to others, if any.
    pub fn command_lock(&self, command: &str) -> Option<&str> {
        self.command_locks.get(command).map(String::as_str)
    }

    /// Names of every sub-command declared by any context.
    pub fn command_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = Vec::new();
        for context in self.contexts.values() {
            for (command, _) in context.commands() {
                if !command.is_empty() && !names.contains(&command) {
                    names.push(command);
                }
            }
        }
        names
    }

    pub(crate) fn default_help_location(&self) -> HelpLocation {
        HelpLocation::parse(&self.config.help_file.to_string_lossy(), &self.cwd)
    }

    /// Registers one option under `command` (`""` for top-level options).
    ///
    /// The declaration is validated, checked against scope locks and the
    /// single-collector rule, compared with other contexts' declarations,
    /// and finally merged into the context's partition.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] variants for malformed declarations, locked
    /// scopes and a second bare-argument collector.
    pub fn register_option(
        &mut self,
        id: ContextId,
        command: &str,
        name: &str,
        config: &OptionConfig,
    ) -> Result<()> {
        let context_name = self.get(id).name().to_string();

        if let Some(issue) = validate_config(name, config).into_iter().next() {
            return Err(ConfigError::InvalidOption {
                context: context_name,
                name: name.to_string(),
                issue,
            }
            .into());
        }

        self.check_locks(&context_name, command, name, config)?;

        if config.collects_bare_args() {
            if let Some(existing) = self.get(id).collector(command).filter(|e| *e != name) {
                return Err(ConfigError::DuplicateCollector {
                    context: context_name,
                    name: name.to_string(),
                    existing: existing.to_string(),
                }
                .into());
            }
        }

        if !self.mode.is_collecting() && !config.is_overload() {
            self.detect_duplicates(id, command, name, config);
        }

        self.context_mut(id).merge_option(command, name, config);
        Ok(())
    }

    fn check_locks(
        &self,
        context: &str,
        command: &str,
        name: &str,
        config: &OptionConfig,
    ) -> Result<()> {
        if config.is_overload() {
            return Ok(());
        }

        if command.is_empty() {
            if let Some(locked_by) = self.global_lock.as_deref().filter(|l| *l != context) {
                return Err(ConfigError::ScopeLocked {
                    context: context.to_string(),
                    name: name.to_string(),
                    locked_by: locked_by.to_string(),
                }
                .into());
            }
        } else if let Some(locked_by) = self
            .command_locks
            .get(command)
            .filter(|l| l.as_str() != context)
        {
            return Err(ConfigError::CommandLocked {
                context: context.to_string(),
                command: command.to_string(),
                name: name.to_string(),
                locked_by: locked_by.clone(),
            }
            .into());
        }

        Ok(())
    }

    /// Warns when `name` or one of its aliases is already claimed by another
    /// context's own declarations in the same partition.
    fn detect_duplicates(&mut self, id: ContextId, command: &str, name: &str, config: &OptionConfig) {
        let context_name = self.get(id).name().to_string();
        let candidates: Vec<&str> = std::iter::once(name)
            .chain(config.aliases.iter().map(String::as_str))
            .collect();

        let mut found = Vec::new();
        for (index, other) in self.contexts.values().enumerate() {
            if index == id.0 {
                continue;
            }
            let Some(partition) = other.partition(command) else {
                continue;
            };
            for candidate in &candidates {
                let clash = partition
                    .iter()
                    .any(|(n, c)| !c.is_overload() && c.answers_to(n, candidate));
                if clash {
                    found.push(Warning {
                        name: candidate.to_string(),
                        command: command.to_string(),
                        context: context_name.clone(),
                        existing_context: other.name().to_string(),
                    });
                }
            }
        }

        for warning in found {
            warn!(
                option = %warning.name,
                command = %warning.command,
                context = %warning.context,
                existing_context = %warning.existing_context,
                "Option already declared by another context"
            );
            self.warnings.push(warning);
        }
    }

    /// Registers a batch of options and, when `allow_other_options` is
    /// `false`, closes the scope to every other context.
    ///
    /// For top-level options (`command == ""`) the lock is global; for a
    /// sub-command it covers that command name only. In generate-help mode
    /// each call also requests a (coalesced) write of the static help
    /// document.
    pub fn declare(
        &mut self,
        id: ContextId,
        command: &str,
        options: &OptionSet,
        allow_other_options: bool,
    ) -> Result<()> {
        for (name, config) in options.iter() {
            self.register_option(id, command, name, config)?;
        }

        if !allow_other_options {
            let context_name = self.get(id).name().to_string();
            if command.is_empty() {
                self.global_lock.get_or_insert(context_name);
            } else {
                self.command_locks
                    .entry(command.to_string())
                    .or_insert(context_name);
            }
        }

        debug!(
            context = self.get(id).name(),
            command,
            count = options.len(),
            allow_other_options,
            "Declared options"
        );

        if self.mode == Mode::GenerateHelp {
            self.request_generation(Instant::now());
        }
        Ok(())
    }

    /// Declares `options` and resolves them against argv.
    ///
    /// Contexts that do not allow other options are also strict: unknown
    /// tokens are rejected. Returns `Ok(None)` when `command` was not invoked.
    pub fn options(
        &mut self,
        id: ContextId,
        command: &str,
        options: &OptionSet,
        allow_other_options: bool,
    ) -> Result<Option<ResolvedOptions>> {
        self.declare(id, command, options, allow_other_options)?;
        self.resolve(id, command, options, !allow_other_options)
    }

    /// [`options`](Self::options), terminating the process on errors.
    pub fn options_or_exit(
        &mut self,
        id: ContextId,
        command: &str,
        options: &OptionSet,
        allow_other_options: bool,
    ) -> Option<ResolvedOptions> {
        self.options(id, command, options, allow_other_options)
            .unwrap_or_else(|err| err.exit())
    }

    /// Queues a declaration that runs later, e.g. in a deferred start-up phase.
    pub fn defer<F>(&mut self, declaration: F)
    where
        F: FnOnce(&mut Session) -> Result<()> + 'static,
    {
        self.deferred.push_back(Box::new(declaration));
    }

    pub fn pending_deferred(&self) -> usize {
        self.deferred.len()
    }

    /// Runs queued declarations in order, including ones they queue themselves.
    pub fn run_deferred(&mut self) -> Result<()> {
        while let Some(declaration) = self.deferred.pop_front() {
            declaration(self)?;
        }
        Ok(())
    }

    /// Suspends the program in help modes until all metadata is collected.
    ///
    /// In [`Mode::Run`] this returns [`Capture::Continue`] immediately. In
    /// [`Mode::ShowHelp`] the deferred declarations run and the rendered
    /// help is returned with [`EXIT_HELP`]. In [`Mode::GenerateHelp`] the
    /// static help document is written and [`EXIT_GENERATED_HELP`] returned;
    /// a failed write is reported but still ends the run.
    pub fn capture(&mut self) -> Result<Capture> {
        match self.mode {
            Mode::Run => Ok(Capture::Continue),
            Mode::ShowHelp => {
                self.run_deferred()?;
                Ok(Capture::Exit {
                    code: EXIT_HELP,
                    output: Some(self.terminal_help()),
                })
            }
            Mode::GenerateHelp => {
                self.run_deferred()?;
                self.generation.flush();
                match self.write_static_help() {
                    Ok(path) => info!(path = %path.display(), "Static help written"),
                    Err(OptionsError::StaticHelp(err)) => {
                        warn!(error = %err, "Static help not written");
                    }
                    Err(err) => return Err(err),
                }
                Ok(Capture::Exit {
                    code: EXIT_GENERATED_HELP,
                    output: None,
                })
            }
        }
    }

    /// Requests a write of the static help document; repeated requests
    /// within the coalescing window collapse into one write.
    pub fn request_generation(&mut self, now: Instant) {
        if self.generation.schedule(now, ()) {
            debug!("Coalesced static help generation request");
        }
    }

    /// Writes the static help document if a request's window has passed.
    pub fn poll_generation(&mut self, now: Instant) -> Result<Option<PathBuf>> {
        match self.generation.poll(now) {
            Some(()) => self.write_static_help().map(Some),
            None => Ok(None),
        }
    }

    /// Writes the static help document now if a request is pending.
    pub fn flush_generation(&mut self) -> Result<Option<PathBuf>> {
        match self.generation.flush() {
            Some(()) => self.write_static_help().map(Some),
            None => Ok(None),
        }
    }

    pub fn generation_pending(&self) -> bool {
        self.generation.is_pending()
    }

    /// Path the static help document is written to.
    ///
    /// This is the help location of the most recently declared context that
    /// writes to a local file, or of the first declared context when none
    /// does. The general-options context is not a candidate.
    pub fn generation_target(&self) -> Result<PathBuf> {
        let candidates: Vec<&Context> = self
            .contexts
            .values()
            .enumerate()
            .filter(|(index, _)| *index != self.default_context.0)
            .map(|(_, context)| context)
            .collect();

        if let Some(path) = candidates
            .iter()
            .rev()
            .find_map(|c| c.help_location().local_path())
        {
            return Ok(path.to_path_buf());
        }

        match candidates.first().map(|c| c.help_location()) {
            None => Err(StaticHelpError::NoContexts.into()),
            Some(HelpLocation::File(path)) => Ok(path.clone()),
            Some(HelpLocation::Remote(url)) => Err(StaticHelpError::NotLocal(url.clone()).into()),
        }
    }
}
