//! Static help document persistence.
//!
//! `--generate-help` writes the Markdown rendering of every registered
//! option to the help file so that a later `--help` can be answered from
//! that file without running the program's start-up sequence.

mod parse;

use std::path::{Path, PathBuf};

use command_options_core::{OptionConfig, OptionValue, strip_dashes};
use tracing::{debug, info};

pub use parse::parse_markdown;

use crate::context::{ContextId, HelpLocation};
use crate::error::{Result, StaticHelpError};
use crate::help::{HelpDocument, HelpEntry, MarkdownRenderer, render};
use crate::session::Session;

/// Renders `doc` in the static help document format.
pub fn generate_markdown(doc: &HelpDocument) -> String {
    render(doc, &MarkdownRenderer).text
}

/// Declaration equivalent to a parsed help entry: the last form is the
/// primary name, the others are aliases.
fn entry_config(entry: &HelpEntry, required: bool) -> Option<(String, OptionConfig)> {
    let (primary, aliases) = entry.names.split_last()?;
    let mut config = OptionConfig::new();
    for alias in aliases {
        config = config.with_alias(strip_dashes(alias));
    }
    config.description = entry.description.clone();
    config.placeholder = entry.placeholder.clone();
    config.default = entry.default.clone().map(OptionValue::String);
    config.required = Some(required);
    Some((strip_dashes(primary).to_string(), config))
}

impl Session {
    /// Writes the static help document to the generation target.
    ///
    /// Missing parent directories are created.
    pub fn write_static_help(&self) -> Result<PathBuf> {
        let path = self.generation_target()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(StaticHelpError::Io)?;
        }
        let markdown = generate_markdown(&self.help_document());
        std::fs::write(&path, markdown).map_err(StaticHelpError::Io)?;
        debug!(path = %path.display(), "Wrote static help document");
        Ok(path)
    }

    /// Registers every entry of a parsed help document.
    ///
    /// Contexts are created in reverse document order, so that rendering the
    /// session again lists them in the document's order. Descriptions only
    /// fill in what is not set yet.
    pub fn merge_help_document(&mut self, doc: &HelpDocument) -> Result<()> {
        if self.description.is_none() {
            self.description = doc.description.clone();
        }

        for help in doc.contexts.iter().rev() {
            let id = self.context(&help.name);
            if let Some(description) = &help.description {
                if self.get(id).description().is_none() {
                    self.describe(id, description);
                }
            }
            for command in &help.commands {
                self.register_entries(id, &command.name, &command.required, true)?;
                self.register_entries(id, &command.name, &command.optional, false)?;
            }
        }
        Ok(())
    }

    fn register_entries(
        &mut self,
        id: ContextId,
        command: &str,
        entries: &[HelpEntry],
        required: bool,
    ) -> Result<()> {
        for entry in entries {
            let (name, config) = entry_config(entry, required).ok_or_else(|| {
                StaticHelpError::Malformed(format!("entry without names in {}", self.get(id).name()))
            })?;
            self.register_option(id, command, &name, &config)?;
        }
        Ok(())
    }

    /// Reads and registers a static help document.
    ///
    /// # Errors
    ///
    /// [`StaticHelpError::NotFound`] when the file does not exist and
    /// [`StaticHelpError::Malformed`] when it cannot be parsed; nothing is
    /// registered in either case.
    pub fn load_static_help(&mut self, path: &Path) -> Result<HelpDocument> {
        let text = std::fs::read_to_string(path).map_err(|err| match err.kind() {
            std::io::ErrorKind::NotFound => StaticHelpError::NotFound(path.to_path_buf()),
            _ => StaticHelpError::Io(err),
        })?;
        let doc = parse_markdown(&text)?;
        self.merge_help_document(&doc)?;
        debug!(
            path = %path.display(),
            contexts = doc.contexts.len(),
            entries = doc.entry_count(),
            "Loaded static help document"
        );
        Ok(doc)
    }

    /// Answers `--help` from the static help document.
    ///
    /// Returns the rendered terminal help, or `None` when the document is
    /// missing or unusable and options have to be collected by running the
    /// program.
    pub fn try_static_help(&mut self) -> Option<String> {
        let location = self.default_help_location();
        self.try_static_help_at(&location)
    }

    /// Like [`try_static_help`](Self::try_static_help), for a document
    /// generated to `location`, e.g. a context created with
    /// [`context_with_help_location`](Self::context_with_help_location).
    /// Remote locations are never read.
    pub fn try_static_help_at(&mut self, location: &HelpLocation) -> Option<String> {
        let Some(path) = location.local_path() else {
            debug!(help = %location, "Static help location is not a local file");
            return None;
        };
        match self.load_static_help(path) {
            Ok(_) => Some(self.terminal_help()),
            Err(err) => {
                info!(path = %path.display(), error = %err, "No static help file found");
                None
            }
        }
    }
}
