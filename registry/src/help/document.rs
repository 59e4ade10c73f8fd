//! Renderer-independent help document.

use command_options_core::OptionConfig;
use serde::{Deserialize, Serialize};

use crate::context::{Context, Partition};
use crate::session::Session;

/// Everything shown by `--help`, in rendering order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default)]
    pub contexts: Vec<HelpContext>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpContext {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Top-level options (`name == ""`) first, then sub-commands.
    #[serde(default)]
    pub commands: Vec<HelpCommand>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpCommand {
    /// Sub-command name, empty for top-level options.
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required: Vec<HelpEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub optional: Vec<HelpEntry>,
}

impl HelpCommand {
    pub fn is_empty(&self) -> bool {
        self.required.is_empty() && self.optional.is_empty()
    }
}

/// One option line.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpEntry {
    /// Command-line forms, aliases first and the primary name last.
    pub names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Default value as displayed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
}

impl HelpEntry {
    pub fn from_config(name: &str, config: &OptionConfig) -> Self {
        Self {
            names: config.display_forms(name),
            placeholder: config.placeholder.clone(),
            description: config.description.clone(),
            default: config.default.as_ref().map(ToString::to_string),
        }
    }
}

impl HelpDocument {
    /// Number of option entries across all contexts and commands.
    pub fn entry_count(&self) -> usize {
        self.contexts
            .iter()
            .flat_map(|c| &c.commands)
            .map(|c| c.required.len() + c.optional.len())
            .sum()
    }
}

fn help_command(name: &str, partition: &Partition) -> HelpCommand {
    let mut command = HelpCommand {
        name: name.to_string(),
        ..HelpCommand::default()
    };
    for (option, config) in partition.iter().filter(|(_, c)| !c.is_dev()) {
        let entry = HelpEntry::from_config(option, config);
        if config.is_required() {
            command.required.push(entry);
        } else {
            command.optional.push(entry);
        }
    }
    command
}

fn help_context(context: &Context) -> HelpContext {
    HelpContext {
        name: context.name().to_string(),
        description: context.description().map(String::from),
        commands: context
            .commands()
            .map(|(name, partition)| help_command(name, partition))
            .filter(|command| !command.is_empty())
            .collect(),
    }
}

impl Session {
    /// Contexts in rendering order: most recently declared first, the
    /// general-options context last.
    pub fn render_order(&self) -> Vec<&Context> {
        let default = self.default_context().0;
        let mut order: Vec<&Context> = self
            .contexts
            .values()
            .enumerate()
            .rev()
            .filter(|(index, _)| *index != default)
            .map(|(_, context)| context)
            .collect();
        order.extend(self.contexts.get_index(default).map(|(_, c)| c));
        order
    }

    /// Builds the help document of every context with visible options.
    pub fn help_document(&self) -> HelpDocument {
        HelpDocument {
            description: self.description.clone(),
            contexts: self
                .render_order()
                .into_iter()
                .filter(|context| context.has_visible_options())
                .map(help_context)
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SessionConfig;
    use command_options_core::OptionSet;
    use std::path::PathBuf;

    fn session() -> Session {
        Session::new(Vec::new(), PathBuf::from("/work"), SessionConfig::default())
    }

    #[test]
    fn test_contexts_reversed_with_general_last() {
        let mut s = session();
        for name in ["First", "Second"] {
            let ctx = s.context(name);
            s.declare(ctx, "", &OptionSet::new().with("x", OptionConfig::boolean()), true)
                .unwrap();
        }
        let names: Vec<_> = s.help_document().contexts.into_iter().map(|c| c.name).collect();
        assert_eq!(names, vec!["Second", "First", "General Options"]);
    }

    #[test]
    fn test_entries_split_and_dev_hidden() {
        let mut s = session();
        let ctx = s.context("Time Machine");
        let options = OptionSet::new()
            .with(
                "time",
                OptionConfig::string()
                    .with_alias("t")
                    .with_placeholder("TIME")
                    .required(),
            )
            .with("location", OptionConfig::string().with_default("X"))
            .with("trace", OptionConfig::boolean().dev());
        s.declare(ctx, "", &options, true).unwrap();

        let doc = s.help_document();
        let command = &doc.contexts[0].commands[0];
        assert_eq!(command.required.len(), 1);
        assert_eq!(command.required[0].names, vec!["-t", "--time"]);
        assert_eq!(command.required[0].placeholder.as_deref(), Some("TIME"));
        assert_eq!(command.optional.len(), 1);
        assert_eq!(command.optional[0].default.as_deref(), Some("X"));

        let general = doc.contexts.last().unwrap();
        assert_eq!(general.commands[0].optional.len(), 1);
        assert_eq!(doc.entry_count(), 3);
    }

    #[test]
    fn test_empty_contexts_and_partitions_skipped() {
        let mut s = session();
        s.context("Nothing");
        let ctx = s.context("Commands only");
        s.declare(
            ctx,
            "advanced",
            &OptionSet::new().with("speed", OptionConfig::number()),
            true,
        )
        .unwrap();

        let doc = s.help_document();
        assert_eq!(doc.contexts.len(), 2);
        assert_eq!(doc.contexts[0].name, "Commands only");
        assert_eq!(doc.contexts[0].commands.len(), 1);
        assert_eq!(doc.contexts[0].commands[0].name, "advanced");
    }
}
