use owo_colors::OwoColorize;

use super::{Block, Heading, HelpRenderer};

const INDENT: &str = "  ";

/// Plain or colored text for a terminal.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalRenderer {
    pub color: bool,
}

impl TerminalRenderer {
    pub fn new(color: bool) -> Self {
        Self { color }
    }
}

impl HelpRenderer for TerminalRenderer {
    fn prefix(&self, names: &[String], placeholder: Option<&str>, level: usize) -> String {
        let names = names.join(", ");
        let names = if self.color {
            names.green().to_string()
        } else {
            names
        };
        match placeholder {
            Some(p) if self.color => format!("{}{names} {}", INDENT.repeat(level), p.italic()),
            Some(p) => format!("{}{names} {p}", INDENT.repeat(level)),
            None => format!("{}{names}", INDENT.repeat(level)),
        }
    }

    fn description(&self, text: &str, level: usize) -> String {
        text.lines()
            .map(|line| format!("{}{line}", INDENT.repeat(level)))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn default_value(&self, value: &str) -> String {
        let annotation = format!("(default: {value})");
        if self.color {
            annotation.dimmed().to_string()
        } else {
            annotation
        }
    }

    fn heading(&self, text: &str, kind: Heading, level: usize) -> String {
        let indent = INDENT.repeat(level);
        if !self.color {
            return format!("{indent}{text}");
        }
        match kind {
            Heading::Context => format!("{indent}{}", text.bold().underline()),
            Heading::Command => format!("{indent}{}", text.bold()),
            Heading::Section => format!("{indent}{}", text.yellow()),
        }
    }

    fn spacing(&self, block: Block) -> &'static str {
        match block {
            Block::Preamble | Block::Heading(Heading::Context | Heading::Command) => "\n\n",
            Block::Heading(Heading::Section) | Block::Description | Block::Entries => "\n",
        }
    }
}
