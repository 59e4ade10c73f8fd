//! The static help document format.
//!
//! ```text
//! ## Time Machine
//!
//! Required:
//!
//! * `-t, --time TIME` When to travel
//!
//! ### advanced
//!
//! Optional:
//!
//! * `--speed MPH` Travel speed (default: 100)
//! ```
//!
//! Further lines of an entry's description are indented by two spaces.
//! Free-text lines that would read as structure (`## `, `* `, `Required:`,
//! ...) are escaped with a leading backslash.
//!
//! [`parse_markdown`](crate::persist::parse_markdown) reads this format back.

use super::{Heading, HelpRenderer, OPTIONAL_TITLE, REQUIRED_TITLE};

/// Escapes every line of a free-text paragraph.
pub(crate) fn escape_paragraph(text: &str) -> String {
    text.split('\n')
        .map(|line| {
            let structural = line.starts_with(['*', '#', '\\'])
                || matches!(line.trim_end(), REQUIRED_TITLE | OPTIONAL_TITLE);
            if structural {
                format!("\\{line}")
            } else {
                line.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Reverses [`escape_paragraph`] for one line.
pub(crate) fn unescape_line(line: &str) -> &str {
    line.strip_prefix('\\').unwrap_or(line)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MarkdownRenderer;

impl HelpRenderer for MarkdownRenderer {
    fn prefix(&self, names: &[String], placeholder: Option<&str>, _level: usize) -> String {
        match placeholder {
            Some(p) => format!("* `{} {p}`", names.join(", ")),
            None => format!("* `{}`", names.join(", ")),
        }
    }

    fn description(&self, text: &str, _level: usize) -> String {
        escape_paragraph(text)
    }

    fn preamble(&self, text: &str) -> String {
        escape_paragraph(text)
    }

    fn heading(&self, text: &str, kind: Heading, _level: usize) -> String {
        match kind {
            Heading::Context => format!("## {text}"),
            Heading::Command => format!("### {text}"),
            Heading::Section => text.to_string(),
        }
    }

    fn entry_separator(&self) -> &'static str {
        " "
    }

    fn aligns(&self) -> bool {
        false
    }
}
