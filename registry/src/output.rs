//! Output formatting for help documents.

use crate::error::Result;
use crate::help::{HelpDocument, MarkdownRenderer, TerminalRenderer, render};

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Terminal,
    Markdown,
    Json,
}

/// Formats a help document in the requested output format.
///
/// `color` only applies to [`OutputFormat::Terminal`].
pub fn format_help(doc: &HelpDocument, format: OutputFormat, color: bool) -> Result<String> {
    match format {
        OutputFormat::Terminal => Ok(render(doc, &TerminalRenderer::new(color)).text),
        OutputFormat::Markdown => Ok(render(doc, &MarkdownRenderer).text),
        OutputFormat::Json => Ok(serde_json::to_string_pretty(doc)? + "\n"),
    }
}
