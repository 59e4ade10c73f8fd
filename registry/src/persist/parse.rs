//! Reader for the static help document written by [`MarkdownRenderer`](crate::help::MarkdownRenderer).

use std::sync::LazyLock;

use regex::Regex;

use crate::error::StaticHelpError;
use crate::help::{
    HelpCommand, HelpContext, HelpDocument, HelpEntry, OPTIONAL_TITLE, REQUIRED_TITLE, unescape_line,
};

static ENTRY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\*\s+`([^`]+)`\s*(.*)$").expect("static regex must compile"));

/// Indent of further description lines of an entry.
const CONTINUATION_INDENT: &str = "  ";

static DEFAULT_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(.*?)\s*\(default: (.*)\)$").expect("static regex must compile")
});

#[derive(Debug, Default)]
struct Parser {
    doc: HelpDocument,
    preamble: Vec<String>,
    context: Option<HelpContext>,
    description: Vec<String>,
    /// Description lines are still accepted for the current context.
    in_description: bool,
    command: String,
    required: bool,
    /// Entry still accepting indented description lines.
    entry: Option<HelpEntry>,
    /// Blank lines seen since the last line of `entry`.
    blank_lines: usize,
}

impl Parser {
    fn finish_context(&mut self) {
        self.finish_entry();
        if let Some(mut context) = self.context.take() {
            context.description = paragraph(&self.description);
            self.doc.contexts.push(context);
        }
        self.description.clear();
    }

    fn start_context(&mut self, name: &str) {
        self.finish_context();
        self.context = Some(HelpContext {
            name: name.trim().to_string(),
            ..HelpContext::default()
        });
        self.in_description = true;
        self.command.clear();
        self.required = true;
    }

    fn current_context(&mut self, line_no: usize, line: &str) -> Result<&mut HelpContext, StaticHelpError> {
        self.context
            .as_mut()
            .ok_or_else(|| malformed(line_no, line, "outside of a context section"))
    }

    /// Files the pending entry under the current command and section.
    fn finish_entry(&mut self) {
        self.blank_lines = 0;
        let Some(mut entry) = self.entry.take() else {
            return;
        };
        split_default(&mut entry);

        let command = self.command.clone();
        let required = self.required;
        // Entries are only started inside a context.
        let Some(context) = self.context.as_mut() else {
            return;
        };
        let index = match context.commands.iter().position(|c| c.name == command) {
            Some(index) => index,
            None => {
                context.commands.push(HelpCommand {
                    name: command,
                    ..HelpCommand::default()
                });
                context.commands.len() - 1
            }
        };
        let target = &mut context.commands[index];
        if required {
            target.required.push(entry);
        } else {
            target.optional.push(entry);
        }
    }

    /// Appends an indented line to the pending entry's description.
    fn continue_entry(&mut self, line: &str) -> bool {
        let Some(entry) = self.entry.as_mut() else {
            return false;
        };
        if line.trim().is_empty() {
            self.blank_lines += 1;
            return true;
        }
        let Some(rest) = line.strip_prefix(CONTINUATION_INDENT) else {
            return false;
        };
        let description = entry.description.get_or_insert_with(String::new);
        description.push_str(&"\n".repeat(self.blank_lines + 1));
        description.push_str(rest);
        self.blank_lines = 0;
        true
    }

    fn line(&mut self, line_no: usize, line: &str) -> Result<(), StaticHelpError> {
        if self.continue_entry(line) {
            return Ok(());
        }
        self.finish_entry();

        if let Some(name) = line.strip_prefix("## ") {
            self.start_context(name);
            return Ok(());
        }

        if let Some(command) = line.strip_prefix("### ") {
            self.current_context(line_no, line)?;
            self.in_description = false;
            self.command = command.trim().to_string();
            self.required = true;
            return Ok(());
        }

        match line.trim_end() {
            REQUIRED_TITLE | OPTIONAL_TITLE => {
                self.current_context(line_no, line)?;
                self.in_description = false;
                self.required = line.trim_end() == REQUIRED_TITLE;
                return Ok(());
            }
            _ => {}
        }

        if line.starts_with('*') {
            self.in_description = false;
            self.current_context(line_no, line)?;
            let entry = parse_entry(line).ok_or_else(|| malformed(line_no, line, "unrecognised entry"))?;
            self.entry = Some(entry);
            return Ok(());
        }

        if self.context.is_none() {
            self.preamble.push(unescape_line(line).to_string());
        } else if self.in_description {
            self.description.push(unescape_line(line).to_string());
        } else if !line.trim().is_empty() {
            return Err(malformed(line_no, line, "unexpected text"));
        }
        Ok(())
    }
}

fn malformed(line_no: usize, line: &str, reason: &str) -> StaticHelpError {
    StaticHelpError::Malformed(format!("line {line_no}: {reason}: {line:?}"))
}

/// Joins lines, dropping blank lines at either end.
fn paragraph(lines: &[String]) -> Option<String> {
    let start = lines.iter().position(|l| !l.trim().is_empty())?;
    let end = lines.iter().rposition(|l| !l.trim().is_empty())?;
    Some(lines[start..=end].join("\n"))
}

/// Moves a trailing `(default: ...)` annotation into `entry.default`.
///
/// Only the last description line can carry the annotation.
fn split_default(entry: &mut HelpEntry) {
    let Some(text) = entry.description.take() else {
        return;
    };
    let (head, last) = match text.rsplit_once('\n') {
        Some((head, last)) => (Some(head), last),
        None => (None, text.as_str()),
    };
    let last = match DEFAULT_PATTERN.captures(last) {
        Some(default) => {
            entry.default = Some(default[2].to_string());
            default[1].to_string()
        }
        None => last.to_string(),
    };
    let description = match head {
        Some(head) => format!("{head}\n{last}"),
        None => last,
    };
    entry.description = Some(description).filter(|d| !d.is_empty());
}

/// Parses the first line of an entry, `` * `-t, --time TIME` When to travel ``.
///
/// The description is kept verbatim until the entry is complete.
fn parse_entry(line: &str) -> Option<HelpEntry> {
    let captures = ENTRY_PATTERN.captures(line)?;
    let mut entry = HelpEntry::default();

    for token in captures[1].split(',') {
        let mut words = token.split_whitespace();
        let form = words.next().filter(|f| f.starts_with('-'))?;
        entry.names.push(form.to_string());
        if let Some(placeholder) = words.next() {
            entry.placeholder = Some(placeholder.to_string());
        }
        if words.next().is_some() {
            return None;
        }
    }

    entry.description = Some(captures[2].trim_end().to_string());
    Some(entry)
}

/// Parses a static help document.
///
/// Text before the first `## ` section is the program description; each
/// section is a context, `### ` starts a sub-command and `Required:` /
/// `Optional:` switch the required flag of the entries that follow.
///
/// # Errors
///
/// Returns [`StaticHelpError::Malformed`] for any line that fits none of
/// these forms.
pub fn parse_markdown(text: &str) -> Result<HelpDocument, StaticHelpError> {
    let mut parser = Parser {
        required: true,
        ..Parser::default()
    };
    for (index, line) in text.lines().enumerate() {
        parser.line(index + 1, line)?;
    }
    parser.finish_entry();
    parser.finish_context();
    parser.doc.description = paragraph(&parser.preamble);
    Ok(parser.doc)
}
