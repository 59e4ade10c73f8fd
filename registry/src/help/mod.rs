//! Help rendering.
//!
//! The session's option metadata is first turned into a [`HelpDocument`],
//! then laid out by [`render`] through a [`HelpRenderer`]. The layout is the
//! same for every renderer: for each context its title and description,
//! then per partition a "Required" and an "Optional" section. Entries are
//! `prefix + separator + description`; renderers that [`align`] get every
//! description in one column, measured without color codes.
//!
//! [`align`]: HelpRenderer::aligns

mod document;
mod markdown;
mod terminal;

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

pub use document::{HelpCommand, HelpContext, HelpDocument, HelpEntry};
pub use markdown::MarkdownRenderer;
pub(crate) use markdown::unescape_line;
pub use terminal::TerminalRenderer;

use crate::session::Session;

static ANSI_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\x1b\[[0-9;]*m").expect("static regex must compile"));

/// Separates an entry's prefix from its description until the alignment pass.
const ENTRY_MARK: char = '\u{1f}';
/// Starts a further line of an entry's description.
const CONTINUATION_MARK: char = '\u{1e}';

/// Section titles used by every renderer.
pub const REQUIRED_TITLE: &str = "Required:";
pub const OPTIONAL_TITLE: &str = "Optional:";

/// Kinds of titles in a help document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Heading {
    Context,
    Command,
    /// "Required:" / "Optional:".
    Section,
}

/// Units of output; renderers choose the spacing before each.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Block {
    Preamble,
    Heading(Heading),
    Description,
    Entries,
}

/// Output format strategy.
pub trait HelpRenderer {
    /// Names and placeholder of an entry at nesting `level`.
    fn prefix(&self, names: &[String], placeholder: Option<&str>, level: usize) -> String;

    /// A free-text paragraph at nesting `level`.
    fn description(&self, text: &str, level: usize) -> String;

    /// Annotation appended to an entry's description.
    fn default_value(&self, value: &str) -> String {
        format!("(default: {value})")
    }

    fn heading(&self, text: &str, kind: Heading, level: usize) -> String;

    /// Program description shown before all contexts.
    fn preamble(&self, text: &str) -> String {
        text.to_string()
    }

    fn epilogue(&self) -> Option<String> {
        None
    }

    /// Text inserted before `block` unless it starts the output.
    fn spacing(&self, _block: Block) -> &'static str {
        "\n\n"
    }

    fn entry_separator(&self) -> &'static str {
        "  "
    }

    /// Whether descriptions are padded into a single column.
    fn aligns(&self) -> bool {
        true
    }

    /// Indent of further description lines when the renderer does not align.
    fn continuation_indent(&self) -> &'static str {
        "  "
    }
}

/// Rendered help text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedHelp {
    pub text: String,
    /// Widest entry prefix, ignoring color codes.
    pub prefix_width: usize,
}

/// Removes ANSI color sequences.
pub fn strip_ansi(text: &str) -> Cow<'_, str> {
    ANSI_PATTERN.replace_all(text, "")
}

/// Display width of `text`, ignoring ANSI color sequences.
pub fn visible_width(text: &str) -> usize {
    strip_ansi(text).chars().count()
}

/// Lays out `doc` through `renderer`.
///
/// # Examples
///
/// ```
/// use command_options_registry::help::{
///     HelpCommand, HelpContext, HelpDocument, HelpEntry, MarkdownRenderer, render,
/// };
///
/// let doc = HelpDocument {
///     description: None,
///     contexts: vec![HelpContext {
///         name: "Time Machine".into(),
///         description: None,
///         commands: vec![HelpCommand {
///             name: String::new(),
///             required: vec![],
///             optional: vec![HelpEntry {
///                 names: vec!["--location".into()],
///                 placeholder: None,
///                 description: Some("Where to go".into()),
///                 default: Some("X".into()),
///             }],
///         }],
///     }],
/// };
///
/// let rendered = render(&doc, &MarkdownRenderer);
/// assert_eq!(
///     rendered.text,
///     "## Time Machine\n\nOptional:\n\n* `--location` Where to go (default: X)\n"
/// );
/// ```
pub fn render(doc: &HelpDocument, renderer: &dyn HelpRenderer) -> RenderedHelp {
    let mut out = String::new();
    let mut push = |block: Block, text: String| {
        if !out.is_empty() {
            out.push_str(renderer.spacing(block));
        }
        out.push_str(&text);
    };

    if let Some(description) = &doc.description {
        push(Block::Preamble, renderer.preamble(description));
    }

    for context in &doc.contexts {
        push(
            Block::Heading(Heading::Context),
            renderer.heading(&context.name, Heading::Context, 0),
        );
        if let Some(description) = &context.description {
            push(Block::Description, renderer.description(description, 1));
        }

        for command in &context.commands {
            let level = if command.name.is_empty() {
                1
            } else {
                push(
                    Block::Heading(Heading::Command),
                    renderer.heading(&command.name, Heading::Command, 1),
                );
                2
            };

            for (title, entries) in [
                (REQUIRED_TITLE, &command.required),
                (OPTIONAL_TITLE, &command.optional),
            ] {
                if entries.is_empty() {
                    continue;
                }
                push(
                    Block::Heading(Heading::Section),
                    renderer.heading(title, Heading::Section, level),
                );
                let lines: Vec<String> = entries
                    .iter()
                    .map(|entry| entry_line(renderer, entry, level + 1))
                    .collect();
                push(Block::Entries, lines.join("\n"));
            }
        }
    }

    if let Some(epilogue) = renderer.epilogue() {
        push(Block::Preamble, epilogue);
    }

    align(&out, renderer)
}

fn entry_line(renderer: &dyn HelpRenderer, entry: &HelpEntry, level: usize) -> String {
    let prefix = renderer.prefix(&entry.names, entry.placeholder.as_deref(), level);
    let annotation = entry.default.as_deref().map(|d| renderer.default_value(d));
    let text: Vec<&str> = [entry.description.as_deref(), annotation.as_deref()]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();
    let text = text.join(" ");
    let mut lines = text.split('\n');
    let mut out = format!("{prefix}{ENTRY_MARK}{}", lines.next().unwrap_or_default());
    for line in lines {
        out.push('\n');
        out.push(CONTINUATION_MARK);
        out.push_str(line);
    }
    out
}

/// Pads every entry prefix to the widest one and inserts the separator.
fn align(text: &str, renderer: &dyn HelpRenderer) -> RenderedHelp {
    let prefix_width = text
        .lines()
        .filter_map(|line| line.split_once(ENTRY_MARK))
        .map(|(prefix, _)| visible_width(prefix))
        .max()
        .unwrap_or(0);

    let separator = renderer.entry_separator();
    let continuation = if renderer.aligns() {
        " ".repeat(prefix_width + visible_width(separator))
    } else {
        renderer.continuation_indent().to_string()
    };
    let mut aligned = String::with_capacity(text.len());
    for line in text.lines() {
        if let Some(rest) = line.strip_prefix(CONTINUATION_MARK) {
            aligned.push_str(format!("{continuation}{rest}").trim_end());
            aligned.push('\n');
            continue;
        }
        match line.split_once(ENTRY_MARK) {
            Some((prefix, rest)) => {
                let padding = if renderer.aligns() {
                    prefix_width - visible_width(prefix)
                } else {
                    0
                };
                let entry = format!("{prefix}{}{separator}{rest}", " ".repeat(padding));
                aligned.push_str(entry.trim_end());
            }
            None => aligned.push_str(line),
        }
        aligned.push('\n');
    }

    RenderedHelp {
        text: aligned,
        prefix_width,
    }
}

impl Session {
    /// Terminal help for every registered context.
    pub fn terminal_help(&self) -> String {
        let renderer = TerminalRenderer::new(self.config.color.enabled());
        render(&self.help_document(), &renderer).text
    }

    /// Markdown help for every registered context.
    pub fn markdown_help(&self) -> String {
        render(&self.help_document(), &MarkdownRenderer).text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(names: &[&str], placeholder: Option<&str>, description: &str) -> HelpEntry {
        HelpEntry {
            names: names.iter().map(|n| n.to_string()).collect(),
            placeholder: placeholder.map(String::from),
            description: Some(description.to_string()),
            default: None,
        }
    }

    fn document() -> HelpDocument {
        HelpDocument {
            description: Some("Travel through time.".into()),
            contexts: vec![HelpContext {
                name: "Time Machine".into(),
                description: None,
                commands: vec![
                    HelpCommand {
                        name: String::new(),
                        required: vec![entry(&["-t", "--time"], Some("TIME"), "When to travel")],
                        optional: vec![],
                    },
                    HelpCommand {
                        name: "advanced".into(),
                        required: vec![],
                        optional: vec![HelpEntry {
                            default: Some("100".into()),
                            ..entry(&["--speed"], Some("MPH"), "Travel speed")
                        }],
                    },
                ],
            }],
        }
    }

    #[test]
    fn test_terminal_aligns_across_levels() {
        let rendered = render(&document(), &TerminalRenderer::new(false));
        assert_eq!(
            rendered.text,
            "Travel through time.\n\
             \n\
             Time Machine\n\
             \x20 Required:\n\
             \x20   -t, --time TIME  When to travel\n\
             \n\
             \x20 advanced\n\
             \x20   Optional:\n\
             \x20     --speed MPH    Travel speed (default: 100)\n"
        );
        assert_eq!(rendered.prefix_width, "    -t, --time TIME".len());
    }

    #[test]
    fn test_color_codes_do_not_affect_alignment() {
        let plain = render(&document(), &TerminalRenderer::new(false));
        let colored = render(&document(), &TerminalRenderer::new(true));
        assert_ne!(plain.text, colored.text);
        assert_eq!(plain.prefix_width, colored.prefix_width);
        assert_eq!(strip_ansi(&colored.text), plain.text);
    }

    #[test]
    fn test_markdown_does_not_align() {
        let rendered = render(&document(), &MarkdownRenderer);
        assert_eq!(
            rendered.text,
            "Travel through time.\n\
             \n\
             ## Time Machine\n\
             \n\
             Required:\n\
             \n\
             * `-t, --time TIME` When to travel\n\
             \n\
             ### advanced\n\
             \n\
             Optional:\n\
             \n\
             * `--speed MPH` Travel speed (default: 100)\n"
        );
    }

    fn multi_line_document() -> HelpDocument {
        let mut doc = document();
        doc.contexts[0].commands[0].required[0].description =
            Some("When to travel.\nUse ISO dates.".into());
        doc.contexts[0].commands[0].required[0].default = Some("now".into());
        doc
    }

    #[test]
    fn test_terminal_indents_further_lines_to_description_column() {
        let rendered = render(&multi_line_document(), &TerminalRenderer::new(false));
        assert!(rendered.text.contains(
            "    -t, --time TIME  When to travel.\n                     Use ISO dates. (default: now)\n"
        ));

        let colored = render(&multi_line_document(), &TerminalRenderer::new(true));
        assert_eq!(strip_ansi(&colored.text), rendered.text);
    }

    #[test]
    fn test_markdown_indents_further_lines() {
        let rendered = render(&multi_line_document(), &MarkdownRenderer);
        assert!(rendered.text.contains(
            "* `-t, --time TIME` When to travel.\n  Use ISO dates. (default: now)\n"
        ));
    }

    #[test]
    fn test_entry_without_description() {
        let doc = HelpDocument {
            description: None,
            contexts: vec![HelpContext {
                name: "A".into(),
                description: None,
                commands: vec![HelpCommand {
                    name: String::new(),
                    required: vec![],
                    optional: vec![HelpEntry {
                        names: vec!["--quiet".into()],
                        ..HelpEntry::default()
                    }],
                }],
            }],
        };
        let rendered = render(&doc, &MarkdownRenderer);
        assert!(rendered.text.ends_with("* `--quiet`\n"));
    }

    #[test]
    fn test_visible_width_ignores_escape_codes() {
        assert_eq!(visible_width("\x1b[1m--time\x1b[0m"), 6);
        assert_eq!(visible_width("--time"), 6);
    }
}
