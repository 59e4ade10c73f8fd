//! Raw argv tokenization.
//!
//! A [`Tokenizer`] splits argv into a flat name → [`RawValue`] map according
//! to a [`ParserDefinition`]. Tokens that match no declared name or alias are
//! handed to an unknown-token callback, which is how the resolver detects
//! sub-commands, collects bare arguments and rejects unknown options.
//!
//! [`DefaultTokenizer`] understands the usual forms:
//!
//! - `--name value`, `--name=value`, `-n value`
//! - `--flag`, `--no-flag`, grouped short switches (`-abc`)
//! - `--` ends option parsing, everything after it is bare

use std::collections::{HashMap, HashSet};

use command_options_core::{OptionSet, OptionType, RawValue, display_form};

use crate::error::Result;

/// Names known to every definition: `--help`, `-h` and `--generate-help`.
pub const BUILTIN_SWITCHES: [&str; 3] = ["help", "h", "generate-help"];

/// Tokenizer input derived from a batch of option declarations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParserDefinition {
    /// Options that take a value.
    pub strings: HashSet<String>,
    /// Switches.
    pub booleans: HashSet<String>,
    /// Alias → canonical name.
    pub aliases: HashMap<String, String>,
    pub defaults: HashMap<String, RawValue>,
    /// Options whose repeated occurrences accumulate into a list.
    pub collect: HashSet<String>,
}

impl ParserDefinition {
    /// Builds the definition for a batch of declarations.
    pub fn from_options(options: &OptionSet) -> Self {
        let mut definition = Self::default();
        for (name, config) in options.iter() {
            if config.option_type() == OptionType::Boolean {
                definition.booleans.insert(name.to_string());
            } else {
                definition.strings.insert(name.to_string());
            }
            for alias in &config.aliases {
                definition.aliases.insert(alias.clone(), name.to_string());
            }
            if let Some(default) = &config.default {
                definition.defaults.insert(name.to_string(), default.to_raw());
            }
            if config.is_multiple() {
                definition.collect.insert(name.to_string());
            }
        }
        definition
    }

    /// Adds the built-in switches unless the batch declares them itself.
    pub fn with_builtins(mut self) -> Self {
        for name in BUILTIN_SWITCHES {
            if self.canonical(name).is_none() {
                self.booleans.insert(name.to_string());
            }
        }
        self
    }

    /// Canonical name for a declared name or alias.
    pub fn canonical<'a>(&'a self, key: &'a str) -> Option<&'a str> {
        if self.strings.contains(key) || self.booleans.contains(key) {
            return Some(key);
        }
        self.aliases.get(key).map(String::as_str)
    }

    pub fn is_boolean(&self, name: &str) -> bool {
        self.booleans.contains(name)
    }
}

/// A token that matched no declared name or alias.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnknownToken<'a> {
    /// The argv token as written.
    pub token: &'a str,
    /// Option name without dashes, `None` for bare tokens.
    pub key: Option<&'a str>,
}

/// Tokenizer output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawArgs {
    /// Canonical name → raw value, defaults included.
    pub values: HashMap<String, RawValue>,
    /// Canonical name → the form last typed on the command line (`-t`).
    pub supplied_as: HashMap<String, String>,
}

impl RawArgs {
    pub fn get(&self, name: &str) -> Option<&RawValue> {
        self.values.get(name)
    }

    /// Whether the value came from argv rather than a default.
    pub fn was_supplied(&self, name: &str) -> bool {
        self.supplied_as.contains_key(name)
    }
}

/// Callback invoked for every unknown token; an error aborts tokenization.
pub type UnknownHandler<'h> = dyn FnMut(UnknownToken<'_>) -> Result<()> + 'h;

/// Splits argv into raw option values.
pub trait Tokenizer {
    fn tokenize(
        &self,
        argv: &[String],
        definition: &ParserDefinition,
        on_unknown: &mut UnknownHandler<'_>,
    ) -> Result<RawArgs>;
}

/// Minimist-style tokenizer used by default.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTokenizer;

impl Tokenizer for DefaultTokenizer {
    fn tokenize(
        &self,
        argv: &[String],
        definition: &ParserDefinition,
        on_unknown: &mut UnknownHandler<'_>,
    ) -> Result<RawArgs> {
        let mut args = RawArgs::default();
        let mut index = 0;

        while index < argv.len() {
            let token = argv[index].as_str();
            let next = argv.get(index + 1).map(String::as_str);

            if token == "--" {
                for rest in &argv[index + 1..] {
                    on_unknown(UnknownToken {
                        token: rest,
                        key: None,
                    })?;
                }
                break;
            }

            if let Some(body) = token.strip_prefix("--").filter(|b| !b.is_empty()) {
                let (key, inline) = match body.split_once('=') {
                    Some((key, value)) => (key, Some(value)),
                    None => (body, None),
                };
                index += read_option(&mut args, definition, token, key, inline, next, on_unknown)?;
            } else if let Some(group) = token.strip_prefix('-').filter(|g| !g.is_empty()) {
                index += read_short_group(&mut args, definition, token, group, next, on_unknown)?;
            } else {
                on_unknown(UnknownToken { token, key: None })?;
            }

            index += 1;
        }

        for (name, default) in &definition.defaults {
            args.values
                .entry(name.clone())
                .or_insert_with(|| default.clone());
        }

        Ok(args)
    }
}

/// Reads one `--key[=value]` option. Returns how many extra tokens were consumed.
fn read_option(
    args: &mut RawArgs,
    definition: &ParserDefinition,
    token: &str,
    key: &str,
    inline: Option<&str>,
    next: Option<&str>,
    on_unknown: &mut UnknownHandler<'_>,
) -> Result<usize> {
    let form = token.split_once('=').map_or(token, |(form, _)| form);

    if inline.is_none() {
        if let Some(negated) = key.strip_prefix("no-") {
            if let Some(name) = definition.canonical(negated).filter(|n| definition.is_boolean(n)) {
                let name = name.to_string();
                store(args, definition, &name, RawValue::Bool(false), form);
                return Ok(0);
            }
        }
    }

    let Some(name) = definition.canonical(key).map(str::to_string) else {
        on_unknown(UnknownToken {
            token,
            key: Some(key),
        })?;
        // An unknown option swallows a following value, like a known one would.
        return Ok(usize::from(inline.is_none() && next.is_some_and(|n| !looks_like_option(n))));
    };

    if definition.is_boolean(&name) {
        let value = inline.map_or(RawValue::Bool(true), RawValue::from);
        store(args, definition, &name, value, form);
        return Ok(0);
    }

    match (inline, next) {
        (Some(value), _) => {
            store(args, definition, &name, value.into(), form);
            Ok(0)
        }
        (None, Some(value)) if !looks_like_option(value) => {
            store(args, definition, &name, value.into(), form);
            Ok(1)
        }
        _ => {
            store(args, definition, &name, RawValue::Str(String::new()), form);
            Ok(0)
        }
    }
}

/// Reads `-x`, `-x value` or a group of switches such as `-abc`.
fn read_short_group(
    args: &mut RawArgs,
    definition: &ParserDefinition,
    token: &str,
    group: &str,
    next: Option<&str>,
    on_unknown: &mut UnknownHandler<'_>,
) -> Result<usize> {
    if group.chars().count() == 1 {
        return read_option(args, definition, token, group, None, next, on_unknown);
    }

    let chars: Vec<(usize, char)> = group.char_indices().collect();
    for (position, (offset, letter)) in chars.iter().enumerate() {
        let key = &group[*offset..offset + letter.len_utf8()];
        let form = display_form(key);
        let Some(name) = definition.canonical(key).map(str::to_string) else {
            on_unknown(UnknownToken {
                token,
                key: Some(key),
            })?;
            continue;
        };

        if definition.is_boolean(&name) {
            store(args, definition, &name, RawValue::Bool(true), &form);
            continue;
        }

        // A value-taking letter consumes the rest of the group, or the next token.
        let rest = &group[offset + letter.len_utf8()..];
        if !rest.is_empty() {
            store(args, definition, &name, rest.into(), &form);
            return Ok(0);
        }
        let is_last = position + 1 == chars.len();
        if is_last {
            if let Some(value) = next.filter(|n| !looks_like_option(n)) {
                store(args, definition, &name, value.into(), &form);
                return Ok(1);
            }
        }
        store(args, definition, &name, RawValue::Str(String::new()), &form);
    }

    Ok(0)
}

fn looks_like_option(token: &str) -> bool {
    token.len() > 1 && token.starts_with('-')
}

fn store(args: &mut RawArgs, definition: &ParserDefinition, name: &str, value: RawValue, form: &str) {
    args.supplied_as.insert(name.to_string(), form.to_string());

    if !definition.collect.contains(name) {
        args.values.insert(name.to_string(), value);
        return;
    }

    match args.values.get_mut(name) {
        Some(RawValue::List(items)) => items.push(value),
        _ => {
            args.values.insert(name.to_string(), RawValue::List(vec![value]));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use command_options_core::OptionConfig;

    fn argv(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|t| t.to_string()).collect()
    }

    fn definition() -> ParserDefinition {
        let options = OptionSet::new()
            .with("time", OptionConfig::string().with_alias("t"))
            .with("traveler", OptionConfig::string().multiple())
            .with("location", OptionConfig::string().with_default("X"))
            .with("verbose", OptionConfig::boolean().with_alias("v"))
            .with("quiet", OptionConfig::boolean().with_alias("q"));
        ParserDefinition::from_options(&options).with_builtins()
    }

    fn tokenize(tokens: &[&str]) -> (RawArgs, Vec<(String, Option<String>)>) {
        let mut unknown = Vec::new();
        let args = DefaultTokenizer
            .tokenize(&argv(tokens), &definition(), &mut |t: UnknownToken<'_>| {
                unknown.push((t.token.to_string(), t.key.map(String::from)));
                Ok(())
            })
            .unwrap();
        (args, unknown)
    }

    #[test]
    fn test_long_options_and_defaults() {
        let (args, unknown) = tokenize(&["--time", "June 28, 2009", "--traveler", "A", "--traveler=B"]);
        assert_eq!(args.get("time"), Some(&RawValue::from("June 28, 2009")));
        assert_eq!(
            args.get("traveler"),
            Some(&RawValue::List(vec!["A".into(), "B".into()]))
        );
        assert_eq!(args.get("location"), Some(&RawValue::from("X")));
        assert!(!args.was_supplied("location"));
        assert!(unknown.is_empty());
    }

    #[test]
    fn test_alias_records_supplied_form() {
        let (args, _) = tokenize(&["-t", "now"]);
        assert_eq!(args.get("time"), Some(&RawValue::from("now")));
        assert_eq!(args.supplied_as.get("time").map(String::as_str), Some("-t"));
    }

    #[test]
    fn test_booleans_groups_and_negation() {
        let (args, _) = tokenize(&["-vq", "--no-verbose"]);
        assert_eq!(args.get("verbose"), Some(&RawValue::Bool(false)));
        assert_eq!(args.get("quiet"), Some(&RawValue::Bool(true)));
    }

    #[test]
    fn test_string_option_without_value_is_empty() {
        let (args, _) = tokenize(&["--time", "--verbose"]);
        assert_eq!(args.get("time"), Some(&RawValue::from("")));
        assert_eq!(args.get("verbose"), Some(&RawValue::Bool(true)));
    }

    #[test]
    fn test_unknown_tokens_reported_in_order() {
        let (_, unknown) = tokenize(&["advanced", "--speed", "4000", "extra"]);
        assert_eq!(
            unknown,
            vec![
                ("advanced".to_string(), None),
                ("--speed".to_string(), Some("speed".to_string())),
                ("extra".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_double_dash_makes_rest_bare() {
        let (args, unknown) = tokenize(&["--", "--time", "x"]);
        assert!(args.get("time").is_none());
        assert_eq!(
            unknown,
            vec![("--time".to_string(), None), ("x".to_string(), None)]
        );
    }

    #[test]
    fn test_builtins_are_known() {
        let (args, unknown) = tokenize(&["--help", "-h", "--generate-help"]);
        assert!(unknown.is_empty());
        assert_eq!(args.get("help"), Some(&RawValue::Bool(true)));
    }

    #[test]
    fn test_callback_error_aborts() {
        let result = DefaultTokenizer.tokenize(&argv(&["--bogus"]), &definition(), &mut |t: UnknownToken<'_>| {
            Err(crate::ValidationError::UnknownOption(t.token.to_string()).into())
        });
        assert!(result.is_err());
    }
}
