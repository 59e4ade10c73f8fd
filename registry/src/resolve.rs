//! Resolution of a batch of declarations against argv.

use command_options_core::{
    CoercionEnv, OptionConfig, OptionSet, OptionValue, RawValue, coerce,
};
use indexmap::IndexMap;
use serde::Serialize;
use tracing::debug;
use url::Url;

use crate::context::ContextId;
use crate::error::{Result, ValidationError};
use crate::session::Session;
use crate::tokenizer::{ParserDefinition, UnknownToken};

/// Typed values of one resolve call, in declaration order.
///
/// Options without a value (and without a default) are absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct ResolvedOptions {
    values: IndexMap<String, OptionValue>,
}

impl ResolvedOptions {
    pub fn get(&self, name: &str) -> Option<&OptionValue> {
        self.values.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn str(&self, name: &str) -> Option<&str> {
        self.get(name)?.as_str()
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name)?.as_number()
    }

    /// Switch state; absent switches are off.
    pub fn flag(&self, name: &str) -> bool {
        self.get(name).and_then(OptionValue::as_bool).unwrap_or(false)
    }

    pub fn url(&self, name: &str) -> Option<&Url> {
        self.get(name)?.as_url()
    }

    pub fn list(&self, name: &str) -> Option<&[OptionValue]> {
        self.get(name)?.as_list()
    }

    /// String elements of a `multiple` option; empty when absent.
    pub fn strings(&self, name: &str) -> Vec<&str> {
        self.list(name)
            .map(|items| items.iter().filter_map(OptionValue::as_str).collect())
            .unwrap_or_default()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionValue)> {
        self.values.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Progress of the unknown-token callback.
#[derive(Debug, Default)]
struct ResolveState {
    valid: bool,
    seen_first: bool,
    /// A sub-command token was seen while resolving top-level options.
    in_command: bool,
    collected: Vec<String>,
}

impl Session {
    /// Runs the tokenizer over argv for `options` and coerces the results.
    ///
    /// With a non-empty `command`, the first unknown token must be that
    /// command's name; otherwise the command was not invoked and `Ok(None)`
    /// is returned without running any value checks. For top-level options
    /// everything after the first registered command name is left to that
    /// command.
    ///
    /// Bare tokens go to the option that collects bare arguments. Other
    /// unknown tokens are an error when `strict` is set. Validation errors
    /// are only reported in [`Mode::Run`](crate::Mode::Run).
    pub fn resolve(
        &self,
        id: ContextId,
        command: &str,
        options: &OptionSet,
        strict: bool,
    ) -> Result<Option<ResolvedOptions>> {
        let definition = ParserDefinition::from_options(options).with_builtins();
        let expected = (!command.is_empty()).then_some(command);
        let collector = options.iter().find(|(_, c)| c.collects_bare_args());
        let commands = self.command_names();
        let collecting = self.mode.is_collecting();

        let mut state = ResolveState {
            valid: true,
            ..ResolveState::default()
        };

        let args = {
            let mut on_unknown = |token: UnknownToken<'_>| -> Result<()> {
                if state.in_command || !state.valid {
                    return Ok(());
                }

                if !state.seen_first {
                    state.seen_first = true;
                    if let Some(expected) = expected {
                        state.valid = token.key.is_none() && token.token == expected;
                        return Ok(());
                    }
                    if token.key.is_none() && commands.contains(&token.token) {
                        state.in_command = true;
                        return Ok(());
                    }
                }

                if let (None, Some((name, config))) = (token.key, collector) {
                    return collect_bare(&mut state.collected, name, config, token.token, collecting);
                }

                if strict && !collecting {
                    return Err(ValidationError::UnknownOption(token.token.to_string()).into());
                }
                Ok(())
            };
            self.tokenizer
                .tokenize(&self.argv, &definition, &mut on_unknown)?
        };

        if !state.valid || (expected.is_some() && !state.seen_first) {
            debug!(context = self.get(id).name(), command, "Command not invoked");
            return Ok(None);
        }

        let env = CoercionEnv {
            cwd: &self.cwd,
            mode: self.mode.coercion_mode(),
        };
        let mut resolved = ResolvedOptions::default();
        for (name, config) in options.iter() {
            let raw = match collector {
                Some((collector, _)) if collector == name && !state.collected.is_empty() => {
                    let explicit = args.was_supplied(name).then(|| args.get(name)).flatten();
                    Some(
                        single_value_conflict(name, config, explicit, &state.collected, collecting)?
                            .unwrap_or_else(|| with_collected(explicit, &state.collected)),
                    )
                }
                _ => args.get(name).cloned(),
            };
            let supplied_as = args.supplied_as.get(name).map(String::as_str);
            if let Some(value) = coerce(name, raw.as_ref(), config, supplied_as, &env)? {
                resolved.values.insert(name.to_string(), value);
            }
        }

        debug!(
            context = self.get(id).name(),
            command,
            resolved = resolved.len(),
            collected = state.collected.len(),
            "Resolved options"
        );
        Ok(Some(resolved))
    }
}

fn collect_bare(
    collected: &mut Vec<String>,
    name: &str,
    config: &OptionConfig,
    token: &str,
    collecting: bool,
) -> Result<()> {
    if !config.is_multiple() && !collected.is_empty() {
        if collecting {
            return Ok(());
        }
        return Err(ValidationError::TooManyBareArguments {
            option: command_options_core::display_form(name),
            value: token.to_string(),
        }
        .into());
    }
    collected.push(token.to_string());
    Ok(())
}

/// A single-valued collector given both `--name value` and a bare token.
///
/// Fatal in normal runs; while collecting metadata the explicit value wins.
fn single_value_conflict(
    name: &str,
    config: &OptionConfig,
    explicit: Option<&RawValue>,
    collected: &[String],
    collecting: bool,
) -> Result<Option<RawValue>> {
    let (Some(explicit), Some(first)) = (explicit, collected.first()) else {
        return Ok(None);
    };
    if config.is_multiple() {
        return Ok(None);
    }
    if collecting {
        return Ok(Some(explicit.clone()));
    }
    Err(ValidationError::TooManyBareArguments {
        option: command_options_core::display_form(name),
        value: first.clone(),
    }
    .into())
}

/// Appends bare tokens after any values supplied with the option itself.
///
/// A default is replaced, not extended, by bare tokens.
fn with_collected(explicit: Option<&RawValue>, collected: &[String]) -> RawValue {
    let mut items: Vec<RawValue> = explicit
        .map(|raw| raw.elements().into_iter().cloned().collect())
        .unwrap_or_default();
    items.extend(collected.iter().map(|token| RawValue::from(token.as_str())));
    RawValue::List(items)
}
