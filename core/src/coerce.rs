//! Coercion of raw tokenizer values into typed option values.
//!
//! [`coerce`] applies the declared [`OptionType`], the `multiple` policy and
//! the required/empty-string checks of an [`OptionConfig`]. The checks only
//! run in [`CoercionMode::Execute`]; while help metadata is being collected a
//! missing or malformed value is dropped instead of failing.

use std::path::Path;
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;
use url::Url;

use crate::{OptionConfig, OptionType, OptionValue, RawValue, display_form};

static NUMBER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[\d.]+$").expect("static regex must compile"));

/// Validation failures caused by the values a user supplied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoercionError {
    #[error("invalid number for {option}: {value:?}")]
    InvalidNumber { option: String, value: String },
    #[error("invalid boolean for {option}: {value:?}")]
    InvalidBoolean { option: String, value: String },
    #[error("cannot resolve {value:?} for {option} as a path or URL")]
    InvalidUrl { option: String, value: String },
    #[error("{option} cannot be empty")]
    EmptyString { option: String },
    #[error("missing required option {}{}", .forms.join(", "), parenthesized(.description))]
    MissingRequired {
        forms: Vec<String>,
        description: Option<String>,
    },
}

fn parenthesized(description: &Option<String>) -> String {
    description
        .as_ref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

/// Whether validation failures abort or are tolerated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CoercionMode {
    /// Normal run: every check applies.
    #[default]
    Execute,
    /// Help display or generation: values are best effort, nothing fails.
    CollectMetadata,
}

/// Ambient inputs for coercion.
#[derive(Debug, Clone, Copy)]
pub struct CoercionEnv<'a> {
    /// Base for relative paths in URL options.
    pub cwd: &'a Path,
    pub mode: CoercionMode,
}

/// Coerces the raw value of option `name`.
///
/// `supplied_as` is the form the user typed (`-t`), used in error messages;
/// the primary display form is used when it is unknown. Returns `Ok(None)`
/// when the option has no value and none is required.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use command_options_core::*;
///
/// let env = CoercionEnv { cwd: Path::new("/tmp"), mode: CoercionMode::Execute };
/// let speed = OptionConfig::number();
///
/// let value = coerce("speed", Some(&RawValue::from("42.5")), &speed, None, &env).unwrap();
/// assert_eq!(value, Some(OptionValue::Number(42.5)));
///
/// assert!(coerce("speed", Some(&RawValue::from("abc")), &speed, None, &env).is_err());
/// assert_eq!(coerce("speed", None, &speed, None, &env).unwrap(), None);
/// ```
pub fn coerce(
    name: &str,
    raw: Option<&RawValue>,
    config: &OptionConfig,
    supplied_as: Option<&str>,
    env: &CoercionEnv<'_>,
) -> Result<Option<OptionValue>, CoercionError> {
    let option = supplied_as
        .map(String::from)
        .unwrap_or_else(|| display_form(name));

    match coerce_unchecked(&option, raw, config, env) {
        Ok(value) if env.mode == CoercionMode::Execute => {
            check_presence(name, &option, value.as_ref(), config)?;
            Ok(value)
        }
        Ok(value) => Ok(value),
        Err(err) if env.mode == CoercionMode::Execute => Err(err),
        Err(_) => Ok(None),
    }
}

fn coerce_unchecked(
    option: &str,
    raw: Option<&RawValue>,
    config: &OptionConfig,
    env: &CoercionEnv<'_>,
) -> Result<Option<OptionValue>, CoercionError> {
    let kind = config.option_type();

    if config.is_multiple() {
        let elements = raw.map(RawValue::elements).unwrap_or_default();
        let values = elements
            .into_iter()
            .map(|element| coerce_scalar(option, element, kind, env.cwd))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Some(OptionValue::List(values)));
    }

    // Repeated occurrences of a single-valued option keep the last one.
    let last = raw.and_then(|r| r.elements().last().copied());
    last.map(|element| coerce_scalar(option, element, kind, env.cwd))
        .transpose()
}

fn check_presence(
    name: &str,
    option: &str,
    value: Option<&OptionValue>,
    config: &OptionConfig,
) -> Result<(), CoercionError> {
    let present = match value {
        None => false,
        Some(OptionValue::List(items)) => !items.is_empty(),
        Some(_) => true,
    };

    if config.is_required() && !present {
        return Err(CoercionError::MissingRequired {
            forms: config.display_forms(name),
            description: config.description.clone(),
        });
    }

    if config.option_type() == OptionType::String && !config.allows_empty_string() {
        let empty = match value {
            Some(OptionValue::String(s)) => s.is_empty(),
            _ => !present,
        };
        if empty {
            return Err(CoercionError::EmptyString {
                option: option.to_string(),
            });
        }
    }

    Ok(())
}

fn coerce_scalar(
    option: &str,
    raw: &RawValue,
    kind: OptionType,
    cwd: &Path,
) -> Result<OptionValue, CoercionError> {
    let text = match raw {
        RawValue::Str(s) => s.as_str(),
        RawValue::Bool(b) => {
            return match kind {
                OptionType::Boolean => Ok(OptionValue::Bool(*b)),
                OptionType::String => Ok(OptionValue::String(b.to_string())),
                OptionType::Number => Err(CoercionError::InvalidNumber {
                    option: option.to_string(),
                    value: b.to_string(),
                }),
                OptionType::Url => Err(CoercionError::InvalidUrl {
                    option: option.to_string(),
                    value: b.to_string(),
                }),
            };
        }
        RawValue::List(items) => {
            return match items.last() {
                Some(last) => coerce_scalar(option, last, kind, cwd),
                None => Err(CoercionError::EmptyString {
                    option: option.to_string(),
                }),
            };
        }
    };

    match kind {
        OptionType::String => Ok(OptionValue::String(text.to_string())),
        OptionType::Boolean => match text {
            "" | "true" => Ok(OptionValue::Bool(true)),
            "false" => Ok(OptionValue::Bool(false)),
            _ => Err(CoercionError::InvalidBoolean {
                option: option.to_string(),
                value: text.to_string(),
            }),
        },
        OptionType::Number => parse_number(text).ok_or_else(|| CoercionError::InvalidNumber {
            option: option.to_string(),
            value: text.to_string(),
        }),
        OptionType::Url => resolve_url(text, cwd).ok_or_else(|| CoercionError::InvalidUrl {
            option: option.to_string(),
            value: text.to_string(),
        }),
    }
}

fn parse_number(text: &str) -> Option<OptionValue> {
    if !NUMBER_PATTERN.is_match(text) {
        return None;
    }
    text.parse::<f64>().ok().map(OptionValue::Number)
}

/// Resolves `text` against `cwd`, keeping values that already are absolute URLs.
pub fn resolve_url(text: &str, cwd: &Path) -> Option<OptionValue> {
    // A one-letter scheme is a Windows drive letter, not a URL.
    if let Ok(url) = Url::parse(text) {
        if url.scheme().len() > 1 {
            return Some(OptionValue::Url(url));
        }
    }
    let base = Url::from_directory_path(cwd).ok()?;
    base.join(text).ok().map(OptionValue::Url)
}
