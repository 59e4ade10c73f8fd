//! Option configuration and value type definitions.
//!
//! This module defines the data model shared by every declaration site:
//! the partial [`OptionConfig`] that is merged across repeated declarations,
//! the raw values produced by a tokenizer ([`RawValue`]) and the typed values
//! produced by coercion ([`OptionValue`]).

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use url::Url;

/// Declared value type of an option.
///
/// # Examples
///
/// ```
/// use command_options_core::OptionType;
///
/// assert_eq!(OptionType::default(), OptionType::String);
/// assert_eq!(OptionType::Number.label(), "number");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OptionType {
    /// Free-form text (the default).
    #[default]
    String,
    /// Switch without a value.
    Boolean,
    /// Digits and dots, parsed as a floating point number.
    Number,
    /// Path or URL, resolved against the working directory.
    #[serde(rename = "URL")]
    Url,
}

impl OptionType {
    /// Lowercase label used in diagnostics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Boolean => "boolean",
            Self::Number => "number",
            Self::Url => "URL",
        }
    }

    /// Whether the tokenizer should treat the option as taking a value.
    pub fn takes_value(&self) -> bool {
        !matches!(self, Self::Boolean)
    }
}

/// Raw value as returned by the tokenizer, before coercion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    /// Text value (`--name value` or `--name=value`).
    Str(String),
    /// Boolean switch (`--flag`, `--no-flag`).
    Bool(bool),
    /// Repeated occurrences of a collected option, in argv order.
    List(Vec<RawValue>),
}

impl RawValue {
    /// Returns the elements of a list, or a one-element slice for scalars.
    pub fn elements(&self) -> Vec<&RawValue> {
        match self {
            Self::List(items) => items.iter().collect(),
            other => vec![other],
        }
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// Typed option value produced by coercion.
///
/// # Examples
///
/// ```
/// use command_options_core::OptionValue;
///
/// let speed = OptionValue::from(100);
/// assert_eq!(speed.as_number(), Some(100.0));
/// assert_eq!(speed.to_string(), "100");
///
/// let travelers = OptionValue::from(vec!["A", "B"]);
/// assert_eq!(travelers.to_string(), "A, B");
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OptionValue {
    Bool(bool),
    Number(f64),
    /// Deserialized text always lands here; URL options accept it.
    String(String),
    Url(Url),
    List(Vec<OptionValue>),
}

impl OptionValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_url(&self) -> Option<&Url> {
        match self {
            Self::Url(u) => Some(u),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[OptionValue]> {
        match self {
            Self::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns `true` when the value can stand in for an option of `kind`.
    ///
    /// Text is accepted for URL options since it is resolved later.
    pub fn matches_type(&self, kind: OptionType) -> bool {
        matches!(
            (self, kind),
            (Self::String(_), OptionType::String)
                | (Self::String(_), OptionType::Url)
                | (Self::Url(_), OptionType::Url)
                | (Self::Bool(_), OptionType::Boolean)
                | (Self::Number(_), OptionType::Number)
        )
    }

    /// Converts the value back into the shape a tokenizer would produce.
    pub fn to_raw(&self) -> RawValue {
        match self {
            Self::Bool(b) => RawValue::Bool(*b),
            Self::List(items) => RawValue::List(items.iter().map(Self::to_raw).collect()),
            other => RawValue::Str(other.to_string()),
        }
    }
}

impl fmt::Display for OptionValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{}", *n as i64),
            Self::Number(n) => write!(f, "{n}"),
            Self::Url(u) => f.write_str(u.as_str()),
            Self::String(s) => f.write_str(s),
            Self::List(items) => {
                let parts = items.iter().map(ToString::to_string).collect::<Vec<_>>();
                f.write_str(&parts.join(", "))
            }
        }
    }
}

impl From<&str> for OptionValue {
    fn from(value: &str) -> Self {
        Self::String(value.to_string())
    }
}

impl From<String> for OptionValue {
    fn from(value: String) -> Self {
        Self::String(value)
    }
}

impl From<bool> for OptionValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<f64> for OptionValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<i32> for OptionValue {
    fn from(value: i32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<Url> for OptionValue {
    fn from(value: Url) -> Self {
        Self::Url(value)
    }
}

impl<T: Into<OptionValue>> From<Vec<T>> for OptionValue {
    fn from(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(Into::into).collect())
    }
}

/// Returns the command-line form of an option or alias name.
///
/// Single-character names use one dash, everything else two.
///
/// ```
/// use command_options_core::display_form;
///
/// assert_eq!(display_form("t"), "-t");
/// assert_eq!(display_form("time"), "--time");
/// ```
pub fn display_form(name: &str) -> String {
    if name.chars().count() == 1 {
        format!("-{name}")
    } else {
        format!("--{name}")
    }
}

/// Strips the leading dashes of a display form (`--time` → `time`).
pub fn strip_dashes(form: &str) -> &str {
    form.trim_start_matches('-')
}

/// Configuration of one named option.
///
/// Every field is optional so that repeated declarations of the same option
/// can be merged field by field (see [`merge_configs`](crate::merge_configs)).
/// Accessors such as [`option_type`](OptionConfig::option_type) supply the
/// defaults for absent fields.
///
/// # Examples
///
/// ```
/// use command_options_core::{OptionConfig, OptionType};
///
/// let time = OptionConfig::string()
///     .with_description("When to travel to")
///     .with_alias("t")
///     .required();
///
/// assert_eq!(time.option_type(), OptionType::String);
/// assert!(time.is_required());
/// assert!(time.allows_empty_string());
/// assert_eq!(time.display_forms("time"), vec!["-t", "--time"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<OptionType>,
    /// Display-only value name (`--time TIME`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placeholder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<OptionValue>,
    /// Alternate names, in declaration order without duplicates.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiple: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_empty_string: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collect_not_prefixed_args: Option<bool>,
    /// Suppresses duplicate-registration warnings and scope locks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub overload: Option<bool>,
    /// Development-only option, never shown in rendered help.
    #[serde(default, rename = "_dev", skip_serializing_if = "Option::is_none")]
    pub dev: Option<bool>,
}

impl OptionConfig {
    /// Creates an empty partial config (every field absent).
    pub fn new() -> Self {
        Self::default()
    }

    pub fn of_type(kind: OptionType) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn string() -> Self {
        Self::of_type(OptionType::String)
    }

    pub fn boolean() -> Self {
        Self::of_type(OptionType::Boolean)
    }

    pub fn number() -> Self {
        Self::of_type(OptionType::Number)
    }

    pub fn url() -> Self {
        Self::of_type(OptionType::Url)
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    pub fn with_placeholder(mut self, placeholder: &str) -> Self {
        self.placeholder = Some(placeholder.to_string());
        self
    }

    pub fn with_default(mut self, value: impl Into<OptionValue>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Adds an alias, ignoring repeats.
    pub fn with_alias(mut self, alias: &str) -> Self {
        if !self.aliases.iter().any(|a| a == alias) {
            self.aliases.push(alias.to_string());
        }
        self
    }

    /// Marks as collecting repeated occurrences into a list.
    pub fn multiple(mut self) -> Self {
        self.multiple = Some(true);
        self
    }

    pub fn required(mut self) -> Self {
        self.required = Some(true);
        self
    }

    pub fn optional(mut self) -> Self {
        self.required = Some(false);
        self
    }

    pub fn disallow_empty_string(mut self) -> Self {
        self.allow_empty_string = Some(false);
        self
    }

    /// Routes bare (not prefixed) arguments into this option.
    pub fn collect_bare_args(mut self) -> Self {
        self.collect_not_prefixed_args = Some(true);
        self
    }

    pub fn overload(mut self) -> Self {
        self.overload = Some(true);
        self
    }

    pub fn dev(mut self) -> Self {
        self.dev = Some(true);
        self
    }

    /// Declared type, defaulting to [`OptionType::String`].
    pub fn option_type(&self) -> OptionType {
        self.kind.unwrap_or_default()
    }

    pub fn is_multiple(&self) -> bool {
        self.multiple.unwrap_or(false)
    }

    pub fn is_required(&self) -> bool {
        self.required.unwrap_or(false)
    }

    /// Whether an empty string is an acceptable value (default `true`).
    pub fn allows_empty_string(&self) -> bool {
        self.allow_empty_string.unwrap_or(true)
    }

    pub fn collects_bare_args(&self) -> bool {
        self.collect_not_prefixed_args.unwrap_or(false)
    }

    pub fn is_overload(&self) -> bool {
        self.overload.unwrap_or(false)
    }

    pub fn is_dev(&self) -> bool {
        self.dev.unwrap_or(false)
    }

    /// Returns `true` when `candidate` is the name or one of the aliases.
    pub fn answers_to(&self, name: &str, candidate: &str) -> bool {
        name == candidate || self.aliases.iter().any(|a| a == candidate)
    }

    /// All command-line forms: aliases first, the primary name last.
    pub fn display_forms(&self, name: &str) -> Vec<String> {
        self.aliases
            .iter()
            .map(|a| display_form(a))
            .chain(std::iter::once(display_form(name)))
            .collect()
    }
}

/// Ordered set of option declarations, keyed by primary name.
///
/// # Examples
///
/// ```
/// use command_options_core::{OptionConfig, OptionSet};
///
/// let options = OptionSet::new()
///     .with("time", OptionConfig::string().required())
///     .with("location", OptionConfig::string().with_default("X"));
///
/// assert_eq!(options.len(), 2);
/// assert_eq!(options.names().collect::<Vec<_>>(), vec!["time", "location"]);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OptionSet {
    options: IndexMap<String, OptionConfig>,
}

impl OptionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an option, replacing a previous entry with the same name.
    pub fn with(mut self, name: &str, config: OptionConfig) -> Self {
        self.insert(name, config);
        self
    }

    pub fn insert(&mut self, name: &str, config: OptionConfig) {
        self.options.insert(name.to_string(), config);
    }

    pub fn get(&self, name: &str) -> Option<&OptionConfig> {
        self.options.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.options.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &OptionConfig)> {
        self.options.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// Finds the primary name an option or alias name refers to.
    pub fn canonical_name(&self, candidate: &str) -> Option<&str> {
        self.iter()
            .find(|(name, config)| config.answers_to(name, candidate))
            .map(|(name, _)| name)
    }
}

impl<'a> IntoIterator for &'a OptionSet {
    type Item = (&'a String, &'a OptionConfig);
    type IntoIter = indexmap::map::Iter<'a, String, OptionConfig>;

    fn into_iter(self) -> Self::IntoIter {
        self.options.iter()
    }
}

impl FromIterator<(String, OptionConfig)> for OptionSet {
    fn from_iter<I: IntoIterator<Item = (String, OptionConfig)>>(iter: I) -> Self {
        Self {
            options: iter.into_iter().collect(),
        }
    }
}
