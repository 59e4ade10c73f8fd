//! Registration-time validation of option configs.
//!
//! Configs are checked once, when they are declared, so that read sites can
//! rely on the accessors without re-validating.
//!
//! # Examples
//!
//! ```
//! use command_options_core::*;
//!
//! let good = OptionConfig::number().with_default(100);
//! assert!(validate_config("speed", &good).is_empty());
//!
//! // A text default on a numeric option is rejected
//! let bad = OptionConfig::number().with_default("fast");
//! assert!(!validate_config("speed", &bad).is_empty());
//! ```

use thiserror::Error;

use crate::{OptionConfig, OptionType, OptionValue};

/// Problems found in a single option declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigIssue {
    /// Option or alias name is empty or whitespace-only.
    #[error("option name cannot be empty")]
    EmptyName,
    /// Names are declared without dashes (`time`, not `--time`).
    #[error("option name must not start with a dash: {0}")]
    LeadingDash(String),
    /// An alias repeats the option's own name.
    #[error("alias repeats the option name: {0}")]
    AliasShadowsName(String),
    /// The default value cannot be a value of the declared type.
    #[error("default value of {name} does not match type {expected}")]
    DefaultTypeMismatch { name: String, expected: String },
    /// Bare-argument collection only makes sense for options with values.
    #[error("boolean option {0} cannot collect bare arguments")]
    CollectOnBoolean(String),
}

/// Validates one option declaration, returning every issue found.
pub fn validate_config(name: &str, config: &OptionConfig) -> Vec<ConfigIssue> {
    let mut issues = Vec::new();

    for candidate in std::iter::once(name).chain(config.aliases.iter().map(String::as_str)) {
        if candidate.trim().is_empty() {
            issues.push(ConfigIssue::EmptyName);
        } else if candidate.starts_with('-') {
            issues.push(ConfigIssue::LeadingDash(candidate.to_string()));
        }
    }

    if config.aliases.iter().any(|alias| alias == name) {
        issues.push(ConfigIssue::AliasShadowsName(name.to_string()));
    }

    if let Some(default) = &config.default {
        let kind = config.option_type();
        if !default_matches(default, kind, config.is_multiple()) {
            issues.push(ConfigIssue::DefaultTypeMismatch {
                name: name.to_string(),
                expected: kind.label().to_string(),
            });
        }
    }

    if config.collects_bare_args() && config.option_type() == OptionType::Boolean {
        issues.push(ConfigIssue::CollectOnBoolean(name.to_string()));
    }

    issues
}

fn default_matches(default: &OptionValue, kind: OptionType, multiple: bool) -> bool {
    match default {
        OptionValue::List(items) if multiple => items.iter().all(|item| item.matches_type(kind)),
        OptionValue::List(_) => false,
        scalar => scalar.matches_type(kind),
    }
}
