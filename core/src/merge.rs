//! First-write-wins merging of partial option configs.
//!
//! The same option may be declared from several places over the lifetime of
//! a program. [`merge_configs`] folds a new declaration into the existing one:
//! fields already present are never overwritten, absent fields are filled in,
//! and aliases accumulate as an ordered union.
//!
//! # Example
//!
//! ```
//! use command_options_core::*;
//!
//! let first = OptionConfig::number().with_description("Travel speed");
//! let second = OptionConfig::string()
//!     .with_description("ignored")
//!     .with_default(100)
//!     .with_alias("s");
//!
//! let merged = merge_configs(&first, &second);
//! assert_eq!(merged.option_type(), OptionType::Number);
//! assert_eq!(merged.description.as_deref(), Some("Travel speed"));
//! assert_eq!(merged.default, Some(OptionValue::Number(100.0)));
//! assert_eq!(merged.aliases, vec!["s".to_string()]);
//! ```

use crate::OptionConfig;

/// Merges `incoming` into `existing`, keeping every field `existing` already has.
///
/// The operation is associative and idempotent: `merge(a, a) == a` and
/// `merge(merge(a, b), c) == merge(a, merge(b, c))`.
pub fn merge_configs(existing: &OptionConfig, incoming: &OptionConfig) -> OptionConfig {
    let mut aliases = existing.aliases.clone();
    for alias in &incoming.aliases {
        if !aliases.contains(alias) {
            aliases.push(alias.clone());
        }
    }

    OptionConfig {
        description: existing
            .description
            .clone()
            .or_else(|| incoming.description.clone()),
        kind: existing.kind.or(incoming.kind),
        placeholder: existing
            .placeholder
            .clone()
            .or_else(|| incoming.placeholder.clone()),
        default: existing.default.clone().or_else(|| incoming.default.clone()),
        aliases,
        multiple: existing.multiple.or(incoming.multiple),
        required: existing.required.or(incoming.required),
        allow_empty_string: existing.allow_empty_string.or(incoming.allow_empty_string),
        collect_not_prefixed_args: existing
            .collect_not_prefixed_args
            .or(incoming.collect_not_prefixed_args),
        overload: existing.overload.or(incoming.overload),
        dev: existing.dev.or(incoming.dev),
    }
}

impl OptionConfig {
    /// In-place form of [`merge_configs`].
    pub fn merge_from(&mut self, incoming: &OptionConfig) {
        *self = merge_configs(self, incoming);
    }
}
