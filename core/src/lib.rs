//! Option configuration model, merging, validation and value coercion.
//!
//! This crate defines the pieces of command-line option handling that need
//! no I/O and no process state:
//!
//! - [`OptionConfig`]: a partial option declaration (type, aliases,
//!   default, required/multiple flags, …) with defaulting accessors.
//! - [`OptionSet`]: an ordered batch of declarations keyed by name.
//! - [`RawValue`] / [`OptionValue`]: tokenizer output and typed values.
//!
//! Merging ([`merge_configs`]) folds repeated declarations of the same
//! option together, first write wins per field.
//!
//! Validation ([`validate_config`]) catches declaration mistakes such as
//! dashed names or defaults that disagree with the declared type.
//!
//! Coercion ([`coerce`]) turns raw values into typed ones and enforces the
//! required and empty-string rules.
//!
//! # Example
//!
//! ```
//! use std::path::Path;
//! use command_options_core::*;
//!
//! let options = OptionSet::new()
//!     .with("speed", OptionConfig::number().with_default(100))
//!     .with("traveler", OptionConfig::string().multiple().required());
//!
//! let env = CoercionEnv { cwd: Path::new("/"), mode: CoercionMode::Execute };
//! let speed = options.get("speed").unwrap();
//! assert!(validate_config("speed", speed).is_empty());
//! assert_eq!(
//!     coerce("speed", Some(&RawValue::from("4000")), speed, None, &env).unwrap(),
//!     Some(OptionValue::Number(4000.0)),
//! );
//! ```

mod coerce;
mod merge;
mod types;
mod validate;

pub use coerce::{CoercionEnv, CoercionError, CoercionMode, coerce, resolve_url};
pub use merge::merge_configs;
pub use types::*;
pub use validate::{ConfigIssue, validate_config};
