//! Startup-time enforcement of required configuration variables.
//!
//! Declare which fields of a configuration type must be present, point the
//! crate at a configuration source, and find out before the first request
//! whether the environment is complete.
//!
//! ```
//! use enforcevars::{EnforcedVariables, MemorySource, TypeDescriptor, Variable, enforce};
//!
//! #[derive(Debug, Default)]
//! struct Settings {
//!     api_key: String,
//!     db_url: String,
//!     port: u16,
//! }
//!
//! impl EnforcedVariables for Settings {
//!     fn describe() -> TypeDescriptor<Self> {
//!         TypeDescriptor::<Self>::builder()
//!             .variable("ApiKey", |s| &mut s.api_key)
//!             .variable_with("db_url", Variable::named("Database__Url"), |s| &mut s.db_url)
//!             .variable_with("port", Variable::named("Port").optional(), |s| &mut s.port)
//!             .build()
//!     }
//! }
//!
//! let source = MemorySource::from_pairs([
//!     ("ApiKey", "secret"),
//!     ("Database:Url", "postgres://db"),
//! ]);
//! let settings: Settings = enforce(&source)?;
//! assert_eq!(settings.db_url, "postgres://db");
//! assert_eq!(settings.port, 0);
//! # Ok::<(), enforcevars::EnforceError>(())
//! ```
//!
//! # Why enforcevars
//!
//! A service that reads `DATABASE__URL` lazily fails on the first query that
//! needs it, minutes or hours after a deploy looked green. Checking every
//! required variable up front turns that into a startup failure with one
//! message listing *all* missing keys, not just the first one tripped over.
//!
//! # Declaring a type
//!
//! A type opts in by implementing [`EnforcedVariables`]. Its descriptor lists
//! the fields that matter:
//!
//! - **`.variable(name, accessor)`** marks a field as a required variable,
//!   looked up under the field name.
//! - **`.variable_with(name, Variable, accessor)`** adds metadata: a different
//!   lookup key ([`Variable::named`]) and/or optionality
//!   ([`Variable::optional`]).
//! - **`.field(name, accessor)`** declares a field without metadata. It is
//!   ignored unless the type sets `.enforce_all(true)`, in which case it is a
//!   required variable under its own name.
//!
//! Field types implement [`Coerce`]; a type without an impl is rejected at
//! compile time.
//!
//! # Keys and sections
//!
//! A key like `Database__Url` is first looked up literally. If that misses,
//! the key is split at the first `__`, the left part names a section and the
//! right part is resolved inside it, recursively. So `Database__Url` is found
//! as a flat `Database__Url` entry, as `Url` under a `[Database]` table, or as
//! a `Database:Url` pair in a [`MemorySource`].
//!
//! # Policy
//!
//! | Function | Missing variables | Registers |
//! |---|---|---|
//! | [`enforce`] | error | no |
//! | [`Registry::enforce_variables`] | error, or skip when `throw_on_missing` is off | yes |
//! | [`Registry::enforce_catalog`] | as above, for every type in a [`Catalog`] | yes |
//! | [`Enforcer::run`] | configurable | configurable |
//!
//! Skipped types surface later through [`Registry::require`] or through
//! [`EnforcedVariablesHealthCheck`].
//!
//! # Errors
//!
//! All failures are [`EnforceError`]. Enable the `rich-errors` feature for
//! [miette](https://docs.rs/miette) diagnostics with codes and help text.
//!
//! # Logging
//!
//! Events are emitted through [tracing](https://docs.rs/tracing): `debug` per
//! field, `warn` for a skipped type, `info` on registration. Install a
//! subscriber in the application to see them.

pub mod error;

mod coerce;
mod descriptor;
mod enforce;
mod health;
mod registry;
mod resolve;
mod source;
mod validate;

#[cfg(test)]
mod fixtures;

pub use coerce::{Coerce, CoerceError, ScalarKind};
pub use descriptor::{
    EnforcedVariables, FieldDescriptor, TypeDescriptor, TypeDescriptorBuilder, Variable,
    descriptor_of,
};
pub use enforce::{Enforcer, Outcome, enforce};
pub use error::{EnforceError, SourceError};
pub use health::{DEFAULT_NAME, EnforcedVariablesHealthCheck, HealthReport, HealthStatus};
pub use registry::{Catalog, CatalogEntry, Registry};
pub use resolve::{DELIMITER, resolve};
pub use source::{ConfigSource, MemorySource, SECTION_SEPARATOR};
pub use validate::{Validation, validate, validate_with};
