//! Startup policy: what to do with a validation result.
//!
//! Validation only reports. This layer decides:
//!
//! | Missing keys | `throw_on_missing` | Result |
//! |---|---|---|
//! | none | either | instance is valid; registered when `register` is on |
//! | some | `true` | [`EnforceError::MissingVariables`] with every missing key |
//! | some | `false` | instance dropped, nothing registered, no error |
//!
//! Under the lenient policy the application still starts; the skipped type
//! shows up later as [`EnforceError::NotRegistered`] on first use, or up front
//! through the [health check](crate::health).
//!
//! An invalid target type is a programming mistake rather than an environment
//! problem, so it is returned as an error under either policy.

use std::sync::Arc;

use tracing::{info, warn};

use crate::descriptor::{EnforcedVariables, descriptor_of};
use crate::error::EnforceError;
use crate::registry::{Catalog, Registry};
use crate::source::ConfigSource;
use crate::validate::{validate, validate_with};

/// Validate `T` and return the populated instance, failing on any missing
/// variable. Nothing is registered.
pub fn enforce<T: EnforcedVariables>(source: &dyn ConfigSource) -> Result<T, EnforceError> {
    validate::<T>(source)?.into_result()
}

/// What [`Enforcer::run`] did with a type.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome<T> {
    /// Valid and stored in the registry.
    Registered(Arc<T>),
    /// Valid, handed back without registering.
    Valid(T),
    /// Required variables were missing; nothing was registered.
    Skipped { missing: Vec<String> },
}

impl<T> Outcome<T> {
    pub fn is_skipped(&self) -> bool {
        matches!(self, Outcome::Skipped { .. })
    }
}

/// Policy settings for enforcing a configuration type.
///
/// Defaults: `throw_on_missing = true`, `register = true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Enforcer {
    throw_on_missing: bool,
    register: bool,
}

impl Default for Enforcer {
    fn default() -> Self {
        Self {
            throw_on_missing: true,
            register: true,
        }
    }
}

impl Enforcer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with [`EnforceError::MissingVariables`] when anything required is
    /// missing. When off, the type is skipped quietly.
    pub fn throw_on_missing(mut self, throw_on_missing: bool) -> Self {
        self.throw_on_missing = throw_on_missing;
        self
    }

    /// Store valid instances in the registry.
    pub fn register(mut self, register: bool) -> Self {
        self.register = register;
        self
    }

    pub fn run<T: EnforcedVariables>(
        &self,
        registry: &mut Registry,
        source: &dyn ConfigSource,
    ) -> Result<Outcome<T>, EnforceError> {
        let descriptor = descriptor_of::<T>();
        let validation = validate_with(&descriptor, source)?;

        if !validation.is_complete() {
            let missing = validation.missing;
            if self.throw_on_missing {
                return Err(EnforceError::MissingVariables(missing));
            }
            warn!(
                type_name = descriptor.type_name(),
                missing = %missing.join(", "),
                "required variables missing, skipping registration"
            );
            return Ok(Outcome::Skipped { missing });
        }

        if !self.register {
            return Ok(Outcome::Valid(validation.instance));
        }

        let shared = registry.register(validation.instance);
        info!(
            type_name = descriptor.type_name(),
            "configuration registered"
        );
        Ok(Outcome::Registered(shared))
    }
}

/// Type-erased entry point used by [`Catalog`] entries.
pub(crate) fn enforce_into<T: EnforcedVariables>(
    registry: &mut Registry,
    source: &dyn ConfigSource,
    throw_on_missing: bool,
) -> Result<(), EnforceError> {
    Enforcer::new()
        .throw_on_missing(throw_on_missing)
        .run::<T>(registry, source)
        .map(|_| ())
}

impl Registry {
    /// Validate `T` and register it when complete.
    ///
    /// With `throw_on_missing` off, an incomplete `T` is left unregistered and
    /// no error is returned.
    pub fn enforce_variables<T: EnforcedVariables>(
        &mut self,
        source: &dyn ConfigSource,
        throw_on_missing: bool,
    ) -> Result<&mut Self, EnforceError> {
        enforce_into::<T>(self, source, throw_on_missing)?;
        Ok(self)
    }

    /// Enforce every type in `catalog`, in catalog order. Under the strict
    /// policy the first incomplete type stops the walk.
    pub fn enforce_catalog(
        &mut self,
        catalog: &Catalog,
        source: &dyn ConfigSource,
        throw_on_missing: bool,
    ) -> Result<&mut Self, EnforceError> {
        for entry in catalog.iter() {
            entry.enforce(self, source, throw_on_missing)?;
        }
        Ok(self)
    }
}
