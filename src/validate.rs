//! Field-by-field validation of a declared type against a source.
//!
//! For each checked field, in declaration order:
//!
//! 1. Resolve the effective key (override or field name) in the source.
//! 2. Convert the raw text into the field's type and store it on the instance.
//! 3. A miss or a failed conversion leaves the field at its default; if the
//!    field is required its key is recorded as missing.
//!
//! Validation never decides what happens next. It hands back the populated
//! instance and the missing keys, and the policy layer in
//! [`enforce`](crate::enforce) throws, skips, or registers.

use tracing::debug;

use crate::coerce::CoerceError;
use crate::descriptor::{EnforcedVariables, FieldDescriptor, TypeDescriptor, descriptor_of};
use crate::error::EnforceError;
use crate::resolve::resolve;
use crate::source::ConfigSource;

/// Result of one validation call.
#[derive(Debug, Clone, PartialEq)]
pub struct Validation<T> {
    /// A fresh instance with every satisfied field populated.
    pub instance: T,
    /// Bound keys of required fields that were absent or unconvertible, in
    /// declaration order. Empty means success.
    pub missing: Vec<String>,
}

impl<T> Validation<T> {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }

    /// The instance when nothing is missing, otherwise
    /// [`EnforceError::MissingVariables`].
    pub fn into_result(self) -> Result<T, EnforceError> {
        if self.missing.is_empty() {
            Ok(self.instance)
        } else {
            Err(EnforceError::MissingVariables(self.missing))
        }
    }
}

/// How a single field fared. Malformed values are reported to the caller the
/// same way as absent ones; the distinction only reaches the logs.
enum FieldOutcome {
    Satisfied,
    Absent,
    Malformed(CoerceError),
}

/// Validate `T` against `source` using its cached descriptor.
pub fn validate<T: EnforcedVariables>(
    source: &dyn ConfigSource,
) -> Result<Validation<T>, EnforceError> {
    validate_with(&descriptor_of::<T>(), source)
}

/// Validate against an explicit descriptor.
///
/// Fails only with [`EnforceError::InvalidTargetType`], before any key is
/// looked up. Missing variables are data in the returned [`Validation`].
pub fn validate_with<T>(
    descriptor: &TypeDescriptor<T>,
    source: &dyn ConfigSource,
) -> Result<Validation<T>, EnforceError> {
    let mut instance = descriptor.instantiate()?;
    let mut missing = Vec::new();

    for field in descriptor.checked_fields() {
        let key = field.effective_key();
        match bind_field(field, &mut instance, source) {
            FieldOutcome::Satisfied => {
                debug!(type_name = descriptor.type_name(), key, "variable resolved");
                continue;
            }
            FieldOutcome::Absent => {
                debug!(type_name = descriptor.type_name(), key, "variable not found");
            }
            FieldOutcome::Malformed(err) => {
                debug!(
                    type_name = descriptor.type_name(),
                    key,
                    error = %err,
                    "variable could not be converted"
                );
            }
        }

        if field.required() {
            missing.push(key.to_string());
        }
    }

    Ok(Validation { instance, missing })
}

fn bind_field<T>(
    field: &FieldDescriptor<T>,
    instance: &mut T,
    source: &dyn ConfigSource,
) -> FieldOutcome {
    let Some(raw) = resolve(source, field.effective_key()) else {
        return FieldOutcome::Absent;
    };
    match field.assign(instance, &raw) {
        Ok(()) => FieldOutcome::Satisfied,
        Err(err) => FieldOutcome::Malformed(err),
    }
}
