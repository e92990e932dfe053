//! Declared shape of a configuration type.
//!
//! A type opts into validation by implementing [`EnforcedVariables`] and
//! describing its fields with [`TypeDescriptor::builder`]:
//!
//! ```
//! use enforcevars::{EnforcedVariables, TypeDescriptor, Variable};
//!
//! #[derive(Default)]
//! struct Database {
//!     url: String,
//!     pool_size: u32,
//!     label: String,
//! }
//!
//! impl EnforcedVariables for Database {
//!     fn describe() -> TypeDescriptor<Self> {
//!         TypeDescriptor::<Self>::builder()
//!             .variable_with("url", Variable::named("Database__Url"), |d| &mut d.url)
//!             .variable_with("pool_size", Variable::named("Database__PoolSize").optional(), |d| {
//!                 &mut d.pool_size
//!             })
//!             .field("label", |d| &mut d.label)
//!             .build()
//!     }
//! }
//! ```
//!
//! `variable*` marks a field with metadata; `field` declares it without any,
//! so it is only checked when the type enforces all fields.
//!
//! Descriptors are immutable once built. [`descriptor_of`] builds each one on
//! first use and hands out the same snapshot for the rest of the process.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock};

use parking_lot::RwLock;

use crate::coerce::{Coerce, CoerceError, ScalarKind};
use crate::error::EnforceError;

/// A configuration type whose fields are checked before startup completes.
pub trait EnforcedVariables: Sized + Send + Sync + 'static {
    fn describe() -> TypeDescriptor<Self>;
}

type Setter<T> = Box<dyn Fn(&mut T, &str) -> Result<(), CoerceError> + Send + Sync>;
type Constructor<T> = Box<dyn Fn() -> Result<T, String> + Send + Sync>;

/// Per-field metadata: an optional bound-key override and the required flag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    key: Option<String>,
    required: bool,
}

impl Variable {
    /// Required, looked up under the field's own name.
    pub fn new() -> Self {
        Self {
            key: None,
            required: true,
        }
    }

    /// Required, looked up under `key` instead of the field name.
    pub fn named(key: impl Into<String>) -> Self {
        Self {
            key: Some(key.into()),
            required: true,
        }
    }

    pub fn required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Shorthand for `.required(false)`.
    pub fn optional(self) -> Self {
        self.required(false)
    }
}

impl Default for Variable {
    fn default() -> Self {
        Self::new()
    }
}

/// One declared field of a configuration type.
pub struct FieldDescriptor<T> {
    name: String,
    bound_key: Option<String>,
    required: bool,
    marked: bool,
    native_type: ScalarKind,
    setter: Setter<T>,
}

impl<T> FieldDescriptor<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn bound_key(&self) -> Option<&str> {
        self.bound_key.as_deref()
    }

    /// The lookup key: the override when present, else the field name.
    pub fn effective_key(&self) -> &str {
        self.bound_key.as_deref().unwrap_or(&self.name)
    }

    pub fn required(&self) -> bool {
        self.required
    }

    /// Whether the field carries explicit metadata.
    pub fn is_marked(&self) -> bool {
        self.marked
    }

    pub fn native_type(&self) -> ScalarKind {
        self.native_type
    }

    /// Fields without metadata are only read when the type enforces all fields.
    pub fn is_checked(&self, enforce_all: bool) -> bool {
        self.marked || enforce_all
    }

    /// Convert `raw` and store it on `instance`. On failure `instance` is untouched.
    pub fn assign(&self, instance: &mut T, raw: &str) -> Result<(), CoerceError> {
        (self.setter)(instance, raw)
    }
}

impl<T> fmt::Debug for FieldDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldDescriptor")
            .field("name", &self.name)
            .field("bound_key", &self.bound_key)
            .field("required", &self.required)
            .field("marked", &self.marked)
            .field("native_type", &self.native_type)
            .finish_non_exhaustive()
    }
}

/// The full declared shape of a configuration type.
pub struct TypeDescriptor<T> {
    type_name: String,
    enforce_all: bool,
    fields: Vec<FieldDescriptor<T>>,
    constructor: Constructor<T>,
}

impl<T: Default + 'static> TypeDescriptor<T> {
    /// Start describing a type constructed with `T::default()`.
    pub fn builder() -> TypeDescriptorBuilder<T> {
        TypeDescriptorBuilder::new(Box::new(|| Ok(T::default())))
    }
}

impl<T: 'static> TypeDescriptor<T> {
    /// Start describing a type with a fallible zero-argument constructor.
    /// A constructor error surfaces as [`EnforceError::InvalidTargetType`].
    pub fn builder_with<F>(constructor: F) -> TypeDescriptorBuilder<T>
    where
        F: Fn() -> Result<T, String> + Send + Sync + 'static,
    {
        TypeDescriptorBuilder::new(Box::new(constructor))
    }
}

impl<T> TypeDescriptor<T> {
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn enforce_all(&self) -> bool {
        self.enforce_all
    }

    /// Fields in declaration order.
    pub fn fields(&self) -> &[FieldDescriptor<T>] {
        &self.fields
    }

    /// Fields validation will read, in declaration order.
    pub fn checked_fields(&self) -> impl Iterator<Item = &FieldDescriptor<T>> {
        self.fields
            .iter()
            .filter(move |field| field.is_checked(self.enforce_all))
    }

    /// Construct a fresh default instance.
    pub fn instantiate(&self) -> Result<T, EnforceError> {
        (self.constructor)().map_err(|reason| EnforceError::InvalidTargetType {
            type_name: self.type_name.clone(),
            reason,
        })
    }
}

impl<T> fmt::Debug for TypeDescriptor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeDescriptor")
            .field("type_name", &self.type_name)
            .field("enforce_all", &self.enforce_all)
            .field("fields", &self.fields)
            .finish_non_exhaustive()
    }
}

/// Builder for [`TypeDescriptor`]. Fields keep the order they are declared in.
pub struct TypeDescriptorBuilder<T> {
    type_name: String,
    enforce_all: bool,
    fields: Vec<FieldDescriptor<T>>,
    constructor: Constructor<T>,
}

impl<T: 'static> TypeDescriptorBuilder<T> {
    fn new(constructor: Constructor<T>) -> Self {
        Self {
            type_name: short_type_name::<T>().to_string(),
            enforce_all: false,
            fields: Vec::new(),
            constructor,
        }
    }

    /// Override the name used in diagnostics and health reports.
    pub fn type_name(mut self, name: &str) -> Self {
        self.type_name = name.to_string();
        self
    }

    /// Check every declared field, marked or not (default: `false`).
    pub fn enforce_all(mut self, enforce_all: bool) -> Self {
        self.enforce_all = enforce_all;
        self
    }

    /// Declare a field marked with default metadata: required, own name.
    pub fn variable<V, A>(self, name: &str, accessor: A) -> Self
    where
        V: Coerce + 'static,
        A: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        self.push(name, Some(Variable::new()), accessor)
    }

    /// Declare a field marked with explicit metadata.
    pub fn variable_with<V, A>(self, name: &str, variable: Variable, accessor: A) -> Self
    where
        V: Coerce + 'static,
        A: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        self.push(name, Some(variable), accessor)
    }

    /// Declare a field without metadata.
    pub fn field<V, A>(self, name: &str, accessor: A) -> Self
    where
        V: Coerce + 'static,
        A: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        self.push(name, None, accessor)
    }

    fn push<V, A>(mut self, name: &str, variable: Option<Variable>, accessor: A) -> Self
    where
        V: Coerce + 'static,
        A: Fn(&mut T) -> &mut V + Send + Sync + 'static,
    {
        let marked = variable.is_some();
        let Variable { key, required } = variable.unwrap_or_default();
        self.fields.push(FieldDescriptor {
            name: name.to_string(),
            bound_key: key,
            required,
            marked,
            native_type: V::kind(),
            setter: Box::new(move |instance: &mut T, raw: &str| -> Result<(), CoerceError> {
                *accessor(instance) = V::coerce(raw)?;
                Ok(())
            }),
        });
        self
    }

    pub fn build(self) -> TypeDescriptor<T> {
        TypeDescriptor {
            type_name: self.type_name,
            enforce_all: self.enforce_all,
            fields: self.fields,
            constructor: self.constructor,
        }
    }
}

/// `my_app::settings::Database` -> `Database`, keeping generic arguments intact.
pub(crate) fn short_type_name<T: ?Sized>() -> &'static str {
    let full = std::any::type_name::<T>();
    let path_end = full.find('<').unwrap_or(full.len());
    let start = full[..path_end].rfind("::").map_or(0, |i| i + 2);
    &full[start..]
}

type DescriptorCache = RwLock<HashMap<TypeId, Arc<dyn Any + Send + Sync>>>;

static DESCRIPTORS: OnceLock<DescriptorCache> = OnceLock::new();

/// The descriptor for `T`, built on first use and shared afterwards.
pub fn descriptor_of<T: EnforcedVariables>() -> Arc<TypeDescriptor<T>> {
    let cache = DESCRIPTORS.get_or_init(Default::default);
    let id = TypeId::of::<T>();

    if let Some(hit) = cache.read().get(&id).cloned()
        && let Ok(descriptor) = hit.downcast::<TypeDescriptor<T>>()
    {
        return descriptor;
    }

    // Built outside the lock: describe() may ask for other descriptors.
    let built: Arc<dyn Any + Send + Sync> = Arc::new(T::describe());
    let entry = cache.write().entry(id).or_insert(built).clone();
    entry
        .downcast::<TypeDescriptor<T>>()
        .unwrap_or_else(|_| Arc::new(T::describe()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::test::{TestModel, TestModel2};

    #[test]
    fn fields_keep_declaration_order() {
        let descriptor = TestModel::describe();
        let names: Vec<&str> = descriptor.fields().iter().map(|f| f.name()).collect();
        assert_eq!(
            names,
            vec![
                "UnNamedVariable",
                "NamedVariable",
                "NotRequiredUnNamedVariable",
                "NotRequiredNamedVariable",
                "VariableWithinSection",
                "VariableWithinDeepSection",
                "IntegerValue",
                "IgnoredProperty",
            ]
        );
    }

    #[test]
    fn effective_key_prefers_override() {
        let descriptor = TestModel::describe();
        let named = &descriptor.fields()[1];
        assert_eq!(named.bound_key(), Some("DifferentName1"));
        assert_eq!(named.effective_key(), "DifferentName1");
        let unnamed = &descriptor.fields()[0];
        assert_eq!(unnamed.bound_key(), None);
        assert_eq!(unnamed.effective_key(), "UnNamedVariable");
    }

    #[test]
    fn variable_defaults_to_required() {
        assert_eq!(Variable::default(), Variable::new());
        assert!(Variable::new().required);
        assert!(!Variable::named("X").optional().required);
    }

    #[test]
    fn unmarked_field_only_checked_under_enforce_all() {
        let descriptor = TestModel::describe();
        let ignored = descriptor.fields().last().unwrap();
        assert!(!ignored.is_marked());
        assert!(!ignored.is_checked(false));
        assert!(ignored.is_checked(true));
        assert_eq!(descriptor.checked_fields().count(), 7);
    }

    #[test]
    fn enforce_all_checks_every_field() {
        let descriptor = TestModel2::describe();
        assert!(descriptor.enforce_all());
        assert_eq!(
            descriptor.checked_fields().count(),
            descriptor.fields().len()
        );
    }

    #[test]
    fn native_type_from_field_type() {
        let descriptor = TestModel::describe();
        let integer = descriptor
            .fields()
            .iter()
            .find(|f| f.name() == "IntegerValue")
            .unwrap();
        assert_eq!(integer.native_type(), ScalarKind::Integer);
        assert_eq!(descriptor.fields()[0].native_type(), ScalarKind::String);
    }

    #[test]
    fn assign_leaves_instance_untouched_on_failure() {
        let descriptor = TestModel::describe();
        let integer = descriptor
            .fields()
            .iter()
            .find(|f| f.name() == "IntegerValue")
            .unwrap();
        let mut model = TestModel::default();
        assert!(integer.assign(&mut model, "oops").is_err());
        assert_eq!(model.integer_value, 0);
        integer.assign(&mut model, "12").unwrap();
        assert_eq!(model.integer_value, 12);
    }

    #[test]
    fn default_type_name_is_short() {
        assert_eq!(TestModel::describe().type_name(), "TestModel");
        assert_eq!(short_type_name::<Vec<String>>(), "Vec<alloc::string::String>");
    }

    #[test]
    fn failing_constructor_is_invalid_target_type() {
        let descriptor: TypeDescriptor<u8> =
            TypeDescriptor::builder_with(|| Err("not a record".to_string()))
                .type_name("u8")
                .build();
        match descriptor.instantiate() {
            Err(EnforceError::InvalidTargetType { type_name, reason }) => {
                assert_eq!(type_name, "u8");
                assert_eq!(reason, "not a record");
            }
            other => panic!("Expected InvalidTargetType, got {other:?}"),
        }
    }

    #[test]
    fn descriptor_is_built_once() {
        let first = descriptor_of::<TestModel>();
        let second = descriptor_of::<TestModel>();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn descriptor_cache_is_per_type() {
        let a = descriptor_of::<TestModel>();
        let b = descriptor_of::<TestModel2>();
        assert_eq!(a.type_name(), "TestModel");
        assert_eq!(b.type_name(), "TestModel2");
    }
}
