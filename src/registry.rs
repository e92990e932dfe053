//! Host-side collaborators: where validated instances live, and which types
//! take part in bulk enforcement.
//!
//! [`Registry`] is a minimal singleton store keyed by type. Instances are put
//! there by the policy layer after a successful validation and looked up by
//! the application and the health check later on.
//!
//! [`Catalog`] lists the configuration types of an application. Rust has no
//! assembly scanning, so types are added explicitly, usually in one place next
//! to `main`.

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::descriptor::{EnforcedVariables, descriptor_of, short_type_name};
use crate::enforce;
use crate::error::EnforceError;
use crate::source::ConfigSource;

/// Type-keyed store of shared configuration instances.
#[derive(Default)]
pub struct Registry {
    instances: HashMap<TypeId, Arc<dyn Any + Send + Sync>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `instance` as the single shared value of its type, replacing any
    /// earlier registration.
    pub fn register<T: Send + Sync + 'static>(&mut self, instance: T) -> Arc<T> {
        let shared = Arc::new(instance);
        self.instances
            .insert(TypeId::of::<T>(), shared.clone() as Arc<dyn Any + Send + Sync>);
        shared
    }

    pub fn get<T: Send + Sync + 'static>(&self) -> Option<Arc<T>> {
        self.instances
            .get(&TypeId::of::<T>())?
            .clone()
            .downcast::<T>()
            .ok()
    }

    /// Like [`get`](Self::get), but a miss is [`EnforceError::NotRegistered`].
    pub fn require<T: Send + Sync + 'static>(&self) -> Result<Arc<T>, EnforceError> {
        self.get::<T>()
            .ok_or_else(|| EnforceError::NotRegistered(short_type_name::<T>().to_string()))
    }

    pub fn contains(&self, id: TypeId) -> bool {
        self.instances.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("len", &self.instances.len())
            .finish()
    }
}

type EnforceFn = fn(&mut Registry, &dyn ConfigSource, bool) -> Result<(), EnforceError>;

/// One declared type in a [`Catalog`].
#[derive(Clone, Copy)]
pub struct CatalogEntry {
    type_id: TypeId,
    type_name: fn() -> String,
    enforce: EnforceFn,
}

impl CatalogEntry {
    fn of<T: EnforcedVariables>() -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            type_name: || descriptor_of::<T>().type_name().to_string(),
            enforce: enforce::enforce_into::<T>,
        }
    }

    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    pub fn type_name(&self) -> String {
        (self.type_name)()
    }

    pub(crate) fn enforce(
        &self,
        registry: &mut Registry,
        source: &dyn ConfigSource,
        throw_on_missing: bool,
    ) -> Result<(), EnforceError> {
        (self.enforce)(registry, source, throw_on_missing)
    }
}

impl fmt::Debug for CatalogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CatalogEntry")
            .field("type_name", &self.type_name())
            .finish()
    }
}

/// The set of configuration types an application declares, in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `T`. Adding the same type twice keeps the first position.
    pub fn add<T: EnforcedVariables>(&mut self) -> &mut Self {
        let entry = CatalogEntry::of::<T>();
        if !self.entries.iter().any(|e| e.type_id == entry.type_id) {
            self.entries.push(entry);
        }
        self
    }

    /// Chaining form of [`add`](Self::add).
    pub fn with<T: EnforcedVariables>(mut self) -> Self {
        self.add::<T>();
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = &CatalogEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
