use super::ModelBuilder;
use super::registry::TypedKeyRegistry;
use crate::coder::CoderRef;
use crate::core::{Result, StoreError};
use crate::store::{DefaultResolver, TypedStore};
use std::collections::BTreeMap;
use std::sync::Arc;

/// An installed store column.
#[derive(Debug, Clone)]
pub struct StoreDefinition {
    pub name: String,
    pub coder: CoderRef,
    pub typed: Arc<TypedStore>,
    pub resolver: Arc<DefaultResolver>,
    /// Class whose defaults seed new records of this store.
    pub default_owner: String,
}

/// Entry of the accessor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Accessor {
    pub name: String,
    pub store: String,
    pub key: String,
    /// Boolean-typed keys also answer `Record::is`.
    pub predicate: bool,
}

/// Class descriptor: stores, typed keys, and accessors. Immutable once built.
#[derive(Debug)]
pub struct ModelClass {
    pub(crate) name: String,
    pub(crate) table_name: String,
    pub(crate) parent: Option<Arc<ModelClass>>,
    pub(crate) explicit_fallback: Option<bool>,
    pub(crate) unset_values_fallback_to_default: bool,
    pub(crate) read_unset_returns_default: bool,
    pub(crate) register_attributes: bool,
    pub(crate) stores: BTreeMap<String, StoreDefinition>,
    pub(crate) registry: TypedKeyRegistry,
    pub(crate) accessors: BTreeMap<String, Accessor>,
    pub(crate) local_stored_attributes: BTreeMap<String, Vec<String>>,
}

impl ModelClass {
    pub fn builder(name: &str) -> ModelBuilder {
        ModelBuilder::new(name)
    }

    /// Starts a subclass from a copy of `parent`'s stores, keys, and accessors.
    pub fn subclass(parent: &Arc<ModelClass>, name: &str) -> ModelBuilder {
        ModelBuilder::inherit(parent, name)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }

    pub fn parent(&self) -> Option<&Arc<ModelClass>> {
        self.parent.as_ref()
    }

    pub fn ancestors(&self) -> impl Iterator<Item = &ModelClass> {
        std::iter::successors(Some(self), |class| class.parent.as_deref())
    }

    pub fn unset_values_fallback_to_default(&self) -> bool {
        self.unset_values_fallback_to_default
    }

    pub fn read_unset_returns_default(&self) -> bool {
        self.read_unset_returns_default
    }

    pub fn register_attributes(&self) -> bool {
        self.register_attributes
    }

    /// The class's own setting, else the nearest ancestor's resolved one, else `global`.
    pub fn resolve_policy(
        explicit: Option<bool>,
        parent: Option<&ModelClass>,
        global: bool,
    ) -> bool {
        explicit
            .or_else(|| parent.map(|parent| parent.unset_values_fallback_to_default))
            .unwrap_or(global)
    }

    pub fn explicit_fallback(&self) -> Option<bool> {
        self.explicit_fallback
    }

    pub fn store(&self, store_name: &str) -> Result<&StoreDefinition> {
        self.stores
            .get(store_name)
            .ok_or_else(|| StoreError::StoreNotFound(store_name.to_string(), self.name.clone()))
    }

    pub fn has_store(&self, store_name: &str) -> bool {
        self.stores.contains_key(store_name)
    }

    pub fn stores(&self) -> impl Iterator<Item = &StoreDefinition> {
        self.stores.values()
    }

    pub fn typed_store(&self, store_name: &str) -> Result<&Arc<TypedStore>> {
        self.store(store_name).map(|store| &store.typed)
    }

    pub fn default_owner(&self, store_name: &str) -> Option<&str> {
        self.stores
            .get(store_name)
            .map(|store| store.default_owner.as_str())
    }

    pub fn registry(&self) -> &TypedKeyRegistry {
        &self.registry
    }

    pub fn accessor(&self, name: &str) -> Result<&Accessor> {
        self.accessors
            .get(name)
            .ok_or_else(|| StoreError::UnknownAccessor(name.to_string(), self.name.clone()))
    }

    pub fn accessors(&self) -> impl Iterator<Item = &Accessor> {
        self.accessors.values()
    }

    pub fn local_stored_attributes(&self) -> &BTreeMap<String, Vec<String>> {
        &self.local_stored_attributes
    }

    /// Accessor keys per store, inherited ones first.
    pub fn stored_attributes(&self) -> BTreeMap<String, Vec<String>> {
        let mut merged = self
            .parent
            .as_ref()
            .map(|parent| parent.stored_attributes())
            .unwrap_or_default();

        for (store, keys) in &self.local_stored_attributes {
            let entry = merged.entry(store.clone()).or_default();
            for key in keys {
                if !entry.contains(key) {
                    entry.push(key.clone());
                }
            }
        }
        merged
    }
}
