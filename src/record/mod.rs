//! Model instances: store containers, accessors, dirty tracking, persistence.

pub mod dirty;

use crate::core::{Container, Result, StoreError, Value, canonical_key, symbol_key};
use crate::model::{Accessor, ModelClass, StoreDefinition};
use crate::storage::{RawRow, RecordStorage};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{Level, debug, event};

pub use dirty::{ChangeRecord, MutationTracker, strip_equal_entries};

#[derive(Debug)]
pub struct Record {
    class: Arc<ModelClass>,
    id: Option<u64>,
    attributes: BTreeMap<String, Value>,
    tracker: MutationTracker,
    /// Defaults handed out for unset keys when `read_unset_returns_default` is on.
    unset_defaults: RefCell<BTreeMap<(String, String), Value>>,
}

impl Record {
    /// A new record whose stores hold their declared defaults.
    ///
    /// The seeded state is the change-tracking baseline, so defaults alone do
    /// not make a record dirty.
    pub fn new(class: &Arc<ModelClass>) -> Result<Self> {
        let mut attributes = BTreeMap::new();
        for store in class.stores() {
            attributes.insert(store.name.clone(), store.resolver.call()?);
        }

        Ok(Self {
            class: Arc::clone(class),
            id: None,
            tracker: MutationTracker::new(attributes.clone()),
            attributes,
            unset_defaults: RefCell::new(BTreeMap::new()),
        })
    }

    /// [`new`](Self::new) followed by [`assign`](Self::assign) for each pair.
    pub fn new_with<'a, I>(class: &Arc<ModelClass>, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        let mut record = Self::new(class)?;
        record.assign_attributes(values)?;
        Ok(record)
    }

    pub fn find<S>(class: &Arc<ModelClass>, storage: &S, id: u64) -> Result<Self>
    where
        S: RecordStorage + ?Sized,
    {
        let row = storage.fetch(class.table_name(), id)?;
        let attributes = Self::load_row(class, &row)?;
        event!(Level::DEBUG, model = %class.name(), id, "record loaded");

        Ok(Self {
            class: Arc::clone(class),
            id: Some(id),
            tracker: MutationTracker::new(attributes.clone()),
            attributes,
            unset_defaults: RefCell::new(BTreeMap::new()),
        })
    }

    fn load_row(class: &ModelClass, row: &RawRow) -> Result<BTreeMap<String, Value>> {
        let mut attributes = BTreeMap::new();
        for store in class.stores() {
            let raw = row.get(&store.name).cloned().unwrap_or_default();
            attributes.insert(store.name.clone(), store.typed.deserialize(&raw)?);
        }
        Ok(attributes)
    }

    pub fn class(&self) -> &Arc<ModelClass> {
        &self.class
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Store columns by name. When the class registers attributes, each typed
    /// key present in its store is listed under its own name too; a column
    /// name and an earlier store win over a later key of the same name.
    pub fn attributes(&self) -> BTreeMap<String, Value> {
        let mut attributes = self.attributes.clone();
        if !self.class.register_attributes() {
            return attributes;
        }
        for store in self.class.stores() {
            let container = self.current(&store.name);
            for key in store.typed.keys() {
                if contains_key(container, &key.name) {
                    attributes
                        .entry(key.name.clone())
                        .or_insert_with(|| store.typed.read(container, &key.name));
                }
            }
        }
        attributes
    }

    /// Serializable view of [`attributes`](Self::attributes).
    pub fn to_json(&self) -> serde_json::Value {
        Value::Map(self.attributes()).to_json()
    }

    /// [`assign`](Self::assign) for each pair, in order.
    pub fn assign_attributes<'a, I>(&mut self, values: I) -> Result<()>
    where
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        for (name, value) in values {
            self.assign(name, value)?;
        }
        Ok(())
    }

    /// [`assign_attributes`](Self::assign_attributes) followed by [`save`](Self::save).
    pub fn update<'a, S, I>(&mut self, storage: &mut S, values: I) -> Result<()>
    where
        S: RecordStorage + ?Sized,
        I: IntoIterator<Item = (&'a str, Value)>,
    {
        self.assign_attributes(values)?;
        self.save(storage)
    }

    /// Sets an accessor, or a whole store when `name` is a store column.
    pub fn assign(&mut self, name: &str, value: Value) -> Result<()> {
        if self.class.accessor(name).is_ok() {
            self.set(name, value)
        } else if self.class.has_store(name) {
            self.write_store(name, value)
        } else {
            Err(StoreError::UnknownAccessor(
                name.to_string(),
                self.class.name().to_string(),
            ))
        }
    }

    fn accessor(&self, name: &str) -> Result<Accessor> {
        self.class.accessor(name).cloned()
    }

    pub fn get(&self, accessor: &str) -> Result<Value> {
        let accessor = self.accessor(accessor)?;
        self.read_store_attribute(&accessor.store, &accessor.key)
    }

    pub fn set(&mut self, accessor: &str, value: impl Into<Value>) -> Result<()> {
        let accessor = self.accessor(accessor)?;
        self.write_store_attribute(&accessor.store, &accessor.key, value)
    }

    /// `true` only when the boolean accessor currently holds `true`.
    pub fn is(&self, accessor: &str) -> Result<bool> {
        let accessor = self.accessor(accessor)?;
        if !accessor.predicate {
            return Err(StoreError::NotAPredicate(accessor.name));
        }
        Ok(self.read_store_attribute(&accessor.store, &accessor.key)? == Value::Boolean(true))
    }

    pub fn read_store_attribute(&self, store_name: &str, key: &str) -> Result<Value> {
        let store = self.class.store(store_name)?;
        let container = self.attributes.get(store_name).unwrap_or(&Value::Null);

        if self.class.read_unset_returns_default()
            && !contains_key(container, key)
            && let Some(default) = store.typed.default_for(key)
        {
            let mut cache = self.unset_defaults.borrow_mut();
            let value = cache
                .entry((store_name.to_string(), canonical_key(key)))
                .or_insert_with(|| default.resolve().unwrap_or_default());
            return Ok(value.clone());
        }

        Ok(store.typed.read(container, key))
    }

    /// Typed keys are cast before the write.
    pub fn write_store_attribute(
        &mut self,
        store_name: &str,
        key: &str,
        value: impl Into<Value>,
    ) -> Result<()> {
        let typed = Arc::clone(self.class.typed_store(store_name)?);
        let container = self
            .attributes
            .entry(store_name.to_string())
            .or_insert(Value::Null);
        typed.write(container, key, value.into())?;
        self.unset_defaults
            .get_mut()
            .remove(&(store_name.to_string(), canonical_key(key)));
        Ok(())
    }

    pub fn store(&self, store_name: &str) -> Result<&Value> {
        self.class.store(store_name)?;
        Ok(self.attributes.get(store_name).unwrap_or(&Value::Null))
    }

    /// Direct access to a store's container. Values written here are not cast.
    pub fn store_mut(&mut self, store_name: &str) -> Result<&mut Container> {
        self.class.store(store_name)?;
        let container = self
            .attributes
            .entry(store_name.to_string())
            .or_insert(Value::Null);
        if !matches!(container, Value::Map(_)) {
            *container = Value::Map(Container::new());
        }
        self.unset_defaults.get_mut().retain(|(store, _), _| store != store_name);
        container
            .as_map_mut()
            .ok_or_else(|| StoreError::StoreNotFound(store_name.to_string(), self.class.name().to_string()))
    }

    /// Replaces a whole store, casting it through the typed store.
    pub fn write_store(&mut self, store_name: &str, value: impl Into<Value>) -> Result<()> {
        let cast = self.class.typed_store(store_name)?.cast(&value.into())?;
        self.attributes.insert(store_name.to_string(), cast);
        self.unset_defaults.get_mut().retain(|(store, _), _| store != store_name);
        Ok(())
    }

    fn current(&self, attribute: &str) -> &Value {
        self.attributes.get(attribute).unwrap_or(&Value::Null)
    }

    pub fn attribute_changed(&self, attribute: &str) -> bool {
        self.tracker.changed(attribute, self.current(attribute))
    }

    pub fn attribute_change(&self, attribute: &str) -> Option<ChangeRecord> {
        self.tracker
            .change_to_attribute(attribute, self.current(attribute))
    }

    /// Changed store columns. Registered typed keys that changed are listed
    /// under their own names too.
    pub fn changes(&self) -> BTreeMap<String, ChangeRecord> {
        let changes = self.tracker.changes(&self.attributes);
        self.with_key_changes(changes)
    }

    /// Previous value of everything [`changes`](Self::changes) reports.
    pub fn changed_attributes(&self) -> BTreeMap<String, Value> {
        self.changes()
            .into_iter()
            .map(|(name, (previous, _))| (name, previous))
            .collect()
    }

    pub fn is_changed(&self) -> bool {
        !self.changes().is_empty()
    }

    /// Changes persisted by the last save, listed like [`changes`](Self::changes).
    pub fn saved_changes(&self) -> BTreeMap<String, ChangeRecord> {
        self.with_key_changes(self.tracker.saved_changes().clone())
    }

    fn with_key_changes(
        &self,
        mut changes: BTreeMap<String, ChangeRecord>,
    ) -> BTreeMap<String, ChangeRecord> {
        if !self.class.register_attributes() {
            return changes;
        }
        for store in self.class.stores() {
            let Some(change) = changes.get(&store.name).cloned() else {
                continue;
            };
            for key in store.typed.keys() {
                if key_differs(&change, &key.name) {
                    changes
                        .entry(key.name.clone())
                        .or_insert_with(|| dig_pair(&change, &key.name));
                }
            }
        }
        changes
    }

    pub fn saved_change_to_attribute(&self, attribute: &str) -> Option<ChangeRecord> {
        self.tracker.saved_change_to_attribute(attribute).cloned()
    }

    pub fn is_saved_change_to_attribute(&self, attribute: &str) -> bool {
        self.tracker.saved_change_to_attribute(attribute).is_some()
    }

    pub fn key_changed(&self, accessor: &str) -> Result<bool> {
        let accessor = self.accessor(accessor)?;
        Ok(self
            .attribute_change(&accessor.store)
            .is_some_and(|change| key_differs(&change, &accessor.key)))
    }

    pub fn key_change(&self, accessor: &str) -> Result<Option<ChangeRecord>> {
        let accessor = self.accessor(accessor)?;
        Ok(self
            .attribute_change(&accessor.store)
            .map(|change| dig_pair(&change, &accessor.key)))
    }

    /// Previous value of the key; `Null` when its store is unchanged.
    pub fn key_was(&self, accessor: &str) -> Result<Value> {
        Ok(self.key_change(accessor)?.map(|(previous, _)| previous).unwrap_or_default())
    }

    pub fn saved_change_to_key(&self, accessor: &str) -> Result<bool> {
        let accessor = self.accessor(accessor)?;
        Ok(self
            .tracker
            .saved_change_to_attribute(&accessor.store)
            .is_some_and(|change| key_differs(change, &accessor.key)))
    }

    pub fn saved_change_to(&self, accessor: &str) -> Result<Option<ChangeRecord>> {
        let accessor = self.accessor(accessor)?;
        Ok(self
            .tracker
            .saved_change_to_attribute(&accessor.store)
            .map(|change| dig_pair(change, &accessor.key)))
    }

    /// Puts the key back to its value in the change-tracking baseline,
    /// removing it when the baseline did not have it.
    pub fn restore_key(&mut self, accessor: &str) -> Result<()> {
        let accessor = self.accessor(accessor)?;
        let typed = Arc::clone(self.class.typed_store(&accessor.store)?);
        let original = self.tracker.original_value(&accessor.store);
        let container = self
            .attributes
            .entry(accessor.store.clone())
            .or_insert(Value::Null);

        match original.dig(&accessor.key) {
            Some(previous) => typed.subtype().write(container, &accessor.key, previous.clone()),
            None => {
                if let Some(map) = container.as_map_mut() {
                    map.remove(&accessor.key);
                    map.remove(&symbol_key(&accessor.key));
                }
            }
        }
        self.unset_defaults
            .get_mut()
            .remove(&(accessor.store, accessor.key));
        Ok(())
    }

    pub fn before_last_save(&self, accessor: &str) -> Result<Value> {
        Ok(self
            .saved_change_to(accessor)?
            .map(|(previous, _)| previous)
            .unwrap_or_default())
    }

    /// Storage form of every store. Fails before anything is written.
    ///
    /// With `read_unset_returns_default`, absent defaulted keys are written
    /// with the value reads of this record return.
    pub fn serialize_row(&self) -> Result<RawRow> {
        let mut row = RawRow::new();
        for store in self.class.stores() {
            let current = self.current(&store.name);
            let raw = match self.unset_defaults_for(store, current) {
                Some(filled) => store.typed.serialize(&filled)?,
                None => store.typed.serialize(current)?,
            };
            row.insert(store.name.clone(), raw);
        }
        Ok(row)
    }

    /// `current` plus the cached default of every absent defaulted key,
    /// resolving and caching the ones not read yet.
    fn unset_defaults_for(&self, store: &StoreDefinition, current: &Value) -> Option<Value> {
        if !self.class.read_unset_returns_default() {
            return None;
        }
        let Value::Map(map) = current else {
            return None;
        };

        let mut filled = map.clone();
        let mut cache = self.unset_defaults.borrow_mut();
        for key in store.typed.keys() {
            if contains_key(current, &key.name) {
                continue;
            }
            let cache_key = (store.name.clone(), key.name.clone());
            let value = match cache.get(&cache_key) {
                Some(value) => value.clone(),
                None => match key.default.resolve() {
                    Some(value) => value,
                    None => continue,
                },
            };
            cache.insert(cache_key, value.clone());
            filled.insert(key.name.clone(), value);
        }
        Some(Value::Map(filled))
    }

    pub fn save<S>(&mut self, storage: &mut S) -> Result<()>
    where
        S: RecordStorage + ?Sized,
    {
        let row = self.serialize_row()?;
        let table = self.class.table_name();

        let id = match self.id {
            Some(id) => {
                storage.update(table, id, row)?;
                id
            }
            None => storage.insert(table, row)?,
        };
        self.id = Some(id);

        self.tracker.changes_applied(&self.attributes);
        debug!(
            model = %self.class.name(),
            id,
            saved_changes = self.tracker.saved_changes().len(),
            "record saved"
        );
        Ok(())
    }

    /// Re-reads every store and clears both current and saved changes.
    /// Producer defaults for absent keys are evaluated again.
    pub fn reload<S>(&mut self, storage: &S) -> Result<()>
    where
        S: RecordStorage + ?Sized,
    {
        let id = self
            .id
            .ok_or_else(|| StoreError::NotPersisted(self.class.name().to_string()))?;
        let row = storage.fetch(self.class.table_name(), id)?;

        self.attributes = Self::load_row(&self.class, &row)?;
        self.tracker.reset(&self.attributes);
        self.unset_defaults.get_mut().clear();
        debug!(model = %self.class.name(), id, "record reloaded");
        Ok(())
    }
}

fn contains_key(container: &Value, key: &str) -> bool {
    let key = canonical_key(key);
    container.dig(&key).is_some() || container.dig(&symbol_key(&key)).is_some()
}

fn dig_pair((previous, current): &ChangeRecord, key: &str) -> ChangeRecord {
    (
        previous.dig(key).cloned().unwrap_or_default(),
        current.dig(key).cloned().unwrap_or_default(),
    )
}

fn key_differs((previous, current): &ChangeRecord, key: &str) -> bool {
    previous.dig(key) != current.dig(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coder::StoreCoder;
    use crate::model::AttributeOptions;
    use crate::storage::MemoryStorage;

    fn user_class() -> Arc<ModelClass> {
        ModelClass::builder("User")
            .store("settings", StoreCoder::Json)
            .store_attribute("settings", "age", "integer", AttributeOptions::new().default(18))
            .unwrap()
            .store_attribute("settings", "active", "boolean", AttributeOptions::new())
            .unwrap()
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_record_is_seeded_and_clean() {
        let record = Record::new(&user_class()).unwrap();
        assert_eq!(record.get("age").unwrap(), Value::Integer(18));
        assert!(!record.is_changed());
        assert!(!record.is_persisted());
    }

    #[test]
    fn test_assign_accepts_accessors_and_stores() {
        let class = user_class();
        let record = Record::new_with(
            &class,
            [("active", Value::from("1")), ("age", Value::from("40"))],
        )
        .unwrap();
        assert!(record.is("active").unwrap());
        assert_eq!(record.get("age").unwrap(), Value::Integer(40));

        let mut record = Record::new(&class).unwrap();
        assert!(matches!(
            record.assign("nope", Value::Null),
            Err(StoreError::UnknownAccessor(name, _)) if name == "nope"
        ));
        assert!(matches!(record.is("age"), Err(StoreError::NotAPredicate(_))));
    }

    #[test]
    fn test_store_mut_bypasses_cast() {
        let mut record = Record::new(&user_class()).unwrap();
        record
            .store_mut("settings")
            .unwrap()
            .insert("age".into(), Value::from("3.14"));
        assert_eq!(record.get("age").unwrap(), Value::from("3.14"));

        record.set("age", "3.14").unwrap();
        assert_eq!(record.get("age").unwrap(), Value::Integer(3));
    }

    #[test]
    fn test_reload_requires_persisted_record() {
        let storage = MemoryStorage::new();
        let mut record = Record::new(&user_class()).unwrap();
        assert!(matches!(record.reload(&storage), Err(StoreError::NotPersisted(_))));
    }
}
