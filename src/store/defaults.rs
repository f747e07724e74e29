use super::TypedStore;
use crate::core::{Result, StoreError, Value};
use std::fmt;
use std::sync::{Arc, RwLock};

pub type DefaultProducer = Arc<dyn Fn() -> Value + Send + Sync>;

/// Default of a typed key.
///
/// A producer runs every time a default is resolved, so each record that
/// seeds its container from it gets its own value.
#[derive(Clone, Default)]
pub enum DefaultSpec {
    #[default]
    Undefined,
    Value(Value),
    Producer(DefaultProducer),
}

impl DefaultSpec {
    pub fn value(value: impl Into<Value>) -> Self {
        Self::Value(value.into())
    }

    pub fn producer<F>(producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        Self::Producer(Arc::new(producer))
    }

    pub fn is_defined(&self) -> bool {
        !matches!(self, Self::Undefined)
    }

    /// `None` when no default was declared. A declared `Null` resolves to `Some(Null)`.
    pub fn resolve(&self) -> Option<Value> {
        match self {
            Self::Undefined => None,
            Self::Value(value) => Some(value.clone()),
            Self::Producer(producer) => Some(producer()),
        }
    }
}

impl fmt::Debug for DefaultSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => write!(f, "Undefined"),
            Self::Value(value) => write!(f, "Value({:?})", value),
            Self::Producer(_) => write!(f, "Producer(<fn>)"),
        }
    }
}

impl From<Value> for DefaultSpec {
    fn from(value: Value) -> Self {
        Self::Value(value)
    }
}

pub type DefaultsProducer = Box<dyn Fn() -> Result<Value> + Send + Sync>;

/// Builds the default container of one store for new records.
///
/// Created before the class's typed store exists and attached once the
/// class is built.
pub struct DefaultResolver {
    store_name: String,
    typed_store: RwLock<Option<Arc<TypedStore>>>,
}

impl DefaultResolver {
    pub fn new(store_name: &str) -> Self {
        Self {
            store_name: store_name.to_string(),
            typed_store: RwLock::new(None),
        }
    }

    pub fn store_name(&self) -> &str {
        &self.store_name
    }

    pub fn attach(&self, typed_store: Arc<TypedStore>) -> Result<()> {
        *self.typed_store.write()? = Some(typed_store);
        Ok(())
    }

    pub fn is_attached(&self) -> bool {
        self.typed_store.read().map(|slot| slot.is_some()).unwrap_or(false)
    }

    pub fn call(&self) -> Result<Value> {
        let slot = self.typed_store.read()?;
        match slot.as_ref() {
            Some(typed_store) => Ok(Value::Map(typed_store.build_defaults())),
            None => Err(StoreError::DefaultsNotAttached(self.store_name.clone())),
        }
    }

    /// Zero-argument closure equivalent to [`call`](Self::call).
    pub fn producer(self: &Arc<Self>) -> DefaultsProducer {
        let resolver = Arc::clone(self);
        Box::new(move || resolver.call())
    }
}

impl fmt::Debug for DefaultResolver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultResolver")
            .field("store_name", &self.store_name)
            .field("attached", &self.is_attached())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{ContainerType, KeyOptions};
    use std::sync::atomic::{AtomicI64, Ordering};

    #[test]
    fn test_producer_runs_on_every_resolve() {
        let counter = Arc::new(AtomicI64::new(0));
        let seen = counter.clone();
        let spec = DefaultSpec::producer(move || Value::Integer(seen.fetch_add(1, Ordering::SeqCst)));
        assert_eq!(spec.resolve(), Some(Value::Integer(0)));
        assert_eq!(spec.resolve(), Some(Value::Integer(1)));
        assert_eq!(DefaultSpec::Undefined.resolve(), None);
        assert_eq!(DefaultSpec::Value(Value::Null).resolve(), Some(Value::Null));
    }

    #[test]
    fn test_unattached_resolver_fails() {
        let resolver = Arc::new(DefaultResolver::new("settings"));
        assert!(matches!(resolver.call(), Err(StoreError::DefaultsNotAttached(name)) if name == "settings"));
        assert!(resolver.producer()().is_err());
    }

    #[test]
    fn test_attached_resolver_builds_defaults() {
        let mut typed = TypedStore::new(ContainerType::json());
        typed
            .add_typed_key("age", "integer", KeyOptions::new().default(18))
            .unwrap();
        let resolver = Arc::new(DefaultResolver::new("settings"));
        resolver.attach(Arc::new(typed)).unwrap();

        let defaults = resolver.producer()().unwrap();
        assert_eq!(defaults.dig("age"), Some(&Value::Integer(18)));
    }
}
