use crate::coder::{CoderRef, StoreCoder};
use crate::core::{Container, Result, Value, canonical_key, stringify_keys, symbol_key};

/// Base column type of a store: a string-keyed map encoded by a [`Coder`](crate::coder::Coder).
///
/// Knows nothing about individual keys. [`TypedStore`](super::TypedStore)
/// wraps it to add per-key casting.
#[derive(Debug, Clone)]
pub struct ContainerType {
    coder: CoderRef,
}

impl ContainerType {
    pub fn new(coder: CoderRef) -> Self {
        Self { coder }
    }

    pub fn json() -> Self {
        Self::new(StoreCoder::Json.build())
    }

    pub fn key_value() -> Self {
        Self::new(StoreCoder::KeyValue.build())
    }

    pub fn coder(&self) -> &CoderRef {
        &self.coder
    }

    /// User input: raw text is decoded, maps get canonical keys.
    pub fn cast(&self, value: &Value) -> Result<Value> {
        match value {
            Value::Text(_) => self.deserialize(value),
            Value::Map(map) => Ok(Value::Map(stringify_keys(map.clone()))),
            other => Ok(other.clone()),
        }
    }

    pub fn deserialize(&self, value: &Value) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Text(raw) => match self.coder.load(raw)? {
                Value::Map(map) => Ok(Value::Map(stringify_keys(map))),
                other => Ok(other),
            },
            Value::Map(map) => Ok(Value::Map(stringify_keys(map.clone()))),
            other => Ok(other.clone()),
        }
    }

    pub fn serialize(&self, value: &Value) -> Result<Value> {
        match value {
            Value::Null => Ok(Value::Null),
            Value::Map(map) => {
                let canonical = Value::Map(stringify_keys(map.clone()));
                Ok(Value::Text(self.coder.dump(&canonical)?))
            }
            other => Ok(Value::Text(self.coder.dump(other)?)),
        }
    }

    /// Keyed write. A non-map container is replaced by an empty map first.
    pub fn write(&self, container: &mut Value, key: &str, value: Value) {
        if !matches!(container, Value::Map(_)) {
            *container = Value::Map(Container::new());
        }
        if let Value::Map(map) = container {
            map.insert(canonical_key(key), value);
        }
    }

    /// Keyed read, accepting the symbol form left behind by direct mutation.
    pub fn read(&self, container: &Value, key: &str) -> Value {
        let key = canonical_key(key);
        container
            .dig(&key)
            .or_else(|| container.dig(&symbol_key(&key)))
            .cloned()
            .unwrap_or_default()
    }
}

impl Default for ContainerType {
    fn default() -> Self {
        Self::json()
    }
}
