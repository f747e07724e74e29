use super::CastType;
use crate::core::{Result, Value, deep_stringify_keys};

/// Nested JSON document stored under a single key.
///
/// Serialize keeps the structure so the enclosing coder encodes it once.
/// Deserialize still decodes array or object JSON text written by older,
/// double-encoding writers; any other text is kept as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonType;

impl CastType for JsonType {
    fn name(&self) -> &'static str {
        "json"
    }

    fn cast(&self, value: &Value) -> Result<Value> {
        Ok(deep_stringify_keys(value.clone()))
    }

    fn deserialize(&self, value: &Value) -> Result<Value> {
        match value {
            Value::Text(raw) => match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(json) if json.is_array() || json.is_object() => Ok(Value::from_json(&json)),
                _ => Ok(Value::Text(raw.clone())),
            },
            other => self.cast(other),
        }
    }

    fn serialize(&self, value: &Value) -> Result<Value> {
        self.cast(value)
    }
}
