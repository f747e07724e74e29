use super::CastType;
use crate::core::{Result, Value};

/// Immutable string type, registered as both `string` and `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StringType {
    name: &'static str,
}

impl StringType {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

impl Default for StringType {
    fn default() -> Self {
        Self::new("string")
    }
}

impl CastType for StringType {
    fn name(&self) -> &'static str {
        self.name
    }

    fn cast(&self, value: &Value) -> Result<Value> {
        let cast = match value {
            Value::Null => Value::Null,
            Value::Boolean(true) => Value::from("t"),
            Value::Boolean(false) => Value::from("f"),
            Value::Text(s) => Value::Text(s.clone()),
            other => Value::Text(other.to_string()),
        };
        Ok(cast)
    }
}
