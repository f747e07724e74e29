use super::Coder;
use crate::core::{Result, Value};

/// Compact JSON. Object keys come out sorted because containers are ordered maps.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCoder;

impl Coder for JsonCoder {
    fn name(&self) -> &'static str {
        "json"
    }

    fn dump(&self, value: &Value) -> Result<String> {
        Ok(serde_json::to_string(&value.to_json())?)
    }

    fn load(&self, raw: &str) -> Result<Value> {
        if raw.trim().is_empty() {
            return Ok(Value::Null);
        }
        let json: serde_json::Value = serde_json::from_str(raw)?;
        Ok(Value::from_json(&json))
    }
}
