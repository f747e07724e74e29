use super::CastType;
use crate::core::{Result, Value};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default)]
pub struct UuidType;

impl CastType for UuidType {
    fn name(&self) -> &'static str {
        "uuid"
    }

    fn cast(&self, value: &Value) -> Result<Value> {
        let cast = match value {
            Value::Uuid(u) => Value::Uuid(*u),
            Value::Text(s) => Uuid::parse_str(s.trim())
                .map(Value::Uuid)
                .unwrap_or(Value::Null),
            _ => Value::Null,
        };
        Ok(cast)
    }
}
