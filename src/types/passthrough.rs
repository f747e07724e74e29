use super::CastType;
use crate::core::{Result, Value};

/// The identity type behind the `value` identifier.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueType;

impl CastType for ValueType {
    fn name(&self) -> &'static str {
        "value"
    }

    fn cast(&self, value: &Value) -> Result<Value> {
        Ok(value.clone())
    }
}
