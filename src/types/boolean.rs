use super::CastType;
use crate::core::{Result, Value};

const FALSE_VALUES: [&str; 7] = ["0", "f", "F", "false", "FALSE", "off", "OFF"];

#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanType;

impl CastType for BooleanType {
    fn name(&self) -> &'static str {
        "boolean"
    }

    fn cast(&self, value: &Value) -> Result<Value> {
        let cast = match value {
            Value::Null => Value::Null,
            Value::Text(s) if s.is_empty() => Value::Null,
            Value::Boolean(b) => Value::Boolean(*b),
            Value::Integer(i) => Value::Boolean(*i != 0),
            Value::Float(f) => Value::Boolean(*f != 0.0),
            Value::Text(s) => Value::Boolean(!FALSE_VALUES.contains(&s.as_str())),
            _ => Value::Boolean(true),
        };
        Ok(cast)
    }

    fn is_boolean(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truthy_inputs() {
        for input in ["t", "1", "true", "yes", "on"] {
            assert_eq!(BooleanType.cast(&Value::from(input)).unwrap(), Value::Boolean(true));
        }
        assert_eq!(BooleanType.cast(&Value::Integer(1)).unwrap(), Value::Boolean(true));
    }

    #[test]
    fn test_falsy_inputs() {
        for input in FALSE_VALUES {
            assert_eq!(BooleanType.cast(&Value::from(input)).unwrap(), Value::Boolean(false));
        }
        assert_eq!(BooleanType.cast(&Value::Integer(0)).unwrap(), Value::Boolean(false));
        assert_eq!(BooleanType.cast(&Value::from("")).unwrap(), Value::Null);
    }
}
