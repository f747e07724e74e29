use super::CastType;
use crate::core::{Result, Value};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LEADING_FLOAT: Regex =
        Regex::new(r"^\s*([+-]?(?:\d+(?:_\d+)*)?(?:\.\d+)?(?:[eE][+-]?\d+)?)").unwrap();
}

/// Parses the leading float of `s`; anything unparseable is `0.0`.
pub(crate) fn leading_float(s: &str) -> f64 {
    let Some(captures) = LEADING_FLOAT.captures(s) else {
        return 0.0;
    };
    captures[1].replace('_', "").parse::<f64>().unwrap_or(0.0)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct FloatType;

impl CastType for FloatType {
    fn name(&self) -> &'static str {
        "float"
    }

    fn cast(&self, value: &Value) -> Result<Value> {
        let cast = match value {
            Value::Null => Value::Null,
            Value::Boolean(b) => Value::Float(if *b { 1.0 } else { 0.0 }),
            Value::Integer(i) => Value::Float(*i as f64),
            Value::Float(f) => Value::Float(*f),
            Value::Text(s) => match s.trim() {
                "" => Value::Null,
                "Infinity" => Value::Float(f64::INFINITY),
                "-Infinity" => Value::Float(f64::NEG_INFINITY),
                "NaN" => Value::Float(f64::NAN),
                other => Value::Float(leading_float(other)),
            },
            Value::Timestamp(t) => {
                Value::Float(t.timestamp() as f64 + f64::from(t.timestamp_subsec_micros()) / 1e6)
            }
            _ => Value::Null,
        };
        Ok(cast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cast_from_text() {
        assert_eq!(FloatType.cast(&Value::from("4.5")).unwrap(), Value::Float(4.5));
        assert_eq!(FloatType.cast(&Value::from("1e3x")).unwrap(), Value::Float(1000.0));
        assert_eq!(FloatType.cast(&Value::from("abc")).unwrap(), Value::Float(0.0));
        assert_eq!(FloatType.cast(&Value::from("")).unwrap(), Value::Null);
        assert!(matches!(
            FloatType.cast(&Value::from("Infinity")).unwrap(),
            Value::Float(f) if f.is_infinite()
        ));
    }

    #[test]
    fn test_cast_from_numbers() {
        assert_eq!(FloatType.cast(&Value::Integer(3)).unwrap(), Value::Float(3.0));
        assert_eq!(FloatType.cast(&Value::Boolean(false)).unwrap(), Value::Float(0.0));
    }
}
