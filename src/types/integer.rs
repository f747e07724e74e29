use super::CastType;
use crate::core::{Result, StoreError, Value};
use lazy_static::lazy_static;
use regex::Regex;

/// Default byte limit of the `integer` identifier.
pub const DEFAULT_LIMIT: u8 = 4;

lazy_static! {
    static ref LEADING_INTEGER: Regex = Regex::new(r"^\s*([+-]?\d+(?:_\d+)*)").unwrap();
    static ref NUMERIC_START: Regex = Regex::new(r"^\s*[+-]?\d").unwrap();
}

/// Parses the leading integer of `s` the permissive way: `"12.02"` is 12,
/// `"abc"` is 0. Overflow saturates.
pub(crate) fn leading_integer(s: &str) -> i64 {
    let Some(captures) = LEADING_INTEGER.captures(s) else {
        return 0;
    };
    let digits = captures[1].replace('_', "");
    match digits.parse::<i128>() {
        Ok(n) => n.clamp(i64::MIN as i128, i64::MAX as i128) as i64,
        Err(_) => 0,
    }
}

pub(crate) fn is_numeric_string(s: &str) -> bool {
    NUMERIC_START.is_match(s)
}

/// Signed integer bounded by a byte `limit` on serialize.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegerType {
    limit: u8,
}

impl IntegerType {
    pub fn new(limit: u8) -> Result<Self> {
        if !(1..=8).contains(&limit) {
            return Err(StoreError::Configuration(format!(
                "integer limit must be between 1 and 8 bytes, got {}",
                limit
            )));
        }
        Ok(Self { limit })
    }

    pub fn limit(&self) -> u8 {
        self.limit
    }

    fn in_range(&self, value: i64) -> bool {
        let max = 1i128 << (u32::from(self.limit) * 8 - 1);
        let value = i128::from(value);
        value >= -max && value < max
    }
}

impl CastType for IntegerType {
    fn name(&self) -> &'static str {
        "integer"
    }

    fn cast(&self, value: &Value) -> Result<Value> {
        let cast = match value {
            Value::Null => Value::Null,
            Value::Boolean(b) => Value::Integer(i64::from(*b)),
            Value::Integer(i) => Value::Integer(*i),
            Value::Float(f) if f.is_finite() => Value::Integer(f.trunc() as i64),
            Value::Text(s) if s.trim().is_empty() => Value::Null,
            Value::Text(s) => Value::Integer(leading_integer(s)),
            Value::Timestamp(t) => Value::Integer(t.timestamp()),
            _ => Value::Null,
        };
        Ok(cast)
    }

    fn serialize(&self, value: &Value) -> Result<Value> {
        if let Value::Text(s) = value
            && !is_numeric_string(s)
        {
            return Ok(Value::Null);
        }

        let cast = self.cast(value)?;
        if let Value::Integer(i) = cast
            && !self.in_range(i)
        {
            return Err(StoreError::Range(format!(
                "{} is out of range for integer with limit {} bytes",
                i, self.limit
            )));
        }
        Ok(cast)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn integer() -> IntegerType {
        IntegerType::new(DEFAULT_LIMIT).unwrap()
    }

    #[test]
    fn test_permissive_cast() {
        let t = integer();
        assert_eq!(t.cast(&Value::from("25")).unwrap(), Value::Integer(25));
        assert_eq!(t.cast(&Value::from("123.123")).unwrap(), Value::Integer(123));
        assert_eq!(t.cast(&Value::from("not a number")).unwrap(), Value::Integer(0));
        assert_eq!(t.cast(&Value::from("  ")).unwrap(), Value::Null);
        assert_eq!(t.cast(&Value::Float(3.1999)).unwrap(), Value::Integer(3));
        assert_eq!(t.cast(&Value::Boolean(true)).unwrap(), Value::Integer(1));
        assert_eq!(t.cast(&Value::Float(f64::NAN)).unwrap(), Value::Null);
    }

    #[test]
    fn test_limit_enforced_on_serialize_only() {
        let t = IntegerType::new(1).unwrap();
        assert_eq!(t.cast(&Value::Integer(1024)).unwrap(), Value::Integer(1024));
        assert!(matches!(
            t.serialize(&Value::Integer(1024)),
            Err(StoreError::Range(_))
        ));
        assert_eq!(t.serialize(&Value::Integer(127)).unwrap(), Value::Integer(127));
        assert_eq!(t.serialize(&Value::Integer(-128)).unwrap(), Value::Integer(-128));
        assert!(t.serialize(&Value::Integer(128)).is_err());
    }

    #[test]
    fn test_serialize_drops_non_numeric_text() {
        assert_eq!(integer().serialize(&Value::from("abc")).unwrap(), Value::Null);
    }

    #[test]
    fn test_eight_byte_limit_covers_i64() {
        let t = IntegerType::new(8).unwrap();
        assert!(t.serialize(&Value::Integer(i64::MAX)).is_ok());
        assert!(t.serialize(&Value::Integer(i64::MIN)).is_ok());
    }
}
