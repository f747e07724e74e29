use super::CastType;
use crate::core::{Result, StoreError, Value};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Timelike, Utc};
use lazy_static::lazy_static;
use regex::Regex;

/// Fractional-second digits kept when no precision is given.
pub const DEFAULT_PRECISION: u8 = 6;

lazy_static! {
    static ref DATETIME: Regex = Regex::new(
        r"^\s*(\d{4})-(\d{1,2})-(\d{1,2})(?:[ T](\d{1,2}):(\d{2})(?::(\d{2})(?:\.(\d+))?)?)?\s*(Z|UTC|[+-]\d{2}:?\d{2})?\s*$"
    )
    .unwrap();
}

fn parse_offset(raw: Option<&str>) -> Option<FixedOffset> {
    let raw = match raw {
        None | Some("Z") | Some("UTC") => return FixedOffset::east_opt(0),
        Some(raw) => raw,
    };
    let sign = if raw.starts_with('-') { -1 } else { 1 };
    let digits: String = raw[1..].chars().filter(|c| c.is_ascii_digit()).collect();
    let hours: i32 = digits.get(0..2)?.parse().ok()?;
    let minutes: i32 = digits.get(2..4)?.parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}

fn parse_fraction(raw: Option<&str>) -> u32 {
    let Some(raw) = raw else {
        return 0;
    };
    let mut digits: String = raw.chars().take(9).collect();
    while digits.len() < 9 {
        digits.push('0');
    }
    digits.parse().unwrap_or(0)
}

/// Parses `YYYY-MM-DD[ HH:MM[:SS[.f]]][ zone]`, treating a missing zone as UTC.
pub(crate) fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(parsed) = DateTime::parse_from_rfc3339(s.trim()) {
        return Some(parsed.with_timezone(&Utc));
    }

    let captures = DATETIME.captures(s)?;
    let field = |idx: usize| captures.get(idx).map(|m| m.as_str());
    let number = |idx: usize| field(idx).and_then(|m| m.parse::<u32>().ok()).unwrap_or(0);

    let date = NaiveDate::from_ymd_opt(field(1)?.parse().ok()?, number(2), number(3))?;
    let time = date.and_hms_nano_opt(number(4), number(5), number(6), parse_fraction(field(7)))?;
    let offset = parse_offset(field(8))?;

    local_to_utc(&offset, time)
}

fn local_to_utc(offset: &FixedOffset, time: NaiveDateTime) -> Option<DateTime<Utc>> {
    offset
        .from_local_datetime(&time)
        .single()
        .map(|t| t.with_timezone(&Utc))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DateTimeType {
    precision: u8,
}

impl DateTimeType {
    pub fn new(precision: Option<u8>) -> Result<Self> {
        let precision = precision.unwrap_or(DEFAULT_PRECISION);
        if precision > 9 {
            return Err(StoreError::Configuration(format!(
                "datetime precision must be between 0 and 9, got {}",
                precision
            )));
        }
        Ok(Self { precision })
    }

    fn apply_precision(&self, t: DateTime<Utc>) -> DateTime<Utc> {
        let factor = 10u32.pow(9 - u32::from(self.precision));
        let nanos = t.nanosecond() / factor * factor;
        t.with_nanosecond(nanos).unwrap_or(t)
    }
}

impl Default for DateTimeType {
    fn default() -> Self {
        Self {
            precision: DEFAULT_PRECISION,
        }
    }
}

impl CastType for DateTimeType {
    fn name(&self) -> &'static str {
        "datetime"
    }

    fn cast(&self, value: &Value) -> Result<Value> {
        let parsed = match value {
            Value::Timestamp(t) => Some(*t),
            Value::Date(d) => d.and_hms_opt(0, 0, 0).map(|t| Utc.from_utc_datetime(&t)),
            Value::Text(s) => parse_timestamp(s),
            _ => None,
        };
        Ok(parsed
            .map(|t| Value::Timestamp(self.apply_precision(t)))
            .unwrap_or(Value::Null))
    }
}
