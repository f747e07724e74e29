use super::CastType;
use crate::core::{Result, Value};
use chrono::NaiveDate;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref ISO_DATE: Regex = Regex::new(r"^\s*(\d{4})-(\d{1,2})-(\d{1,2})").unwrap();
}

const FALLBACK_FORMATS: [&str; 3] = ["%d/%m/%Y", "%Y/%m/%d", "%d.%m.%Y"];

/// Parses an ISO date (time suffix ignored) or one of the fallback layouts.
pub(crate) fn parse_date(s: &str) -> Option<NaiveDate> {
    if let Some(captures) = ISO_DATE.captures(s) {
        let year = captures[1].parse().ok()?;
        let month = captures[2].parse().ok()?;
        let day = captures[3].parse().ok()?;
        return NaiveDate::from_ymd_opt(year, month, day);
    }

    let trimmed = s.trim();
    FALLBACK_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DateType;

impl CastType for DateType {
    fn name(&self) -> &'static str {
        "date"
    }

    fn cast(&self, value: &Value) -> Result<Value> {
        let cast = match value {
            Value::Date(d) => Value::Date(*d),
            Value::Timestamp(t) => Value::Date(t.date_naive()),
            Value::Text(s) => parse_date(s).map(Value::Date).unwrap_or(Value::Null),
            _ => Value::Null,
        };
        Ok(cast)
    }
}
