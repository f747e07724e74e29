#![allow(dead_code)]

use chrono::{NaiveDate, Utc};
use std::sync::{Arc, Once};
use typed_store::core::{Result, Value};
use typed_store::types::{self, CastType, CastTypeRef, IntegerType};
use typed_store::{AccessorOptions, AttributeOptions, MemoryStorage, ModelClass, StoreCoder};

pub const DEFAULT_LOCALE: &str = "en-US";

pub fn default_date() -> Value {
    Value::Date(NaiveDate::from_ymd_opt(2019, 7, 17).unwrap())
}

pub fn today() -> Value {
    Value::Date(Utc::now().date_naive())
}

pub fn date(y: i32, m: u32, d: u32) -> Value {
    Value::Date(NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

pub fn map(pairs: &[(&str, Value)]) -> Value {
    Value::Map(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
}

/// Integer amount of cents; `"$1.5"` casts to 150.
#[derive(Debug)]
pub struct MoneyType {
    cents: IntegerType,
}

impl CastType for MoneyType {
    fn name(&self) -> &'static str {
        "money_type"
    }

    fn cast(&self, value: &Value) -> Result<Value> {
        match value {
            Value::Text(raw) if raw.contains('$') => {
                let dollars: f64 = raw.replace('$', "").trim().parse().unwrap_or(0.0);
                self.cents.cast(&Value::Float(dollars * 100.0))
            }
            other => self.cents.cast(other),
        }
    }

    fn serialize(&self, value: &Value) -> Result<Value> {
        self.cents.serialize(&self.cast(value)?)
    }
}

static REGISTER_MONEY: Once = Once::new();

pub fn register_money_type() {
    REGISTER_MONEY.call_once(|| {
        types::register("money_type", |_| {
            Ok(Arc::new(MoneyType {
                cents: IntegerType::new(8)?,
            }) as CastTypeRef)
        })
        .unwrap();
    });
}

/// Users keep three stores: `jparams` (JSON), `custom` (JSON), and `hdata` (key-value text).
pub fn user_class() -> Arc<ModelClass> {
    register_money_type();

    ModelClass::builder("User")
        .store_accessor("jparams", &["version"], AccessorOptions::new())
        .unwrap()
        .store_attribute("jparams", "active", "boolean", AttributeOptions::new())
        .unwrap()
        .store_attribute("jparams", "salary", "integer", AttributeOptions::new())
        .unwrap()
        .store_attribute("jparams", "birthday", "date", AttributeOptions::new())
        .unwrap()
        .store_attribute("jparams", "static_date", "date", AttributeOptions::new().default(default_date()))
        .unwrap()
        .store_attribute("jparams", "dynamic_date", "date", AttributeOptions::new().default_with(today))
        .unwrap()
        .store_attribute("jparams", "empty_date", "date", AttributeOptions::new().default(Value::Null))
        .unwrap()
        .store_attribute("jparams", "safe_locale", "string", AttributeOptions::new().default(DEFAULT_LOCALE))
        .unwrap()
        .store_attribute("jparams", "inner_json", "json", AttributeOptions::new())
        .unwrap()
        .store_attribute(
            "jparams",
            "tags",
            "value",
            AttributeOptions::new().default_with(|| Value::Array(Vec::new())),
        )
        .unwrap()
        .store_attribute(
            "jparams",
            "active",
            "boolean",
            AttributeOptions::new().prefix("json").suffix("value"),
        )
        .unwrap()
        .store_attribute(
            "jparams",
            "birthday",
            "date",
            AttributeOptions::new().prefix("json").suffix("value"),
        )
        .unwrap()
        .store("custom", StoreCoder::Json)
        .store_attribute("custom", "price", "money_type", AttributeOptions::new())
        .unwrap()
        .store_attribute("custom", "custom_date", "date", AttributeOptions::new())
        .unwrap()
        .store("hdata", StoreCoder::KeyValue)
        .store_attribute("hdata", "visible", "boolean", AttributeOptions::new())
        .unwrap()
        .store_attribute("hdata", "ratio", "integer", AttributeOptions::new().limit(1))
        .unwrap()
        .store_attribute("hdata", "login_at", "datetime", AttributeOptions::new())
        .unwrap()
        .build()
        .unwrap()
}

pub fn storage() -> MemoryStorage {
    MemoryStorage::new()
        .with_table("users", &["jparams", "custom", "hdata"])
        .unwrap()
}
