mod common;

use chrono::{TimeZone, Utc};
use common::{date, default_date, map, storage, today, user_class};
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};
use typed_store::core::{Result, StoreError, Value};
use typed_store::{AttributeOptions, MemoryStorage, ModelClass, Record, StoreCoder};

fn login_time() -> Value {
    Value::Timestamp(Utc.with_ymd_and_hms(2015, 2, 14, 17, 0, 0).unwrap())
}

fn raw_json(storage: &MemoryStorage, id: u64, column: &str) -> serde_json::Value {
    let raw = storage.raw_value("users", id, column).unwrap();
    serde_json::from_str(raw.as_str().unwrap()).unwrap()
}

#[test]
fn test_hstore_typecasts_on_build() -> Result<()> {
    let user = Record::new_with(
        &user_class(),
        [("visible", Value::from("t")), ("login_at", Value::from("2015-02-14 17:00"))],
    )?;

    assert_eq!(user.get("visible")?, Value::Boolean(true));
    assert!(user.is("visible")?);
    assert_eq!(user.get("login_at")?, login_time());
    Ok(())
}

#[test]
fn test_hstore_stores_text_and_recasts_on_load() -> Result<()> {
    let class = user_class();
    let mut storage = storage();

    let mut user = Record::new(&class)?;
    user.set("visible", false)?;
    user.set("login_at", "2015-02-14 17:00")?;
    user.save(&mut storage)?;
    let id = user.id().unwrap();

    let user = Record::find(&class, &storage, id)?;
    assert_eq!(user.get("visible")?, Value::Boolean(false));
    assert!(!user.is("visible")?);
    assert_eq!(user.get("login_at")?, login_time());

    let raw = storage.raw_value("users", id, "hdata")?;
    assert_eq!(
        raw,
        Value::from(r#""login_at"=>"2015-02-14 17:00:00 UTC", "visible"=>"false""#)
    );
    Ok(())
}

#[test]
fn test_range_error_aborts_save() -> Result<()> {
    let class = user_class();
    let mut storage = storage();

    let mut user = Record::new_with(&class, [("ratio", Value::Integer(1024))])?;
    assert!(matches!(user.save(&mut storage), Err(StoreError::Range(_))));
    assert!(storage.table("users")?.is_empty());
    assert!(!user.is_persisted());
    Ok(())
}

#[test]
fn test_json_typecasts_on_build() -> Result<()> {
    let user = Record::new_with(
        &user_class(),
        [
            ("active", Value::from("true")),
            ("salary", Value::Float(3.1999)),
            ("birthday", Value::from("2000-01-01")),
        ],
    )?;

    assert!(user.is("active")?);
    assert_eq!(user.get("salary")?, Value::Integer(3));
    assert_eq!(user.get("birthday")?, date(2000, 1, 1));
    assert_eq!(user.store("jparams")?.dig("birthday"), Some(&date(2000, 1, 1)));
    assert_eq!(user.store("jparams")?.dig("active"), Some(&Value::Boolean(true)));
    Ok(())
}

#[test]
fn test_whole_store_assignment_is_cast() -> Result<()> {
    let class = user_class();
    let mut storage = storage();

    let mut user = Record::new_with(
        &class,
        [(
            "jparams",
            map(&[
                ("active", Value::from("1")),
                ("birthday", Value::from("01/01/2000")),
                (":salary", Value::from("3.14")),
            ]),
        )],
    )?;
    assert_eq!(user.get("salary")?, Value::Integer(3));
    user.save(&mut storage)?;

    let user = Record::find(&class, &storage, user.id().unwrap())?;
    assert!(user.is("active")?);
    assert_eq!(user.get("salary")?, Value::Integer(3));
    assert_eq!(user.get("birthday")?, date(2000, 1, 1));
    Ok(())
}

#[test]
fn test_saved_json_holds_storage_forms() -> Result<()> {
    let class = user_class();
    let mut storage = storage();

    let mut user = Record::new(&class)?;
    user.set("active", 1)?;
    assert_eq!(user.store("jparams")?.dig("active"), Some(&Value::Boolean(true)));

    user.write_store(
        "jparams",
        map(&[
            (":active", Value::from("true")),
            (":salary", Value::from("123.123")),
            (":birthday", Value::from("01/01/2012")),
        ]),
    )?;
    assert!(user.is("active")?);
    assert_eq!(user.get("birthday")?, date(2012, 1, 1));
    assert_eq!(user.get("salary")?, Value::Integer(123));
    user.save(&mut storage)?;

    let raw = raw_json(&storage, user.id().unwrap(), "jparams");
    assert_eq!(raw["active"], serde_json::json!(true));
    assert_eq!(raw["birthday"], serde_json::json!("2012-01-01"));
    assert_eq!(raw["salary"], serde_json::json!(123));
    Ok(())
}

#[test]
fn test_legacy_raw_data_is_recast() -> Result<()> {
    let class = user_class();
    let mut storage = storage();

    let mut user = Record::new(&class)?;
    user.save(&mut storage)?;
    let id = user.id().unwrap();
    storage.update_raw("users", id, "jparams", Value::from(r#"{"active":"1","salary":"12.02"}"#))?;

    let mut user = Record::find(&class, &storage, id)?;
    assert!(user.is("active")?);
    assert_eq!(user.get("salary")?, Value::Integer(12));

    user.set("salary", 13)?;
    user.save(&mut storage)?;

    let raw = raw_json(&storage, id, "jparams");
    assert_eq!(raw["active"], serde_json::json!(true));
    assert_eq!(raw["salary"], serde_json::json!(13));
    Ok(())
}

#[test]
fn test_custom_type() -> Result<()> {
    let class = user_class();
    let mut storage = storage();

    let user = Record::new_with(&class, [("price", Value::from("$1"))])?;
    assert_eq!(user.get("price")?, Value::Integer(100));

    let mut user = Record::new_with(&class, [("custom", map(&[(":price", Value::from("$12"))]))])?;
    user.save(&mut storage)?;
    user.reload(&storage)?;
    assert_eq!(user.get("price")?, Value::Integer(1200));

    let user = Record::find(&class, &storage, user.id().unwrap())?;
    assert_eq!(user.get("price")?, Value::Integer(1200));
    Ok(())
}

#[test]
fn test_json_subtype_is_encoded_once() -> Result<()> {
    let class = user_class();
    let mut storage = storage();

    let mut user = Record::new_with(&class, [("inner_json", map(&[(":x", Value::Integer(1))]))])?;
    assert_eq!(user.get("inner_json")?, map(&[("x", Value::Integer(1))]));
    user.save(&mut storage)?;

    let raw = raw_json(&storage, user.id().unwrap(), "jparams");
    assert_eq!(raw["inner_json"], serde_json::json!({"x": 1}));

    user.reload(&storage)?;
    assert_eq!(user.get("inner_json")?, map(&[("x", Value::Integer(1))]));
    Ok(())
}

#[test]
fn test_defaults_on_new_and_loaded_records() -> Result<()> {
    let class = user_class();
    let mut storage = storage();

    let user = Record::new(&class)?;
    assert_eq!(user.get("static_date")?, default_date());
    assert_eq!(user.get("dynamic_date")?, today());
    assert_eq!(user.get("safe_locale")?, Value::from(common::DEFAULT_LOCALE));
    assert_eq!(user.get("empty_date")?, Value::Null);

    let user = Record::new_with(&class, [("static_date", date(2020, 1, 1))])?;
    assert_eq!(user.get("static_date")?, date(2020, 1, 1));

    let user = Record::new_with(&class, [("static_date", Value::Null)])?;
    assert_eq!(user.get("static_date")?, Value::Null);

    let mut user = Record::new(&class)?;
    user.save(&mut storage)?;
    let user = Record::find(&class, &storage, user.id().unwrap())?;
    assert_eq!(user.get("static_date")?, default_date());
    assert_eq!(user.get("dynamic_date")?, today());
    assert_eq!(user.get("empty_date")?, Value::Null);
    Ok(())
}

#[test]
fn test_absent_keys_get_defaults_on_load() -> Result<()> {
    let class = user_class();
    let mut storage = storage();

    let mut user = Record::new(&class)?;
    user.save(&mut storage)?;
    let id = user.id().unwrap();
    storage.update_raw("users", id, "jparams", Value::from("{}"))?;

    let user = Record::find(&class, &storage, id)?;
    assert_eq!(user.get("static_date")?, default_date());
    assert_eq!(user.get("safe_locale")?, Value::from(common::DEFAULT_LOCALE));
    assert_eq!(user.get("birthday")?, Value::Null);
    assert!(user.store("jparams")?.dig("birthday").is_none());
    Ok(())
}

#[test]
fn test_producer_defaults_are_not_shared() -> Result<()> {
    let class = user_class();
    let mut first = Record::new(&class)?;
    let second = Record::new(&class)?;

    if let Some(Value::Array(tags)) = first.store_mut("jparams")?.get_mut("tags") {
        tags.push(Value::from("rust"));
    }

    assert_eq!(first.get("tags")?, Value::Array(vec![Value::from("rust")]));
    assert_eq!(second.get("tags")?, Value::Array(Vec::new()));
    Ok(())
}

#[test]
fn test_prefix_and_suffix_accessors() -> Result<()> {
    let class = user_class();
    let mut storage = storage();

    let mut user = Record::new_with(
        &class,
        [
            ("json_active_value", Value::from("t")),
            ("json_birthday_value", Value::from("2019-06-26")),
        ],
    )?;
    user.save(&mut storage)?;

    let mut user = Record::find(&class, &storage, user.id().unwrap())?;
    assert_eq!(user.get("json_active_value")?, Value::Boolean(true));
    assert!(user.is("json_active_value")?);
    assert_eq!(user.get("json_birthday_value")?, date(2019, 6, 26));
    assert_eq!(user.get("active")?, Value::Boolean(true));

    user.set("json_active_value", false)?;
    assert!(user.key_changed("json_active_value")?);
    user.save(&mut storage)?;

    assert_eq!(
        user.saved_change_to("json_active_value")?,
        Some((Value::Boolean(true), Value::Boolean(false)))
    );
    Ok(())
}

#[test]
fn test_untyped_accessor_passes_values_through() -> Result<()> {
    let mut user = Record::new(&user_class())?;
    user.set("version", "1.0")?;
    assert_eq!(user.get("version")?, Value::from("1.0"));
    assert!(matches!(user.is("version"), Err(StoreError::NotAPredicate(_))));
    Ok(())
}

#[test]
fn test_plain_store_without_accessors() -> Result<()> {
    let class = ModelClass::builder("Dummy")
        .table_name("users")
        .store("custom", StoreCoder::Json)
        .build()?;

    let dummy = Record::new_with(&class, [("custom", map(&[(":key", Value::from("text"))]))])?;
    assert_eq!(dummy.store("custom")?, &map(&[("key", Value::from("text"))]));
    Ok(())
}

#[test]
fn test_lookup_errors() -> Result<()> {
    let class = user_class();
    let mut user = Record::new(&class)?;

    assert!(matches!(user.get("missing"), Err(StoreError::UnknownAccessor(_, _))));
    assert!(matches!(user.store("nope"), Err(StoreError::StoreNotFound(_, _))));
    assert!(matches!(
        user.write_store_attribute("nope", "x", 1),
        Err(StoreError::StoreNotFound(_, _))
    ));
    assert!(matches!(
        Record::find(&class, &storage(), 42),
        Err(StoreError::RecordNotFound(42, _))
    ));
    Ok(())
}

#[test]
fn test_missing_column_fails_at_save() -> Result<()> {
    let class = user_class();
    let mut storage = MemoryStorage::new().with_table("users", &["jparams", "custom"])?;

    let mut user = Record::new(&class)?;
    assert!(matches!(
        user.save(&mut storage),
        Err(StoreError::ColumnNotFound(column, _)) if column == "hdata"
    ));
    Ok(())
}

#[test]
fn test_saved_unset_default_matches_what_was_read() -> Result<()> {
    let counter = Arc::new(AtomicI64::new(100));
    let serials = Arc::clone(&counter);
    let tokens = Arc::clone(&counter);
    let class = ModelClass::builder("Ticket")
        .unset_values_fallback_to_default(false)
        .read_unset_returns_default(true)
        .store("data", StoreCoder::Json)
        .store_attribute(
            "data",
            "serial",
            "integer",
            AttributeOptions::new().default_with(move || Value::Integer(serials.fetch_add(1, Ordering::SeqCst))),
        )?
        .store_attribute(
            "data",
            "token",
            "integer",
            AttributeOptions::new().default_with(move || Value::Integer(tokens.fetch_add(1, Ordering::SeqCst))),
        )?
        .build()?;
    let mut storage = MemoryStorage::new().with_table("tickets", &["data"])?;

    let mut ticket = Record::new(&class)?;
    ticket.save(&mut storage)?;
    let id = ticket.id().unwrap();
    storage.update_raw("tickets", id, "data", Value::from("{}"))?;

    let mut loaded = Record::find(&class, &storage, id)?;
    let serial = loaded.get("serial")?;
    assert_eq!(loaded.get("serial")?, serial);
    assert_eq!(loaded.store("data")?.dig("serial"), None);

    loaded.save(&mut storage)?;
    let raw = storage.raw_value("tickets", id, "data")?;
    let saved: serde_json::Value = serde_json::from_str(raw.as_str().unwrap()).unwrap();
    assert_eq!(saved["serial"], serial.to_json());
    assert_eq!(saved["token"], loaded.get("token")?.to_json());

    let token = loaded.get("token")?;
    loaded.reload(&storage)?;
    assert_eq!(loaded.get("serial")?, serial);
    assert_eq!(loaded.get("token")?, token);
    assert_eq!(Record::find(&class, &storage, id)?.get("serial")?, serial);
    Ok(())
}

#[test]
fn test_non_finite_floats_survive_save() -> Result<()> {
    let class = ModelClass::builder("Gauge")
        .store("readings", StoreCoder::Json)
        .store_attribute("readings", "peak", "float", AttributeOptions::new())?
        .store_attribute("readings", "noise", "float", AttributeOptions::new())?
        .store("limits", StoreCoder::KeyValue)
        .store_attribute("limits", "floor", "float", AttributeOptions::new())?
        .build()?;
    let mut storage = MemoryStorage::new().with_table("gauges", &["readings", "limits"])?;

    let mut gauge = Record::new_with(
        &class,
        [
            ("peak", Value::from("Infinity")),
            ("noise", Value::Float(f64::NAN)),
            ("floor", Value::Float(f64::NEG_INFINITY)),
        ],
    )?;
    gauge.save(&mut storage)?;
    let id = gauge.id().unwrap();

    assert_eq!(
        storage.raw_value("gauges", id, "readings")?,
        Value::from(r#"{"noise":"NaN","peak":"Infinity"}"#)
    );

    let loaded = Record::find(&class, &storage, id)?;
    assert_eq!(loaded.get("peak")?, Value::Float(f64::INFINITY));
    assert!(matches!(loaded.get("noise")?, Value::Float(f) if f.is_nan()));
    assert_eq!(loaded.get("floor")?, Value::Float(f64::NEG_INFINITY));
    Ok(())
}
