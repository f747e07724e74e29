//! Typed Store Demo
//!
//! Declares a model with a JSON settings column and a key-value flags
//! column, then walks through casting, defaults, saving, and change tracking.
//!
//! Run with: cargo run --example settings_store

use anyhow::Result;
use typed_store::{
    AccessorOptions, AttributeOptions, MemoryStorage, ModelClass, Record, StoreCoder, Value,
};

fn main() -> Result<()> {
    println!("=== Typed Store Demo ===\n");

    let account = ModelClass::builder("Account")
        .store("settings", StoreCoder::Json)
        .store_accessor("settings", &["theme"], AccessorOptions::new())?
        .store_attribute("settings", "locale", "string", AttributeOptions::new().default("en-US"))?
        .store_attribute("settings", "trial_ends", "date", AttributeOptions::new())?
        .store_attribute("settings", "seats", "integer", AttributeOptions::new().limit(2))?
        .store("flags", StoreCoder::KeyValue)
        .store_attribute("flags", "beta", "boolean", AttributeOptions::new().prefix_store())?
        .build()?;

    let mut storage = MemoryStorage::new().with_table("accounts", &["settings", "flags"])?;

    // 1. New records start from their defaults
    println!("1. Building a new account...");
    let mut record = Record::new(&account)?;
    println!("   locale = {}", record.get("locale")?);
    println!("   dirty? {}\n", record.is_changed());

    // 2. Writes are cast
    println!("2. Assigning loosely typed input...");
    record.set("seats", "12 seats")?;
    record.set("trial_ends", "01/03/2025")?;
    record.set("flags_beta", "t")?;
    record.set("theme", "dark")?;
    println!("   seats = {:?}", record.get("seats")?);
    println!("   trial_ends = {:?}", record.get("trial_ends")?);
    println!("   beta? {}", record.is("flags_beta")?);
    println!("   seats change = {:?}\n", record.key_change("seats")?);

    // 3. Saving stores the encoded columns
    println!("3. Saving...");
    record.save(&mut storage)?;
    let id = record.id().unwrap_or_default();
    println!("   settings column: {}", storage.raw_value("accounts", id, "settings")?);
    println!("   flags column:    {}", storage.raw_value("accounts", id, "flags")?);
    println!("   saved change to seats = {:?}\n", record.saved_change_to("seats")?);

    // 4. Loading re-casts and fills in defaults
    println!("4. Loading legacy data...");
    storage.update_raw("accounts", id, "settings", Value::from(r#"{"seats":"7"}"#))?;
    let loaded = Record::find(&account, &storage, id)?;
    println!("   seats = {:?}", loaded.get("seats")?);
    println!("   locale = {:?}\n", loaded.get("locale")?);

    // 5. Range checks happen on save
    println!("5. Saving an out-of-range value...");
    let mut oversized = Record::new_with(&account, [("seats", Value::Integer(100_000))])?;
    match oversized.save(&mut storage) {
        Ok(()) => println!("   unexpectedly saved"),
        Err(e) => println!("   rejected: {}", e),
    }

    println!("\n=== Demo Complete ===");
    Ok(())
}
