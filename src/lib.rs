// ============================================================================
// typed_store Library
// ============================================================================

//! Typed, defaulted, dirty-tracked keys inside serialized store columns.
//!
//! A store column holds a string-keyed map encoded into a single raw value
//! (JSON or `"k"=>"v"` text). Declaring a key with [`ModelBuilder::store_attribute`]
//! gives it a cast type and an optional default; records then read, write,
//! and track changes of that key as if it were its own column.
//!
//! ```
//! use typed_store::{AttributeOptions, MemoryStorage, ModelClass, Record, StoreCoder, Value};
//!
//! # fn main() -> typed_store::Result<()> {
//! let user = ModelClass::builder("User")
//!     .store("settings", StoreCoder::Json)
//!     .store_attribute("settings", "age", "integer", AttributeOptions::new().default(18))?
//!     .store_attribute("settings", "active", "boolean", AttributeOptions::new())?
//!     .build()?;
//!
//! let mut storage = MemoryStorage::new().with_table("users", &["settings"])?;
//!
//! let mut record = Record::new(&user)?;
//! record.set("active", "1")?;
//! assert!(record.key_changed("active")?);
//! record.save(&mut storage)?;
//!
//! let loaded = Record::find(&user, &storage, record.id().unwrap_or_default())?;
//! assert_eq!(loaded.get("age")?, Value::Integer(18));
//! assert!(loaded.is("active")?);
//! # Ok(())
//! # }
//! ```

pub mod coder;
pub mod config;
pub mod core;
pub mod macros;
pub mod model;
pub mod prelude;
pub mod record;
pub mod storage;
pub mod store;
pub mod types;

// Re-export main types for convenience
pub use coder::{Coder, CoderRef, JsonCoder, KeyValueCoder, StoreCoder};
pub use config::StoreConfig;
pub use core::{Container, Result, StoreError, Value};
pub use macros::HasRecord;
pub use model::{
    Accessor, AccessorOptions, Affix, AttributeOptions, ModelBuilder, ModelClass, TypedKeyRegistry,
};
pub use record::{ChangeRecord, MutationTracker, Record};
pub use storage::{MemoryStorage, RawRow, RecordStorage};
pub use store::{ContainerType, DefaultResolver, DefaultSpec, KeyOptions, TypedStore};
pub use types::{CastType, CastTypeRef, TypeOptions, TypeRegistry, TypeSpec};

#[doc(hidden)]
pub use paste;
