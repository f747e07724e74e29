//! Class-level declarations: stores, typed keys, and the accessor table.
//!
//! ```
//! use typed_store::{AttributeOptions, ModelClass, StoreCoder};
//!
//! # fn main() -> typed_store::Result<()> {
//! let user = ModelClass::builder("User")
//!     .store("settings", StoreCoder::Json)
//!     .store_attribute("settings", "age", "integer", AttributeOptions::new().default(18))?
//!     .store_attribute("settings", "active", "boolean", AttributeOptions::new())?
//!     .build()?;
//!
//! assert!(user.accessor("active")?.predicate);
//! # Ok(())
//! # }
//! ```

pub mod builder;
pub mod class;
pub mod options;
pub mod registry;

pub use builder::{ModelBuilder, default_table_name};
pub use class::{Accessor, ModelClass, StoreDefinition};
pub use options::{AccessorOptions, Affix, AttributeOptions};
pub use registry::{KeyDefinition, TypedKeyRegistry};
