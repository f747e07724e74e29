//! Recommended imports grouped by use.
//!
//! `models` covers declaring classes and working with records.
//! `types` is for registering custom cast types and coders.

pub mod models {
    //! Class declarations, records, and the accessor macro.
    pub use crate::{
        AccessorOptions, Affix, AttributeOptions, ChangeRecord, HasRecord, MemoryStorage,
        ModelClass, Record, RecordStorage, Result, StoreCoder, StoreError, Value,
        store_accessors,
    };
}

pub mod types {
    //! Extension points.
    pub use crate::coder::{Coder, CoderRef};
    pub use crate::core::{Container, canonical_key, symbol_key};
    pub use crate::store::{ContainerType, KeyOptions, TypedStore};
    pub use crate::types::{
        CastType, CastTypeRef, IntegerType, TypeOptions, TypeSpec, lookup, register,
    };
}
