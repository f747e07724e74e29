pub mod error;
pub mod keys;
pub mod value;

pub use error::{Result, StoreError};
pub use keys::{canonical_key, deep_stringify_keys, stringify_keys, symbol_key};
pub use value::{Container, Value};
