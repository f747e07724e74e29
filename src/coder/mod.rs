//! Raw column encodings for store containers.

pub mod json;
pub mod key_value;

use crate::core::{Result, Value};
use std::fmt;
use std::sync::Arc;

pub use json::JsonCoder;
pub use key_value::KeyValueCoder;

/// Encode/decode strategy for a store column's raw text.
pub trait Coder: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    fn dump(&self, value: &Value) -> Result<String>;

    fn load(&self, raw: &str) -> Result<Value>;
}

pub type CoderRef = Arc<dyn Coder>;

/// Built-in coders, selectable when declaring a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreCoder {
    #[default]
    Json,
    KeyValue,
}

impl StoreCoder {
    pub fn build(self) -> CoderRef {
        match self {
            Self::Json => Arc::new(JsonCoder),
            Self::KeyValue => Arc::new(KeyValueCoder),
        }
    }
}
