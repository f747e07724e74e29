//! Row storage boundary used by `Record::save`, `reload`, and `find`.
//!
//! Rows hold raw column values exactly as the store coders produced them
//! (`Text` or `Null`).

pub mod memory;
pub mod table;

use crate::core::{Result, Value};
use std::collections::BTreeMap;

pub use memory::MemoryStorage;
pub use table::MemoryTable;

pub type RawRow = BTreeMap<String, Value>;

pub trait RecordStorage {
    /// Stores a new row and returns its id.
    fn insert(&mut self, table: &str, row: RawRow) -> Result<u64>;

    /// Overwrites the given columns of an existing row.
    fn update(&mut self, table: &str, id: u64, row: RawRow) -> Result<()>;

    fn fetch(&self, table: &str, id: u64) -> Result<RawRow>;
}
