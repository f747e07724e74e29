use super::{MemoryTable, RawRow, RecordStorage};
use crate::core::{Result, StoreError, Value};
use std::collections::HashMap;
use tracing::trace;

/// Synchronous in-memory row store.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    tables: HashMap<String, MemoryTable>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_table(&mut self, name: &str, columns: &[&str]) -> Result<()> {
        if self.tables.contains_key(name) {
            return Err(StoreError::TableExists(name.to_string()));
        }
        self.tables.insert(name.to_string(), MemoryTable::new(name, columns));
        Ok(())
    }

    pub fn with_table(mut self, name: &str, columns: &[&str]) -> Result<Self> {
        self.create_table(name, columns)?;
        Ok(self)
    }

    pub fn table(&self, name: &str) -> Result<&MemoryTable> {
        self.tables
            .get(name)
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    fn table_mut(&mut self, name: &str) -> Result<&mut MemoryTable> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| StoreError::TableNotFound(name.to_string()))
    }

    /// Raw value of one column, as stored.
    pub fn raw_value(&self, table: &str, id: u64, column: &str) -> Result<Value> {
        let row = self.table(table)?.get(id)?;
        row.get(column)
            .cloned()
            .ok_or_else(|| StoreError::ColumnNotFound(column.to_string(), table.to_string()))
    }

    /// Writes a raw column value, bypassing every store type.
    pub fn update_raw(&mut self, table: &str, id: u64, column: &str, value: Value) -> Result<()> {
        let mut row = RawRow::new();
        row.insert(column.to_string(), value);
        self.update(table, id, row)
    }
}

impl RecordStorage for MemoryStorage {
    fn insert(&mut self, table: &str, row: RawRow) -> Result<u64> {
        let id = self.table_mut(table)?.insert(row)?;
        trace!(table, id, "row inserted");
        Ok(id)
    }

    fn update(&mut self, table: &str, id: u64, row: RawRow) -> Result<()> {
        self.table_mut(table)?.update(id, row)?;
        trace!(table, id, "row updated");
        Ok(())
    }

    fn fetch(&self, table: &str, id: u64) -> Result<RawRow> {
        self.table(table)?.get(id).cloned()
    }
}
