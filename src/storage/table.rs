use super::RawRow;
use crate::core::{Result, StoreError, Value};
use std::collections::BTreeMap;

/// Table with a fixed column list. Columns missing from a written row are `Null`.
#[derive(Debug, Clone)]
pub struct MemoryTable {
    name: String,
    columns: Vec<String>,
    rows: BTreeMap<u64, RawRow>,
    next_id: u64,
}

impl MemoryTable {
    pub fn new(name: &str, columns: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows: BTreeMap::new(),
            next_id: 1,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    fn check_columns(&self, row: &RawRow) -> Result<()> {
        match row.keys().find(|column| !self.columns.contains(column)) {
            Some(column) => Err(StoreError::ColumnNotFound(column.clone(), self.name.clone())),
            None => Ok(()),
        }
    }

    pub fn insert(&mut self, row: RawRow) -> Result<u64> {
        self.check_columns(&row)?;
        let id = self.next_id;
        self.next_id += 1;

        let mut stored: RawRow = self.columns.iter().map(|c| (c.clone(), Value::Null)).collect();
        stored.extend(row);
        self.rows.insert(id, stored);
        Ok(id)
    }

    pub fn update(&mut self, id: u64, row: RawRow) -> Result<()> {
        self.check_columns(&row)?;
        let stored = self
            .rows
            .get_mut(&id)
            .ok_or_else(|| StoreError::RecordNotFound(id, self.name.clone()))?;
        stored.extend(row);
        Ok(())
    }

    pub fn get(&self, id: u64) -> Result<&RawRow> {
        self.rows
            .get(&id)
            .ok_or_else(|| StoreError::RecordNotFound(id, self.name.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_fills_missing_columns() {
        let mut table = MemoryTable::new("users", &["settings", "extra"]);
        let mut row = RawRow::new();
        row.insert("settings".into(), Value::from("{}"));
        let id = table.insert(row).unwrap();

        let stored = table.get(id).unwrap();
        assert_eq!(stored.get("extra"), Some(&Value::Null));
        assert_eq!(stored.get("settings"), Some(&Value::from("{}")));
    }

    #[test]
    fn test_unknown_column_and_row() {
        let mut table = MemoryTable::new("users", &["settings"]);
        let mut row = RawRow::new();
        row.insert("nope".into(), Value::Null);
        assert!(matches!(
            table.insert(row.clone()),
            Err(StoreError::ColumnNotFound(column, _)) if column == "nope"
        ));
        assert!(matches!(table.update(9, RawRow::new()), Err(StoreError::RecordNotFound(9, _))));
    }
}
