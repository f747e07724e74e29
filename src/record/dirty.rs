use crate::core::Value;
use std::collections::BTreeMap;

/// `(previous, current)` value of a column.
pub type ChangeRecord = (Value, Value);

/// Drops every key present on both sides with an equal value.
///
/// Non-map sides are returned as they are.
pub fn strip_equal_entries(previous: Value, current: Value) -> ChangeRecord {
    match (previous, current) {
        (Value::Map(mut previous), Value::Map(mut current)) => {
            let equal: Vec<String> = previous
                .iter()
                .filter(|(key, value)| current.get(*key) == Some(*value))
                .map(|(key, _)| key.clone())
                .collect();
            for key in equal {
                previous.remove(&key);
                current.remove(&key);
            }
            (Value::Map(previous), Value::Map(current))
        }
        pair => pair,
    }
}

/// Column-level change tracking for one record.
///
/// Store columns are compared after [`strip_equal_entries`], so a change
/// record only carries the keys that actually differ.
#[derive(Debug, Clone, Default)]
pub struct MutationTracker {
    original: BTreeMap<String, Value>,
    saved_changes: BTreeMap<String, ChangeRecord>,
}

impl MutationTracker {
    pub fn new(original: BTreeMap<String, Value>) -> Self {
        Self {
            original,
            saved_changes: BTreeMap::new(),
        }
    }

    pub fn original_value(&self, attribute: &str) -> Value {
        self.original.get(attribute).cloned().unwrap_or_default()
    }

    pub fn change_to_attribute(&self, attribute: &str, current: &Value) -> Option<ChangeRecord> {
        let (previous, current) = strip_equal_entries(self.original_value(attribute), current.clone());
        (previous != current).then_some((previous, current))
    }

    pub fn changed(&self, attribute: &str, current: &Value) -> bool {
        self.change_to_attribute(attribute, current).is_some()
    }

    pub fn changes(&self, attributes: &BTreeMap<String, Value>) -> BTreeMap<String, ChangeRecord> {
        attributes
            .iter()
            .filter_map(|(name, value)| {
                self.change_to_attribute(name, value)
                    .map(|change| (name.clone(), change))
            })
            .collect()
    }

    /// After a save: current changes become the saved ones and the baseline moves.
    pub fn changes_applied(&mut self, attributes: &BTreeMap<String, Value>) {
        self.saved_changes = self.changes(attributes);
        self.original = attributes.clone();
    }

    /// After a reload: nothing is dirty and nothing counts as saved.
    pub fn reset(&mut self, attributes: &BTreeMap<String, Value>) {
        self.saved_changes.clear();
        self.original = attributes.clone();
    }

    pub fn saved_changes(&self) -> &BTreeMap<String, ChangeRecord> {
        &self.saved_changes
    }

    pub fn saved_change_to_attribute(&self, attribute: &str) -> Option<&ChangeRecord> {
        self.saved_changes.get(attribute)
    }
}
