use crate::store::DefaultSpec;
use crate::types::CastTypeRef;
use im::{OrdMap, Vector};
use std::sync::Arc;

/// One `store_attribute` declaration.
#[derive(Debug, Clone)]
pub struct KeyDefinition {
    pub store: String,
    pub key: String,
    pub cast_type: CastTypeRef,
    pub default: DefaultSpec,
    /// Class that declared the key.
    pub owner: String,
}

/// Typed key declarations of a class, per store, in declaration order.
///
/// Definitions live in a persistent arena; each class holds its own index of
/// arena slots. Cloning shares both structures, so a subclass starts from its
/// parent's declarations and later declarations on either side stay local.
#[derive(Debug, Clone, Default)]
pub struct TypedKeyRegistry {
    arena: Vector<Arc<KeyDefinition>>,
    index: OrdMap<String, Vector<usize>>,
}

impl TypedKeyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records `definition`, returning the definition it replaced, if any.
    ///
    /// A re-declaration takes a new arena slot and repoints the index at it.
    /// The replaced slot is never reclaimed, since a parent or sibling registry
    /// may still index it, so the arena grows by one per declaration.
    pub fn declare(&mut self, definition: KeyDefinition) -> Option<Arc<KeyDefinition>> {
        let slot = self.arena.len();
        let store = definition.store.clone();
        let key = definition.key.clone();
        self.arena.push_back(Arc::new(definition));

        let mut slots = self.index.get(&store).cloned().unwrap_or_default();
        let existing = slots
            .iter()
            .position(|&candidate| self.arena[candidate].key == key);

        let replaced = match existing {
            Some(position) => {
                let previous = self.arena[slots[position]].clone();
                slots.set(position, slot);
                Some(previous)
            }
            None => {
                slots.push_back(slot);
                None
            }
        };

        self.index.insert(store, slots);
        replaced
    }

    pub fn get(&self, store: &str, key: &str) -> Option<Arc<KeyDefinition>> {
        self.index.get(store)?.iter().find_map(|&slot| {
            let definition = &self.arena[slot];
            (definition.key == key).then(|| definition.clone())
        })
    }

    pub fn entries(&self, store: &str) -> Vec<Arc<KeyDefinition>> {
        self.index
            .get(store)
            .map(|slots| slots.iter().map(|&slot| self.arena[slot].clone()).collect())
            .unwrap_or_default()
    }

    pub fn stores(&self) -> Vec<String> {
        self.index.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.index.values().map(|slots| slots.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Arena slots in use, live or replaced.
    pub fn arena_len(&self) -> usize {
        self.arena.len()
    }
}
