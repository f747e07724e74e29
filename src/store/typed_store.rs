use super::{ContainerType, DefaultSpec};
use crate::core::{Container, Result, Value, canonical_key, symbol_key};
use crate::types::{CastType, CastTypeRef, TypeOptions, TypeSpec};

/// Declaration options of a single typed key.
#[derive(Debug, Clone, Default)]
pub struct KeyOptions {
    pub default: DefaultSpec,
    pub type_options: TypeOptions,
}

impl KeyOptions {
    pub fn new() -> Self {
        Self {
            default: DefaultSpec::Undefined,
            type_options: TypeOptions::default(),
        }
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = DefaultSpec::value(value);
        self
    }

    pub fn default_with<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = DefaultSpec::producer(producer);
        self
    }

    pub fn default_spec(mut self, default: DefaultSpec) -> Self {
        self.default = default;
        self
    }

    pub fn limit(mut self, limit: u8) -> Self {
        self.type_options.limit = Some(limit);
        self
    }

    pub fn precision(mut self, precision: u8) -> Self {
        self.type_options.precision = Some(precision);
        self
    }

    pub fn type_options(mut self, type_options: TypeOptions) -> Self {
        self.type_options = type_options;
        self
    }
}

#[derive(Debug, Clone)]
pub struct TypedKey {
    pub name: String,
    pub cast_type: CastTypeRef,
    pub default: DefaultSpec,
}

/// Store column type with per-key casting and defaults.
///
/// Wraps a [`ContainerType`]. Every conversion first runs the container's own
/// conversion, then walks the registered keys in declaration order:
///
/// - a present key goes through its type;
/// - an absent key with a default receives the default (raw, not cast) when
///   `fallback_to_default` is on;
/// - a non-map container is returned untouched.
///
/// Keys not registered here pass through unchanged.
#[derive(Debug, Clone)]
pub struct TypedStore {
    subtype: ContainerType,
    keys: Vec<TypedKey>,
    fallback_to_default: bool,
}

impl TypedStore {
    pub fn new(subtype: ContainerType) -> Self {
        Self {
            subtype,
            keys: Vec::new(),
            fallback_to_default: true,
        }
    }

    /// Builds a typed store over `base` with one more key.
    ///
    /// An existing `TypedStore` passed as `base` keeps its keys; callers pass a
    /// clone, so the original is left as it was.
    pub fn create_from_type(
        base: impl Into<TypedStore>,
        key: &str,
        spec: impl Into<TypeSpec>,
        options: KeyOptions,
    ) -> Result<Self> {
        let mut typed_store = base.into();
        typed_store.add_typed_key(key, spec, options)?;
        Ok(typed_store)
    }

    pub fn with_fallback(mut self, fallback_to_default: bool) -> Self {
        self.fallback_to_default = fallback_to_default;
        self
    }

    pub fn fallback_to_default(&self) -> bool {
        self.fallback_to_default
    }

    pub fn subtype(&self) -> &ContainerType {
        &self.subtype
    }

    /// Registers `key`, replacing any earlier declaration of the same key.
    pub fn add_typed_key(
        &mut self,
        key: &str,
        spec: impl Into<TypeSpec>,
        options: KeyOptions,
    ) -> Result<()> {
        let cast_type = spec.into().resolve(&options.type_options)?;
        let entry = TypedKey {
            name: canonical_key(key),
            cast_type,
            default: options.default,
        };

        match self.keys.iter_mut().find(|existing| existing.name == entry.name) {
            Some(existing) => *existing = entry,
            None => self.keys.push(entry),
        }
        Ok(())
    }

    pub fn keys(&self) -> impl Iterator<Item = &TypedKey> {
        self.keys.iter()
    }

    pub fn typed(&self, key: &str) -> bool {
        self.entry(key).is_some()
    }

    pub fn type_for(&self, key: &str) -> Option<&CastTypeRef> {
        self.entry(key).map(|entry| &entry.cast_type)
    }

    pub fn default_for(&self, key: &str) -> Option<&DefaultSpec> {
        self.entry(key)
            .map(|entry| &entry.default)
            .filter(|default| default.is_defined())
    }

    fn entry(&self, key: &str) -> Option<&TypedKey> {
        let key = canonical_key(key);
        self.keys.iter().find(|entry| entry.name == key)
    }

    pub fn cast(&self, value: &Value) -> Result<Value> {
        let container = self.subtype.cast(value)?;
        self.apply_keys(container, |cast_type, value| cast_type.cast(value))
    }

    pub fn deserialize(&self, value: &Value) -> Result<Value> {
        let container = self.subtype.deserialize(value)?;
        self.apply_keys(container, |cast_type, value| cast_type.deserialize(value))
    }

    fn apply_keys<F>(&self, container: Value, convert: F) -> Result<Value>
    where
        F: Fn(&dyn CastType, &Value) -> Result<Value>,
    {
        let Value::Map(mut map) = container else {
            return Ok(container);
        };

        for key in &self.keys {
            if let Some(current) = map.get_mut(&key.name) {
                *current = convert(key.cast_type.as_ref(), current)?;
            } else if self.fallback_to_default
                && let Some(default) = key.default.resolve()
            {
                map.insert(key.name.clone(), default);
            }
        }

        Ok(Value::Map(map))
    }

    /// Storage form. Each registered key is looked up as the exact key, then
    /// its symbol form, then (only when it has a default) the canonical key.
    /// A key found nowhere and without a default is left out of the pass.
    pub fn serialize(&self, value: &Value) -> Result<Value> {
        let Value::Map(map) = value else {
            return self.subtype.serialize(value);
        };

        let mut typed_casted = Container::new();
        for key in &self.keys {
            let Some(found) = Self::key_to_cast(map, key) else {
                continue;
            };

            let serialized = match map.get(&found) {
                Some(current) => key.cast_type.serialize(current)?,
                None => match key.default.resolve() {
                    Some(default) => key.cast_type.serialize(&default)?,
                    None => continue,
                },
            };
            typed_casted.insert(found, serialized);
        }

        let mut merged = map.clone();
        merged.extend(typed_casted);
        self.subtype.serialize(&Value::Map(merged))
    }

    fn key_to_cast(map: &Container, key: &TypedKey) -> Option<String> {
        if map.contains_key(&key.name) {
            return Some(key.name.clone());
        }
        let symbol = symbol_key(&key.name);
        if map.contains_key(&symbol) {
            return Some(symbol);
        }
        key.default.is_defined().then(|| key.name.clone())
    }

    /// Keyed write; typed keys are cast first.
    pub fn write(&self, container: &mut Value, key: &str, value: Value) -> Result<()> {
        let value = match self.type_for(key) {
            Some(cast_type) => cast_type.cast(&value)?,
            None => value,
        };
        self.subtype.write(container, key, value);
        Ok(())
    }

    pub fn read(&self, container: &Value, key: &str) -> Value {
        self.subtype.read(container, key)
    }

    /// Fresh container holding every declared default. Producers run once each.
    pub fn build_defaults(&self) -> Container {
        self.keys
            .iter()
            .filter_map(|key| key.default.resolve().map(|value| (key.name.clone(), value)))
            .collect()
    }
}

impl From<ContainerType> for TypedStore {
    fn from(subtype: ContainerType) -> Self {
        Self::new(subtype)
    }
}
