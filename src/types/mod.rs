//! Scalar cast types and the lookup registry that resolves type identifiers.
//!
//! Every type is a small plugin implementing [`CastType`]. The registry maps
//! identifiers such as `"integer"` or `"date"` (plus [`TypeOptions`]) to a
//! shared type object.

pub mod boolean;
pub mod date;
pub mod datetime;
pub mod float;
pub mod integer;
pub mod json;
pub mod passthrough;
pub mod string;
pub mod uuid;

use crate::core::{Result, StoreError, Value, canonical_key};
use lazy_static::lazy_static;
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, RwLock};
use tracing::debug;

pub use boolean::BooleanType;
pub use date::DateType;
pub use datetime::DateTimeType;
pub use float::FloatType;
pub use integer::IntegerType;
pub use json::JsonType;
pub use passthrough::ValueType;
pub use string::StringType;
pub use uuid::UuidType;

/// A scalar type descriptor.
///
/// All three conversions map `Null` to `Null`. Loosely typed input is coerced
/// rather than rejected; only domain limits (such as an integer byte limit)
/// produce errors.
pub trait CastType: fmt::Debug + Send + Sync {
    fn name(&self) -> &'static str;

    /// Converts user input into the in-memory representation.
    fn cast(&self, value: &Value) -> Result<Value>;

    /// Converts a value read back from storage.
    fn deserialize(&self, value: &Value) -> Result<Value> {
        self.cast(value)
    }

    /// Converts an in-memory value into its storage form.
    fn serialize(&self, value: &Value) -> Result<Value> {
        self.cast(value)
    }

    /// Boolean types get a predicate accessor.
    fn is_boolean(&self) -> bool {
        false
    }
}

pub type CastTypeRef = Arc<dyn CastType>;

/// Options passed to a type factory during lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeOptions {
    pub limit: Option<u8>,
    pub precision: Option<u8>,
    pub scale: Option<u8>,
}

impl TypeOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn limit(mut self, limit: u8) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn precision(mut self, precision: u8) -> Self {
        self.precision = Some(precision);
        self
    }

    pub fn scale(mut self, scale: u8) -> Self {
        self.scale = Some(scale);
        self
    }
}

/// How a typed key names its type: an identifier to look up, or a ready type object.
#[derive(Clone)]
pub enum TypeSpec {
    Named(String),
    Type(CastTypeRef),
}

impl TypeSpec {
    /// Resolves against the global registry.
    pub fn resolve(&self, options: &TypeOptions) -> Result<CastTypeRef> {
        match self {
            Self::Named(name) => lookup(name, options),
            Self::Type(cast_type) => Ok(cast_type.clone()),
        }
    }
}

impl fmt::Debug for TypeSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Named(name) => write!(f, "TypeSpec::Named({})", name),
            Self::Type(cast_type) => write!(f, "TypeSpec::Type({})", cast_type.name()),
        }
    }
}

impl From<&str> for TypeSpec {
    fn from(name: &str) -> Self {
        Self::Named(name.to_string())
    }
}

impl From<String> for TypeSpec {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}

impl From<CastTypeRef> for TypeSpec {
    fn from(cast_type: CastTypeRef) -> Self {
        Self::Type(cast_type)
    }
}

pub type TypeFactory = Arc<dyn Fn(&TypeOptions) -> Result<CastTypeRef> + Send + Sync>;

/// Registry of type factories keyed by identifier.
pub struct TypeRegistry {
    factories: HashMap<String, TypeFactory>,
}

impl TypeRegistry {
    pub fn new() -> Self {
        Self {
            factories: HashMap::new(),
        }
    }

    /// Registers (or replaces) a factory under `name`.
    pub fn register<F>(&mut self, name: &str, factory: F)
    where
        F: Fn(&TypeOptions) -> Result<CastTypeRef> + Send + Sync + 'static,
    {
        let name = normalize_type_name(name);
        debug!(type_name = %name, "registered cast type");
        self.factories.insert(name, Arc::new(factory));
    }

    /// Registers a fixed type instance that ignores options.
    pub fn register_type(&mut self, name: &str, cast_type: CastTypeRef) {
        self.register(name, move |_| Ok(cast_type.clone()));
    }

    /// Registry populated with every built-in type.
    pub fn with_default_types() -> Self {
        let mut registry = Self::new();

        registry.register("integer", |options| {
            Ok(Arc::new(IntegerType::new(
                options.limit.unwrap_or(integer::DEFAULT_LIMIT),
            )?) as CastTypeRef)
        });
        registry.register("big_integer", |options| {
            Ok(Arc::new(IntegerType::new(options.limit.unwrap_or(8))?) as CastTypeRef)
        });
        registry.register("float", |_| Ok(Arc::new(FloatType) as CastTypeRef));
        registry.register("string", |_| Ok(Arc::new(StringType::new("string")) as CastTypeRef));
        registry.register("text", |_| Ok(Arc::new(StringType::new("text")) as CastTypeRef));
        registry.register("boolean", |_| Ok(Arc::new(BooleanType) as CastTypeRef));
        registry.register("date", |_| Ok(Arc::new(DateType) as CastTypeRef));
        registry.register("datetime", |options| {
            Ok(Arc::new(DateTimeType::new(options.precision)?) as CastTypeRef)
        });
        registry.register("timestamp", |options| {
            Ok(Arc::new(DateTimeType::new(options.precision)?) as CastTypeRef)
        });
        registry.register("json", |_| Ok(Arc::new(JsonType) as CastTypeRef));
        registry.register("uuid", |_| Ok(Arc::new(UuidType) as CastTypeRef));
        registry.register("value", |_| Ok(Arc::new(ValueType) as CastTypeRef));

        registry
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&normalize_type_name(name))
    }

    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.factories.keys().cloned().collect();
        names.sort();
        names
    }

    pub fn lookup(&self, name: &str, options: &TypeOptions) -> Result<CastTypeRef> {
        let normalized = normalize_type_name(name);
        let factory = self
            .factories
            .get(&normalized)
            .ok_or_else(|| StoreError::UnknownType(normalized.clone()))?;
        factory(options)
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_default_types()
    }
}

fn normalize_type_name(name: &str) -> String {
    canonical_key(name.trim()).to_ascii_lowercase()
}

lazy_static! {
    static ref GLOBAL_TYPES: RwLock<TypeRegistry> = RwLock::new(TypeRegistry::with_default_types());
}

/// Resolves `name` through the process-wide registry.
pub fn lookup(name: &str, options: &TypeOptions) -> Result<CastTypeRef> {
    GLOBAL_TYPES.read()?.lookup(name, options)
}

/// Adds a factory to the process-wide registry. Call during bootstrap,
/// before the model classes that use it are built.
pub fn register<F>(name: &str, factory: F) -> Result<()>
where
    F: Fn(&TypeOptions) -> Result<CastTypeRef> + Send + Sync + 'static,
{
    GLOBAL_TYPES.write()?.register(name, factory);
    Ok(())
}
