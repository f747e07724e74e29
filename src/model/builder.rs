use super::class::{Accessor, ModelClass, StoreDefinition};
use super::options::{AccessorOptions, AttributeOptions, accessor_name};
use super::registry::{KeyDefinition, TypedKeyRegistry};
use crate::coder::{CoderRef, StoreCoder};
use crate::config;
use crate::core::{Result, canonical_key};
use crate::store::{ContainerType, DefaultResolver, KeyOptions, TypedStore};
use crate::types::TypeSpec;
use log::warn;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{Level, debug, event};

#[derive(Debug, Clone)]
struct PendingStore {
    coder: CoderRef,
    default_owner: String,
}

/// Class definition in progress.
///
/// Declarations are validated as they are made (unknown types fail here);
/// typed stores are assembled and installed by [`build`](Self::build).
#[derive(Debug)]
pub struct ModelBuilder {
    name: String,
    table_name: Option<String>,
    parent: Option<Arc<ModelClass>>,
    explicit_fallback: Option<bool>,
    explicit_read_unset: Option<bool>,
    explicit_register: Option<bool>,
    stores: BTreeMap<String, PendingStore>,
    registry: TypedKeyRegistry,
    accessors: BTreeMap<String, Accessor>,
    local_stored_attributes: BTreeMap<String, Vec<String>>,
}

impl ModelBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            table_name: None,
            parent: None,
            explicit_fallback: None,
            explicit_read_unset: None,
            explicit_register: None,
            stores: BTreeMap::new(),
            registry: TypedKeyRegistry::new(),
            accessors: BTreeMap::new(),
            local_stored_attributes: BTreeMap::new(),
        }
    }

    pub(crate) fn inherit(parent: &Arc<ModelClass>, name: &str) -> Self {
        let stores = parent
            .stores
            .iter()
            .map(|(store_name, store)| {
                (
                    store_name.clone(),
                    PendingStore {
                        coder: store.coder.clone(),
                        default_owner: store.default_owner.clone(),
                    },
                )
            })
            .collect();

        Self {
            name: name.to_string(),
            table_name: Some(parent.table_name.clone()),
            parent: Some(Arc::clone(parent)),
            explicit_fallback: None,
            explicit_read_unset: None,
            explicit_register: None,
            stores,
            registry: parent.registry.clone(),
            accessors: parent.accessors.clone(),
            local_stored_attributes: BTreeMap::new(),
        }
    }

    /// Defaults to the snake-cased class name with an `s`.
    pub fn table_name(mut self, table_name: &str) -> Self {
        self.table_name = Some(table_name.to_string());
        self
    }

    pub fn unset_values_fallback_to_default(mut self, enabled: bool) -> Self {
        self.explicit_fallback = Some(enabled);
        self
    }

    /// Overrides the global `read_unset_returns_default` for this class and its subclasses.
    pub fn read_unset_returns_default(mut self, enabled: bool) -> Self {
        self.explicit_read_unset = Some(enabled);
        self
    }

    /// Typed keys show up in `Record::attributes`, `changes`, and `saved_changes`.
    pub fn register_attributes(mut self, enabled: bool) -> Self {
        self.explicit_register = Some(enabled);
        self
    }

    /// Declares (or re-codes) a store column.
    pub fn store(mut self, store_name: &str, coder: StoreCoder) -> Self {
        self.declare_store(store_name, Some(coder.build()));
        self
    }

    pub fn store_with_coder(mut self, store_name: &str, coder: CoderRef) -> Self {
        self.declare_store(store_name, Some(coder));
        self
    }

    /// Keys go through the store as given; no cast is applied on write.
    pub fn store_accessor(
        mut self,
        store_name: &str,
        keys: &[&str],
        options: AccessorOptions,
    ) -> Result<Self> {
        self.declare_store(store_name, None);
        for key in keys {
            let key = canonical_key(key);
            self.define_accessor(store_name, &key, &options, false);
            self.add_local_stored_attribute(store_name, &key);
        }
        Ok(self)
    }

    pub fn store_attribute(
        mut self,
        store_name: &str,
        key: &str,
        type_spec: impl Into<TypeSpec>,
        options: AttributeOptions,
    ) -> Result<Self> {
        self.declare_store(store_name, None);

        let key = canonical_key(key);
        let cast_type = type_spec.into().resolve(&options.type_options)?;
        let predicate = cast_type.is_boolean();
        let has_default = options.default.is_defined();

        let replaced = self.registry.declare(KeyDefinition {
            store: store_name.to_string(),
            key: key.clone(),
            cast_type: cast_type.clone(),
            default: options.default.clone(),
            owner: self.name.clone(),
        });

        let replaced_default = replaced
            .as_ref()
            .is_some_and(|previous| previous.default.is_defined());

        if let Some(previous) = replaced
            && previous.cast_type.name() != cast_type.name()
        {
            warn!(
                "{}: {}.{} re-declared as {} (was {})",
                self.name,
                store_name,
                key,
                cast_type.name(),
                previous.cast_type.name()
            );
        }

        if (has_default || replaced_default)
            && let Some(store) = self.stores.get_mut(store_name)
        {
            store.default_owner = self.name.clone();
        }

        self.define_accessor(store_name, &key, &options.accessor_options(), predicate);
        self.add_local_stored_attribute(store_name, &key);
        Ok(self)
    }

    /// `store` plus untyped and typed accessors in one declaration.
    pub fn store_with_accessors(
        self,
        store_name: &str,
        coder: StoreCoder,
        untyped: &[&str],
        typed: Vec<(&str, TypeSpec)>,
    ) -> Result<Self> {
        let mut builder = self
            .store(store_name, coder)
            .store_accessor(store_name, untyped, AccessorOptions::new())?;
        for (key, type_spec) in typed {
            builder = builder.store_attribute(store_name, key, type_spec, AttributeOptions::new())?;
        }
        Ok(builder)
    }

    fn declare_store(&mut self, store_name: &str, coder: Option<CoderRef>) {
        if let Some(existing) = self.stores.get_mut(store_name) {
            if let Some(coder) = coder {
                existing.coder = coder;
            }
            return;
        }

        self.stores.insert(
            store_name.to_string(),
            PendingStore {
                coder: coder.unwrap_or_else(|| StoreCoder::Json.build()),
                default_owner: self.name.clone(),
            },
        );
    }

    fn define_accessor(
        &mut self,
        store_name: &str,
        key: &str,
        options: &AccessorOptions,
        predicate: bool,
    ) {
        let name = accessor_name(store_name, key, options.prefix.as_ref(), options.suffix.as_ref());
        self.accessors.insert(
            name.clone(),
            Accessor {
                name,
                store: store_name.to_string(),
                key: key.to_string(),
                predicate,
            },
        );
    }

    fn add_local_stored_attribute(&mut self, store_name: &str, key: &str) {
        let keys = self
            .local_stored_attributes
            .entry(store_name.to_string())
            .or_default();
        if !keys.iter().any(|existing| existing == key) {
            keys.push(key.to_string());
        }
    }

    /// Installs one typed store per store column. Defaults come from the
    /// default owner's resolver, attached here when this class owns them.
    pub fn build(self) -> Result<Arc<ModelClass>> {
        let global = config::current()?;
        let fallback = ModelClass::resolve_policy(
            self.explicit_fallback,
            self.parent.as_deref(),
            global.unset_values_fallback_to_default,
        );
        let parent = self.parent.as_deref();
        let read_unset = self
            .explicit_read_unset
            .or_else(|| parent.map(|parent| parent.read_unset_returns_default))
            .unwrap_or(global.read_unset_returns_default);
        let register_attributes = self
            .explicit_register
            .or_else(|| parent.map(|parent| parent.register_attributes))
            .unwrap_or(global.register_attributes);

        let mut stores = BTreeMap::new();
        for (store_name, pending) in self.stores {
            let mut typed = TypedStore::new(ContainerType::new(pending.coder.clone()))
                .with_fallback(fallback);
            for definition in self.registry.entries(&store_name) {
                typed.add_typed_key(
                    &definition.key,
                    TypeSpec::Type(definition.cast_type.clone()),
                    KeyOptions::new().default_spec(definition.default.clone()),
                )?;
            }

            let typed = Arc::new(typed);
            let inherited = inherited_resolver(
                parent,
                &self.name,
                &store_name,
                &pending.default_owner,
            );
            let resolver = match inherited {
                Some(resolver) => resolver,
                None => {
                    let resolver = Arc::new(DefaultResolver::new(&store_name));
                    resolver.attach(Arc::clone(&typed))?;
                    resolver
                }
            };

            debug!(
                class = %self.name,
                store = %store_name,
                coder = pending.coder.name(),
                typed_keys = typed.keys().count(),
                "typed store installed"
            );

            stores.insert(
                store_name.clone(),
                StoreDefinition {
                    name: store_name,
                    coder: pending.coder,
                    typed,
                    resolver,
                    default_owner: pending.default_owner,
                },
            );
        }

        let table_name = self
            .table_name
            .unwrap_or_else(|| default_table_name(&self.name));

        event!(
            Level::INFO,
            class = %self.name,
            table = %table_name,
            stores = stores.len(),
            accessors = self.accessors.len(),
            fallback,
            read_unset,
            register_attributes,
            "model class built"
        );

        Ok(Arc::new(ModelClass {
            name: self.name,
            table_name,
            parent: self.parent,
            explicit_fallback: self.explicit_fallback,
            unset_values_fallback_to_default: fallback,
            read_unset_returns_default: read_unset,
            register_attributes,
            stores,
            registry: self.registry,
            accessors: self.accessors,
            local_stored_attributes: self.local_stored_attributes,
        }))
    }
}

/// Resolver of the ancestor that last declared defaults for `store_name`.
/// `None` when the class being built owns them.
fn inherited_resolver(
    parent: Option<&ModelClass>,
    class_name: &str,
    store_name: &str,
    owner: &str,
) -> Option<Arc<DefaultResolver>> {
    if owner == class_name {
        return None;
    }
    parent?
        .ancestors()
        .find(|class| class.name == owner)
        .and_then(|class| class.stores.get(store_name))
        .map(|store| Arc::clone(&store.resolver))
}

/// `"SuperUser"` becomes `"super_users"`.
pub fn default_table_name(class_name: &str) -> String {
    let mut table = String::with_capacity(class_name.len() + 4);
    for (i, c) in class_name.chars().enumerate() {
        if c.is_uppercase() {
            if i > 0 {
                table.push('_');
            }
            table.extend(c.to_lowercase());
        } else {
            table.push(c);
        }
    }
    table.push('s');
    table
}
