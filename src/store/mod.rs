//! Store column types: the plain container and its typed wrapper.

pub mod container;
pub mod defaults;
pub mod typed_store;

pub use container::ContainerType;
pub use defaults::{DefaultProducer, DefaultResolver, DefaultSpec, DefaultsProducer};
pub use typed_store::{KeyOptions, TypedKey, TypedStore};
