use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Unknown type '{0}'")]
    UnknownType(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Default producer for store '{0}' was invoked before a typed store was attached")]
    DefaultsNotAttached(String),

    #[error("Range error: {0}")]
    Range(String),

    #[error("Store '{0}' is not declared on model '{1}'")]
    StoreNotFound(String, String),

    #[error("Unknown accessor '{0}' for model '{1}'")]
    UnknownAccessor(String, String),

    #[error("Accessor '{0}' is not boolean-typed and has no predicate")]
    NotAPredicate(String),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Table '{0}' already exists")]
    TableExists(String),

    #[error("Column '{0}' not found in table '{1}'")]
    ColumnNotFound(String, String),

    #[error("Record {0} not found in table '{1}'")]
    RecordNotFound(u64, String),

    #[error("Record of model '{0}' has not been saved yet")]
    NotPersisted(String),

    #[error("Coder error: {0}")]
    Coder(String),

    #[error("Lock error: {0}")]
    LockError(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        Self::Coder(err.to_string())
    }
}

impl<T> From<std::sync::PoisonError<T>> for StoreError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}
