use crate::core::Value;
use crate::store::DefaultSpec;
use crate::types::TypeOptions;

/// Accessor name decoration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Affix {
    Named(String),
    /// Uses the store's own name.
    StoreName,
}

impl Affix {
    fn text<'a>(&'a self, store_name: &'a str) -> &'a str {
        match self {
            Self::Named(text) => text,
            Self::StoreName => store_name,
        }
    }
}

impl From<&str> for Affix {
    fn from(text: &str) -> Self {
        Self::Named(text.to_string())
    }
}

/// `{prefix_}{key}{_suffix}`
pub(crate) fn accessor_name(
    store_name: &str,
    key: &str,
    prefix: Option<&Affix>,
    suffix: Option<&Affix>,
) -> String {
    let mut name = String::new();
    if let Some(prefix) = prefix {
        name.push_str(prefix.text(store_name));
        name.push('_');
    }
    name.push_str(key);
    if let Some(suffix) = suffix {
        name.push('_');
        name.push_str(suffix.text(store_name));
    }
    name
}

/// Options of an untyped accessor declaration.
#[derive(Debug, Clone, Default)]
pub struct AccessorOptions {
    pub prefix: Option<Affix>,
    pub suffix: Option<Affix>,
}

impl AccessorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prefix(mut self, prefix: impl Into<Affix>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn prefix_store(mut self) -> Self {
        self.prefix = Some(Affix::StoreName);
        self
    }

    pub fn suffix(mut self, suffix: impl Into<Affix>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn suffix_store(mut self) -> Self {
        self.suffix = Some(Affix::StoreName);
        self
    }
}

/// Options of a typed key declaration.
#[derive(Debug, Clone)]
pub struct AttributeOptions {
    pub prefix: Option<Affix>,
    pub suffix: Option<Affix>,
    pub default: DefaultSpec,
    pub type_options: TypeOptions,
}

impl AttributeOptions {
    pub fn new() -> Self {
        Self {
            prefix: None,
            suffix: None,
            default: DefaultSpec::Undefined,
            type_options: TypeOptions::new(),
        }
    }

    pub fn prefix(mut self, prefix: impl Into<Affix>) -> Self {
        self.prefix = Some(prefix.into());
        self
    }

    pub fn prefix_store(mut self) -> Self {
        self.prefix = Some(Affix::StoreName);
        self
    }

    pub fn suffix(mut self, suffix: impl Into<Affix>) -> Self {
        self.suffix = Some(suffix.into());
        self
    }

    pub fn suffix_store(mut self) -> Self {
        self.suffix = Some(Affix::StoreName);
        self
    }

    pub fn default(mut self, value: impl Into<Value>) -> Self {
        self.default = DefaultSpec::value(value);
        self
    }

    /// The producer runs once per new or loaded record.
    pub fn default_with<F>(mut self, producer: F) -> Self
    where
        F: Fn() -> Value + Send + Sync + 'static,
    {
        self.default = DefaultSpec::producer(producer);
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

    pub fn scale(mut self, scale: u8) -> Self {
        self.type_options.scale = Some(scale);
        self
    }

    pub(crate) fn accessor_options(&self) -> AccessorOptions {
        AccessorOptions {
            prefix: self.prefix.clone(),
            suffix: self.suffix.clone(),
        }
    }
}

impl Default for AttributeOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl From<AccessorOptions> for AttributeOptions {
    fn from(options: AccessorOptions) -> Self {
        Self {
            prefix: options.prefix,
            suffix: options.suffix,
            ..Self::new()
        }
    }
}
