//! Naming context abstraction

use crate::NamingResult;
use std::fmt;
use std::sync::Arc;

/// What a name is bound to
#[derive(Debug, Clone)]
pub enum Entry {
    /// A nested context
    Context(Arc<dyn NamingContext>),
    /// A text value
    Text(String),
    /// A value with no configuration meaning
    Opaque,
}

impl Entry {
    /// Nested context entry
    pub fn context(context: impl NamingContext + 'static) -> Self {
        Self::Context(Arc::new(context))
    }

    /// Text entry
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }
}

/// A hierarchical namespace of named entries.
pub trait NamingContext: fmt::Debug + Send + Sync {
    /// The entry bound directly under `name`
    fn lookup(&self, name: &str) -> NamingResult<Entry>;

    /// Names bound directly in this context
    fn list(&self) -> NamingResult<Vec<String>>;
}
