//! In-memory naming context

use crate::{Entry, NamingContext, NamingError, NamingResult};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Naming context held in memory, built up with `bind_*` calls
#[derive(Debug, Clone, Default)]
pub struct MemoryContext {
    entries: BTreeMap<String, Entry>,
}

impl MemoryContext {
    /// Empty context
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a text value
    #[must_use = "builder methods must be chained or built"]
    pub fn bind_text(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.entries.insert(name.into(), Entry::text(value));
        self
    }

    /// Bind a nested context
    #[must_use = "builder methods must be chained or built"]
    pub fn bind_context(
        mut self,
        name: impl Into<String>,
        context: impl NamingContext + 'static,
    ) -> Self {
        self.entries.insert(name.into(), Entry::context(context));
        self
    }

    /// Bind an already shared context
    #[must_use = "builder methods must be chained or built"]
    pub fn bind_shared(mut self, name: impl Into<String>, context: Arc<dyn NamingContext>) -> Self {
        self.entries.insert(name.into(), Entry::Context(context));
        self
    }

    /// Bind a value with no configuration meaning
    #[must_use = "builder methods must be chained or built"]
    pub fn bind_opaque(mut self, name: impl Into<String>) -> Self {
        self.entries.insert(name.into(), Entry::Opaque);
        self
    }
}

impl NamingContext for MemoryContext {
    fn lookup(&self, name: &str) -> NamingResult<Entry> {
        self.entries
            .get(name)
            .cloned()
            .ok_or_else(|| NamingError::name_not_found(name))
    }

    fn list(&self) -> NamingResult<Vec<String>> {
        Ok(self.entries.keys().cloned().collect())
    }
}
