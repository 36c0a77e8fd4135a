//! Configuration view of a naming context
//!
//! [`DirectoryContext`] never fails: lookups that cannot be followed degrade
//! to "no context", and entries that cannot be converted are left out of the
//! resulting [`Tree`].

use crate::{Entry, NamingContext, NamingError, NamingResult};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use stratum_config::{ParseOptions, Tree, parse_scalar_value};
use tracing::{debug, trace};

const DEFAULT_ORIGIN: &str = "directory";

/// A naming context, or the absence of one, viewed as configuration
#[derive(Clone, Default)]
pub struct DirectoryContext {
    context: Option<Arc<dyn NamingContext>>,
    origin_description: Option<String>,
    parse_options: ParseOptions,
}

impl DirectoryContext {
    /// Wrap a context
    pub fn new(context: impl NamingContext + 'static) -> Self {
        Self::of(Arc::new(context))
    }

    /// Wrap a shared context
    pub fn of(context: Arc<dyn NamingContext>) -> Self {
        Self {
            context: Some(context),
            ..Self::default()
        }
    }

    /// The empty context
    pub fn no_context() -> Self {
        Self::default()
    }

    /// Whether a context is wrapped
    pub fn is_present(&self) -> bool {
        self.context.is_some()
    }

    /// The wrapped context
    pub fn context(&self) -> Option<&Arc<dyn NamingContext>> {
        self.context.as_ref()
    }

    /// Set the origin attached to converted trees
    #[must_use = "builder methods must be chained or built"]
    pub fn with_origin_description(mut self, origin: impl Into<String>) -> Self {
        self.origin_description = Some(origin.into());
        self
    }

    /// Set the parse options carried into sub-contexts
    #[must_use = "builder methods must be chained or built"]
    pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
        self.parse_options = options;
        self
    }

    /// Follow a `/`-separated path of names.
    ///
    /// Empty segments are ignored. Any failure along the way yields
    /// [`DirectoryContext::no_context`] with the same options.
    pub fn get_context(&self, path: &str) -> DirectoryContext {
        let Some(context) = &self.context else {
            return self.with_context(None);
        };

        match follow(Arc::clone(context), path) {
            Ok(found) => self.with_context(Some(found)),
            Err(e) => {
                debug!(action = "get_context", path, error = %e, "Naming path unavailable");
                self.with_context(None)
            }
        }
    }

    /// Convert the context into a tree
    pub fn to_tree(&self) -> Tree {
        let origin = self.origin();
        let Some(context) = &self.context else {
            return Tree::empty_with_origin(origin);
        };
        Tree::from_map(context_to_map(context.as_ref())).with_origin(origin)
    }

    fn origin(&self) -> String {
        self.origin_description
            .clone()
            .or_else(|| self.parse_options.origin_description.clone())
            .unwrap_or_else(|| DEFAULT_ORIGIN.to_string())
    }

    fn with_context(&self, context: Option<Arc<dyn NamingContext>>) -> DirectoryContext {
        Self {
            context,
            origin_description: self.origin_description.clone(),
            parse_options: self.parse_options.clone(),
        }
    }
}

impl fmt::Debug for DirectoryContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryContext")
            .field("context", &self.context)
            .field("origin", &self.origin())
            .finish()
    }
}

fn follow(mut context: Arc<dyn NamingContext>, path: &str) -> NamingResult<Arc<dyn NamingContext>> {
    for name in path.split('/').filter(|name| !name.is_empty()) {
        context = match context.lookup(name)? {
            Entry::Context(next) => next,
            _ => return Err(NamingError::not_a_context(name)),
        };
    }
    Ok(context)
}

fn context_to_map(context: &dyn NamingContext) -> Map<String, Value> {
    let names = match context.list() {
        Ok(names) => names,
        Err(e) => {
            debug!(action = "list", error = %e, "Naming context not listable");
            return Map::new();
        }
    };

    let mut map = Map::new();
    for name in names {
        match context.lookup(&name) {
            Ok(Entry::Context(sub)) => {
                map.insert(name, Value::Object(context_to_map(sub.as_ref())));
            }
            Ok(Entry::Text(text)) => match text_value(&text) {
                Some(value) => {
                    map.insert(name, value);
                }
                None => trace!(action = "convert", name = %name, "Skipping unparseable entry"),
            },
            Ok(Entry::Opaque) => trace!(action = "convert", name = %name, "Skipping opaque entry"),
            Err(e) => trace!(action = "convert", name = %name, error = %e, "Skipping entry"),
        }
    }
    map
}

fn text_value(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if trimmed.starts_with('[') || trimmed.starts_with('{') {
        serde_json::from_str(trimmed).ok()
    } else {
        Some(parse_scalar_value(trimmed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryContext;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn sample() -> DirectoryContext {
        DirectoryContext::new(
            MemoryContext::new().bind_context(
                "env",
                MemoryContext::new()
                    .bind_text("port", "8080")
                    .bind_text("name", "\"svc\"")
                    .bind_text("tags", "[1, 2]")
                    .bind_text("broken", "{not json")
                    .bind_opaque("handle")
                    .bind_context("db", MemoryContext::new().bind_text("host", "localhost")),
            ),
        )
    }

    #[test]
    fn test_to_tree_converts_entries() {
        let tree = sample().get_context("env").to_tree();
        assert_eq!(
            tree.as_value(),
            json!({
                "port": 8080,
                "name": "svc",
                "tags": [1, 2],
                "db": { "host": "localhost" }
            })
        );
        assert_eq!(tree.origin(), Some("directory"));
    }

    #[test]
    fn test_get_context_follows_nested_path() {
        let db = sample().get_context("/env/db/");
        assert!(db.is_present());
        assert_eq!(db.to_tree().as_value(), json!({ "host": "localhost" }));
    }

    #[test]
    fn test_get_context_degrades() {
        let ctx = sample().with_origin_description("registry");
        let missing = ctx.get_context("env/nope");
        assert!(!missing.is_present());
        assert!(missing.to_tree().is_empty());
        assert_eq!(missing.to_tree().origin(), Some("registry"));

        assert!(!ctx.get_context("env/port").is_present());
        assert!(!DirectoryContext::no_context().get_context("env").is_present());
    }

    #[test]
    fn test_origin_from_parse_options() {
        let ctx = DirectoryContext::no_context()
            .with_parse_options(ParseOptions::defaults().with_origin_description("naming"));
        assert_eq!(ctx.to_tree().origin(), Some("naming"));
    }

    #[test]
    fn test_unlistable_context_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = DirectoryContext::new(crate::FsContext::new(dir.path().join("missing")));
        assert!(ctx.is_present());
        assert!(ctx.to_tree().is_empty());
    }
}
