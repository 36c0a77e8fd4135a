//! Configuration sources and their names

use super::{Bindings, ConfigResult, Tree};
use std::fmt;
use std::sync::Arc;

/// Something that produces a configuration tree.
///
/// A source with nothing to contribute returns an empty tree. Errors are
/// reserved for real failures (unreadable or malformed input) and abort the
/// whole load.
pub trait ConfigSource: fmt::Debug + fmt::Display + Send + Sync {
    /// Produce a tree, pulling optional capabilities out of `bindings`
    fn load(&self, bindings: &Bindings) -> ConfigResult<Tree>;
}

impl<S: ConfigSource + ?Sized> ConfigSource for Arc<S> {
    fn load(&self, bindings: &Bindings) -> ConfigResult<Tree> {
        (**self).load(bindings)
    }
}

/// Name identifying a source within a source list
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceName(Arc<str>);

impl SourceName {
    /// Create a name
    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    /// The name as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Debug for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(&*self.0, f)
    }
}

impl From<&str> for SourceName {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for SourceName {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl From<&SourceName> for SourceName {
    fn from(name: &SourceName) -> Self {
        name.clone()
    }
}

impl AsRef<str> for SourceName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

/// Shorthand for [`SourceName::new`]
pub fn source_named(name: impl Into<Arc<str>>) -> SourceName {
    SourceName::new(name)
}

/// A source paired with its name; the unit a source list orders.
#[derive(Clone)]
pub struct NamedSource {
    name: SourceName,
    source: Arc<dyn ConfigSource>,
}

impl NamedSource {
    /// Pair `source` with `name`
    pub fn new(name: impl Into<SourceName>, source: impl ConfigSource + 'static) -> Self {
        Self::from_arc(name, Arc::new(source))
    }

    /// Pair an already shared source with `name`
    pub fn from_arc(name: impl Into<SourceName>, source: Arc<dyn ConfigSource>) -> Self {
        Self {
            name: name.into(),
            source,
        }
    }

    /// Name of this source
    pub fn name(&self) -> &SourceName {
        &self.name
    }

    /// The wrapped producer
    pub fn source(&self) -> &Arc<dyn ConfigSource> {
        &self.source
    }

    /// Same producer under a different name
    #[must_use = "renamed returns a new named source"]
    pub fn renamed(&self, name: impl Into<SourceName>) -> Self {
        Self {
            name: name.into(),
            source: Arc::clone(&self.source),
        }
    }
}

impl ConfigSource for NamedSource {
    fn load(&self, bindings: &Bindings) -> ConfigResult<Tree> {
        self.source.load(bindings)
    }
}

impl fmt::Display for NamedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigSource {{ {} }}", self.name)
    }
}

impl fmt::Debug for NamedSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamedSource")
            .field("name", &self.name)
            .field("source", &format_args!("{}", self.source))
            .finish()
    }
}

/// Projection used by source lists to identify their elements
pub(crate) fn name_of(source: &NamedSource) -> &SourceName {
    source.name()
}

/// Extension methods for every [`ConfigSource`]
pub trait ConfigSourceExt: ConfigSource + Sized + 'static {
    /// Give this source a name
    fn named(self, name: impl Into<SourceName>) -> NamedSource {
        NamedSource::new(name, self)
    }
}

impl<S: ConfigSource + Sized + 'static> ConfigSourceExt for S {}

/// A source backed by a closure
pub struct FnSource<F> {
    description: String,
    produce: F,
}

impl<F> FnSource<F>
where
    F: Fn(&Bindings) -> ConfigResult<Tree> + Send + Sync,
{
    /// Wrap `produce`, described as `description` in diagnostics
    pub fn new(description: impl Into<String>, produce: F) -> Self {
        Self {
            description: description.into(),
            produce,
        }
    }
}

impl<F> ConfigSource for FnSource<F>
where
    F: Fn(&Bindings) -> ConfigResult<Tree> + Send + Sync,
{
    fn load(&self, bindings: &Bindings) -> ConfigResult<Tree> {
        (self.produce)(bindings)
    }
}

impl<F> fmt::Display for FnSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description)
    }
}

impl<F> fmt::Debug for FnSource<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnSource")
            .field("description", &self.description)
            .finish_non_exhaustive()
    }
}

/// A source that always produces the same tree
#[derive(Debug, Clone)]
pub struct TreeSource(pub Tree);

impl ConfigSource for TreeSource {
    fn load(&self, _bindings: &Bindings) -> ConfigResult<Tree> {
        Ok(self.0.clone())
    }
}

impl fmt::Display for TreeSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "tree: {}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tree(value: serde_json::Value) -> Tree {
        Tree::from_value(value).unwrap()
    }

    #[test]
    fn test_named_display_and_debug() {
        let source = TreeSource(tree(json!({"a": 1}))).named("defaults");
        assert_eq!(source.to_string(), "ConfigSource { defaults }");
        assert_eq!(source.name().as_str(), "defaults");

        let debug = format!("{source:?}");
        assert!(debug.contains("\"defaults\""));
        assert!(debug.contains("tree: {\"a\":1}"));
    }

    #[test]
    fn test_renamed_keeps_producer() {
        let source = TreeSource(tree(json!({"a": 1}))).named("first");
        let renamed = source.renamed("second");

        assert_eq!(renamed.name(), &source_named("second"));
        assert_eq!(source.name(), &source_named("first"));
        assert!(Arc::ptr_eq(source.source(), renamed.source()));
        assert_eq!(
            renamed.load(&Bindings::none()).unwrap(),
            tree(json!({"a": 1}))
        );
    }

    #[test]
    fn test_fn_source_sees_bindings() {
        let source = FnSource::new("answer", |bindings: &Bindings| {
            let value = bindings.get::<u32>().map_or(0, |v| *v);
            Tree::empty().with_value("answer", json!(value))
        });

        let loaded = source.load(&Bindings::none().set(42_u32)).unwrap();
        assert_eq!(loaded.get("answer"), Some(&json!(42)));
        assert_eq!(source.to_string(), "answer");
    }

    #[test]
    fn test_source_name_conversions() {
        let a: SourceName = "x".into();
        let b: SourceName = String::from("x").into();
        assert_eq!(a, b);
        assert_eq!(format!("{a:?}"), "\"x\"");
        assert_eq!(a.to_string(), "x");
    }
}
