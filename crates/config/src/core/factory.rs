//! Composition engine
//!
//! A [`ConfigFactory`] holds an ordered source list and a set of bindings.
//! Every configuration method returns a new factory; [`ConfigFactory::load`]
//! runs the sources and produces one merged, resolved tree.

use super::bindings::{Bindings, CurrentTree};
use super::insertion::{ListInsertionStep, PrecedenceOrderStep};
use super::list::SourceList;
use super::source::{ConfigSource, ConfigSourceExt, NamedSource, SourceName};
use super::{ConfigResult, ConfigResultExt, ParseOptions, ResolveOptions, Tree};
use crate::loaders::{
    EnvironmentSource, FileSource, PathSpec, PropertiesSource, ResourceLoader, ResourceSource,
    StringSource,
};
use std::any::Any;
use std::marker::PhantomData;
use std::path::PathBuf;
use std::sync::Arc;

/// Number of load passes; the second sees the first one's resolved tree
pub const LOAD_PASSES: usize = 2;

/// Immutable source list plus bindings, consumed by [`ConfigFactory::load`]
#[derive(Debug, Clone, Default)]
pub struct ConfigFactory {
    sources: SourceList,
    bindings: Bindings,
}

impl ConfigFactory {
    /// No sources, no bindings
    pub fn empty() -> Self {
        Self::default()
    }

    /// The ordered sources, highest precedence first
    pub fn sources(&self) -> &SourceList {
        &self.sources
    }

    /// The bindings sources will see
    pub fn bindings(&self) -> &Bindings {
        &self.bindings
    }

    /// Same bindings, different source list
    #[must_use = "factories are immutable, use the returned value"]
    pub fn with_source_list(&self, sources: SourceList) -> Self {
        Self {
            sources,
            bindings: self.bindings.clone(),
        }
    }

    /// Replace every source with `sources`
    pub fn with_sources(
        &self,
        sources: Vec<NamedSource>,
    ) -> PrecedenceOrderStep<ConfigResult<ConfigFactory>, NamedSource> {
        let this = self.clone();
        PrecedenceOrderStep::new(sources, move |sources| {
            let list = SourceList::with_equivalence_of(&this.sources)
                .insert(sources)
                .from_highest_to_lowest_precedence()
                .at_beginning()?;
            Ok(this.with_source_list(list))
        })
    }

    /// Add one source; choose where it lands
    pub fn insert_source(&self, source: NamedSource) -> SourceInsertionStep {
        self.insert_sources(vec![source])
            .from_highest_to_lowest_precedence()
    }

    /// Add several sources; choose their order, then where they land
    pub fn insert_sources(
        &self,
        sources: Vec<NamedSource>,
    ) -> PrecedenceOrderStep<SourceInsertionStep, NamedSource> {
        let this = self.clone();
        PrecedenceOrderStep::new(sources, move |sources| {
            let inner = this
                .sources
                .insert(sources)
                .from_highest_to_lowest_precedence()
                .map_result(move |list| this.with_source_list(list));
            SourceInsertionStep { inner }
        })
    }

    /// Drop the source named `name`; an absent name is not an error
    #[must_use = "factories are immutable, use the returned value"]
    pub fn remove_source(&self, name: impl Into<SourceName>) -> Self {
        self.with_source_list(self.sources.remove(&name.into()))
    }

    /// Start binding a capability of type `T`
    pub fn bind<T>(&self) -> BindStep<T>
    where
        T: Any + Send + Sync,
    {
        BindStep {
            factory: self.clone(),
            _marker: PhantomData,
        }
    }

    /// Add every binding in `bindings`, replacing existing ones of the same type
    #[must_use = "factories are immutable, use the returned value"]
    pub fn bind_all(&self, bindings: &Bindings) -> Self {
        self.with_bindings(self.bindings.merge(bindings))
    }

    /// Add the default capability set, see [`Bindings::defaults`]
    #[must_use = "factories are immutable, use the returned value"]
    pub fn bind_defaults(&self) -> Self {
        self.bind_all(&Bindings::defaults())
    }

    /// Bind the parse options sources use
    #[must_use = "factories are immutable, use the returned value"]
    pub fn with_parse_options(&self, options: ParseOptions) -> Self {
        self.bind::<ParseOptions>().to_instance(options)
    }

    /// Bind the options used to resolve each pass
    #[must_use = "factories are immutable, use the returned value"]
    pub fn with_resolve_options(&self, options: ResolveOptions) -> Self {
        self.bind::<ResolveOptions>().to_instance(options)
    }

    /// Bind the loader resource sources read from
    #[must_use = "factories are immutable, use the returned value"]
    pub fn with_resource_loader(&self, loader: impl ResourceLoader + 'static) -> Self {
        let loader: Arc<dyn ResourceLoader> = Arc::new(loader);
        self.bind::<Arc<dyn ResourceLoader>>().to_instance(loader)
    }

    fn with_bindings(&self, bindings: Bindings) -> Self {
        Self {
            sources: self.sources.clone(),
            bindings,
        }
    }

    /// Load every source and merge the results.
    ///
    /// Runs exactly two passes. Each pass folds the sources from highest to
    /// lowest precedence with fallback merge and resolves the result; the
    /// resolved tree is then bound as [`CurrentTree`] so that the second
    /// pass can read settings the first one produced. Any source failure
    /// or unresolvable reference aborts the whole load.
    pub fn load(&self) -> ConfigResult<Tree> {
        let mut bindings = self.bindings.clone();
        let mut tree = Tree::empty();

        for pass in 1..=LOAD_PASSES {
            tree = self.load_pass(pass, &bindings)?;
            bindings = bindings.set(CurrentTree(tree.clone()));
        }

        tracing::debug!(
            action = "load",
            sources = self.sources.len(),
            keys = tree.root().len(),
            "Configuration loaded"
        );
        Ok(tree)
    }

    fn load_pass(&self, pass: usize, bindings: &Bindings) -> ConfigResult<Tree> {
        tracing::debug!(action = "load_pass", pass, sources = self.sources.len(), "Starting pass");

        let mut tree = Tree::empty();
        for source in &self.sources {
            tracing::trace!(pass, source = %source.name(), "Loading source");
            let loaded = source
                .load(bindings)
                .with_context(|| format!("Loading {source}"))?;
            tree = tree.with_fallback(loaded);
        }

        let options = bindings
            .get::<ResolveOptions>()
            .map_or_else(ResolveOptions::defaults, |options| *options);
        tree.resolve(&options)
    }
}

/// Placement step for sources added to a [`ConfigFactory`]
#[must_use = "choose a placement to finish the insertion"]
#[derive(Debug)]
pub struct SourceInsertionStep {
    inner: ListInsertionStep<ConfigFactory, NamedSource, SourceName>,
}

impl SourceInsertionStep {
    /// New sources outrank every existing one
    pub fn with_highest_precedence(self) -> ConfigResult<ConfigFactory> {
        self.inner.at_beginning()
    }

    /// Every existing source outranks the new ones
    pub fn with_lowest_precedence(self) -> ConfigResult<ConfigFactory> {
        self.inner.at_end()
    }

    /// New sources sit immediately above `name`
    pub fn with_higher_precedence_than(
        self,
        name: impl Into<SourceName>,
    ) -> ConfigResult<ConfigFactory> {
        self.inner.before(&name.into())
    }

    /// New sources sit immediately below `name`
    pub fn with_lower_precedence_than(
        self,
        name: impl Into<SourceName>,
    ) -> ConfigResult<ConfigFactory> {
        self.inner.after(&name.into())
    }

    /// New sources take the place of `name`
    pub fn replacing(self, name: impl Into<SourceName>) -> ConfigResult<ConfigFactory> {
        self.inner.replacing(&name.into())
    }
}

/// Step returned by [`ConfigFactory::bind`]
#[must_use = "choose what to bind"]
pub struct BindStep<T> {
    factory: ConfigFactory,
    _marker: PhantomData<fn() -> T>,
}

impl<T> BindStep<T>
where
    T: Any + Send + Sync,
{
    /// Bind `value`
    pub fn to_instance(self, value: T) -> ConfigFactory {
        let bindings = self.factory.bindings.set(value);
        self.factory.with_bindings(bindings)
    }

    /// Bind an already shared instance
    pub fn to_shared(self, value: Arc<T>) -> ConfigFactory {
        let bindings = self.factory.bindings.set_arc(value);
        self.factory.with_bindings(bindings)
    }

    /// Remove any binding for `T`
    pub fn to_nothing(self) -> ConfigFactory {
        let bindings = self.factory.bindings.remove::<T>();
        self.factory.with_bindings(bindings)
    }
}

impl<T> std::fmt::Debug for BindStep<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BindStep")
            .field("type", &std::any::type_name::<T>())
            .finish_non_exhaustive()
    }
}

/// Process environment, named `environment`
pub fn environment() -> NamedSource {
    EnvironmentSource::new().named("environment")
}

/// Fixed properties, named `properties`
pub fn properties<K, V>(properties: impl IntoIterator<Item = (K, V)>) -> NamedSource
where
    K: Into<String>,
    V: Into<String>,
{
    PropertiesSource::new(properties).named("properties")
}

/// Resources under `basename`, named `resource: <basename>`
pub fn resource(basename: impl Into<String>) -> NamedSource {
    let source = ResourceSource::new(basename);
    let name = source.to_string();
    source.named(name)
}

/// Start describing a file source
pub fn config_file() -> FileSourceStep {
    FileSourceStep
}

/// Inline configuration text; name it with [`ConfigSourceExt::named`]
pub fn config_string(text: impl Into<String>) -> StringSource {
    StringSource::new(text)
}

/// Chooses how a file source finds its path
#[derive(Debug, Clone, Copy)]
pub struct FileSourceStep;

impl FileSourceStep {
    /// Path read from `key` of the previous pass's tree
    pub fn by_key(self, key: impl Into<String>) -> NamedSource {
        self.by(PathSpec::by_key(key))
    }

    /// Constant path
    pub fn by_path(self, path: impl Into<PathBuf>) -> NamedSource {
        self.by(PathSpec::by_path(path))
    }

    /// Path from `spec`, named `file <spec name>`
    pub fn by(self, spec: PathSpec) -> NamedSource {
        let source = FileSource::new(spec);
        let name = source.to_string();
        source.named(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::source::{FnSource, TreeSource};
    use crate::core::{ConfigError, Syntax};
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn tree_source(name: &str, value: serde_json::Value) -> NamedSource {
        TreeSource(Tree::from_value(value).unwrap()).named(name)
    }

    fn names(factory: &ConfigFactory) -> Vec<String> {
        factory.sources().names().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_higher_precedence_wins() {
        let factory = ConfigFactory::empty()
            .insert_source(tree_source("b", json!({"x": 2, "y": 2})))
            .with_highest_precedence()
            .unwrap()
            .insert_source(tree_source("a", json!({"x": 1})))
            .with_highest_precedence()
            .unwrap();

        let tree = factory.load().unwrap();
        assert_eq!(tree.as_value(), json!({"x": 1, "y": 2}));
    }

    #[test]
    fn test_with_sources_replaces_list() {
        let factory = ConfigFactory::empty()
            .insert_source(tree_source("old", json!({})))
            .with_lowest_precedence()
            .unwrap()
            .with_sources(vec![tree_source("low", json!({})), tree_source("high", json!({}))])
            .from_lowest_to_highest_precedence()
            .unwrap();
        assert_eq!(names(&factory), ["high", "low"]);

        let err = ConfigFactory::empty()
            .with_sources(vec![tree_source("a", json!({})), tree_source("a", json!({}))])
            .from_highest_to_lowest_precedence()
            .unwrap_err();
        assert_eq!(err, ConfigError::duplicate_identifier("a"));
    }

    #[test]
    fn test_relative_insertion() {
        let factory = ConfigFactory::empty()
            .insert_sources(vec![tree_source("three", json!({})), tree_source("one", json!({}))])
            .from_highest_to_lowest_precedence()
            .with_lowest_precedence()
            .unwrap();

        let after = factory
            .insert_source(tree_source("two", json!({})))
            .with_lower_precedence_than("three")
            .unwrap();
        assert_eq!(names(&after), ["three", "two", "one"]);

        let before = factory
            .insert_source(tree_source("two", json!({})))
            .with_higher_precedence_than("one")
            .unwrap();
        assert_eq!(names(&before), ["three", "two", "one"]);

        let err = factory
            .insert_source(tree_source("two", json!({})))
            .with_higher_precedence_than("four")
            .unwrap_err();
        assert_eq!(err, ConfigError::no_such_identifier("four"));
        assert_eq!(names(&factory), ["three", "one"]);
    }

    #[test]
    fn test_replacing_and_removing() {
        let factory = ConfigFactory::empty()
            .insert_sources(vec![
                tree_source("one", json!({})),
                tree_source("two", json!({})),
                tree_source("three", json!({})),
            ])
            .from_highest_to_lowest_precedence()
            .with_highest_precedence()
            .unwrap();

        assert_eq!(names(&factory.remove_source("two")), ["one", "three"]);
        assert_eq!(names(&factory.remove_source("nine")), ["one", "two", "three"]);

        let replaced = factory
            .insert_source(tree_source("deux", json!({})))
            .replacing("two")
            .unwrap();
        assert_eq!(names(&replaced), ["one", "deux", "three"]);
    }

    #[test]
    fn test_exactly_two_passes() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let source = FnSource::new("counting", move |_: &Bindings| {
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Tree::empty())
        });

        ConfigFactory::empty()
            .insert_source(source.named("counting"))
            .with_highest_precedence()
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), LOAD_PASSES);
    }

    #[test]
    fn test_second_pass_sees_first_pass_tree() {
        let source = FnSource::new("echo", |bindings: &Bindings| {
            let seen = bindings
                .get::<CurrentTree>()
                .and_then(|current| current.tree().get_string("name").ok().flatten());
            match seen {
                Some(name) => Tree::empty().with_value("greeting", json!(format!("hi {name}"))),
                None => Ok(Tree::empty()),
            }
        });

        let tree = ConfigFactory::empty()
            .with_sources(vec![
                tree_source("name", json!({"name": "${who}", "who": "ann"})),
                source.named("echo"),
            ])
            .from_highest_to_lowest_precedence()
            .unwrap()
            .load()
            .unwrap();
        assert_eq!(tree.get("greeting"), Some(&json!("hi ann")));
    }

    #[test]
    fn test_unresolvable_reference_fails_load() {
        let factory = ConfigFactory::empty()
            .with_resolve_options(ResolveOptions::no_environment())
            .insert_source(tree_source("a", json!({"x": "${nope.nothing}"})))
            .with_highest_precedence()
            .unwrap();

        let err = factory.load().unwrap_err();
        assert!(matches!(err, ConfigError::SubstitutionError { ref path, .. } if path == "nope.nothing"));

        let lenient = factory.with_resolve_options(
            ResolveOptions::no_environment().with_allow_unresolved(true),
        );
        assert_eq!(lenient.load().unwrap().get("x"), Some(&json!("${nope.nothing}")));
    }

    #[test]
    fn test_source_failure_aborts_load() {
        let failing = FnSource::new("broken", |_: &Bindings| {
            Err(ConfigError::parse_error("broken", "bad input"))
        });
        let err = ConfigFactory::empty()
            .insert_source(failing.named("broken"))
            .with_highest_precedence()
            .unwrap()
            .load()
            .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }

    #[test]
    fn test_bind_steps() {
        let factory = ConfigFactory::empty().bind::<u16>().to_instance(8080);
        assert_eq!(*factory.bindings().get::<u16>().unwrap(), 8080);

        let cleared = factory.bind::<u16>().to_nothing();
        assert!(cleared.bindings().get::<u16>().is_none());
        assert!(factory.bindings().contains::<u16>());

        let shared = ConfigFactory::empty()
            .bind::<String>()
            .to_shared(Arc::new("x".to_string()));
        assert_eq!(shared.bindings().get::<String>().unwrap().as_str(), "x");
    }

    #[test]
    fn test_constructor_names() {
        assert_eq!(environment().name().as_str(), "environment");
        assert_eq!(properties([("a", "b")]).name().as_str(), "properties");
        assert_eq!(resource("reference").name().as_str(), "resource: reference");
        assert_eq!(
            config_file().by_key("app.file").name().as_str(),
            "file by key: app.file"
        );
        assert_eq!(
            config_file().by_path("conf/app.toml").name().as_str(),
            "file by path: conf/app.toml"
        );
    }

    #[test]
    fn test_load_does_not_change_factory() {
        let factory = ConfigFactory::empty()
            .with_parse_options(ParseOptions::defaults().with_syntax(Syntax::Json))
            .insert_source(config_string(r#"{"a": 1}"#).named("inline"))
            .with_highest_precedence()
            .unwrap();

        let first = factory.load().unwrap();
        let second = factory.load().unwrap();
        assert_eq!(first, second);
        assert!(!factory.bindings().contains::<CurrentTree>());
    }
}
