//! Configuration from the directory namespace

use std::fmt;
use std::sync::Arc;
use stratum_config::{
    Bindings, ConfigResult, ConfigSource, NamedSource, ParseOptions, SourceName, Tree,
};
use stratum_naming::DirectoryContext;

/// Default name of a [`NamingSource`]
pub const DEFAULT_NAME: &str = "directory";

/// Key the whole namespace tree is placed under
pub const NAMESPACE_KEY: &str = "directory";

/// Root of the directory namespace, as a binding.
#[derive(Debug, Clone, Default)]
pub struct NamingRoot(pub DirectoryContext);

impl NamingRoot {
    /// The bound context
    pub fn context(&self) -> &DirectoryContext {
        &self.0
    }
}

/// Copy the value at `from` in the namespace tree to `to` at the root.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathMapping {
    /// Path inside the namespace tree
    pub from: String,
    /// Destination path at the root
    pub to: String,
}

impl PathMapping {
    /// Mapping from `from` to `to`
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }
}

type TreeSupplier = Arc<dyn Fn(&Bindings) -> Tree + Send + Sync>;

/// Source exposing the directory namespace.
///
/// The namespace tree appears under `directory`, and each [`PathMapping`]
/// additionally copies one value to the root:
///
/// ```text
/// namespace { a = 1, b = 2 }  +  map_path("b", "c")
///   => directory { a = 1, b = 2 }, c = 2
/// ```
#[derive(Clone)]
pub struct NamingSource {
    name: SourceName,
    mappings: Vec<PathMapping>,
    supplier: TreeSupplier,
}

impl NamingSource {
    /// Source over the bound [`NamingRoot`], named `directory`
    pub fn new() -> Self {
        Self {
            name: SourceName::from(DEFAULT_NAME),
            mappings: Vec::new(),
            supplier: Arc::new(bound_namespace_tree),
        }
    }

    /// The source name
    pub fn name(&self) -> &SourceName {
        &self.name
    }

    /// Path mappings in application order
    pub fn mappings(&self) -> &[PathMapping] {
        &self.mappings
    }

    /// Rename the source
    #[must_use = "builder methods must be chained or built"]
    pub fn with_name(mut self, name: impl Into<SourceName>) -> Self {
        self.name = name.into();
        self
    }

    /// Add a mapping after the existing ones
    #[must_use = "builder methods must be chained or built"]
    pub fn map_path(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.mappings.push(PathMapping::new(from, to));
        self
    }

    /// Replace every mapping
    #[must_use = "builder methods must be chained or built"]
    pub fn with_path_mappings(mut self, mappings: impl IntoIterator<Item = PathMapping>) -> Self {
        self.mappings = mappings.into_iter().collect();
        self
    }

    /// Read the namespace tree from `supplier` instead of the bound root
    #[must_use = "builder methods must be chained or built"]
    pub fn with_supplier<F>(mut self, supplier: F) -> Self
    where
        F: Fn(&Bindings) -> Tree + Send + Sync + 'static,
    {
        self.supplier = Arc::new(supplier);
        self
    }
}

impl Default for NamingSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigSource for NamingSource {
    fn load(&self, bindings: &Bindings) -> ConfigResult<Tree> {
        let namespace = (self.supplier)(bindings);

        let mut mapped = Tree::empty();
        for mapping in &self.mappings {
            if let Some(value) = namespace.get(&mapping.from) {
                mapped = mapped.with_value(&mapping.to, value.clone())?;
            }
        }

        Ok(mapped.with_fallback(namespace.at_key(NAMESPACE_KEY)))
    }
}

impl From<NamingSource> for NamedSource {
    fn from(source: NamingSource) -> Self {
        NamedSource::new(source.name.clone(), source)
    }
}

impl fmt::Display for NamingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ConfigSource {{ {} }}", self.name)
    }
}

impl fmt::Debug for NamingSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NamingSource")
            .field("name", &self.name)
            .field("mappings", &self.mappings)
            .finish_non_exhaustive()
    }
}

fn bound_namespace_tree(bindings: &Bindings) -> Tree {
    let context = bindings
        .get::<NamingRoot>()
        .map_or_else(DirectoryContext::no_context, |root| root.0.clone());
    let context = match bindings.get::<ParseOptions>() {
        Some(options) => context.with_parse_options((*options).clone()),
        None => context,
    };
    context.to_tree()
}

/// The directory namespace source, named `directory`
pub fn naming() -> NamingSource {
    NamingSource::new()
}
