//! Named resource bundles
//!
//! A [`ResourceLoader`] maps a resource name such as `application.toml` to
//! zero or more documents. Several roots may each provide a document under
//! the same name; all of them contribute, earlier ones winning.

use super::bound_parse_options;
use crate::core::parse::{parse_str, read_file};
use crate::core::{
    Bindings, ConfigError, ConfigResult, ConfigResultExt, ConfigSource, Syntax, Tree,
};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// One document found under a resource name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    /// Where the document came from
    pub origin: String,
    /// Document text
    pub content: String,
}

/// Finds resources by name.
///
/// Bound into [`Bindings`] as `Arc<dyn ResourceLoader>`.
pub trait ResourceLoader: fmt::Debug + Send + Sync {
    /// Every document available under `name`, highest precedence first
    fn resources(&self, name: &str) -> ConfigResult<Vec<Resource>>;
}

/// Resources held in memory
#[derive(Debug, Clone, Default)]
pub struct EmbeddedResources {
    entries: BTreeMap<String, Vec<String>>,
}

impl EmbeddedResources {
    /// No resources
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a document under `name`; repeated names keep every document
    #[must_use = "builder methods must be chained or built"]
    pub fn with(mut self, name: impl Into<String>, content: impl Into<String>) -> Self {
        self.entries.entry(name.into()).or_default().push(content.into());
        self
    }
}

impl ResourceLoader for EmbeddedResources {
    fn resources(&self, name: &str) -> ConfigResult<Vec<Resource>> {
        Ok(self
            .entries
            .get(name)
            .map(|contents| {
                contents
                    .iter()
                    .enumerate()
                    .map(|(i, content)| Resource {
                        origin: format!("embedded: {name} #{}", i + 1),
                        content: content.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default())
    }
}

/// Resources read from an ordered set of directories
#[derive(Debug, Clone, Default)]
pub struct DirectoryResources {
    roots: Vec<PathBuf>,
}

impl DirectoryResources {
    /// Search `roots` in order
    pub fn new(roots: impl IntoIterator<Item = impl Into<PathBuf>>) -> Self {
        Self {
            roots: roots.into_iter().map(Into::into).collect(),
        }
    }

    /// Root directories, highest precedence first
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }
}

impl ResourceLoader for DirectoryResources {
    fn resources(&self, name: &str) -> ConfigResult<Vec<Resource>> {
        let mut found = Vec::new();
        for root in &self.roots {
            let path = root.join(name);
            let Some(content) = read_file(&path).or_missing()? else {
                continue;
            };
            found.push(Resource {
                origin: path.display().to_string(),
                content,
            });
        }
        Ok(found)
    }
}

/// Source merging every resource found for a base name.
///
/// A base name without a known extension is tried with each supported
/// extension in probe order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceSource {
    basename: String,
}

impl ResourceSource {
    /// Source for resources named `basename`
    pub fn new(basename: impl Into<String>) -> Self {
        Self {
            basename: basename.into(),
        }
    }

    /// The base name
    pub fn basename(&self) -> &str {
        &self.basename
    }

    fn candidates(&self, forced: Option<Syntax>) -> Vec<(String, Syntax)> {
        if let Some(syntax) = Syntax::from_path(Path::new(&self.basename)) {
            return vec![(self.basename.clone(), forced.unwrap_or(syntax))];
        }
        Syntax::PROBE_ORDER
            .iter()
            .filter(|(_, syntax)| forced.is_none_or(|f| f == *syntax))
            .filter(|(_, syntax)| syntax.is_supported())
            .map(|(ext, syntax)| (format!("{}.{ext}", self.basename), *syntax))
            .collect()
    }
}

impl ConfigSource for ResourceSource {
    fn load(&self, bindings: &Bindings) -> ConfigResult<Tree> {
        let options = bound_parse_options(bindings);
        let loader: Arc<dyn ResourceLoader> = match bindings.get::<Arc<dyn ResourceLoader>>() {
            Some(loader) => Arc::clone(&*loader),
            None => Arc::new(DirectoryResources::new(std::env::current_dir().ok())),
        };

        let mut tree = Tree::empty();
        let mut found = 0_usize;
        for (name, syntax) in self.candidates(options.syntax) {
            for resource in loader.resources(&name)? {
                tracing::trace!(origin = %resource.origin, %syntax, "Parsing resource");
                let origin = options
                    .origin_description
                    .as_deref()
                    .unwrap_or(&resource.origin);
                tree = tree.with_fallback(parse_str(&resource.content, syntax, origin)?);
                found += 1;
            }
        }

        if found == 0 {
            if !options.allow_missing {
                return Err(ConfigError::file_not_found(&self.basename));
            }
            tracing::trace!(basename = %self.basename, "No resources found");
        }
        Ok(tree)
    }
}

impl fmt::Display for ResourceSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "resource: {}", self.basename)
    }
}
