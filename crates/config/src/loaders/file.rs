//! File source and path specifications

use super::bound_parse_options;
use crate::core::parse::parse_file_any_syntax;
use crate::core::{Bindings, ConfigResult, ConfigSource, CurrentTree, Tree};
use std::fmt;
use std::path::PathBuf;

/// Where a path-valued source finds its path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSpec {
    /// A constant path
    ByPath(PathBuf),

    /// The string stored at a key of the tree resolved so far
    ByKey(String),
}

impl PathSpec {
    /// Constant path
    pub fn by_path(path: impl Into<PathBuf>) -> Self {
        Self::ByPath(path.into())
    }

    /// Path read from the bound [`CurrentTree`] at `key`
    pub fn by_key(key: impl Into<String>) -> Self {
        Self::ByKey(key.into())
    }

    /// Resolve the path against `bindings`.
    ///
    /// A key spec with no bound tree, or whose key is missing, yields no
    /// path rather than an error.
    pub fn resolve(&self, bindings: &Bindings) -> ConfigResult<Option<PathBuf>> {
        match self {
            PathSpec::ByPath(path) => Ok(Some(path.clone())),
            PathSpec::ByKey(key) => {
                let Some(current) = bindings.get::<CurrentTree>() else {
                    return Ok(None);
                };
                Ok(current.tree().get_string(key)?.map(PathBuf::from))
            }
        }
    }

    /// Short description, `by path: <p>` or `by key: <k>`
    pub fn name(&self) -> String {
        match self {
            PathSpec::ByPath(path) => format!("by path: {}", path.display()),
            PathSpec::ByKey(key) => format!("by key: {key}"),
        }
    }
}

impl fmt::Display for PathSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// Source parsing the file a [`PathSpec`] points at.
///
/// No path means an empty tree. A file without an extension is probed with
/// every supported one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileSource {
    spec: PathSpec,
}

impl FileSource {
    /// Source for `spec`
    pub fn new(spec: PathSpec) -> Self {
        Self { spec }
    }

    /// The path specification
    pub fn spec(&self) -> &PathSpec {
        &self.spec
    }
}

impl ConfigSource for FileSource {
    fn load(&self, bindings: &Bindings) -> ConfigResult<Tree> {
        let Some(path) = self.spec.resolve(bindings)? else {
            tracing::trace!(spec = %self.spec, "No path, contributing nothing");
            return Ok(Tree::empty());
        };

        tracing::debug!(action = "load_file", path = %path.display(), "Loading configuration file");
        parse_file_any_syntax(&path, &bound_parse_options(bindings))
    }
}

impl fmt::Display for FileSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "file {}", self.spec)
    }
}
