//! Per-application files under a configuration directory

use crate::ContextPath;
use std::fmt;
use std::path::PathBuf;
use stratum_config::{
    Bindings, ConfigResult, ConfigSource, ConfigSourceExt, FileSource, NamedSource, PathSpec, Tree,
};

/// Source loading `<directory>/<context path components...>` as a config file.
///
/// Contributes nothing when the directory spec yields no path or no
/// [`ContextPath`] is bound.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextDirectorySource {
    spec: PathSpec,
}

impl ContextDirectorySource {
    /// Source whose base directory comes from `spec`
    pub fn new(spec: PathSpec) -> Self {
        Self { spec }
    }

    /// The base directory specification
    pub fn spec(&self) -> &PathSpec {
        &self.spec
    }
}

impl ConfigSource for ContextDirectorySource {
    fn load(&self, bindings: &Bindings) -> ConfigResult<Tree> {
        let Some(base) = self.spec.resolve(bindings)? else {
            return Ok(Tree::empty());
        };
        let Some(context_path) = bindings.get::<ContextPath>() else {
            tracing::trace!(spec = %self.spec, "No context path bound");
            return Ok(Tree::empty());
        };

        let path: PathBuf = context_path
            .components()
            .iter()
            .fold(base, |path, component| path.join(component));

        FileSource::new(PathSpec::ByPath(path)).load(bindings)
    }
}

impl fmt::Display for ContextDirectorySource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "context relative to directory {}", self.spec)
    }
}

/// Start describing a context-directory source
pub fn context_directory() -> ContextDirectoryStep {
    ContextDirectoryStep
}

/// Chooses how a context-directory source finds its base directory
#[derive(Debug, Clone, Copy)]
pub struct ContextDirectoryStep;

impl ContextDirectoryStep {
    /// Base directory read from `key` of the previous pass's tree
    pub fn by_key(self, key: impl Into<String>) -> NamedSource {
        self.by(PathSpec::by_key(key))
    }

    /// Constant base directory
    pub fn by_path(self, path: impl Into<PathBuf>) -> NamedSource {
        self.by(PathSpec::by_path(path))
    }

    /// Base directory from `spec`, named `context directory <spec name>`
    pub fn by(self, spec: PathSpec) -> NamedSource {
        let name = format!("context directory {}", spec.name());
        ContextDirectorySource::new(spec).named(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use stratum_config::CurrentTree;

    #[test]
    fn test_empty_without_context_path() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("shop.toml"), "a = 1").unwrap();

        let source = ContextDirectorySource::new(PathSpec::by_path(dir.path()));
        assert!(source.load(&Bindings::none()).unwrap().is_empty());
    }

    #[test]
    fn test_empty_without_directory() {
        let source = ContextDirectorySource::new(PathSpec::by_key("webapp.config.directory"));
        let bindings = Bindings::none()
            .set(CurrentTree(Tree::empty()))
            .set(ContextPath::parse("/shop"));
        assert!(source.load(&bindings).unwrap().is_empty());
    }

    #[test]
    fn test_loads_file_for_context() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("a")).unwrap();
        std::fs::write(dir.path().join("a").join("b.json"), r#"{"x": 1}"#).unwrap();

        let source = context_directory().by_path(dir.path());
        let tree = source
            .load(&Bindings::none().set(ContextPath::parse("/a/b")))
            .unwrap();
        assert_eq!(tree.as_value(), json!({ "x": 1 }));
    }

    #[test]
    fn test_names() {
        assert_eq!(
            context_directory().by_key("k").name().as_str(),
            "context directory by key: k"
        );
        assert_eq!(
            ContextDirectorySource::new(PathSpec::by_key("k")).to_string(),
            "context relative to directory by key: k"
        );
    }
}
