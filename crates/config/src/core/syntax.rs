//! Configuration syntaxes and parse options

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Text syntax of a configuration document
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    /// JSON
    Json,

    /// TOML
    Toml,

    /// YAML
    Yaml,

    /// INI sections with `key = value` lines
    Ini,

    /// `.properties` files with dot-notation keys
    Properties,
}

impl Syntax {
    /// Extensions probed, in precedence order, when a path has none.
    pub const PROBE_ORDER: [(&'static str, Syntax); 5] = [
        ("toml", Syntax::Toml),
        ("yaml", Syntax::Yaml),
        ("yml", Syntax::Yaml),
        ("json", Syntax::Json),
        ("properties", Syntax::Properties),
    ];

    /// Canonical file extension for this syntax
    pub fn extension(&self) -> &'static str {
        match self {
            Syntax::Json => "json",
            Syntax::Toml => "toml",
            Syntax::Yaml => "yml",
            Syntax::Ini => "ini",
            Syntax::Properties => "properties",
        }
    }

    /// Detect syntax from file extension
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "json" => Some(Syntax::Json),
            "toml" => Some(Syntax::Toml),
            "yml" | "yaml" => Some(Syntax::Yaml),
            "ini" | "cfg" => Some(Syntax::Ini),
            "properties" | "props" => Some(Syntax::Properties),
            _ => None,
        }
    }

    /// Detect syntax from file path
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// Whether this build can parse the syntax
    pub fn is_supported(&self) -> bool {
        match self {
            Syntax::Toml => cfg!(feature = "toml"),
            Syntax::Yaml => cfg!(feature = "yaml"),
            Syntax::Json | Syntax::Ini | Syntax::Properties => true,
        }
    }
}

impl std::fmt::Display for Syntax {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Syntax::Json => write!(f, "JSON"),
            Syntax::Toml => write!(f, "TOML"),
            Syntax::Yaml => write!(f, "YAML"),
            Syntax::Ini => write!(f, "INI"),
            Syntax::Properties => write!(f, "Properties"),
        }
    }
}

/// Options applied whenever a source parses text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParseOptions {
    /// Force a syntax instead of detecting it from the extension
    pub syntax: Option<Syntax>,

    /// Treat missing files as empty instead of failing
    pub allow_missing: bool,

    /// Origin description attached to parsed trees
    pub origin_description: Option<String>,
}

impl ParseOptions {
    /// Default options: detect syntax, allow missing files
    pub fn defaults() -> Self {
        Self {
            syntax: None,
            allow_missing: true,
            origin_description: None,
        }
    }

    /// Force a syntax
    #[must_use = "builder methods must be chained or built"]
    pub fn with_syntax(mut self, syntax: Syntax) -> Self {
        self.syntax = Some(syntax);
        self
    }

    /// Set whether missing files are allowed
    #[must_use = "builder methods must be chained or built"]
    pub fn with_allow_missing(mut self, allow: bool) -> Self {
        self.allow_missing = allow;
        self
    }

    /// Set the origin description
    #[must_use = "builder methods must be chained or built"]
    pub fn with_origin_description(mut self, origin: impl Into<String>) -> Self {
        self.origin_description = Some(origin.into());
        self
    }
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self::defaults()
    }
}
