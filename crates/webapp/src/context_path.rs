//! Web-application context path

use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

/// The path a web application is mounted at, split into components.
///
/// Bind one into a factory so that context-directory sources can find the
/// file belonging to this application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct ContextPath {
    components: Vec<String>,
}

impl ContextPath {
    /// The root context
    pub fn root() -> Self {
        Self::default()
    }

    /// Split `path` on `/`, dropping empty components
    pub fn parse(path: &str) -> Self {
        Self {
            components: path
                .split('/')
                .filter(|component| !component.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// Path components in order
    pub fn components(&self) -> &[String] {
        &self.components
    }

    /// Whether this is the root context
    pub fn is_root(&self) -> bool {
        self.components.is_empty()
    }
}

impl FromStr for ContextPath {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::parse(s))
    }
}

impl fmt::Display for ContextPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ContextPath { ")?;
        if self.is_root() {
            f.write_str("(root)")?;
        }
        for component in &self.components {
            write!(f, "/{component}")?;
        }
        f.write_str(" }")
    }
}
