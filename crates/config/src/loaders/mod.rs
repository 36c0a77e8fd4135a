//! Built-in configuration sources

mod env;
mod file;
mod properties;
mod resource;
mod string;

pub use env::EnvironmentSource;
pub use file::{FileSource, PathSpec};
pub use properties::PropertiesSource;
pub use resource::{DirectoryResources, EmbeddedResources, Resource, ResourceLoader, ResourceSource};
pub use string::StringSource;

use crate::core::{Bindings, ParseOptions};

/// Parse options bound in `bindings`, or the defaults
pub(crate) fn bound_parse_options(bindings: &Bindings) -> ParseOptions {
    bindings
        .get::<ParseOptions>()
        .map_or_else(ParseOptions::defaults, |options| (*options).clone())
}
