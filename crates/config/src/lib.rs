//! Stratum Config - layered configuration from named, ordered sources
//!
//! Sources (files, resources, environment variables, inline strings) are
//! kept in a list ordered from highest to lowest precedence. Loading folds
//! their trees together with fallback merge, resolves `${...}` references,
//! and then runs a second pass in which every source can see the first
//! pass's result.
//!
//! # Example
//!
//! ```rust,no_run
//! use stratum_config::prelude::*;
//!
//! fn main() -> ConfigResult<()> {
//!     let factory = ConfigFactory::empty()
//!         .bind_defaults()
//!         .with_sources(vec![
//!             environment(),
//!             config_file().by_key("app.config.file"),
//!             resource("application"),
//!             resource("reference"),
//!         ])
//!         .from_highest_to_lowest_precedence()?;
//!
//!     let tree = factory.load()?;
//!     let port: Option<u16> = tree.get_as("server.port")?;
//!     println!("port = {port:?}");
//!     Ok(())
//! }
//! ```

#![deny(unused_must_use)]
#![warn(missing_docs)]

pub mod core;
pub mod loaders;

pub use crate::core::{
    BindStep, Bindings, ConfigError, ConfigFactory, ConfigResult, ConfigResultExt, ConfigSource,
    ConfigSourceExt, CurrentTree, ErrorCategory, NamedSource, ParseOptions, Precedence,
    ResolveOptions, SourceInsertionStep, SourceList, SourceName, Syntax, Tree, config_file,
    config_string, environment, escape_literal, parse_scalar_value, properties, resource,
    source_named,
};

pub use loaders::{
    DirectoryResources, EmbeddedResources, EnvironmentSource, FileSource, PathSpec,
    PropertiesSource, Resource, ResourceLoader, ResourceSource, StringSource,
};

/// Prelude module for convenient imports
pub mod prelude {
    //! Prelude for common imports
    //!
    //! # Example
    //! ```rust
    //! use stratum_config::prelude::*;
    //! ```

    pub use crate::core::{
        Bindings, ConfigError, ConfigFactory, ConfigResult, ConfigResultExt, ConfigSource,
        ConfigSourceExt, CurrentTree, NamedSource, ParseOptions, Precedence, ResolveOptions,
        SourceList, SourceName, Syntax, Tree, config_file, config_string, environment,
        properties, resource, source_named,
    };

    pub use crate::loaders::{
        DirectoryResources, EmbeddedResources, EnvironmentSource, PathSpec, ResourceLoader,
    };
}
