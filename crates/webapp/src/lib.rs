//! # Stratum Webapp
//!
//! A configuration preset for web applications: the directory namespace,
//! the environment, per-application files and bundled resources layered in
//! a fixed precedence order.
//!
//! ```rust,no_run
//! use stratum_naming::{DirectoryContext, FsContext};
//! use stratum_webapp::{ContextPath, NamingRoot, webapp_config_factory_for};
//!
//! # fn main() -> stratum_config::ConfigResult<()> {
//! let config = webapp_config_factory_for(ContextPath::parse("/shop"))?
//!     .bind::<NamingRoot>()
//!     .to_instance(NamingRoot(DirectoryContext::new(FsContext::new("/etc/naming"))))
//!     .load()?;
//! println!("{config}");
//! # Ok(())
//! # }
//! ```

#![deny(unused_must_use)]
#![warn(missing_docs)]

mod context_directory;
mod context_path;
mod naming_source;
mod preset;

pub use context_directory::{ContextDirectorySource, ContextDirectoryStep, context_directory};
pub use context_path::ContextPath;
pub use naming_source::{
    DEFAULT_NAME, NAMESPACE_KEY, NamingRoot, NamingSource, PathMapping, naming,
};
pub use preset::{
    CONFIG_DIRECTORY_KEY, CONFIG_FILE_KEY, webapp_config_factory, webapp_config_factory_for,
};
