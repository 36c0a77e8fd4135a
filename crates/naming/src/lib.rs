//! # Stratum Naming
//!
//! Hierarchical naming contexts (an in-memory tree or a directory on disk)
//! and their conversion into configuration trees.
//!
//! ```rust
//! use stratum_naming::{DirectoryContext, MemoryContext};
//!
//! let root = MemoryContext::new().bind_context(
//!     "env",
//!     MemoryContext::new().bind_text("port", "8080"),
//! );
//! let tree = DirectoryContext::new(root).get_context("env").to_tree();
//! assert_eq!(tree.get("port"), Some(&serde_json::json!(8080)));
//! ```

#![deny(unused_must_use)]
#![warn(missing_docs)]

mod context;
mod directory;
mod error;
mod fs;
mod memory;

pub use context::{Entry, NamingContext};
pub use directory::DirectoryContext;
pub use error::{NamingError, NamingResult};
pub use fs::FsContext;
pub use memory::MemoryContext;
