//! Naming errors

use std::path::PathBuf;
use thiserror::Error;

/// Failure while looking up or listing a naming context
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NamingError {
    /// Nothing is bound under the name
    #[error("Name not found: {name}")]
    NameNotFound {
        /// The name looked up
        name: String,
    },

    /// The name is bound to something that is not a context
    #[error("Not a context: {name}")]
    NotAContext {
        /// The name looked up
        name: String,
    },

    /// The name cannot be used with this context
    #[error("Invalid name '{name}': {message}")]
    InvalidName {
        /// The offending name
        name: String,
        /// Why it was rejected
        message: String,
    },

    /// Backing storage failed
    #[error("I/O error at {path}: {message}")]
    Io {
        /// Path being accessed
        path: PathBuf,
        /// Underlying error message
        message: String,
    },
}

impl NamingError {
    /// Create a name-not-found error
    pub fn name_not_found(name: impl Into<String>) -> Self {
        Self::NameNotFound { name: name.into() }
    }

    /// Create a not-a-context error
    pub fn not_a_context(name: impl Into<String>) -> Self {
        Self::NotAContext { name: name.into() }
    }

    /// Create an invalid-name error
    pub fn invalid_name(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidName {
            name: name.into(),
            message: message.into(),
        }
    }

    /// Create an I/O error
    pub fn io(path: impl Into<PathBuf>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Result alias for naming operations
pub type NamingResult<T> = Result<T, NamingError>;
