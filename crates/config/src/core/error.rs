//! Configuration error types

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Configuration error type
#[non_exhaustive]
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfigError {
    /// Configuration file not found
    #[error("Configuration file not found: {path}")]
    FileNotFound {
        /// Path to the configuration file
        path: PathBuf,
    },

    /// Configuration file read error
    #[error("Failed to read configuration file {path}: {message}")]
    FileReadError {
        /// Path to the configuration file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Configuration text could not be parsed
    #[error("Failed to parse configuration from {origin}: {message}")]
    ParseError {
        /// Where the text came from (file path, resource, "string")
        origin: String,
        /// Error message describing the parse failure
        message: String,
    },

    /// Configuration syntax not supported by this build
    #[error("Configuration syntax not supported: {format}")]
    FormatNotSupported {
        /// Syntax that is not supported
        format: String,
    },

    /// Two elements of an ordered list share an identifier
    #[error("Duplicate element identifier: {identifier}")]
    DuplicateIdentifier {
        /// The identifier that occurs more than once
        identifier: String,
    },

    /// A relative insertion referenced an identifier that is not in the list
    #[error("No such element identifier: {identifier}")]
    NoSuchIdentifier {
        /// The identifier that was not found
        identifier: String,
    },

    /// A `${...}` reference could not be resolved
    #[error("Could not resolve substitution ${{{path}}}: {message}")]
    SubstitutionError {
        /// Path named by the offending reference
        path: String,
        /// Error message describing the failure
        message: String,
    },

    /// Configuration type error
    #[error("Configuration type error: {message}")]
    TypeError {
        /// Error message describing the type mismatch
        message: String,
        /// Expected type
        expected: String,
        /// Actual type encountered
        actual: String,
    },

    /// Configuration path error
    #[error("Configuration path error: {message}")]
    PathError {
        /// Error message describing the path issue
        message: String,
        /// Path that caused the error
        path: String,
    },

    /// Configuration source error
    #[error("Configuration source error: {message}")]
    SourceError {
        /// Error message describing the source error
        message: String,
        /// Origin of the configuration source
        origin: String,
    },
}

impl ConfigError {
    /// Create a file not found error
    pub fn file_not_found(path: impl Into<PathBuf>) -> Self {
        Self::FileNotFound { path: path.into() }
    }

    /// Create a file read error
    pub fn file_read_error(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::FileReadError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a parse error
    pub fn parse_error(origin: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            origin: origin.into(),
            message: message.into(),
        }
    }

    /// Create a format not supported error
    pub fn format_not_supported(format: impl Into<String>) -> Self {
        Self::FormatNotSupported {
            format: format.into(),
        }
    }

    /// Create a duplicate identifier error
    pub fn duplicate_identifier(identifier: impl Into<String>) -> Self {
        Self::DuplicateIdentifier {
            identifier: identifier.into(),
        }
    }

    /// Create a missing identifier error
    pub fn no_such_identifier(identifier: impl Into<String>) -> Self {
        Self::NoSuchIdentifier {
            identifier: identifier.into(),
        }
    }

    /// Create a substitution error
    pub fn substitution_error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::SubstitutionError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a type error
    pub fn type_error(
        message: impl Into<String>,
        expected: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        Self::TypeError {
            message: message.into(),
            expected: expected.into(),
            actual: actual.into(),
        }
    }

    /// Create a path error
    pub fn path_error(message: impl Into<String>, path: impl Into<String>) -> Self {
        Self::PathError {
            message: message.into(),
            path: path.into(),
        }
    }

    /// Create a source error
    pub fn source_error(message: impl Into<String>, origin: impl Into<String>) -> Self {
        Self::SourceError {
            message: message.into(),
            origin: origin.into(),
        }
    }

    /// Check if error is due to list ordering (duplicate or missing identifier)
    pub fn is_ordering(&self) -> bool {
        matches!(
            self,
            ConfigError::DuplicateIdentifier { .. } | ConfigError::NoSuchIdentifier { .. }
        )
    }

    /// Check if error is due to a missing file
    pub fn is_missing_source(&self) -> bool {
        matches!(self, ConfigError::FileNotFound { .. })
    }

    /// Get the error category
    pub fn category(&self) -> ErrorCategory {
        match self {
            ConfigError::FileNotFound { .. } => ErrorCategory::NotFound,
            ConfigError::FileReadError { .. } => ErrorCategory::Io,
            ConfigError::ParseError { .. } | ConfigError::FormatNotSupported { .. } => {
                ErrorCategory::Parse
            }
            ConfigError::DuplicateIdentifier { .. } | ConfigError::NoSuchIdentifier { .. } => {
                ErrorCategory::Ordering
            }
            ConfigError::SubstitutionError { .. } => ErrorCategory::Resolution,
            ConfigError::TypeError { .. } | ConfigError::PathError { .. } => {
                ErrorCategory::Access
            }
            ConfigError::SourceError { .. } => ErrorCategory::Operation,
        }
    }
}

/// Error category for grouping errors
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Resource not found
    NotFound,
    /// I/O error
    Io,
    /// Parse error
    Parse,
    /// Source list ordering error
    Ordering,
    /// Substitution resolution error
    Resolution,
    /// Wrong type or malformed path while reading a tree
    Access,
    /// Source-level failure
    Operation,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordering_errors_name_the_identifier() {
        let dup = ConfigError::duplicate_identifier("resource: application");
        assert_eq!(
            dup.to_string(),
            "Duplicate element identifier: resource: application"
        );
        assert!(dup.is_ordering());
        assert_eq!(dup.category(), ErrorCategory::Ordering);

        let missing = ConfigError::no_such_identifier("three");
        assert_eq!(missing.to_string(), "No such element identifier: three");
        assert!(missing.is_ordering());
    }

    #[test]
    fn test_substitution_error_names_the_path() {
        let err = ConfigError::substitution_error("db.host", "no value");
        assert_eq!(
            err.to_string(),
            "Could not resolve substitution ${db.host}: no value"
        );
        assert_eq!(err.category(), ErrorCategory::Resolution);
    }

    #[test]
    fn test_missing_file_category() {
        let err = ConfigError::file_not_found("conf/app.toml");
        assert!(err.is_missing_source());
        assert!(!err.is_ordering());
        assert_eq!(err.category(), ErrorCategory::NotFound);
        assert_eq!(
            err.to_string(),
            "Configuration file not found: conf/app.toml"
        );
    }
}
