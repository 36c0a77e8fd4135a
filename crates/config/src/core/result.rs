//! Result alias and helpers for configuration operations

use super::error::ConfigError;

/// Standard result type for configuration operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration-specific combinators on [`ConfigResult`]
pub trait ConfigResultExt<T> {
    /// Prefix a source error's message with `f()`.
    ///
    /// Other variants pass through untouched.
    fn with_context<F>(self, f: F) -> ConfigResult<T>
    where
        F: FnOnce() -> String;

    /// Turn a file-not-found error into `Ok(None)`
    fn or_missing(self) -> ConfigResult<Option<T>>;
}

impl<T> ConfigResultExt<T> for ConfigResult<T> {
    fn with_context<F>(self, f: F) -> ConfigResult<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| match e {
            ConfigError::SourceError { message, origin } => ConfigError::SourceError {
                message: format!("{}: {message}", f()),
                origin,
            },
            other => other,
        })
    }

    fn or_missing(self) -> ConfigResult<Option<T>> {
        match self {
            Ok(value) => Ok(Some(value)),
            Err(e) if e.is_missing_source() => Ok(None),
            Err(e) => Err(e),
        }
    }
}
