//! Ready-made factory for web applications

use crate::{ContextPath, context_directory, naming};
use stratum_config::{ConfigFactory, ConfigResult, config_file, environment, resource};

/// Key holding the per-application configuration directory
pub const CONFIG_DIRECTORY_KEY: &str = "webapp.config.directory";

/// Key holding the application configuration file
pub const CONFIG_FILE_KEY: &str = "webapp.config.file";

/// A factory with the default bindings and, from highest to lowest
/// precedence:
///
/// 1. the directory namespace (`directory`)
/// 2. the process environment
/// 3. the context directory found at `directory.webapp.config.directory`
/// 4. the context directory found at `webapp.config.directory`
/// 5. the file found at `directory.webapp.config.file`
/// 6. the file found at `webapp.config.file`
/// 7. resources named `application`
/// 8. resources named `reference`
///
/// Context-directory sources contribute nothing until a [`ContextPath`] is
/// bound; see [`webapp_config_factory_for`].
pub fn webapp_config_factory() -> ConfigResult<ConfigFactory> {
    ConfigFactory::empty()
        .bind_defaults()
        .with_sources(vec![
            naming().into(),
            environment(),
            context_directory().by_key(format!("directory.{CONFIG_DIRECTORY_KEY}")),
            context_directory().by_key(CONFIG_DIRECTORY_KEY),
            config_file().by_key(format!("directory.{CONFIG_FILE_KEY}")),
            config_file().by_key(CONFIG_FILE_KEY),
            resource("application"),
            resource("reference"),
        ])
        .from_highest_to_lowest_precedence()
}

/// [`webapp_config_factory`] with `context_path` bound
pub fn webapp_config_factory_for(context_path: ContextPath) -> ConfigResult<ConfigFactory> {
    tracing::debug!(action = "webapp_factory", %context_path, "Building web application factory");
    Ok(webapp_config_factory()?
        .bind::<ContextPath>()
        .to_instance(context_path))
}
