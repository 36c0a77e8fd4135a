//! Turning arguments into a configuration factory

use crate::args::SourceArgs;
use anyhow::{Context, Result};
use stratum_config::{
    ConfigFactory, ConfigSourceExt, DirectoryResources, EnvironmentSource, NamedSource,
    ResolveOptions, config_file, config_string, environment, resource,
};
use stratum_naming::{DirectoryContext, FsContext};
use stratum_webapp::{ContextPath, NamingRoot, webapp_config_factory, webapp_config_factory_for};

const ENVIRONMENT: &str = "environment";

pub fn build_factory(args: &SourceArgs) -> Result<ConfigFactory> {
    let mut factory = base_factory(args)?;

    let mut sources: Vec<NamedSource> = args
        .strings
        .iter()
        .enumerate()
        .map(|(i, text)| config_string(text.as_str()).named(format!("string #{}", i + 1)))
        .collect();

    if let Some(env) = environment_source(args) {
        if args.webapp {
            factory = factory
                .insert_source(env)
                .replacing(ENVIRONMENT)
                .context("Replacing the preset environment source")?;
        } else {
            sources.push(env);
        }
    }

    sources.extend(args.files.iter().map(|path| config_file().by_path(path)));
    sources.extend(args.file_keys.iter().map(|key| config_file().by_key(key.as_str())));
    sources.extend(args.resources.iter().map(|name| resource(name.as_str())));

    if !sources.is_empty() {
        factory = factory
            .insert_sources(sources)
            .from_highest_to_lowest_precedence()
            .with_highest_precedence()
            .context("Adding sources")?;
    }

    if !args.resource_roots.is_empty() {
        factory = factory.with_resource_loader(DirectoryResources::new(args.resource_roots.clone()));
    }
    if let Some(dir) = &args.naming_dir {
        factory = factory
            .bind::<NamingRoot>()
            .to_instance(NamingRoot(DirectoryContext::new(FsContext::new(dir))));
    }
    if args.allow_unresolved {
        factory =
            factory.with_resolve_options(ResolveOptions::defaults().with_allow_unresolved(true));
    }

    tracing::debug!(action = "build_factory", sources = %factory.sources(), "Factory ready");
    Ok(factory)
}

fn base_factory(args: &SourceArgs) -> Result<ConfigFactory> {
    let context_path = args.context_path.as_deref().map(ContextPath::parse);
    let factory = match (args.webapp, context_path) {
        (true, Some(path)) => webapp_config_factory_for(path)?,
        (true, None) => webapp_config_factory()?,
        (false, Some(path)) => ConfigFactory::empty()
            .bind_defaults()
            .bind::<ContextPath>()
            .to_instance(path),
        (false, None) => ConfigFactory::empty().bind_defaults(),
    };
    Ok(factory)
}

fn environment_source(args: &SourceArgs) -> Option<NamedSource> {
    match &args.env_prefix {
        Some(prefix) => Some(EnvironmentSource::with_prefix(prefix.as_str()).named(ENVIRONMENT)),
        None if args.env => Some(environment()),
        None => None,
    }
}
