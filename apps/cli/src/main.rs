//! `stratum` - load layered configuration from the command line
//!
//! ```text
//! stratum load --string 'port = 8080' --file app.toml --resource reference
//! stratum sources --webapp --context-path /shop
//! ```

use anyhow::{Context, Result};
use clap::Parser;
use stratum_config::Tree;

mod args;
mod build;

use crate::args::{Cli, Command, Format};
use crate::build::build_factory;

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new(
                "stratum=debug,stratum_config=debug,stratum_naming=debug,stratum_webapp=debug,warn",
            )
        } else {
            EnvFilter::new("warn")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn render(tree: &Tree, format: Format) -> Result<String> {
    match format {
        Format::Json => serde_json::to_string_pretty(tree).context("Rendering JSON"),
        Format::Toml => toml::to_string_pretty(tree).context("Rendering TOML"),
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Command::Load { sources, format } => {
            let factory = build_factory(&sources)?;
            let tree = factory.load().context("Loading configuration")?;
            println!("{}", render(&tree, format)?);
        }
        Command::Sources { sources } => {
            let factory = build_factory(&sources)?;
            for name in factory.sources().names() {
                println!("{name}");
            }
        }
    }

    Ok(())
}
