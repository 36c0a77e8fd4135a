//! Command-line arguments

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "stratum", version)]
#[command(about = "Load layered configuration from precedence-ordered sources")]
pub struct Cli {
    /// Verbose logging (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load every source and print the merged configuration
    Load {
        #[command(flatten)]
        sources: SourceArgs,

        /// Output format
        #[arg(long, value_enum, default_value_t = Format::Json)]
        format: Format,
    },

    /// Print source names from highest to lowest precedence
    Sources {
        #[command(flatten)]
        sources: SourceArgs,
    },
}

/// Sources and bindings, shared by every subcommand.
///
/// Within each group, earlier flags take precedence over later ones. Groups
/// rank strings, environment, files, file keys, then resources.
#[derive(Args, Debug, Default)]
pub struct SourceArgs {
    /// Configuration file (repeatable)
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<PathBuf>,

    /// Key whose value names a configuration file (repeatable)
    #[arg(long = "file-key", value_name = "KEY")]
    pub file_keys: Vec<String>,

    /// Resource base name (repeatable)
    #[arg(long = "resource", value_name = "NAME")]
    pub resources: Vec<String>,

    /// Directory searched for resources (repeatable, default: current directory)
    #[arg(long = "resource-root", value_name = "DIR")]
    pub resource_roots: Vec<PathBuf>,

    /// Inline configuration text (repeatable)
    #[arg(long = "string", value_name = "TEXT")]
    pub strings: Vec<String>,

    /// Include the process environment
    #[arg(long)]
    pub env: bool,

    /// Include only environment variables with this prefix
    #[arg(long, value_name = "PREFIX")]
    pub env_prefix: Option<String>,

    /// Start from the web-application preset
    #[arg(long)]
    pub webapp: bool,

    /// Web-application context path, e.g. /shop
    #[arg(long, value_name = "PATH")]
    pub context_path: Option<String>,

    /// Directory exposed as the naming namespace
    #[arg(long, value_name = "DIR")]
    pub naming_dir: Option<PathBuf>,

    /// Leave unresolvable substitutions in place instead of failing
    #[arg(long)]
    pub allow_unresolved: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Format {
    Json,
    Toml,
}
