use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

use crate::output::OutputFormat;

#[derive(Parser)]
#[command(name = "apiflow")]
#[command(version, about = "ApiFlow - chain HTTP calls into a dependency graph")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file (defaults to ~/.config/apiflow/config.toml)
    #[arg(long, global = true, env = "APIFLOW_CONFIG")]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a starter flow snapshot
    Init {
        /// Snapshot file to create
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the execution order of a flow
    Order(GraphArgs),

    /// Check a flow for cycles, dangling edges and bad references
    Validate(GraphArgs),

    /// Execute every node of a flow
    Run(RunArgs),

    /// Pin a flow to a content-addressed store
    Publish(PublishArgs),

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct GraphArgs {
    /// Snapshot file
    pub snapshot: PathBuf,

    /// Treat edges to unknown nodes as errors
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args)]
pub struct RunArgs {
    /// Snapshot file
    pub snapshot: PathBuf,

    /// Maximum calls in flight (1 runs strictly in order)
    #[arg(short, long, env = "APIFLOW_CONCURRENCY")]
    pub concurrency: Option<usize>,

    /// Per-request timeout in seconds (0 disables it)
    #[arg(long, env = "APIFLOW_TIMEOUT_SECS")]
    pub timeout_secs: Option<u64>,

    /// Reject edges to unknown nodes when loading
    #[arg(long)]
    pub strict: bool,

    /// Save statuses and results back into the snapshot
    #[arg(long)]
    pub write_back: bool,
}

#[derive(Args)]
pub struct PublishArgs {
    /// Snapshot file
    pub snapshot: PathBuf,

    /// Pinning service URL
    #[arg(long, env = "APIFLOW_PUBLISH_URL")]
    pub endpoint: Option<String>,

    /// Bearer token for the pinning service
    #[arg(long, env = "APIFLOW_PUBLISH_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Response field holding the content address
    #[arg(long)]
    pub address_field: Option<String>,

    /// Wrap the payload under this key
    #[arg(long)]
    pub content_field: Option<String>,
}
