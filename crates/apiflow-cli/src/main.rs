mod cli;
mod commands;
mod completions;
mod config;
mod error;
mod output;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands};
use config::CliConfig;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

const LOG_ENV: &str = "APIFLOW_LOG";

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(err) = run(cli).await {
        error::handle_error(err);
    }
}

async fn run(cli: Cli) -> Result<()> {
    if let Commands::Completions { shell } = cli.command {
        completions::write_completions(shell, &mut std::io::stdout());
        return Ok(());
    }

    let config = CliConfig::load(cli.config.as_deref())?;
    let _guard = init_logging(&config, cli.verbose);

    match cli.command {
        Commands::Init { path, force } => commands::init::run(&path, force, cli.format),
        Commands::Order(args) => commands::order::run(args, &config, cli.format),
        Commands::Validate(args) => commands::validate::run(args, &config, cli.format),
        Commands::Run(args) => commands::run::run(args, &config, cli.format).await,
        Commands::Publish(args) => commands::publish::run(args, &config, cli.format).await,
        Commands::Completions { .. } => Ok(()),
    }
}

/// Console logs go to stderr; a daily file is kept when the log dir is writable.
fn init_logging(config: &CliConfig, verbose: bool) -> Option<WorkerGuard> {
    let default_filter = config
        .log
        .filter
        .clone()
        .unwrap_or_else(|| if verbose { "info" } else { "warn" }.to_string());
    let console_filter = EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| EnvFilter::new(&default_filter));

    let console = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_filter(console_filter);

    let log_dir = config
        .log_dir()
        .filter(|dir| std::fs::create_dir_all(dir).is_ok());
    let (file, guard) = match log_dir {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "apiflow.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(false)
                .with_target(false)
                .with_level(true)
                .with_filter(EnvFilter::new("info"));
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry().with(console).with(file).init();
    guard
}
