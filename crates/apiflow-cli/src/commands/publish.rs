use anyhow::{Context, Result};
use apiflow_core::{EdgePolicy, Publisher};
use serde_json::json;

use crate::cli::PublishArgs;
use crate::commands::load_graph;
use crate::config::CliConfig;
use crate::output::{OutputFormat, json::print_json};

pub async fn run(args: PublishArgs, config: &CliConfig, format: OutputFormat) -> Result<()> {
    let graph = load_graph(&args.snapshot, EdgePolicy::Lenient)?;

    let mut publish = config.engine.publish.clone();
    if args.endpoint.is_some() {
        publish.endpoint = args.endpoint;
    }
    if args.token.is_some() {
        publish.token = args.token;
    }
    if let Some(field) = args.address_field {
        publish.address_field = field;
    }
    if args.content_field.is_some() {
        publish.content_field = args.content_field;
    }

    let publisher = Publisher::new(publish).context("Failed to build HTTP client")?;
    let address = publisher.publish(&graph).await?;

    if format.is_json() {
        return print_json(&json!({ "address": address.to_string() }));
    }

    println!("{address}");
    Ok(())
}
