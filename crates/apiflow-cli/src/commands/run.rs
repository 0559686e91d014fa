use anyhow::{Context, Result};
use apiflow_core::snapshot;
use apiflow_core::{
    ExecutionReport, Executor, ExecutorConfig, Graph, HttpConfig, NodeOutcome, ReqwestInvoker,
    RunEvent,
};
use colored::Colorize;
use comfy_table::{Cell, Table};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::cli::RunArgs;
use crate::commands::{edge_policy, load_graph};
use crate::config::CliConfig;
use crate::output::table::{preview_text, print_table, status_label};
use crate::output::{OutputFormat, json::print_json};

pub async fn run(args: RunArgs, config: &CliConfig, format: OutputFormat) -> Result<()> {
    let policy = edge_policy(args.strict, config.engine.edge_policy());
    let mut graph = load_graph(&args.snapshot, policy)?;

    let http = HttpConfig {
        timeout_secs: args.timeout_secs.unwrap_or(config.engine.http.timeout_secs),
    };
    let executor_config = ExecutorConfig {
        max_concurrency: args
            .concurrency
            .unwrap_or(config.engine.executor.max_concurrency),
    };
    let invoker = ReqwestInvoker::new(&http).context("Failed to build HTTP client")?;

    let (tx, rx) = mpsc::unbounded_channel();
    let printer = (!format.is_json()).then(|| tokio::spawn(print_events(rx, labels(&graph))));

    let executor = Executor::new(Arc::new(invoker))
        .with_config(executor_config)
        .with_events(tx);
    let report = executor.run(&mut graph).await;
    // Closes the event channel so the printer drains and exits.
    drop(executor);
    if let Some(printer) = printer {
        printer.await.ok();
    }

    if args.write_back {
        snapshot::save_to_path(&graph, &args.snapshot)
            .with_context(|| format!("Failed to write {}", args.snapshot.display()))?;
    }

    if format.is_json() {
        return print_json(&report);
    }

    print_report(&graph, &report)?;
    if args.write_back {
        println!("Results saved to {}", args.snapshot.display());
    }
    Ok(())
}

fn labels(graph: &Graph) -> HashMap<String, String> {
    graph
        .nodes()
        .iter()
        .map(|n| (n.id().to_string(), n.label().to_string()))
        .collect()
}

async fn print_events(mut rx: mpsc::UnboundedReceiver<RunEvent>, labels: HashMap<String, String>) {
    while let Some(event) = rx.recv().await {
        match event {
            RunEvent::Started {
                order,
                cycle_detected,
                ..
            } => {
                println!("Running {} node(s)", order.len());
                if cycle_detected {
                    println!(
                        "{} some nodes are on a cycle or wait on an unknown node and will not run",
                        "Warning:".yellow().bold()
                    );
                }
            }
            RunEvent::NodeStatus { node_id, status } => {
                let label = labels.get(&node_id).map(String::as_str).unwrap_or("");
                println!("  [{}] {} {}", status_label(status), node_id, label.dimmed());
            }
            RunEvent::Finished { .. } => {}
        }
    }
}

fn print_report(graph: &Graph, report: &ExecutionReport) -> Result<()> {
    let mut table = Table::new();
    table.set_header(vec!["ID", "Label", "Method", "Status", "Result"]);

    for id in &report.order {
        let Some(node) = graph.node(id) else {
            continue;
        };
        let result = match report.outcome(id) {
            Some(NodeOutcome::Success(payload)) => preview_text(&payload.to_string(), 60),
            Some(NodeOutcome::Error(message)) => preview_text(message, 60),
            None => "skipped".to_string(),
        };
        table.add_row(vec![
            Cell::new(node.id()),
            Cell::new(node.label()),
            Cell::new(node.method()),
            Cell::new(status_label(node.status())),
            Cell::new(result),
        ]);
    }
    print_table(table)?;

    println!(
        "{} succeeded, {} failed, {} skipped",
        report.succeeded().to_string().green(),
        report.failed().to_string().red(),
        report.skipped.len()
    );
    if report.cycle_detected {
        let plan = apiflow_core::DependencyGraph::from_graph(graph);
        println!(
            "{} not executed: {}",
            "Cycle:".yellow().bold(),
            plan.unordered(&report.order).join(", ")
        );
    }
    Ok(())
}
