use anyhow::Result;
use apiflow_core::DependencyGraph;
use comfy_table::{Cell, Table};
use serde_json::json;

use crate::cli::GraphArgs;
use crate::commands::{edge_policy, load_graph};
use crate::config::CliConfig;
use crate::output::table::print_table;
use crate::output::{OutputFormat, json::print_json};
use colored::Colorize;

pub fn run(args: GraphArgs, config: &CliConfig, format: OutputFormat) -> Result<()> {
    let policy = edge_policy(args.strict, config.engine.edge_policy());
    let graph = load_graph(&args.snapshot, policy)?;
    let plan = DependencyGraph::from_graph(&graph);
    let result = plan.execution_order();
    let unordered = plan.unordered(&result.order);

    if format.is_json() {
        return print_json(&json!({
            "order": result.order,
            "cycleDetected": result.cycle_detected,
            "unordered": unordered,
        }));
    }

    let mut table = Table::new();
    table.set_header(vec!["#", "ID", "Label", "Method", "Endpoint"]);
    for (step, id) in result.order.iter().enumerate() {
        let Some(node) = graph.node(id) else {
            continue;
        };
        table.add_row(vec![
            Cell::new(step + 1),
            Cell::new(node.id()),
            Cell::new(node.label()),
            Cell::new(node.method()),
            Cell::new(node.endpoint_template()),
        ]);
    }
    print_table(table)?;

    if result.cycle_detected {
        println!(
            "{} {} node(s) not ordered (cycle or unknown dependency): {}",
            "Warning:".yellow().bold(),
            unordered.len(),
            unordered.join(", ")
        );
    }
    Ok(())
}
