use anyhow::{Result, bail};
use apiflow_core::engine::context::references;
use apiflow_core::{DependencyGraph, EdgePolicy, Graph};
use colored::Colorize;
use comfy_table::{Cell, Table};
use serde::Serialize;
use std::collections::HashSet;

use crate::cli::GraphArgs;
use crate::commands::{edge_policy, load_graph};
use crate::config::CliConfig;
use crate::output::table::print_table;
use crate::output::{OutputFormat, json::print_json};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

#[derive(Debug, Clone, Serialize)]
pub struct Issue {
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<String>,
    pub message: String,
}

impl Issue {
    fn error(node: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            node: node.map(str::to_string),
            message: message.into(),
        }
    }

    fn warning(node: Option<&str>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            node: node.map(str::to_string),
            message: message.into(),
        }
    }
}

pub fn run(args: GraphArgs, config: &CliConfig, format: OutputFormat) -> Result<()> {
    // Always load leniently so dangling edges are reported, not rejected.
    let graph = load_graph(&args.snapshot, EdgePolicy::Lenient)?;
    let strict = edge_policy(args.strict, config.engine.edge_policy()) == EdgePolicy::Strict;
    let issues = check(&graph, strict);
    let errors = issues
        .iter()
        .filter(|i| i.severity == Severity::Error)
        .count();

    if format.is_json() {
        print_json(&serde_json::json!({ "valid": errors == 0, "issues": issues }))?;
    } else if issues.is_empty() {
        println!("{} {} node(s), {} edge(s)", "OK".green().bold(), graph.len(), graph.edges().len());
    } else {
        let mut table = Table::new();
        table.set_header(vec!["Severity", "Node", "Problem"]);
        for issue in &issues {
            let severity = match issue.severity {
                Severity::Error => "error".red().bold(),
                Severity::Warning => "warning".yellow(),
            };
            table.add_row(vec![
                Cell::new(severity),
                Cell::new(issue.node.as_deref().unwrap_or("-")),
                Cell::new(&issue.message),
            ]);
        }
        print_table(table)?;
    }

    if errors > 0 {
        bail!("Validation failed with {errors} error(s)");
    }
    Ok(())
}

pub fn check(graph: &Graph, strict: bool) -> Vec<Issue> {
    let mut issues = Vec::new();

    let mut seen = HashSet::new();
    for node in graph.nodes() {
        if !seen.insert(node.id()) {
            issues.push(Issue::warning(
                Some(node.id()),
                "duplicate node id; only the first definition is used",
            ));
        }
    }

    for edge in graph.dangling_edges() {
        let message = format!("edge {} -> {} references an unknown node", edge.source, edge.target);
        issues.push(if strict {
            Issue::error(None, message)
        } else {
            Issue::warning(None, message)
        });
    }

    let plan = DependencyGraph::from_graph(graph);
    let order = plan.execution_order();
    if order.cycle_detected {
        let unordered = plan.unordered(&order.order);
        issues.push(Issue::error(
            None,
            format!(
                "cycle or unknown dependency; never executed: {}",
                unordered.join(", ")
            ),
        ));
    }

    for node in graph.nodes() {
        let id = node.id();
        if !node.has_endpoint() {
            issues.push(Issue::warning(Some(id), "no endpoint; node will be skipped"));
        }
        if node.body_template().is_some() && !node.method().carries_body() {
            issues.push(Issue::warning(
                Some(id),
                format!("body template is ignored for {}", node.method()),
            ));
        }

        let ancestors = plan.ancestors(id);
        let mut templates = vec![node.endpoint_template()];
        if node.method().carries_body() {
            templates.extend(node.body_template());
        }
        let mut referenced: Vec<String> = Vec::new();
        for template in templates {
            for target in references(template) {
                if !referenced.contains(&target) {
                    referenced.push(target);
                }
            }
        }
        for target in referenced {
            if !graph.contains(&target) {
                issues.push(Issue::warning(
                    Some(id),
                    format!("references unknown node '{target}'"),
                ));
            } else if !ancestors.contains(&target) {
                issues.push(Issue::warning(
                    Some(id),
                    format!("references node '{target}' which is not upstream"),
                ));
            }
        }
    }

    issues
}
