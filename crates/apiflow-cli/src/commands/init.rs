use anyhow::{Result, bail};
use apiflow_core::snapshot;
use apiflow_core::{Edge, Graph, HttpMethod, Node};
use serde_json::json;
use std::path::Path;

use crate::output::{OutputFormat, json::print_json};

pub fn run(path: &Path, force: bool, format: OutputFormat) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let graph = starter_graph()?;
    snapshot::save_to_path(&graph, path)?;

    if format.is_json() {
        return print_json(&json!({
            "path": path.display().to_string(),
            "nodes": graph.len(),
            "edges": graph.edges().len(),
        }));
    }

    println!("Flow written to {}", path.display());
    println!("  {} nodes, {} edge", graph.len(), graph.edges().len());
    Ok(())
}

/// Two chained calls against the example users API.
pub fn starter_graph() -> Result<Graph> {
    let mut graph = Graph::new();
    graph.add_node(
        Node::new("1", "Get Users", HttpMethod::Get, "https://api.example.com/users")
            .with_position(200.0, 100.0),
    );
    graph.add_node(
        Node::new("2", "Create User", HttpMethod::Post, "https://api.example.com/users")
            .with_body(r#"{"name": "{node_1.0.name}"}"#)
            .with_position(200.0, 250.0),
    );
    graph.add_edge(Edge::new("1", "2"))?;
    Ok(graph)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starter_graph_orders_cleanly() {
        let graph = starter_graph().unwrap();
        let order = apiflow_core::order(&graph);
        assert_eq!(order.order, vec!["1", "2"]);
        assert!(graph.dangling_edges().is_empty());
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("flow.json");
        std::fs::write(&path, "{}").unwrap();

        assert!(run(&path, false, OutputFormat::Text).is_err());
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{}");

        run(&path, true, OutputFormat::Text).unwrap();
        let graph = snapshot::load_from_path(&path, apiflow_core::EdgePolicy::Strict).unwrap();
        assert_eq!(graph.len(), 2);
    }
}
