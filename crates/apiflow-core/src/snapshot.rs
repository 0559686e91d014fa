//! Snapshot codec: the flat JSON document used for save/load.
//!
//! ```json
//! { "nodes": [...], "edges": [{"source": "1", "target": "2"}], "timestamp": "2025-01-01T00:00:00Z" }
//! ```

use crate::error::SnapshotError;
use apiflow_models::{Edge, EdgePolicy, Graph, Node};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Snapshot {
    pub nodes: Vec<Node>,
    pub edges: Vec<Edge>,
    /// Capture time. Unreadable values are dropped on load rather than
    /// failing the whole document.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient_timestamp"
    )]
    pub timestamp: Option<DateTime<Utc>>,
}

/// Accepts RFC 3339, ISO 8601 without an offset (read as UTC), or a bare date.
fn lenient_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    let raw = Option::<Value>::deserialize(deserializer)?;
    let Some(Value::String(text)) = raw else {
        return Ok(None);
    };
    let parsed = parse_timestamp(&text);
    if parsed.is_none() {
        debug!(timestamp = %text, "Ignoring unreadable snapshot timestamp");
    }
    Ok(parsed)
}

fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if let Ok(at) = DateTime::parse_from_rfc3339(text) {
        return Some(at.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(text, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Capture the full graph, transient status/result fields included.
pub fn serialize(graph: &Graph) -> Snapshot {
    Snapshot {
        nodes: graph.nodes().to_vec(),
        edges: graph.edges().to_vec(),
        timestamp: Some(Utc::now()),
    }
}

pub fn to_json_string(graph: &Graph) -> Result<String, SnapshotError> {
    Ok(serde_json::to_string_pretty(&serialize(graph))?)
}

/// Build a graph from a snapshot document.
///
/// Both `nodes` and `edges` must be present. Dangling edges are rejected
/// under [`EdgePolicy::Strict`].
pub fn deserialize(document: &Value, policy: EdgePolicy) -> Result<Graph, SnapshotError> {
    let object = document.as_object().ok_or(SnapshotError::NotAnObject)?;
    for field in ["nodes", "edges"] {
        if !object.contains_key(field) {
            return Err(SnapshotError::MissingField(field));
        }
    }

    let snapshot: Snapshot = serde_json::from_value(document.clone())
        .map_err(|e| SnapshotError::InvalidRecord(e.to_string()))?;
    Ok(Graph::from_parts(snapshot.nodes, snapshot.edges, policy)?)
}

pub fn from_json_str(json: &str, policy: EdgePolicy) -> Result<Graph, SnapshotError> {
    let document: Value = serde_json::from_str(json)?;
    deserialize(&document, policy)
}

/// Replace `graph` with the document's contents, or leave it untouched on error.
pub fn load_into(graph: &mut Graph, document: &Value) -> Result<(), SnapshotError> {
    let loaded = deserialize(document, graph.policy())?;
    graph.replace_with(loaded);
    Ok(())
}

pub fn save_to_path(graph: &Graph, path: &Path) -> Result<(), SnapshotError> {
    let json = to_json_string(graph)?;
    std::fs::write(path, json)?;
    info!(path = %path.display(), nodes = graph.len(), "Snapshot saved");
    Ok(())
}

pub fn load_from_path(path: &Path, policy: EdgePolicy) -> Result<Graph, SnapshotError> {
    let json = std::fs::read_to_string(path)?;
    let graph = from_json_str(&json, policy)?;
    info!(path = %path.display(), nodes = graph.len(), edges = graph.edges().len(), "Snapshot loaded");
    Ok(graph)
}
