use crate::node::NodeId;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Result of a single node call within a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeOutcome {
    Success(Value),
    Error(String),
}

impl NodeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, NodeOutcome::Success(_))
    }

    /// The value placeholders see for this node: the payload, or `{"error": msg}`.
    pub fn as_result_value(&self) -> Value {
        match self {
            NodeOutcome::Success(payload) => payload.clone(),
            NodeOutcome::Error(message) => serde_json::json!({ "error": message }),
        }
    }
}

/// Produced once per run. Has no persisted identity beyond `run_id`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    pub run_id: String,
    /// Topological order the run was planned with. Sequential runs follow
    /// it exactly; concurrent runs may start independent nodes out of it.
    pub order: Vec<NodeId>,
    /// Ids in the order their calls actually started.
    #[serde(default)]
    pub launched: Vec<NodeId>,
    /// When set, `order` covers only the acyclic remainder of the graph.
    pub cycle_detected: bool,
    pub outcomes: BTreeMap<NodeId, NodeOutcome>,
    /// Ids in `order` that were not invoked because they have no endpoint.
    #[serde(default)]
    pub skipped: Vec<NodeId>,
}

impl ExecutionReport {
    pub fn outcome(&self, id: &str) -> Option<&NodeOutcome> {
        self.outcomes.get(id)
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes.values().filter(|o| o.is_success()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.succeeded()
    }

    /// No cycle and no failed node.
    pub fn is_clean(&self) -> bool {
        !self.cycle_detected && self.failed() == 0
    }
}
