use crate::error::GraphError;
use crate::node::{HttpMethod, Node, NodeId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use ts_rs::TS;

/// Directed ordering/data dependency: `source` completes before `target`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Edge {
    pub source: NodeId,
    pub target: NodeId,
}

impl Edge {
    pub fn new(source: impl Into<NodeId>, target: impl Into<NodeId>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }
}

/// How edges whose endpoints are not known node ids are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgePolicy {
    /// Dangling edges are kept as data. An edge from an unknown source still
    /// counts towards its target's in-degree, so that target never runs.
    #[default]
    Lenient,
    /// Dangling edges are rejected when the graph is built or edited.
    Strict,
}

/// Ordered node collection plus edges. Single source of truth while editing.
///
/// Duplicate ids are accepted as data; lookups by id return the first node
/// inserted with that id.
#[derive(Debug, Clone, Default)]
pub struct Graph {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
    index: HashMap<NodeId, usize>,
    policy: EdgePolicy,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: EdgePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Build a graph from existing collections, checking edges under `policy`.
    pub fn from_parts(
        nodes: Vec<Node>,
        edges: Vec<Edge>,
        policy: EdgePolicy,
    ) -> Result<Self, GraphError> {
        let mut graph = Self {
            nodes,
            edges: Vec::new(),
            index: HashMap::new(),
            policy,
        };
        graph.reindex();
        for edge in &edges {
            graph.check_edge(edge)?;
        }
        graph.edges = edges;
        Ok(graph)
    }

    pub fn policy(&self) -> EdgePolicy {
        self.policy
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    pub fn node(&self, id: &str) -> Option<&Node> {
        self.index.get(id).map(|&i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, id: &str) -> Option<&mut Node> {
        match self.index.get(id) {
            Some(&i) => self.nodes.get_mut(i),
            None => None,
        }
    }

    pub fn add_node(&mut self, node: Node) {
        self.index
            .entry(node.id().to_string())
            .or_insert(self.nodes.len());
        self.nodes.push(node);
    }

    /// Remove every node with `id` together with its incident edges.
    pub fn remove_node(&mut self, id: &str) -> Option<Node> {
        let position = self.nodes.iter().position(|n| n.id() == id)?;
        let removed = self.nodes.remove(position);
        self.nodes.retain(|n| n.id() != id);
        self.edges.retain(|e| e.source != id && e.target != id);
        self.reindex();
        Some(removed)
    }

    pub fn add_edge(&mut self, edge: Edge) -> Result<(), GraphError> {
        self.check_edge(&edge)?;
        self.edges.push(edge);
        Ok(())
    }

    pub fn remove_edge(&mut self, source: &str, target: &str) -> bool {
        let before = self.edges.len();
        self.edges
            .retain(|e| !(e.source == source && e.target == target));
        before != self.edges.len()
    }

    /// Edges whose source or target is not a known node id.
    pub fn dangling_edges(&self) -> Vec<&Edge> {
        self.edges
            .iter()
            .filter(|e| !self.contains(&e.source) || !self.contains(&e.target))
            .collect()
    }

    /// Put every node back to `idle` with no result.
    pub fn reset_run_state(&mut self) {
        for node in &mut self.nodes {
            node.clear_run_state();
        }
    }

    /// First unused decimal id, counting up from `len() + 1`.
    pub fn next_node_id(&self) -> NodeId {
        let mut candidate = self.nodes.len() + 1;
        while self.contains(&candidate.to_string()) {
            candidate += 1;
        }
        candidate.to_string()
    }

    /// Append a blank GET node, placed to the right of the last node.
    pub fn add_api_node(&mut self) -> &Node {
        let id = self.next_node_id();
        let mut node = Node::new(id.clone(), format!("New API Node {id}"), HttpMethod::Get, "");
        if let Some(last) = self.nodes.last().and_then(|n| n.position()) {
            node = node.with_position(last.x + 250.0, last.y);
        }
        self.add_node(node);
        let last = self.nodes.len() - 1;
        &self.nodes[last]
    }

    /// Swap in the contents of `other`, keeping this graph's edge policy.
    pub fn replace_with(&mut self, other: Graph) {
        self.nodes = other.nodes;
        self.edges = other.edges;
        self.reindex();
    }

    fn check_edge(&self, edge: &Edge) -> Result<(), GraphError> {
        if self.policy == EdgePolicy::Lenient {
            return Ok(());
        }
        for endpoint in [&edge.source, &edge.target] {
            if !self.contains(endpoint) {
                return Err(GraphError::DanglingEdge {
                    from: edge.source.clone(),
                    to: edge.target.clone(),
                    missing: endpoint.clone(),
                });
            }
        }
        Ok(())
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, node) in self.nodes.iter().enumerate() {
            self.index.entry(node.id().to_string()).or_insert(i);
        }
    }
}
