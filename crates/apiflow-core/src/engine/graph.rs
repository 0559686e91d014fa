use apiflow_models::{Graph, NodeId};
use std::collections::{HashMap, HashSet, VecDeque};
use tracing::warn;

/// Execution order computed by Kahn's algorithm.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopologicalOrder {
    pub order: Vec<NodeId>,
    /// Some nodes sit on or behind a cycle and are absent from `order`.
    pub cycle_detected: bool,
}

/// Compute the execution order of `graph`.
pub fn order(graph: &Graph) -> TopologicalOrder {
    DependencyGraph::from_graph(graph).execution_order()
}

/// Adjacency and in-degree bookkeeping derived from a [`Graph`].
///
/// Every known node id starts at in-degree 0. Each edge increments its
/// target's in-degree when the target is known, even if the source is not;
/// such a target can never be released and is reported as part of the
/// unordered remainder.
pub struct DependencyGraph {
    ids: Vec<NodeId>,
    adjacency: HashMap<NodeId, Vec<NodeId>>,
    upstream: HashMap<NodeId, Vec<NodeId>>,
    in_degree: HashMap<NodeId, usize>,
}

impl DependencyGraph {
    pub fn from_graph(graph: &Graph) -> Self {
        let mut ids = Vec::with_capacity(graph.len());
        let mut adjacency: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut upstream: HashMap<NodeId, Vec<NodeId>> = HashMap::new();
        let mut in_degree: HashMap<NodeId, usize> = HashMap::new();

        for node in graph.nodes() {
            if in_degree.contains_key(node.id()) {
                continue;
            }
            ids.push(node.id().to_string());
            adjacency.insert(node.id().to_string(), Vec::new());
            upstream.insert(node.id().to_string(), Vec::new());
            in_degree.insert(node.id().to_string(), 0);
        }

        for edge in graph.edges() {
            let Some(degree) = in_degree.get_mut(&edge.target) else {
                continue;
            };
            *degree += 1;

            if let Some(targets) = adjacency.get_mut(&edge.source) {
                targets.push(edge.target.clone());
                if let Some(sources) = upstream.get_mut(&edge.target) {
                    sources.push(edge.source.clone());
                }
            }
        }

        Self {
            ids,
            adjacency,
            upstream,
            in_degree,
        }
    }

    pub fn in_degrees(&self) -> &HashMap<NodeId, usize> {
        &self.in_degree
    }

    /// Nodes with in-degree 0, in insertion order.
    pub fn roots(&self) -> Vec<NodeId> {
        self.ids
            .iter()
            .filter(|id| self.in_degree.get(*id) == Some(&0))
            .cloned()
            .collect()
    }

    /// Direct successors, one entry per edge.
    pub fn dependents(&self, id: &str) -> &[NodeId] {
        self.adjacency.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Direct predecessors that are known nodes, one entry per edge.
    pub fn dependencies(&self, id: &str) -> &[NodeId] {
        self.upstream.get(id).map(Vec::as_slice).unwrap_or_default()
    }

    /// Transitive upstream set of `id`, excluding `id` itself unless it sits
    /// on a cycle.
    pub fn ancestors(&self, id: &str) -> HashSet<NodeId> {
        let mut seen = HashSet::new();
        let mut stack: Vec<&str> = self.dependencies(id).iter().map(String::as_str).collect();
        while let Some(current) = stack.pop() {
            if seen.insert(current.to_string()) {
                stack.extend(self.dependencies(current).iter().map(String::as_str));
            }
        }
        seen
    }

    pub fn execution_order(&self) -> TopologicalOrder {
        let mut in_degree = self.in_degree.clone();
        let mut queue: VecDeque<NodeId> = self.roots().into();
        let mut order = Vec::with_capacity(self.ids.len());

        while let Some(id) = queue.pop_front() {
            for next in self.dependents(&id) {
                if let Some(degree) = in_degree.get_mut(next) {
                    *degree -= 1;
                    if *degree == 0 {
                        queue.push_back(next.clone());
                    }
                }
            }
            order.push(id);
        }

        let cycle_detected = order.len() < self.ids.len();
        if cycle_detected {
            warn!(
                ordered = order.len(),
                unordered = self.ids.len() - order.len(),
                "Graph contains a cycle or an unsatisfiable dependency"
            );
        }

        TopologicalOrder {
            order,
            cycle_detected,
        }
    }

    /// Ids missing from `order`, in insertion order.
    pub fn unordered(&self, order: &[NodeId]) -> Vec<NodeId> {
        let ordered: HashSet<&str> = order.iter().map(String::as_str).collect();
        self.ids
            .iter()
            .filter(|id| !ordered.contains(id.as_str()))
            .cloned()
            .collect()
    }
}
