//! Graph model shared by the ApiFlow engine and its front ends.
//!
//! A [`Graph`] is an ordered set of HTTP call definitions ([`Node`]) plus the
//! dependency [`Edge`]s between them. The model performs no I/O; the engine
//! in `apiflow-core` borrows it for a run and only ever writes the transient
//! `status` / `last_result` fields.

pub mod error;
pub mod graph;
pub mod node;
pub mod report;

pub use error::GraphError;
pub use graph::{Edge, EdgePolicy, Graph};
pub use node::{HttpMethod, Node, NodeId, NodeStatus, Position};
pub use report::{ExecutionReport, NodeOutcome};
