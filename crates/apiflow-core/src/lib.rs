//! ApiFlow engine.
//!
//! Takes a [`Graph`] of HTTP call definitions, orders it topologically,
//! resolves `{node_<id>.<path>}` placeholders against upstream responses and
//! performs the calls through an injected [`HttpInvoker`].

pub mod config;
pub mod engine;
pub mod error;
pub mod http;
pub mod publish;
pub mod snapshot;

pub use apiflow_models as models;
pub use apiflow_models::{
    Edge, EdgePolicy, ExecutionReport, Graph, GraphError, HttpMethod, Node, NodeId, NodeOutcome,
    NodeStatus, Position,
};
pub use config::{EngineConfig, ExecutorConfig, HttpConfig, PublishConfig};
pub use engine::context::{ResultSource, RunContext, resolve, resolve_optional};
pub use engine::executor::{Executor, RunEvent};
pub use engine::graph::{DependencyGraph, TopologicalOrder, order};
pub use error::{InvokeError, PublishError, SnapshotError};
pub use http::{HttpInvoker, HttpRequest, ReqwestInvoker};
pub use publish::{ContentAddress, Publisher};
