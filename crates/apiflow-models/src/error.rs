use thiserror::Error;

/// Errors raised while building or editing a [`crate::Graph`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Edge {from} -> {to} references unknown node '{missing}'")]
    DanglingEdge {
        from: String,
        to: String,
        missing: String,
    },

    #[error("Unknown HTTP method: {0}")]
    UnknownMethod(String),
}
