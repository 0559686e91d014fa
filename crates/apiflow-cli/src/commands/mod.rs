pub mod init;
pub mod order;
pub mod publish;
pub mod run;
pub mod validate;

use anyhow::{Context, Result};
use apiflow_core::snapshot;
use apiflow_core::{EdgePolicy, Graph};
use std::path::Path;

pub(crate) fn load_graph(path: &Path, policy: EdgePolicy) -> Result<Graph> {
    snapshot::load_from_path(path, policy)
        .with_context(|| format!("Failed to load snapshot {}", path.display()))
}

pub(crate) fn edge_policy(strict_flag: bool, configured: EdgePolicy) -> EdgePolicy {
    if strict_flag {
        EdgePolicy::Strict
    } else {
        configured
    }
}
