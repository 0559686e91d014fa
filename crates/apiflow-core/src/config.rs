//! Engine configuration.
//!
//! Every section has serde defaults so a partial TOML table (or none at all)
//! yields a working configuration.

use apiflow_models::EdgePolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default per-request timeout applied by [`crate::ReqwestInvoker`].
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Response field holding the content address returned by pinning services.
pub const DEFAULT_ADDRESS_FIELD: &str = "IpfsHash";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub executor: ExecutorConfig,
    pub http: HttpConfig,
    pub publish: PublishConfig,
    /// Reject edges that reference unknown nodes when loading a graph.
    pub strict_edges: bool,
}

impl EngineConfig {
    pub fn edge_policy(&self) -> EdgePolicy {
        if self.strict_edges {
            EdgePolicy::Strict
        } else {
            EdgePolicy::Lenient
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExecutorConfig {
    /// Maximum calls in flight. 1 walks the topological order strictly
    /// one node at a time.
    pub max_concurrency: usize,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self { max_concurrency: 1 }
    }
}

impl ExecutorConfig {
    pub fn concurrent(max_concurrency: usize) -> Self {
        Self { max_concurrency }
    }

    /// Zero is treated as one.
    pub fn effective_concurrency(&self) -> usize {
        self.max_concurrency.max(1)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl HttpConfig {
    /// Zero means no per-request limit.
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PublishConfig {
    /// Pinning service URL that accepts a JSON document via POST.
    pub endpoint: Option<String>,
    /// Sent as a bearer token when present.
    pub token: Option<String>,
    /// Response field holding the content address.
    pub address_field: String,
    /// Wrap the payload under this key (e.g. `pinataContent`).
    pub content_field: Option<String>,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            token: None,
            address_field: DEFAULT_ADDRESS_FIELD.to_string(),
            content_field: None,
        }
    }
}
