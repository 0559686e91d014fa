//! Remote publish: pin the graph document to a content-addressed store.

use crate::config::{HttpConfig, PublishConfig};
use crate::error::PublishError;
use crate::http::build_http_client;
use apiflow_models::Graph;
use reqwest::Client;
use serde_json::{Map, Value, json};
use std::fmt;
use tracing::{info, warn};

/// Identifier returned by the pinning service (an IPFS CID for Pinata).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentAddress(pub String);

impl fmt::Display for ContentAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub struct Publisher {
    client: Client,
    config: PublishConfig,
}

impl Publisher {
    pub fn new(config: PublishConfig) -> Result<Self, PublishError> {
        let client = build_http_client(&HttpConfig::default())?;
        Ok(Self { client, config })
    }

    /// The `{nodes, edges}` document, wrapped under `content_field` if set.
    pub fn payload(&self, graph: &Graph) -> Value {
        let document = json!({
            "nodes": graph.nodes(),
            "edges": graph.edges(),
        });
        match &self.config.content_field {
            Some(field) => {
                let mut wrapper = Map::new();
                wrapper.insert(field.clone(), document);
                Value::Object(wrapper)
            }
            None => document,
        }
    }

    pub async fn publish(&self, graph: &Graph) -> Result<ContentAddress, PublishError> {
        let endpoint = self
            .config
            .endpoint
            .as_deref()
            .filter(|e| !e.trim().is_empty())
            .ok_or(PublishError::NotConfigured)?;

        let mut request = self.client.post(endpoint).json(&self.payload(graph));
        if let Some(token) = &self.config.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(endpoint, status = status.as_u16(), "Publish rejected");
            return Err(PublishError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let body: Value = response.json().await?;
        let address = body
            .get(&self.config.address_field)
            .and_then(Value::as_str)
            .ok_or_else(|| PublishError::MissingAddress(self.config.address_field.clone()))?;

        info!(endpoint, address, nodes = graph.len(), "Graph published");
        Ok(ContentAddress(address.to_string()))
    }
}
