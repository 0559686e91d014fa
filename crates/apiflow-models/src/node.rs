use crate::error::GraphError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Value, json};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

/// Stable node identity, referenced by edges and `{node_<id>.path}` placeholders.
pub type NodeId = String;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, TS)]
#[serde(rename_all = "UPPERCASE")]
#[ts(export)]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Only POST and PUT requests send a body.
    pub fn carries_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpMethod {
    type Err = GraphError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(GraphError::UnknownMethod(s.to_string())),
        }
    }
}

/// Accepts any casing, as [`FromStr`] does.
impl<'de> Deserialize<'de> for HttpMethod {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Transient run state of a node.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum NodeStatus {
    #[default]
    Idle,
    Loading,
    Success,
    Error,
}

impl NodeStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            NodeStatus::Idle => "idle",
            NodeStatus::Loading => "loading",
            NodeStatus::Success => "success",
            NodeStatus::Error => "error",
        }
    }
}

impl fmt::Display for NodeStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canvas coordinates owned by the editor. The engine never reads them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

/// One HTTP call definition plus its transient run state.
///
/// Editing the method or any template clears `status` and `last_result`, so a
/// stale response is never shown against an edited request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Node {
    id: NodeId,
    #[serde(default)]
    label: String,
    #[serde(default)]
    method: HttpMethod,
    #[serde(default)]
    endpoint_template: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    body_template: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    position: Option<Position>,
    #[serde(default)]
    status: NodeStatus,
    #[serde(default)]
    #[ts(type = "any")]
    last_result: Option<Value>,
}

impl Node {
    pub fn new(
        id: impl Into<NodeId>,
        label: impl Into<String>,
        method: HttpMethod,
        endpoint_template: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            method,
            endpoint_template: endpoint_template.into(),
            body_template: None,
            position: None,
            status: NodeStatus::Idle,
            last_result: None,
        }
    }

    pub fn with_body(mut self, body_template: impl Into<String>) -> Self {
        self.body_template = Some(body_template.into());
        self
    }

    pub fn with_position(mut self, x: f64, y: f64) -> Self {
        self.position = Some(Position { x, y });
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn method(&self) -> HttpMethod {
        self.method
    }

    pub fn endpoint_template(&self) -> &str {
        &self.endpoint_template
    }

    pub fn body_template(&self) -> Option<&str> {
        self.body_template.as_deref()
    }

    pub fn position(&self) -> Option<Position> {
        self.position
    }

    pub fn status(&self) -> NodeStatus {
        self.status
    }

    pub fn last_result(&self) -> Option<&Value> {
        self.last_result.as_ref()
    }

    /// A node without an endpoint is skipped by the driver.
    pub fn has_endpoint(&self) -> bool {
        !self.endpoint_template.trim().is_empty()
    }

    pub fn set_label(&mut self, label: impl Into<String>) {
        self.label = label.into();
    }

    pub fn set_position(&mut self, position: Option<Position>) {
        self.position = position;
    }

    pub fn set_method(&mut self, method: HttpMethod) {
        self.method = method;
        self.clear_run_state();
    }

    pub fn set_endpoint_template(&mut self, template: impl Into<String>) {
        self.endpoint_template = template.into();
        self.clear_run_state();
    }

    pub fn set_body_template(&mut self, template: Option<String>) {
        self.body_template = template;
        self.clear_run_state();
    }

    pub fn set_status(&mut self, status: NodeStatus) {
        self.status = status;
    }

    pub fn record_success(&mut self, payload: Value) {
        self.status = NodeStatus::Success;
        self.last_result = Some(payload);
    }

    pub fn record_error(&mut self, message: impl Into<String>) {
        self.status = NodeStatus::Error;
        self.last_result = Some(json!({ "error": message.into() }));
    }

    pub fn clear_run_state(&mut self) {
        self.status = NodeStatus::Idle;
        self.last_result = None;
    }
}
