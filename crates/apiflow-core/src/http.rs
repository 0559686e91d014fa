//! HTTP-call capability consumed by the executor.

use crate::config::HttpConfig;
use crate::error::InvokeError;
use apiflow_models::HttpMethod;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::debug;

const DISABLE_SYSTEM_PROXY_ENV: &str = "APIFLOW_DISABLE_SYSTEM_PROXY";
const MAX_ERROR_BODY_CHARS: usize = 512;

/// A fully resolved request, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub body: Option<String>,
    pub headers: BTreeMap<String, String>,
}

impl HttpRequest {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: None,
            headers: BTreeMap::new(),
        }
    }

    /// Attach a JSON body together with its content type.
    pub fn with_json_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self.headers
            .insert("content-type".to_string(), "application/json".to_string());
        self
    }
}

/// Performs one HTTP call and returns the decoded JSON payload.
///
/// Implementations own timeouts; the executor enforces none.
#[async_trait]
pub trait HttpInvoker: Send + Sync {
    async fn invoke(&self, request: HttpRequest) -> Result<Value, InvokeError>;
}

/// [`HttpInvoker`] backed by reqwest.
#[derive(Clone)]
pub struct ReqwestInvoker {
    client: Client,
}

impl ReqwestInvoker {
    pub fn new(config: &HttpConfig) -> Result<Self, InvokeError> {
        let client = build_http_client(config).map_err(|e| InvokeError::Client(e.to_string()))?;
        Ok(Self { client })
    }
}

#[async_trait]
impl HttpInvoker for ReqwestInvoker {
    async fn invoke(&self, request: HttpRequest) -> Result<Value, InvokeError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder.send().await?;
        let status = response.status();
        let text = response.text().await?;
        debug!(url = %request.url, status = status.as_u16(), bytes = text.len(), "Response received");

        if !status.is_success() {
            return Err(InvokeError::Status {
                status: status.as_u16(),
                body: truncate(&text, MAX_ERROR_BODY_CHARS),
            });
        }

        decode_body(&text)
    }
}

/// Empty bodies decode to `null`; anything else must be JSON.
pub fn decode_body(text: &str) -> Result<Value, InvokeError> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    serde_json::from_str(text).map_err(|e| InvokeError::Decode(e.to_string()))
}

pub(crate) fn build_http_client(config: &HttpConfig) -> reqwest::Result<Client> {
    let mut builder =
        Client::builder().user_agent(concat!("apiflow/", env!("CARGO_PKG_VERSION")));
    if let Some(timeout) = config.timeout() {
        builder = builder.timeout(timeout);
    }
    if should_disable_system_proxy() {
        builder = builder.no_proxy();
    }
    builder.build()
}

fn should_disable_system_proxy() -> bool {
    if std::env::var_os(DISABLE_SYSTEM_PROXY_ENV).is_some() {
        return true;
    }

    cfg!(test)
}

fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}...", &text[..cut]),
        None => text.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{body_string, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn invoker() -> ReqwestInvoker {
        ReqwestInvoker::new(&HttpConfig::default()).unwrap()
    }

    #[test]
    fn test_decode_body() {
        assert_eq!(decode_body("").unwrap(), Value::Null);
        assert_eq!(decode_body(r#"{"a":1}"#).unwrap(), json!({"a": 1}));
        assert!(matches!(decode_body("<html>"), Err(InvokeError::Decode(_))));
    }

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("abc", 5), "abc");
        assert_eq!(truncate("abcdef", 3), "abc...");
    }

    #[tokio::test]
    async fn test_get_decodes_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": 1}])))
            .mount(&server)
            .await;

        let payload = invoker()
            .invoke(HttpRequest::new(HttpMethod::Get, format!("{}/users", server.uri())))
            .await
            .unwrap();
        assert_eq!(payload, json!([{"id": 1}]));
    }

    #[tokio::test]
    async fn test_post_sends_body_and_content_type() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users"))
            .and(header("content-type", "application/json"))
            .and(body_string(r#"{"name":"Ann"}"#))
            .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 7})))
            .mount(&server)
            .await;

        let request = HttpRequest::new(HttpMethod::Post, format!("{}/users", server.uri()))
            .with_json_body(r#"{"name":"Ann"}"#);
        let payload = invoker().invoke(request).await.unwrap();
        assert_eq!(payload, json!({"id": 7}));
    }

    #[tokio::test]
    async fn test_error_status_is_failure() {
        let server = MockServer::start().await;
        Mock::given(method("DELETE"))
            .respond_with(ResponseTemplate::new(404).set_body_string("missing"))
            .mount(&server)
            .await;

        let err = invoker()
            .invoke(HttpRequest::new(HttpMethod::Delete, format!("{}/users/1", server.uri())))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            InvokeError::Status {
                status: 404,
                body: "missing".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_non_json_body_is_decode_failure() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html></html>"))
            .mount(&server)
            .await;

        let err = invoker()
            .invoke(HttpRequest::new(HttpMethod::Get, server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::Decode(_)));
    }

    #[tokio::test]
    async fn test_timeout() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(3)))
            .mount(&server)
            .await;

        let invoker = ReqwestInvoker::new(&HttpConfig { timeout_secs: 1 }).unwrap();
        let err = invoker
            .invoke(HttpRequest::new(HttpMethod::Get, server.uri()))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::Timeout(_)));
    }

    #[tokio::test]
    async fn test_zero_timeout_disables_the_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"slow": true}))
                    .set_delay(Duration::from_millis(200)),
            )
            .mount(&server)
            .await;

        let invoker = ReqwestInvoker::new(&HttpConfig { timeout_secs: 0 }).unwrap();
        let payload = invoker
            .invoke(HttpRequest::new(HttpMethod::Get, server.uri()))
            .await
            .unwrap();
        assert_eq!(payload, json!({"slow": true}));
    }

    #[tokio::test]
    async fn test_unresolved_placeholder_url_is_transport_failure() {
        let err = invoker()
            .invoke(HttpRequest::new(HttpMethod::Get, "{node_9.url}/users"))
            .await
            .unwrap_err();
        assert!(matches!(err, InvokeError::Transport(_)));
    }
}
