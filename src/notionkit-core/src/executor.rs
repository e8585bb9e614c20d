//! The single choke point every Notion API call goes through.
//!
//! [`Executor::execute`] resolves a relative path against the configured
//! base URL, attaches the authorization and version headers, performs the
//! round trip through a [`Transport`], and maps the outcome onto
//! [`NotionError`].

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION};
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{field, instrument, Span};
use url::Url;

use crate::config::ClientConfig;
use crate::error::{NotionError, Result};
use crate::transport::{Method, OutboundRequest, RawResponse, ReqwestTransport, Transport};

const NOTION_VERSION_HEADER: &str = "notion-version";

/// Issues authenticated requests and normalizes their outcome.
///
/// Holds no per-call state, so one instance can be shared behind an `Arc`.
pub struct Executor {
    config: ClientConfig,
    headers: HeaderMap,
    transport: Arc<dyn Transport>,
}

impl Executor {
    /// Executor over the default `reqwest` transport, configured from
    /// `config.transport()`.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport = ReqwestTransport::new(config.transport())?;
        Self::with_transport(config, Arc::new(transport))
    }

    pub fn with_transport(config: ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let headers = default_headers(&config)?;
        Ok(Self {
            config,
            headers,
            transport,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Join `path` onto the base URL, refusing anything that lands outside it.
    pub fn resolve(&self, path: &str) -> Result<Url> {
        if path.starts_with('/') || path.starts_with('\\') {
            return Err(NotionError::invalid(format!(
                "path {path:?} must be relative to the base URL"
            )));
        }
        if Url::parse(path).is_ok() {
            return Err(NotionError::invalid(format!(
                "path {path:?} must not be an absolute URL"
            )));
        }

        let base = self.config.base_url();
        let url = base
            .join(path)
            .map_err(|e| NotionError::invalid(format!("path {path:?}: {e}")))?;

        if !url.as_str().starts_with(base.as_str()) {
            return Err(NotionError::invalid(format!(
                "path {path:?} escapes the base URL {base}"
            )));
        }
        Ok(url)
    }

    /// Perform one API call and return the decoded JSON body.
    ///
    /// `query` is only valid for GET and `body` only for POST/PATCH. The
    /// returned value is exactly what the server sent on a 200 response.
    #[instrument(
        name = "notion_request",
        skip(self, method, query, body),
        fields(
            http.method = %method,
            http.url = field::Empty,
            http.status_code = field::Empty,
            otel.kind = "client",
        )
    )]
    pub async fn execute(
        &self,
        method: Method,
        path: &str,
        query: Option<&Map<String, Value>>,
        body: Option<Value>,
    ) -> Result<Value> {
        let url = self.resolve(path)?;
        Span::current().record("http.url", url.as_str());

        let query = match (method, query) {
            (_, None) => Vec::new(),
            (Method::Get, Some(query)) => encode_query(query)?,
            (_, Some(_)) => {
                return Err(NotionError::invalid(format!(
                    "{method} requests do not take query parameters"
                )))
            }
        };
        if method == Method::Get && body.is_some() {
            return Err(NotionError::invalid("GET requests do not take a body"));
        }

        let request = OutboundRequest {
            method,
            url,
            query,
            body,
        };

        let response = self
            .transport
            .send(&self.headers, request)
            .await
            .map_err(|e| {
                let cause = format!("{e:#}");
                tracing::warn!(error = %cause, "Notion request failed before a response");
                NotionError::Transport(cause)
            })?;

        Span::current().record("http.status_code", response.status);
        decode_response(response)
    }
}

fn default_headers(config: &ClientConfig) -> Result<HeaderMap> {
    let mut auth = HeaderValue::from_str(&format!("Bearer {}", config.api_key()))
        .map_err(|_| NotionError::invalid("API key contains characters not allowed in a header"))?;
    auth.set_sensitive(true);

    let version = HeaderValue::from_str(config.notion_version())
        .map_err(|_| NotionError::invalid("notion version is not a valid header value"))?;

    let mut headers = HeaderMap::new();
    headers.insert(AUTHORIZATION, auth);
    headers.insert(HeaderName::from_static(NOTION_VERSION_HEADER), version);
    Ok(headers)
}

/// Flatten query values into string pairs. `null` is dropped and arrays
/// repeat the key; nested objects cannot be expressed and are rejected.
fn encode_query(query: &Map<String, Value>) -> Result<Vec<(String, String)>> {
    let mut pairs = Vec::with_capacity(query.len());
    for (key, value) in query {
        match value {
            Value::Array(items) => {
                for item in items {
                    if let Some(item) = scalar(key, item)? {
                        pairs.push((key.clone(), item));
                    }
                }
            }
            other => {
                if let Some(value) = scalar(key, other)? {
                    pairs.push((key.clone(), value));
                }
            }
        }
    }
    Ok(pairs)
}

fn scalar(key: &str, value: &Value) -> Result<Option<String>> {
    match value {
        Value::Null => Ok(None),
        Value::Bool(b) => Ok(Some(b.to_string())),
        Value::Number(n) => Ok(Some(n.to_string())),
        Value::String(s) => Ok(Some(s.clone())),
        Value::Array(_) | Value::Object(_) => Err(NotionError::invalid(format!(
            "query parameter {key:?} must be a scalar"
        ))),
    }
}

/// Body first, status second: an unparseable body is a decode failure even
/// when the status says success.
fn decode_response(response: RawResponse) -> Result<Value> {
    let status = response.status;
    let value: Value = serde_json::from_slice(&response.body).map_err(|e| {
        tracing::debug!(status, error = %e, "response body is not JSON");
        NotionError::Decode {
            status,
            cause: e.to_string(),
        }
    })?;

    if status != 200 {
        let message = value
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_owned);
        tracing::debug!(status, message = ?message, "Notion API returned an error");
        return Err(NotionError::Api { status, message });
    }

    Ok(value)
}
