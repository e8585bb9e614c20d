use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::config::TransportOptions;
use crate::error::{NotionError, Result};

pub use reqwest::header::HeaderMap;

/// HTTP verbs used by the Notion API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Patch,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = NotionError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(Method::Get),
            "POST" => Ok(Method::Post),
            "PATCH" => Ok(Method::Patch),
            other => Err(NotionError::invalid(format!(
                "unsupported HTTP method {other:?}"
            ))),
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
        }
    }
}

/// One fully resolved call, handed to a [`Transport`].
#[derive(Debug, Clone, PartialEq)]
pub struct OutboundRequest {
    pub method: Method,
    pub url: Url,
    /// Query string pairs, only ever populated for GET
    pub query: Vec<(String, String)>,
    /// JSON payload, only ever populated for POST/PATCH
    pub body: Option<Value>,
}

/// Status and raw body bytes, before any decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }
}

/// Capability the executor needs from the network.
///
/// Implementations perform exactly one round trip per call and report any
/// failure to reach the server as an error. A response with a non-success
/// status is NOT an error at this layer.
#[async_trait::async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, headers: &HeaderMap, request: OutboundRequest)
        -> anyhow::Result<RawResponse>;
}

/// Default transport backed by a pooled `reqwest::Client`.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new(options: &TransportOptions) -> Result<Self> {
        let mut builder = reqwest::Client::builder();

        if let Some(timeout) = options.timeout() {
            builder = builder.timeout(timeout);
        }
        if let Some(timeout) = options.connect_timeout() {
            builder = builder.connect_timeout(timeout);
        }
        if let Some(proxy) = &options.proxy {
            let proxy = reqwest::Proxy::all(proxy)
                .map_err(|e| NotionError::invalid(format!("proxy {proxy:?}: {e}")))?;
            builder = builder.proxy(proxy);
        }
        if let Some(agent) = &options.user_agent {
            builder = builder.user_agent(agent.as_str());
        }
        if options.insecure_skip_verify {
            tracing::warn!("TLS certificate verification is disabled");
            builder = builder.danger_accept_invalid_certs(true);
        }
        if let Some(path) = &options.ca_cert_path {
            let pem = std::fs::read(path)
                .map_err(|e| NotionError::invalid(format!("CA certificate {path:?}: {e}")))?;
            let cert = reqwest::Certificate::from_pem(&pem)
                .map_err(|e| NotionError::invalid(format!("CA certificate {path:?}: {e}")))?;
            builder = builder.add_root_certificate(cert);
        }

        let client = builder
            .build()
            .map_err(|e| NotionError::invalid(format!("HTTP client configuration: {e}")))?;
        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Transport for ReqwestTransport {
    async fn send(
        &self,
        headers: &HeaderMap,
        request: OutboundRequest,
    ) -> anyhow::Result<RawResponse> {
        let mut builder = self
            .client
            .request(request.method.into(), request.url)
            .headers(headers.clone());

        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?;

        Ok(RawResponse::new(status, body.to_vec()))
    }
}
