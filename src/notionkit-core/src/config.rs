use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use url::Url;

use crate::error::{NotionError, Result};

/// Environment variable consulted when no API key is passed explicitly.
pub const API_KEY_ENV: &str = "NOTION_API_KEY";

/// Protocol version sent in the `Notion-Version` header.
pub const NOTION_VERSION: &str = "2021-05-13";

pub const DEFAULT_BASE_URL: &str = "https://api.notion.com/v1/";

/// Resolved client configuration. Immutable once built.
#[derive(Clone)]
pub struct ClientConfig {
    api_key: String,
    base_url: Url,
    notion_version: String,
    transport: TransportOptions,
}

/// Options forwarded verbatim to the HTTP transport.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct TransportOptions {
    /// Total request timeout in milliseconds. Unset means no timeout.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub connect_timeout_ms: Option<u64>,
    /// Proxy URL applied to all schemes
    #[serde(default)]
    pub proxy: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub insecure_skip_verify: bool,
    /// PEM file with an extra root certificate
    #[serde(default)]
    pub ca_cert_path: Option<String>,
}

impl TransportOptions {
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }
}

/// On-disk shape read by [`ClientConfig::load`].
#[derive(Clone, Deserialize, Serialize)]
pub struct ConfigFile {
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_notion_version")]
    pub notion_version: String,
    #[serde(default)]
    pub transport: TransportOptions,
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_notion_version() -> String {
    NOTION_VERSION.to_string()
}

impl ClientConfig {
    pub fn builder() -> ClientConfigBuilder {
        ClientConfigBuilder::default()
    }

    /// Default endpoint and version, key taken from `NOTION_API_KEY`.
    pub fn from_env() -> Result<Self> {
        Self::builder().build()
    }

    /// Load a JSON config file. A missing `api_key` falls back to the environment.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let file: ConfigFile = serde_json::from_str(&contents)?;
        Ok(Self::try_from(file)?)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn notion_version(&self) -> &str {
        &self.notion_version
    }

    pub fn transport(&self) -> &TransportOptions {
        &self.transport
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url.as_str())
            .field("notion_version", &self.notion_version)
            .field("transport", &self.transport)
            .finish()
    }
}

impl TryFrom<ConfigFile> for ClientConfig {
    type Error = NotionError;

    fn try_from(file: ConfigFile) -> Result<Self> {
        let mut builder = ClientConfig::builder()
            .base_url(file.base_url)
            .notion_version(file.notion_version)
            .transport(file.transport);
        if let Some(key) = file.api_key {
            builder = builder.api_key(key);
        }
        builder.build()
    }
}

#[derive(Debug, Clone, Default)]
pub struct ClientConfigBuilder {
    api_key: Option<String>,
    base_url: Option<String>,
    notion_version: Option<String>,
    transport: TransportOptions,
}

impl ClientConfigBuilder {
    pub fn api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn notion_version(mut self, version: impl Into<String>) -> Self {
        self.notion_version = Some(version.into());
        self
    }

    pub fn transport(mut self, options: TransportOptions) -> Self {
        self.transport = options;
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.transport.timeout_ms = Some(u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX));
        self
    }

    /// Resolve the credential and validate the endpoint.
    ///
    /// The environment is read here and only here, so a missing key fails
    /// before any request can be made.
    pub fn build(mut self) -> Result<ClientConfig> {
        let api_key = match self.api_key.take() {
            Some(key) => key,
            None => std::env::var(API_KEY_ENV).unwrap_or_default(),
        };
        self.finish(api_key)
    }

    fn finish(self, api_key: String) -> Result<ClientConfig> {
        if api_key.trim().is_empty() {
            return Err(NotionError::MissingCredential);
        }

        let raw = self.base_url.unwrap_or_else(default_base_url);
        let base_url = parse_base_url(&raw)?;

        let notion_version = self.notion_version.unwrap_or_else(default_notion_version);
        if notion_version.trim().is_empty() {
            return Err(NotionError::invalid("notion version must not be empty"));
        }

        Ok(ClientConfig {
            api_key,
            base_url,
            notion_version,
            transport: self.transport,
        })
    }
}

/// Parse the base endpoint, treating it as a directory: `https://host/v1`
/// becomes `https://host/v1/` so relative joins keep the last segment.
fn parse_base_url(raw: &str) -> Result<Url> {
    let mut url =
        Url::parse(raw).map_err(|e| NotionError::invalid(format!("base URL {raw:?}: {e}")))?;

    if !matches!(url.scheme(), "http" | "https") || url.cannot_be_a_base() {
        return Err(NotionError::invalid(format!(
            "base URL {raw:?} must be an absolute http(s) URL"
        )));
    }
    if url.query().is_some() || url.fragment().is_some() {
        return Err(NotionError::invalid(format!(
            "base URL {raw:?} must not carry a query or fragment"
        )));
    }

    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builder_without_env(builder: ClientConfigBuilder) -> Result<ClientConfig> {
        let key = builder.api_key.clone().unwrap_or_default();
        builder.finish(key)
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::builder().api_key("secret_abc").build().unwrap();
        assert_eq!(config.api_key(), "secret_abc");
        assert_eq!(config.base_url().as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.notion_version(), NOTION_VERSION);
        assert_eq!(config.transport(), &TransportOptions::default());
    }

    #[test]
    fn test_missing_key_is_rejected() {
        let err = builder_without_env(ClientConfig::builder()).unwrap_err();
        assert_eq!(err, NotionError::MissingCredential);

        let err = ClientConfig::builder().api_key("  ").build().unwrap_err();
        assert_eq!(err, NotionError::MissingCredential);
    }

    #[test]
    fn test_base_url_gains_trailing_slash() {
        let config = ClientConfig::builder()
            .api_key("k")
            .base_url("http://localhost:9000/v1")
            .build()
            .unwrap();
        assert_eq!(config.base_url().as_str(), "http://localhost:9000/v1/");
    }

    #[test]
    fn test_base_url_must_be_http() {
        for raw in ["not a url", "mailto:someone@example.com", "ftp://host/v1/", "https://host/v1/?x=1"] {
            let err = ClientConfig::builder()
                .api_key("k")
                .base_url(raw)
                .build()
                .unwrap_err();
            assert!(
                matches!(err, NotionError::InvalidParameters(_)),
                "{raw} gave {err:?}"
            );
        }
    }

    #[test]
    fn test_config_file_parsing() {
        let json = r#"{
            "api_key": "secret_file",
            "base_url": "http://127.0.0.1:8080/v1/",
            "transport": { "timeout_ms": 2500, "insecure_skip_verify": true }
        }"#;
        let file: ConfigFile = serde_json::from_str(json).unwrap();
        let config = ClientConfig::try_from(file).unwrap();

        assert_eq!(config.api_key(), "secret_file");
        assert_eq!(config.notion_version(), NOTION_VERSION);
        assert_eq!(
            config.transport().timeout(),
            Some(Duration::from_millis(2500))
        );
        assert!(config.transport().insecure_skip_verify);
        assert_eq!(config.transport().proxy, None);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("notionkit-config-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"api_key": "secret_disk", "notion_version": "2022-06-28"}"#,
        )
        .unwrap();

        let config = ClientConfig::load(path.to_str().unwrap()).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(config.api_key(), "secret_disk");
        assert_eq!(config.notion_version(), "2022-06-28");
        assert_eq!(config.base_url().as_str(), DEFAULT_BASE_URL);

        assert!(ClientConfig::load("/nonexistent/notionkit.json").is_err());
    }

    #[test]
    fn test_build_uses_explicit_key() {
        let config = ClientConfig::builder()
            .api_key("secret_explicit")
            .base_url("http://localhost:9000/v1/")
            .build()
            .unwrap();
        assert_eq!(config.api_key(), "secret_explicit");
        assert_eq!(config.base_url().as_str(), "http://localhost:9000/v1/");
    }

    #[test]
    fn test_huge_timeout_saturates() {
        let config = ClientConfig::builder()
            .api_key("k")
            .timeout(Duration::MAX)
            .build()
            .unwrap();
        assert_eq!(config.transport().timeout_ms, Some(u64::MAX));
    }

    #[test]
    fn test_debug_hides_key() {
        let config = ClientConfig::builder().api_key("secret_abc").build().unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("secret_abc"));
        assert!(rendered.contains("api.notion.com"));
    }

    #[test]
    fn test_timeout_shortcut() {
        let config = ClientConfig::builder()
            .api_key("k")
            .timeout(Duration::from_secs(3))
            .build()
            .unwrap();
        assert_eq!(config.transport().timeout_ms, Some(3000));
        assert_eq!(config.transport().connect_timeout(), None);
    }
}
