//! Error taxonomy shared by every notionkit operation.

/// Every way a request against the Notion API can fail.
///
/// Exactly one variant applies per failed call, so callers can match
/// on the kind instead of inspecting error strings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotionError {
    /// No API key was supplied and `NOTION_API_KEY` is unset or empty.
    #[error("missing API key: pass one explicitly or set NOTION_API_KEY")]
    MissingCredential,

    /// The HTTP call itself failed (DNS, connection reset, timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// The response body was not valid JSON, whatever the status was.
    #[error("invalid JSON response ({status}): {cause}")]
    Decode { status: u16, cause: String },

    /// The body was valid JSON but the status was not 200.
    #[error("API error {}", describe_status(.status, .message))]
    Api {
        status: u16,
        message: Option<String>,
    },

    /// Caller arguments broke a documented precondition.
    #[error("invalid parameters: {0}")]
    InvalidParameters(String),
}

impl NotionError {
    /// HTTP status carried by [`NotionError::Api`] and [`NotionError::Decode`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Api { status, .. } | Self::Decode { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The `message` field of an API error body, if the server sent one.
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Api { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    pub fn is_decode(&self) -> bool {
        matches!(self, Self::Decode { .. })
    }

    pub(crate) fn invalid(reason: impl Into<String>) -> Self {
        Self::InvalidParameters(reason.into())
    }
}

/// Renders `404` or `404 (Not found)`.
fn describe_status(status: &u16, message: &Option<String>) -> String {
    match message {
        Some(message) => format!("{status} ({message})"),
        None => status.to_string(),
    }
}

pub type Result<T> = std::result::Result<T, NotionError>;
