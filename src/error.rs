//! Error types for the news caster
//!
//! Only `AgentError` is allowed to stop the process. The others describe a
//! single failed cycle step and are logged, then degraded to "no result".

use thiserror::Error;

/// Startup errors: configuration and credentials
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Missing credentials: {0}")]
    MissingCredentials(String),

    #[error("Failed to read config file {path}: {source}")]
    ConfigRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config: {0}")]
    ConfigParse(#[from] serde_yaml::Error),
}

/// News search errors
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Search API key is not configured")]
    MissingApiKey,

    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Malformed search response: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Summarization service errors
#[derive(Error, Debug)]
pub enum LlmError {
    /// Rate limit or quota exhaustion on the active key. Triggers key rotation.
    #[error("Quota exhausted: {0}")]
    QuotaExhausted(String),

    #[error("LLM API error: {0}")]
    Api(String),
}

/// Websocket delivery errors
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Receiver is not running at {url}")]
    ReceiverNotRunning { url: String },

    #[error("WebSocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("Send failed: {0}")]
    Send(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Textual markers a summarization backend uses to signal rate limiting or
/// quota exhaustion, matched case-insensitively.
const QUOTA_MARKERS: [&str; 5] = [
    "resource_exhausted",
    "quota",
    "rate limit",
    "rate_limit",
    "too many requests",
];

/// Helper to check whether an error payload is a quota/rate-limit signal
pub fn is_quota_signal(text: &str) -> bool {
    let lower = text.to_lowercase();
    QUOTA_MARKERS.iter().any(|m| lower.contains(m))
}

impl LlmError {
    /// Classify a failed response by HTTP status and body.
    ///
    /// A `RESOURCE_EXHAUSTED` status field counts at any HTTP status; the
    /// looser text markers only on 403 and 429.
    pub fn from_response(status: u16, body: &str) -> Self {
        let exhausted = body.to_lowercase().contains("resource_exhausted");
        if status == 429 || exhausted || (status == 403 && is_quota_signal(body)) {
            LlmError::QuotaExhausted(format!("HTTP {}: {}", status, body))
        } else {
            LlmError::Api(format!("HTTP {}: {}", status, body))
        }
    }

    pub fn is_quota(&self) -> bool {
        matches!(self, LlmError::QuotaExhausted(_))
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        match err.status() {
            Some(status) if status.as_u16() == 429 => LlmError::QuotaExhausted(err.to_string()),
            _ => LlmError::Api(err.to_string()),
        }
    }
}

impl From<async_openai::error::OpenAIError> for LlmError {
    fn from(err: async_openai::error::OpenAIError) -> Self {
        let text = format!("{:?}", err);
        if is_quota_signal(&text) {
            LlmError::QuotaExhausted(err.to_string())
        } else {
            LlmError::Api(err.to_string())
        }
    }
}
