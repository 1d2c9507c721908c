//! Application-wide constants
//!
//! Fixed values of the news cycle live here; anything an operator is
//! expected to tune lives in `config.yaml` instead.

use std::time::Duration;

/// News search constants
pub mod search {
    /// Maximum number of results requested per cycle
    pub const MAX_RESULTS: usize = 5;

    /// Recency window passed to the search service when filtering by age
    pub const RECENCY_DAYS: u32 = 1;

    /// Default search endpoint (Tavily)
    pub const DEFAULT_ENDPOINT: &str = "https://api.tavily.com/search";
}

/// Summarization constants
pub mod summarizer {
    /// Character budget of the joined search context sent to the model
    pub const CONTEXT_CHAR_BUDGET: usize = 20_000;

    /// Attempts per cycle when the service reports quota exhaustion
    pub const MAX_ATTEMPTS: u32 = 3;

    /// Literal the model returns when no item qualifies
    pub const NO_NEWS_SENTINEL: &str = "NO_NEWS";

    /// Sampling temperature
    pub const DEFAULT_TEMPERATURE: f32 = 0.7;

    /// Gemini's OpenAI-compatible endpoint
    pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta/openai";

    pub const DEFAULT_MODEL: &str = "gemini-2.0-flash-lite";
}

/// Wire message constants
pub mod message {
    /// Message type every synthesized message carries
    pub const CHAT_TYPE: &str = "chat";
}

/// Cycle scheduling constants
pub mod schedule {
    use super::*;

    /// Sleep between cycles for the one-shot sender
    pub const ONESHOT_INTERVAL: Duration = Duration::from_secs(90);

    /// Sleep between cycles for the broadcast server
    pub const BROADCAST_INTERVAL: Duration = Duration::from_secs(300);

    /// How often the broadcast server checks for its first listener
    pub const LISTENER_POLL: Duration = Duration::from_secs(1);
}

/// Transport constants
pub mod transport {
    pub const DEFAULT_ONESHOT_URL: &str = "ws://localhost:8000/direct-speech";
    pub const DEFAULT_BROADCAST_HOST: &str = "localhost";
    pub const DEFAULT_BROADCAST_PORT: u16 = 9000;
    pub const DEFAULT_PATH: &str = "/direct-speech";
}
