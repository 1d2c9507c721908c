use serde::Deserialize;
use std::fs;
use std::time::Duration;
use url::Url;

use crate::constants::{schedule, search, summarizer, transport};
use crate::error::AgentError;
use crate::llm::CredentialPool;

/// Environment variable overriding the config file location
pub const CONFIG_PATH_ENV: &str = "NEWSCASTER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config.yaml";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryMode {
    /// Connect, send one message, disconnect
    #[default]
    Oneshot,
    /// Serve viewers and broadcast to all of them
    Broadcast,
}

/// How the search service restricts results by age
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchWindow {
    /// News topic, last day only
    #[default]
    LastDay,
    /// Advanced depth, no recency filter
    Advanced,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub endpoint: String,
    pub base_query: String,
    pub window: SearchWindow,
    pub base_domains: Vec<String>,
    pub additional_sites: Vec<String>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            endpoint: search::DEFAULT_ENDPOINT.to_string(),
            base_query: "為替 FX 市場ニュース 最新 ドル円 ユーロドル ポンド".to_string(),
            window: SearchWindow::LastDay,
            base_domains: Vec::new(),
            additional_sites: vec!["gaitame.com".to_string(), "zai.diamond.jp".to_string()],
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: summarizer::DEFAULT_BASE_URL.to_string(),
            model: summarizer::DEFAULT_MODEL.to_string(),
            temperature: summarizer::DEFAULT_TEMPERATURE,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct OneshotConfig {
    pub url: String,
    pub startup_greeting: Option<String>,
}

impl Default for OneshotConfig {
    fn default() -> Self {
        Self {
            url: transport::DEFAULT_ONESHOT_URL.to_string(),
            startup_greeting: Some("ニュースエージェント、接続確認よし！監視を開始するぞ！".to_string()),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct BroadcastConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    pub greeting: String,
    pub listener_poll_ms: u64,
}

impl Default for BroadcastConfig {
    fn default() -> Self {
        Self {
            host: transport::DEFAULT_BROADCAST_HOST.to_string(),
            port: transport::DEFAULT_BROADCAST_PORT,
            path: transport::DEFAULT_PATH.to_string(),
            greeting: "接続完了！指定されたサイトを監視するぞ！".to_string(),
            listener_poll_ms: schedule::LISTENER_POLL.as_millis() as u64,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub mode: DeliveryMode,
    pub persona_name: Option<String>,
    pub cycle_interval_secs: Option<u64>,
    pub search: SearchConfig,
    pub llm: LlmConfig,
    pub oneshot: OneshotConfig,
    pub broadcast: BroadcastConfig,
}

impl AppConfig {
    /// Load `config.yaml` (or the file named by `NEWSCASTER_CONFIG`).
    pub fn load() -> Result<Self, AgentError> {
        let path = std::env::var(CONFIG_PATH_ENV).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
        let content = fs::read_to_string(&path).map_err(|source| AgentError::ConfigRead {
            path: path.clone(),
            source,
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self, AgentError> {
        // Strip BOM if present
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);

        let config: AppConfig = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AgentError> {
        if self.cycle_interval_secs == Some(0) {
            return Err(AgentError::Config("cycle_interval_secs must be positive".into()));
        }
        if self.mode == DeliveryMode::Oneshot {
            let url = Url::parse(&self.oneshot.url)
                .map_err(|e| AgentError::Config(format!("invalid oneshot.url {}: {}", self.oneshot.url, e)))?;
            if !matches!(url.scheme(), "ws" | "wss") {
                return Err(AgentError::Config(format!(
                    "oneshot.url must use ws:// or wss://, got {}",
                    self.oneshot.url
                )));
            }
        }
        if !self.broadcast.path.starts_with('/') {
            return Err(AgentError::Config(format!(
                "broadcast.path must start with '/', got {}",
                self.broadcast.path
            )));
        }
        Ok(())
    }

    /// Sleep between cycles, defaulting per delivery mode
    pub fn cycle_interval(&self) -> Duration {
        match (self.cycle_interval_secs, self.mode) {
            (Some(secs), _) => Duration::from_secs(secs),
            (None, DeliveryMode::Oneshot) => schedule::ONESHOT_INTERVAL,
            (None, DeliveryMode::Broadcast) => schedule::BROADCAST_INTERVAL,
        }
    }

    pub fn listener_poll(&self) -> Duration {
        Duration::from_millis(self.broadcast.listener_poll_ms.max(1))
    }

    /// Allowed source domains: base list followed by the additional sites
    pub fn target_domains(&self) -> Vec<String> {
        self.search
            .base_domains
            .iter()
            .chain(self.search.additional_sites.iter())
            .cloned()
            .collect()
    }
}

/// API keys read from the environment at startup
pub struct Credentials {
    pub llm_keys: CredentialPool,
    pub search_key: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("llm_keys", &self.llm_keys)
            .field("search_key", &self.search_key.as_ref().map(|_| "<set>"))
            .finish()
    }
}

impl Credentials {
    pub fn from_env() -> Result<Self, AgentError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Collect keys through `lookup`: `GOOGLE_API_KEYS` (comma separated),
    /// then `GOOGLE_API_KEY` and `GOOGLE_API_KEY_1`..`GOOGLE_API_KEY_9`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AgentError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut keys: Vec<String> = Vec::new();
        let mut push = |candidate: &str| {
            let candidate = candidate.trim();
            if !candidate.is_empty() && !keys.iter().any(|k| k == candidate) {
                keys.push(candidate.to_string());
            }
        };

        if let Some(list) = lookup("GOOGLE_API_KEYS") {
            list.split(',').for_each(&mut push);
        }
        if let Some(key) = lookup("GOOGLE_API_KEY") {
            push(key.as_str());
        }
        for i in 1..=9 {
            if let Some(key) = lookup(&format!("GOOGLE_API_KEY_{}", i)) {
                push(key.as_str());
            }
        }

        let llm_keys = CredentialPool::new(keys)?;
        let search_key = lookup("TAVILY_API_KEY")
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());

        Ok(Self { llm_keys, search_key })
    }
}
