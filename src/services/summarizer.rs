use chrono::Local;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::agents::{Agent, NewscasterAgent};
use crate::constants::summarizer::{CONTEXT_CHAR_BUDGET, MAX_ATTEMPTS, NO_NEWS_SENTINEL};
use crate::error::LlmError;
use crate::llm::{ChatBackend, CredentialPool};
use crate::message::strip_code_fence;
use crate::news::NewsResult;

/// What one summarization cycle produced
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SummaryOutcome {
    /// Model text, fences removed, ready for message normalization
    Reply(String),
    /// No search results, or the model answered with the sentinel
    NothingQualified,
    /// Every attempt hit a quota signal
    QuotaExhausted,
    /// A non-quota error ended the cycle
    Failed,
}

impl SummaryOutcome {
    pub fn into_reply(self) -> Option<String> {
        match self {
            SummaryOutcome::Reply(text) => Some(text),
            _ => None,
        }
    }
}

/// Join results as `URL: ...\n本文: ...\n---\n` blocks, capped at the
/// context character budget.
pub fn build_context(results: &[NewsResult]) -> String {
    let joined: String = results
        .iter()
        .map(|r| format!("URL: {}\n本文: {}\n---\n", r.source, r.body))
        .collect();

    match joined.char_indices().nth(CONTEXT_CHAR_BUDGET) {
        Some((cut, _)) => joined[..cut].to_string(),
        None => joined,
    }
}

/// Strip fences from a model reply; `None` when it is blank or carries the sentinel.
pub fn normalize_reply(raw: &str) -> Option<String> {
    let content = strip_code_fence(raw);
    if content.is_empty() || content.contains(NO_NEWS_SENTINEL) {
        return None;
    }
    Some(content.to_string())
}

/// Turns search results into one in-character utterance.
///
/// Owns the credential pool: on a quota signal the pool rotates to the next
/// key and the request is retried, up to `MAX_ATTEMPTS` per cycle.
pub struct Summarizer {
    backend: Arc<dyn ChatBackend>,
    credentials: CredentialPool,
    agent: NewscasterAgent,
}

impl Summarizer {
    pub fn new(backend: Arc<dyn ChatBackend>, credentials: CredentialPool, agent: NewscasterAgent) -> Self {
        Self {
            backend,
            credentials,
            agent,
        }
    }

    pub fn credentials(&self) -> &CredentialPool {
        &self.credentials
    }

    pub async fn summarize(&mut self, results: &[NewsResult]) -> SummaryOutcome {
        if results.is_empty() {
            return SummaryOutcome::NothingQualified;
        }

        let system_prompt = self.agent.system_prompt(Local::now().naive_local());
        let user_prompt = self.agent.user_prompt(&build_context(results));

        for attempt in 1..=MAX_ATTEMPTS {
            let response = self
                .backend
                .chat(self.credentials.current(), &system_prompt, &user_prompt)
                .await;

            match response {
                Ok(raw) => {
                    info!("🤖 [SUMMARIZER] {} replied: {}", self.agent.name(), raw.trim());
                    return match normalize_reply(&raw) {
                        Some(text) => SummaryOutcome::Reply(text),
                        None => SummaryOutcome::NothingQualified,
                    };
                }
                Err(LlmError::QuotaExhausted(reason)) => {
                    warn!(
                        "⚠️ [SUMMARIZER] Quota hit on key #{} (attempt {}/{}): {}",
                        self.credentials.cursor(),
                        attempt,
                        MAX_ATTEMPTS,
                        reason
                    );
                    if attempt < MAX_ATTEMPTS {
                        self.credentials.rotate();
                        info!("🔑 [SUMMARIZER] Rotated to key #{}", self.credentials.cursor());
                    }
                }
                Err(e) => {
                    error!("❌ [SUMMARIZER] LLM request failed: {}", e);
                    return SummaryOutcome::Failed;
                }
            }
        }

        error!("❌ [SUMMARIZER] Quota exhausted after {} attempts, skipping cycle", MAX_ATTEMPTS);
        SummaryOutcome::QuotaExhausted
    }
}
