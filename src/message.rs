//! Wire message and normalization of model output
//!
//! Every frame sent to a presentation client is a JSON object
//! `{"type": "chat", "text": "..."}`. Model output is parsed strictly and,
//! when it is not usable JSON, wrapped as plain chat text.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::constants::message::CHAT_TYPE;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutgoingMessage {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

impl OutgoingMessage {
    pub fn chat(text: impl Into<String>) -> Self {
        Self {
            kind: CHAT_TYPE.to_string(),
            text: text.into(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

/// Result of normalizing model output
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum NormalizedMessage {
    /// The output parsed as JSON
    Parsed(OutgoingMessage),
    /// The output was not JSON and was wrapped as chat text
    RawTextFallback(OutgoingMessage),
}

impl NormalizedMessage {
    pub fn message(&self) -> &OutgoingMessage {
        match self {
            NormalizedMessage::Parsed(m) | NormalizedMessage::RawTextFallback(m) => m,
        }
    }

    /// Owned form of [`message`](Self::message); the cycle only borrows, tests take ownership.
    pub fn into_message(self) -> OutgoingMessage {
        match self {
            NormalizedMessage::Parsed(m) | NormalizedMessage::RawTextFallback(m) => m,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, NormalizedMessage::RawTextFallback(_))
    }
}

/// Strip a surrounding triple-backtick fence, with or without a `json` tag.
pub fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest
        .strip_prefix("json")
        .or_else(|| rest.strip_prefix("JSON"))
        .unwrap_or(rest);
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    rest.trim()
}

/// Normalize raw model output into a wire message.
pub fn normalize(raw: &str) -> NormalizedMessage {
    let body = strip_code_fence(raw);
    match serde_json::from_str::<Value>(body) {
        Ok(value) => normalize_value(value),
        Err(_) => NormalizedMessage::RawTextFallback(OutgoingMessage::chat(body)),
    }
}

/// Normalize an already-structured value into a wire message.
pub fn normalize_value(value: Value) -> NormalizedMessage {
    match value {
        Value::Object(ref map) => {
            let text = map
                .get("text")
                .and_then(Value::as_str)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string());

            let kind = match map.get("type").and_then(Value::as_str) {
                Some(kind) => kind.to_string(),
                None => CHAT_TYPE.to_string(),
            };
            NormalizedMessage::Parsed(OutgoingMessage { kind, text })
        }
        Value::String(text) => NormalizedMessage::Parsed(OutgoingMessage::chat(text)),
        other => NormalizedMessage::RawTextFallback(OutgoingMessage::chat(other.to_string())),
    }
}
