use std::fmt;

use crate::error::AgentError;

/// Interchangeable API keys with a round-robin cursor.
///
/// The pool is never empty and never changes size after construction. The
/// cursor only moves on `rotate`, so it carries over from one cycle to the
/// next.
pub struct CredentialPool {
    keys: Vec<String>,
    cursor: usize,
}

impl CredentialPool {
    pub fn new(keys: Vec<String>) -> Result<Self, AgentError> {
        if keys.is_empty() {
            return Err(AgentError::MissingCredentials(
                "at least one LLM API key is required (GOOGLE_API_KEY or GOOGLE_API_KEYS)".into(),
            ));
        }
        Ok(Self { keys, cursor: 0 })
    }

    /// Key at the cursor
    pub fn current(&self) -> &str {
        &self.keys[self.cursor]
    }

    /// Advance to the next key, wrapping after the last, and return it
    pub fn rotate(&mut self) -> &str {
        self.cursor = (self.cursor + 1) % self.keys.len();
        self.current()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }
}

// Keys never show up in logs.
impl fmt::Debug for CredentialPool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialPool")
            .field("keys", &self.keys.len())
            .field("cursor", &self.cursor)
            .finish()
    }
}
