pub mod newscaster;

use chrono::NaiveDateTime;

pub use newscaster::NewscasterAgent;

/// A persona with its own instructions for the summarization service.
pub trait Agent {
    fn name(&self) -> &str;

    /// System instructions, stamped with the moment of the request.
    fn system_prompt(&self, now: NaiveDateTime) -> String;

    /// Human turn wrapping the gathered context.
    fn user_prompt(&self, context: &str) -> String;
}
