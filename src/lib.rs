//! FX news caster
//!
//! Periodically searches for foreign-exchange news, has a language model
//! turn it into a short in-character line, and pushes that line to a
//! presentation client over a websocket.

pub mod agents;
pub mod config;
pub mod constants;
pub mod error;
pub mod llm;
pub mod message;
pub mod news;
pub mod services;
pub mod transport;

// Re-export commonly used types
pub use config::{AppConfig, Credentials, DeliveryMode};
pub use message::{NormalizedMessage, OutgoingMessage};
pub use services::{CycleOutcome, NewsCycle, Summarizer};
