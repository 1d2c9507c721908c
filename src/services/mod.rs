pub mod scheduler;
pub mod summarizer;

pub use scheduler::{CycleOutcome, NewsCycle};
pub use summarizer::{Summarizer, SummaryOutcome};

#[cfg(test)]
mod summarizer_tests;
