use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};

use crate::message::normalize;
use crate::news::{current_query, NewsFetcher};
use crate::services::summarizer::Summarizer;
use crate::transport::Delivery;

/// What one pass of the loop ended with
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Search returned nothing (or failed)
    NoResults,
    /// Nothing recent enough, or the model call gave up
    NoNews,
    /// Message delivered to this many receivers
    Delivered(usize),
    DeliveryFailed,
}

/// The search → summarize → deliver → sleep loop.
///
/// Cycles are strictly sequential: the sleep starts only once the previous
/// cycle has finished, however long the external calls took.
pub struct NewsCycle {
    fetcher: NewsFetcher,
    summarizer: Summarizer,
    delivery: Arc<dyn Delivery>,
    base_query: String,
    interval: Duration,
}

impl NewsCycle {
    pub fn new(
        fetcher: NewsFetcher,
        summarizer: Summarizer,
        delivery: Arc<dyn Delivery>,
        base_query: String,
        interval: Duration,
    ) -> Self {
        Self {
            fetcher,
            summarizer,
            delivery,
            base_query,
            interval,
        }
    }

    pub fn summarizer(&self) -> &Summarizer {
        &self.summarizer
    }

    pub async fn run_once(&mut self) -> CycleOutcome {
        let query = current_query(&self.base_query);
        info!("🔎 [CYCLE] Searching {} site(s): {}", self.fetcher.domains().len(), query);

        let results = self.fetcher.fetch(&query).await;
        if results.is_empty() {
            return CycleOutcome::NoResults;
        }

        let Some(reply) = self.summarizer.summarize(&results).await.into_reply() else {
            info!(">> [CYCLE] No news (NO_NEWS)");
            return CycleOutcome::NoNews;
        };

        let normalized = normalize(&reply);
        if normalized.is_fallback() {
            warn!("⚠️ [CYCLE] Model reply was not JSON, sending it as plain chat text");
        }

        match self.delivery.deliver(normalized.message()).await {
            Ok(count) => CycleOutcome::Delivered(count),
            Err(e) => {
                warn!("⚠️ [CYCLE] Delivery failed, message dropped: {}", e);
                CycleOutcome::DeliveryFailed
            }
        }
    }

    /// Run forever. Waits once for the delivery side to be ready.
    pub async fn run(mut self) {
        self.delivery.wait_until_ready().await;
        info!("🚀 [CYCLE] News loop started (interval: {}s)", self.interval.as_secs());

        loop {
            let outcome = self.run_once().await;
            info!("[CYCLE] Outcome: {:?}. Next search in {}s...", outcome, self.interval.as_secs());
            tokio::time::sleep(self.interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agents::NewscasterAgent;
    use crate::error::{LlmError, SearchError, TransportError};
    use crate::llm::{ChatBackend, CredentialPool};
    use crate::message::OutgoingMessage;
    use crate::news::{NewsResult, NewsSearch};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct FixedSearch(Vec<NewsResult>);

    #[async_trait]
    impl NewsSearch for FixedSearch {
        async fn search(&self, _q: &str, _d: &[String]) -> Result<Vec<NewsResult>, SearchError> {
            Ok(self.0.clone())
        }
    }

    struct FixedBackend(&'static str);

    #[async_trait]
    impl ChatBackend for FixedBackend {
        async fn chat(&self, _k: &str, _s: &str, _u: &str) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    #[derive(Default)]
    struct CapturingDelivery {
        sent: Mutex<Vec<OutgoingMessage>>,
        fail: bool,
    }

    #[async_trait]
    impl Delivery for CapturingDelivery {
        async fn deliver(&self, message: &OutgoingMessage) -> Result<usize, TransportError> {
            if self.fail {
                return Err(TransportError::ReceiverNotRunning { url: "ws://localhost:8000".into() });
            }
            self.sent.lock().unwrap().push(message.clone());
            Ok(1)
        }
    }

    fn cycle(results: Vec<NewsResult>, reply: &'static str, delivery: Arc<CapturingDelivery>) -> NewsCycle {
        let fetcher = NewsFetcher::new(Arc::new(FixedSearch(results)), vec!["x.com".into()]);
        let summarizer = Summarizer::new(
            Arc::new(FixedBackend(reply)),
            CredentialPool::new(vec!["k".into()]).unwrap(),
            NewscasterAgent::default(),
        );
        NewsCycle::new(fetcher, summarizer, delivery, "FX".into(), Duration::from_secs(90))
    }

    #[tokio::test]
    async fn test_no_results_skips_delivery() {
        let delivery = Arc::new(CapturingDelivery::default());
        let mut c = cycle(Vec::new(), "unused", delivery.clone());

        assert_eq!(c.run_once().await, CycleOutcome::NoResults);
        assert!(delivery.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_sentinel_skips_delivery() {
        let delivery = Arc::new(CapturingDelivery::default());
        let mut c = cycle(vec![NewsResult::new("x.com", "old")], "NO_NEWS", delivery.clone());

        assert_eq!(c.run_once().await, CycleOutcome::NoNews);
        assert!(delivery.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blank_reply_skips_delivery() {
        for reply in ["", "```json\n```"] {
            let delivery = Arc::new(CapturingDelivery::default());
            let mut c = cycle(vec![NewsResult::new("x.com", "news")], reply, delivery.clone());

            assert_eq!(c.run_once().await, CycleOutcome::NoNews);
            assert!(delivery.sent.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_plain_text_reply_is_wrapped() {
        let delivery = Arc::new(CapturingDelivery::default());
        let mut c = cycle(vec![NewsResult::new("x.com", "news")], "ポンドが急落したらしいな！", delivery.clone());

        assert_eq!(c.run_once().await, CycleOutcome::Delivered(1));
        assert_eq!(
            delivery.sent.lock().unwrap()[0],
            OutgoingMessage::chat("ポンドが急落したらしいな！")
        );
    }

    #[tokio::test]
    async fn test_delivery_failure_is_not_fatal() {
        let delivery = Arc::new(CapturingDelivery { fail: true, ..Default::default() });
        let mut c = cycle(vec![NewsResult::new("x.com", "news")], r#"{"text":"hi"}"#, delivery);

        assert_eq!(c.run_once().await, CycleOutcome::DeliveryFailed);
        assert_eq!(c.run_once().await, CycleOutcome::DeliveryFailed);
    }
}
