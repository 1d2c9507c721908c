pub mod query;
pub mod tavily;

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::SearchError;

pub use query::{build_query, current_query};
pub use tavily::TavilyClient;

/// One search hit: where it came from and what it says.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NewsResult {
    pub source: String,
    pub body: String,
}

impl NewsResult {
    pub fn new(source: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait NewsSearch: Send + Sync {
    async fn search(&self, query: &str, domains: &[String]) -> Result<Vec<NewsResult>, SearchError>;
}

/// Runs searches restricted to a fixed domain allow-list.
///
/// Failures never leave this type: they are logged and reported as an
/// empty result list.
#[derive(Clone)]
pub struct NewsFetcher {
    search: Arc<dyn NewsSearch>,
    domains: Arc<[String]>,
}

impl NewsFetcher {
    pub fn new(search: Arc<dyn NewsSearch>, domains: Vec<String>) -> Self {
        Self {
            search,
            domains: domains.into(),
        }
    }

    pub fn domains(&self) -> &[String] {
        &self.domains
    }

    pub async fn fetch(&self, query: &str) -> Vec<NewsResult> {
        match self.search.search(query, &self.domains).await {
            Ok(results) => {
                info!("🔎 [SEARCH] {} result(s)", results.len());
                results
            }
            Err(e) => {
                warn!("⚠️ [SEARCH] Search failed: {}", e);
                Vec::new()
            }
        }
    }
}
