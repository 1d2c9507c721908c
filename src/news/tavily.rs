use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::config::{SearchConfig, SearchWindow};
use crate::constants::search::{MAX_RESULTS, RECENCY_DAYS};
use crate::error::SearchError;

use super::{NewsResult, NewsSearch};

#[derive(Serialize, Debug)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    max_results: usize,
    include_answer: bool,
    include_raw_content: bool,
    include_domains: &'a [String],
    #[serde(skip_serializing_if = "Option::is_none")]
    topic: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    days: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    search_depth: Option<&'static str>,
}

#[derive(Deserialize, Debug)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Deserialize, Debug)]
struct SearchHit {
    url: String,
    #[serde(default)]
    content: Option<String>,
}

/// Tavily search API client
#[derive(Clone)]
pub struct TavilyClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    window: SearchWindow,
}

impl TavilyClient {
    pub fn new(endpoint: String, api_key: Option<String>, window: SearchWindow) -> Self {
        Self {
            client: Client::new(),
            endpoint,
            api_key,
            window,
        }
    }

    pub fn from_config(config: &SearchConfig, api_key: Option<String>) -> Self {
        Self::new(config.endpoint.clone(), api_key, config.window)
    }

    fn request_body<'a>(&self, api_key: &'a str, query: &'a str, domains: &'a [String]) -> SearchRequest<'a> {
        let (topic, days, search_depth) = match self.window {
            SearchWindow::LastDay => (Some("news"), Some(RECENCY_DAYS), None),
            SearchWindow::Advanced => (None, None, Some("advanced")),
        };
        SearchRequest {
            api_key,
            query,
            max_results: MAX_RESULTS,
            include_answer: false,
            include_raw_content: true,
            include_domains: domains,
            topic,
            days,
            search_depth,
        }
    }
}

#[async_trait]
impl NewsSearch for TavilyClient {
    async fn search(&self, query: &str, domains: &[String]) -> Result<Vec<NewsResult>, SearchError> {
        let api_key = self.api_key.as_deref().ok_or(SearchError::MissingApiKey)?;

        info!("🔎 [SEARCH] Querying {} domains: {}", domains.len(), query);

        let resp = self
            .client
            .post(&self.endpoint)
            .json(&self.request_body(api_key, query, domains))
            .send()
            .await?;

        let status = resp.status();
        let body = resp.text().await?;
        if !status.is_success() {
            return Err(SearchError::Http {
                status: status.as_u16(),
                body,
            });
        }

        parse_results(&body)
    }
}

fn parse_results(body: &str) -> Result<Vec<NewsResult>, SearchError> {
    let parsed: SearchResponse = serde_json::from_str(body)?;
    Ok(parsed
        .results
        .into_iter()
        .take(MAX_RESULTS)
        .map(|hit| NewsResult {
            source: hit.url,
            body: hit.content.unwrap_or_default(),
        })
        .collect())
}
