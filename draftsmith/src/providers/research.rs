//! Research provider: topic search with ranked snippets and a direct answer

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{GenerationError, Result};
use crate::models::{ResearchContext, ResearchHit};

/// How thorough a search pass should be
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchDepth {
    Basic,
    Advanced,
}

impl SearchDepth {
    fn as_str(&self) -> &'static str {
        match self {
            SearchDepth::Basic => "basic",
            SearchDepth::Advanced => "advanced",
        }
    }
}

#[async_trait]
pub trait ResearchProvider: Send + Sync {
    async fn search(&self, query: &str, depth: SearchDepth) -> Result<ResearchContext>;
}

/// Tavily-style search API client
#[derive(Debug)]
pub struct TavilySearchClient {
    api_key: String,
    base_url: String,
    max_results: usize,
    client: reqwest::Client,
}

impl TavilySearchClient {
    pub fn new(api_key: &str, base_url: &str) -> Self {
        Self {
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
            max_results: 5,
            client: reqwest::Client::new(),
        }
    }
}

#[derive(Serialize)]
struct SearchRequest<'a> {
    api_key: &'a str,
    query: &'a str,
    search_depth: &'static str,
    include_answer: bool,
    max_results: usize,
}

#[derive(Deserialize)]
struct SearchResponse {
    answer: Option<String>,
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Deserialize)]
struct SearchResult {
    title: String,
    url: String,
    content: String,
    #[serde(default)]
    score: f32,
}

#[async_trait]
impl ResearchProvider for TavilySearchClient {
    async fn search(&self, query: &str, depth: SearchDepth) -> Result<ResearchContext> {
        let url = format!("{}/search", self.base_url);

        let request_body = SearchRequest {
            api_key: &self.api_key,
            query,
            search_depth: depth.as_str(),
            include_answer: true,
            max_results: self.max_results,
        };

        let resp = self.client.post(&url).json(&request_body).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let error_text = resp.text().await.unwrap_or_default();
            return Err(GenerationError::ProviderCall(format!(
                "search endpoint returned {}: {}",
                status, error_text
            )));
        }

        let result: SearchResponse = resp.json().await?;
        Ok(ResearchContext {
            answer: result.answer.filter(|a| !a.trim().is_empty()),
            results: result
                .results
                .into_iter()
                .map(|r| ResearchHit {
                    title: r.title,
                    url: r.url,
                    content: r.content,
                    score: r.score,
                })
                .collect(),
        })
    }
}
