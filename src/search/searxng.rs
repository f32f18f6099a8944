use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use super::{SearchHit, WebSearch};

#[derive(Debug, Deserialize)]
struct SearxngResult {
    #[serde(default)]
    title: String,
    #[serde(default)]
    url: String,
    #[serde(default)]
    content: String,
}

#[derive(Debug, Deserialize)]
struct SearxngResponse {
    #[serde(default)]
    results: Vec<SearxngResult>,
}

/// Queries a SearxNG instance through its JSON API. The instance must
/// have the `json` format enabled.
#[derive(Clone, Debug)]
pub struct SearxngSearch {
    api_url: String,
}

impl SearxngSearch {
    pub fn new(api_url: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl WebSearch for SearxngSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let resp: SearxngResponse = reqwest::Client::new()
            .get(format!("{}/search", self.api_url))
            .query(&[("q", query), ("format", "json")])
            .timeout(Duration::from_secs(15))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let hits = resp
            .results
            .into_iter()
            .take(limit)
            .map(|r| SearchHit {
                title: r.title,
                link: r.url,
                snippet: r.content,
            })
            .collect();
        Ok(hits)
    }
}
