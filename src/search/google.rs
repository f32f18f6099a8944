use std::time::Duration;

use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;

use super::{SearchHit, WebSearch};

const GOOGLE_SEARCH_API_URL: &str = "https://www.googleapis.com";
// The API rejects `num` above 10
const MAX_RESULTS_PER_REQUEST: usize = 10;

#[derive(Debug, Deserialize)]
struct GoogleSearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    link: String,
    #[serde(default)]
    snippet: String,
}

#[derive(Debug, Deserialize)]
struct GoogleSearchResponse {
    // Omitted entirely when there are no results
    #[serde(default)]
    items: Vec<GoogleSearchItem>,
}

/// Google Programmable Search (Custom Search JSON API).
#[derive(Clone, Debug)]
pub struct GoogleCustomSearch {
    api_url: String,
    api_key: String,
    cx_id: String,
}

impl GoogleCustomSearch {
    pub fn new(api_key: &str, cx_id: &str) -> Self {
        Self::with_api_url(GOOGLE_SEARCH_API_URL, api_key, cx_id)
    }

    pub fn with_api_url(api_url: &str, api_key: &str, cx_id: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            cx_id: cx_id.to_string(),
        }
    }
}

#[async_trait]
impl WebSearch for GoogleCustomSearch {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let num = limit.clamp(1, MAX_RESULTS_PER_REQUEST).to_string();
        let resp: GoogleSearchResponse = reqwest::Client::new()
            .get(format!("{}/customsearch/v1", self.api_url))
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.cx_id.as_str()),
                ("q", query),
                ("num", num.as_str()),
            ])
            .timeout(Duration::from_secs(15))
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(resp
            .items
            .into_iter()
            .map(|item| SearchHit {
                title: item.title,
                link: item.link,
                snippet: item.snippet,
            })
            .collect())
    }
}
