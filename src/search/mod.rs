//! Web search: pluggable engines behind `WebSearch` plus the client
//! that turns hits into a bounded block of prompt text.

pub mod google;
pub mod searxng;

pub use google::GoogleCustomSearch;
pub use searxng::SearxngSearch;

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::core::{Outcome, SearchBackend};

/// Character budget of the snippet block before it is cut off.
pub const SNIPPET_CHAR_BUDGET: usize = 1500;
const TRUNCATION_MARKER: &str = "... (truncated)";

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    pub snippet: String,
}

impl SearchHit {
    /// Best short text for this hit. Engines sometimes return no
    /// snippet, in which case the title and link stand in.
    fn summary(&self) -> String {
        let snippet = self.snippet.trim();
        if !snippet.is_empty() {
            return snippet.to_string();
        }
        match (self.title.trim(), self.link.trim()) {
            ("", link) => link.to_string(),
            (title, "") => title.to_string(),
            (title, link) => format!("{} - {}", title, link),
        }
    }
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<SearchHit>>;
}

pub fn backend_from_config(backend: &SearchBackend) -> Arc<dyn WebSearch> {
    match backend {
        SearchBackend::Searxng { api_url } => Arc::new(SearxngSearch::new(api_url)),
        SearchBackend::Google { api_key, cx_id } => {
            Arc::new(GoogleCustomSearch::new(api_key, cx_id))
        }
    }
}

/// Concatenate hits into `Snippet N: ...` lines, stopping with a
/// truncation marker once the block passes the character budget.
pub fn format_snippets(hits: &[SearchHit], char_budget: usize) -> String {
    let mut text = String::new();
    let summaries = hits.iter().map(SearchHit::summary).filter(|s| !s.is_empty());
    for (i, summary) in summaries.enumerate() {
        text.push_str(&format!("Snippet {}: {}\n", i + 1, summary));

        if text.chars().count() > char_budget {
            text.push_str(TRUNCATION_MARKER);
            break;
        }
    }
    text
}

/// Runs searches and returns prompt-ready snippet text. The text is
/// opaque prose, callers splice it into a prompt and nothing else.
#[derive(Clone)]
pub struct WebSearchClient {
    engine: Arc<dyn WebSearch>,
    char_budget: usize,
}

impl WebSearchClient {
    pub fn new(engine: Arc<dyn WebSearch>) -> Self {
        Self {
            engine,
            char_budget: SNIPPET_CHAR_BUDGET,
        }
    }

    /// Never errors. Zero hits or any failure yields empty text.
    pub async fn snippets(&self, keyword: &str, limit: usize) -> Outcome<String> {
        tracing::debug!("Searching the web for: {}", keyword);
        let result = self.engine.search(keyword, limit).await.map(|hits| {
            if hits.is_empty() {
                tracing::debug!("No search results found for {}", keyword);
            }
            let hits: Vec<SearchHit> = hits.into_iter().take(limit).collect();
            format_snippets(&hits, self.char_budget)
        });
        Outcome::absorb(result, "Web search", String::new)
    }
}
