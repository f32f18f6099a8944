//! Asks the model whether a message needs a web search before it can
//! be answered, and if so with which keyword.

use std::sync::Arc;

use anyhow::{Result, bail};
use handlebars::Handlebars;
use serde::Deserialize;

use super::prompt::{Prompt, SearchGateContext, render, templates};
use crate::core::Outcome;
use crate::openai::{LanguageModel, Message, ResponseFormat, Role};

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SearchDecision {
    pub needed: bool,
    pub keyword: String,
}

impl SearchDecision {
    /// The fail-closed default: don't search.
    pub fn skip() -> Self {
        Self::default()
    }

    /// Search only when the model asked for it and gave us something to
    /// search for.
    pub fn should_search(&self) -> bool {
        self.needed && !self.keyword.trim().is_empty()
    }
}

// Both fields are required, a reply missing either is malformed
#[derive(Deserialize)]
struct RawDecision {
    search: String,
    keyword: String,
}

/// Models in JSON mode still occasionally wrap the object in a
/// markdown code fence.
fn strip_code_fence(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

pub fn parse_decision(raw: &str) -> Result<SearchDecision> {
    let decision: RawDecision = serde_json::from_str(strip_code_fence(raw))?;
    let needed = match decision.search.trim() {
        "Y" | "y" => true,
        "N" | "n" => false,
        other => bail!("Unexpected search flag: {}", other),
    };
    Ok(SearchDecision {
        needed,
        keyword: decision.keyword.trim().to_string(),
    })
}

pub struct SearchGate {
    llm: Arc<dyn LanguageModel>,
    templates: Handlebars<'static>,
}

impl SearchGate {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            llm,
            templates: templates(),
        }
    }

    async fn classify(&self, message: &str) -> Result<SearchDecision> {
        let prompt = render(
            &self.templates,
            Prompt::SearchGate,
            &SearchGateContext { msg: message },
        )?;
        // No history, this is a one-off classification
        let raw = self
            .llm
            .complete(&[Message::new(Role::User, &prompt)], ResponseFormat::Json)
            .await?;
        tracing::debug!("Search gate raw response: {}", raw);
        parse_decision(&raw)
    }

    /// Never errors. Any failure yields `SearchDecision::skip()`.
    pub async fn decide(&self, message: &str) -> Outcome<SearchDecision> {
        Outcome::absorb(
            self.classify(message).await,
            "Search gate",
            SearchDecision::skip,
        )
    }
}
