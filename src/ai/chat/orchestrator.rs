use std::sync::Arc;

use futures_util::StreamExt;
use handlebars::Handlebars;
use tokio::sync::mpsc;

use super::generator::ResponseGenerator;
use super::history::{HistoryStore, Speaker};
use crate::ai::gate::SearchGate;
use crate::ai::prompt::{Prompt, SearchAugmentedContext, render, templates};
use crate::openai::LanguageModel;
use crate::search::{WebSearch, WebSearchClient};

/// Ties the search gate, web search and response generation together
/// for each inbound message, and keeps the per-user history current.
///
/// Use `Conversation::builder()` to construct a `Conversation`.
pub struct Conversation {
    gate: SearchGate,
    search: WebSearchClient,
    generator: ResponseGenerator,
    history: HistoryStore,
    templates: Handlebars<'static>,
    system_message: Option<String>,
    streaming: bool,
    search_results: usize,
}

impl Conversation {
    pub fn builder() -> ConversationBuilder {
        ConversationBuilder::default()
    }

    pub fn history(&self) -> &HistoryStore {
        &self.history
    }

    /// Prompt to send the model for `message` given search results. A
    /// rendering failure falls back to the raw message.
    fn augmented_prompt(&self, message: &str, search_results: &str) -> String {
        let ctx = SearchAugmentedContext {
            question: message,
            search_results,
        };
        render(&self.templates, Prompt::SearchAugmented, &ctx).unwrap_or_else(|err| {
            tracing::warn!("Rendering search prompt failed: {}", err);
            message.to_string()
        })
    }

    /// Decide whether to search and build the final prompt.
    async fn prompt_for(&self, message: &str) -> String {
        let decision = self.gate.decide(message).await.into_inner();
        if !decision.should_search() {
            tracing::debug!("No search needed, answering directly");
            return message.to_string();
        }

        tracing::debug!("Model suggests searching for: {}", decision.keyword);
        let results = self
            .search
            .snippets(&decision.keyword, self.search_results)
            .await
            .into_inner();
        if results.is_empty() {
            tracing::debug!("No search results, answering directly");
            return message.to_string();
        }

        self.augmented_prompt(message, &results)
    }

    /// Answer `message` from `user_id` and record the round.
    pub async fn reply(&self, user_id: &str, message: &str) -> String {
        self.reply_with_sink(user_id, message, None).await
    }

    /// Like `reply`, but also forwards each fragment to `sink` as it is
    /// produced. Always returns some text.
    pub async fn reply_with_sink(
        &self,
        user_id: &str,
        message: &str,
        sink: Option<&mpsc::UnboundedSender<String>>,
    ) -> String {
        // Held for the whole exchange so concurrent messages from the
        // same user are answered one at a time, in lock order
        let entry = self.history.get_or_create(user_id);
        let mut history = entry.lock().await;

        let evicted = history.trim();
        if evicted > 0 {
            tracing::debug!("Evicted {} turns from history of {}", evicted, user_id);
        }

        let prompt = self.prompt_for(message).await;

        let mut fragments = self
            .generator
            .fragments(
                &prompt,
                self.system_message.as_deref(),
                &history.turns(),
                self.streaming,
            )
            .await;
        let mut reply = String::new();
        while let Some(fragment) = fragments.next().await {
            if let Some(tx) = sink {
                // The receiver going away doesn't stop the reply from
                // being recorded
                let _ = tx.send(fragment.clone());
            }
            reply.push_str(&fragment);
        }

        // Record what the user actually said, not the augmented prompt
        history.append_turn(Speaker::User, message);
        history.append_turn(Speaker::Model, &reply);

        reply
    }
}

pub struct ConversationBuilder {
    llm: Option<Arc<dyn LanguageModel>>,
    search: Option<Arc<dyn WebSearch>>,
    history: HistoryStore,
    system_message: Option<String>,
    streaming: bool,
    search_results: usize,
}

impl Default for ConversationBuilder {
    fn default() -> Self {
        Self {
            llm: None,
            search: None,
            history: HistoryStore::new(),
            system_message: None,
            streaming: false,
            search_results: 3,
        }
    }
}

impl ConversationBuilder {
    pub fn language_model(mut self, llm: Arc<dyn LanguageModel>) -> Self {
        self.llm = Some(llm);
        self
    }

    pub fn web_search(mut self, search: Arc<dyn WebSearch>) -> Self {
        self.search = Some(search);
        self
    }

    pub fn history(mut self, history: HistoryStore) -> Self {
        self.history = history;
        self
    }

    pub fn system_message(mut self, system_message: &str) -> Self {
        self.system_message = Some(system_message.to_string());
        self
    }

    pub fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    pub fn search_results(mut self, search_results: usize) -> Self {
        self.search_results = search_results;
        self
    }

    pub fn build(self) -> anyhow::Result<Conversation> {
        let llm = self
            .llm
            .ok_or_else(|| anyhow::anyhow!("Conversation requires a language model"))?;
        let search = self
            .search
            .ok_or_else(|| anyhow::anyhow!("Conversation requires a web search engine"))?;

        Ok(Conversation {
            gate: SearchGate::new(Arc::clone(&llm)),
            search: WebSearchClient::new(search),
            generator: ResponseGenerator::new(llm),
            history: self.history,
            templates: templates(),
            system_message: self.system_message,
            streaming: self.streaming,
            search_results: self.search_results,
        })
    }
}
