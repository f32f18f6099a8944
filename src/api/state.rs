use std::sync::Arc;

use anyhow::Result;

use crate::ai::chat::Conversation;
use crate::core::AppConfig;
use crate::line::{LineClient, Messenger};
use crate::openai::LanguageModel;
use crate::search::backend_from_config;

pub struct AppState {
    pub conversation: Arc<Conversation>,
    pub messenger: Arc<dyn Messenger>,
    // Verifies inbound webhook signatures
    pub channel_secret: String,
}

impl AppState {
    pub fn new(
        conversation: Arc<Conversation>,
        messenger: Arc<dyn Messenger>,
        channel_secret: &str,
    ) -> Self {
        Self {
            conversation,
            messenger,
            channel_secret: channel_secret.to_string(),
        }
    }

    /// Wire up the production collaborators described by `config`.
    pub fn from_config(config: &AppConfig, llm: Arc<dyn LanguageModel>) -> Result<Self> {
        let conversation = Conversation::builder()
            .language_model(llm)
            .web_search(backend_from_config(&config.search_backend))
            .system_message(&config.system_message)
            .streaming(config.streaming)
            .search_results(config.search_results)
            .build()?;
        let messenger = LineClient::new(&config.line_api_url, &config.line_channel_access_token);

        Ok(Self::new(
            Arc::new(conversation),
            Arc::new(messenger),
            &config.line_channel_secret,
        ))
    }
}
