use anyhow::Result;
use async_trait::async_trait;

use super::core::{
    Message, ResponseFormat, TextStream, completion, completion_content, completion_stream,
};

/// The seam between conversation logic and whichever hosted model
/// answers it.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Single-shot completion returning the full text.
    async fn complete(&self, messages: &[Message], format: ResponseFormat) -> Result<String>;

    /// Streamed completion yielding text fragments as they arrive.
    async fn complete_stream(&self, messages: &[Message]) -> Result<TextStream>;
}

/// Any OpenAI compatible chat completions endpoint.
#[derive(Clone, Debug)]
pub struct OpenAiClient {
    api_hostname: String,
    api_key: String,
    model: String,
}

impl OpenAiClient {
    pub fn new(api_hostname: &str, api_key: &str, model: &str) -> Self {
        Self {
            api_hostname: api_hostname.to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(&self, messages: &[Message], format: ResponseFormat) -> Result<String> {
        let resp = completion(
            messages,
            format,
            &self.api_hostname,
            &self.api_key,
            &self.model,
        )
        .await?;
        completion_content(&resp)
    }

    async fn complete_stream(&self, messages: &[Message]) -> Result<TextStream> {
        completion_stream(messages, &self.api_hostname, &self.api_key, &self.model).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::Role;

    #[tokio::test]
    async fn test_complete_returns_content() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[{"message":{"role":"assistant","content":"pong"}}]}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new(&server.url(), "test-key", "gemini-2.0-flash");
        let text = client
            .complete(&[Message::new(Role::User, "ping")], ResponseFormat::Text)
            .await
            .unwrap();
        assert_eq!(text, "pong");
        assert_eq!(client.model(), "gemini-2.0-flash");
    }

    #[tokio::test]
    async fn test_complete_without_content_is_error() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/chat/completions")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"choices":[]}"#)
            .create_async()
            .await;

        let client = OpenAiClient::new(&server.url(), "test-key", "gemini-2.0-flash");
        let result = client
            .complete(&[Message::new(Role::User, "ping")], ResponseFormat::Text)
            .await;
        assert!(result.is_err());
    }
}
