//! Outbound side of the LINE Messaging API.

use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use serde::Serialize;

pub const LINE_API_URL: &str = "https://api.line.me";

/// LINE rejects text messages longer than this many characters.
pub const MAX_TEXT_LENGTH: usize = 5000;

/// Sends replies back to the platform the message came from.
#[async_trait]
pub trait Messenger: Send + Sync {
    /// Reply to the event identified by the one-shot `reply_token`.
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()>;
}

#[derive(Serialize)]
struct TextMessage<'a> {
    r#type: &'static str,
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ReplyRequest<'a> {
    reply_token: &'a str,
    messages: Vec<TextMessage<'a>>,
}

/// Cut `text` down to LINE's length limit on a character boundary.
pub fn truncate_text(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[derive(Clone, Debug)]
pub struct LineClient {
    api_url: String,
    access_token: String,
}

impl LineClient {
    pub fn new(api_url: &str, access_token: &str) -> Self {
        Self {
            api_url: api_url.trim_end_matches('/').to_string(),
            access_token: access_token.to_string(),
        }
    }
}

#[async_trait]
impl Messenger for LineClient {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()> {
        let payload = ReplyRequest {
            reply_token,
            messages: vec![TextMessage {
                r#type: "text",
                text: truncate_text(text, MAX_TEXT_LENGTH),
            }],
        };

        let response = reqwest::Client::new()
            .post(format!("{}/v2/bot/message/reply", self.api_url))
            .bearer_auth(&self.access_token)
            .header("Content-Type", "application/json")
            .timeout(Duration::from_secs(30))
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("LINE reply failed with {}: {}", status, body));
        }

        Ok(())
    }
}
