use std::time::Duration;

use anyhow::{Error, Result, anyhow};
use futures::stream::BoxStream;
use futures_util::StreamExt;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub enum Role {
    #[serde(rename = "system")]
    System,
    #[serde(rename = "assistant")]
    Assistant,
    #[serde(rename = "user")]
    User,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Message {
            role,
            content: content.to_string(),
        }
    }
}

/// Shape of the completion the caller wants back.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ResponseFormat {
    Text,
    /// Ask the provider to constrain output to a JSON object
    Json,
}

/// Text fragments of a streamed completion in arrival order. The stream
/// ends once the provider signals completion.
pub type TextStream = BoxStream<'static, Result<String, Error>>;

fn completions_url(api_hostname: &str) -> String {
    format!("{}/chat/completions", api_hostname.trim_end_matches('/'))
}

pub async fn completion(
    messages: &[Message],
    format: ResponseFormat,
    api_hostname: &str,
    api_key: &str,
    model: &str,
) -> Result<Value, Error> {
    let mut payload = json!({
        "model": model,
        "messages": messages,
    });
    if format == ResponseFormat::Json {
        payload["response_format"] = json!({"type": "json_object"});
    }
    let response = reqwest::Client::new()
        .post(completions_url(api_hostname))
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(Duration::from_secs(60 * 2))
        .json(&payload)
        .send()
        .await?
        .error_for_status()?
        .json()
        .await?;

    Ok(response)
}

/// Pull the assistant text out of a non-streaming completion response.
pub fn completion_content(resp: &Value) -> Result<String, Error> {
    resp["choices"][0]["message"]["content"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("No message received. Resp: {}", resp))
}

// Role-only, reasoning-only and `"content": null` deltas carry no text
#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionChunkChoice {
    #[serde(default)]
    delta: Delta,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CompletionChunk {
    #[serde(default)]
    choices: Vec<CompletionChunkChoice>,
}

/// Split the next complete SSE event off the front of `buffer`.
fn next_event(buffer: &mut Vec<u8>) -> Option<Vec<u8>> {
    let end = buffer.windows(2).position(|w| w == b"\n\n")?;
    let event = buffer[..end].to_vec();
    buffer.drain(..end + 2);
    Some(event)
}

pub async fn completion_stream(
    messages: &[Message],
    api_hostname: &str,
    api_key: &str,
    model: &str,
) -> Result<TextStream, Error> {
    let payload = json!({
        "model": model,
        "messages": messages,
        "stream": true,
    });
    let response = reqwest::Client::new()
        .post(completions_url(api_hostname))
        .bearer_auth(api_key)
        .header("Content-Type", "application/json")
        .timeout(Duration::from_secs(60 * 5))
        .json(&payload)
        .send()
        .await?
        .error_for_status()?;

    let mut stream = response.bytes_stream();

    Ok(Box::pin(async_stream::try_stream! {
        // Bytes are buffered rather than text because a multi-byte
        // character can be split across two network chunks
        let mut buffer: Vec<u8> = Vec::new();

        'outer: while let Some(chunk) = stream.next().await {
            let chunk = chunk?;
            buffer.extend(chunk.iter().filter(|b| **b != b'\r'));

            while let Some(event) = next_event(&mut buffer) {
                let event = std::str::from_utf8(&event)?;
                let event = event.trim();

                let Some(data) = event.strip_prefix("data:") else {
                    continue;
                };
                let data = data.trim();
                if data.is_empty() {
                    continue;
                }
                if data == "[DONE]" {
                    break 'outer;
                }

                let chunk = serde_json::from_str::<CompletionChunk>(data).inspect_err(|e| {
                    tracing::error!("Parsing completion chunk failed for {}\nError:{}", data, e)
                })?;
                // Usage-only chunks carry no choices
                let Some(choice) = chunk.choices.first() else {
                    continue;
                };

                if let Some(content) = choice.delta.content.as_deref().filter(|c| !c.is_empty()) {
                    yield content.to_string();
                }
                if choice.finish_reason.is_some() {
                    break 'outer;
                }
            }
        }
    }))
}
