//! Test utilities for integration tests
#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use axum::{Router, body::Body, http::Request};
use futures::stream::{self, StreamExt};

use linebot_search::ai::chat::Conversation;
use linebot_search::api::public::webhook::{SIGNATURE_HEADER, sign};
use linebot_search::api::{AppState, app};
use linebot_search::line::Messenger;
use linebot_search::openai::{LanguageModel, Message, ResponseFormat, TextStream};
use linebot_search::search::{SearchHit, WebSearch};

pub const CHANNEL_SECRET: &str = "test-channel-secret";

/// Language model stand-in. Answers search gate requests (JSON mode)
/// with `gate_reply` and generation requests with `reply`, failing
/// when `reply` is `None`.
pub struct ScriptedModel {
    pub gate_reply: Mutex<String>,
    pub reply: Option<String>,
    pub gate_calls: Mutex<Vec<String>>,
    pub contexts: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedModel {
    pub fn new(gate_reply: &str, reply: Option<&str>) -> Arc<Self> {
        Arc::new(Self {
            gate_reply: Mutex::new(gate_reply.to_string()),
            reply: reply.map(str::to_string),
            gate_calls: Mutex::new(Vec::new()),
            contexts: Mutex::new(Vec::new()),
        })
    }

    pub fn set_gate_reply(&self, gate_reply: &str) {
        *self.gate_reply.lock().unwrap() = gate_reply.to_string();
    }

    /// Contents of the context sent with the latest generation request.
    pub fn last_context(&self) -> Vec<String> {
        self.contexts
            .lock()
            .unwrap()
            .last()
            .map(|ctx| ctx.iter().map(|m| m.content.clone()).collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, messages: &[Message], format: ResponseFormat) -> Result<String> {
        if format == ResponseFormat::Json {
            let prompt = messages.last().map(|m| m.content.clone()).unwrap_or_default();
            self.gate_calls.lock().unwrap().push(prompt);
            return Ok(self.gate_reply.lock().unwrap().clone());
        }
        self.contexts.lock().unwrap().push(messages.to_vec());
        self.reply.clone().ok_or_else(|| anyhow!("model unavailable"))
    }

    async fn complete_stream(&self, messages: &[Message]) -> Result<TextStream> {
        self.contexts.lock().unwrap().push(messages.to_vec());
        let reply = self.reply.clone().ok_or_else(|| anyhow!("model unavailable"))?;
        let fragments: Vec<Result<String>> = reply.chars().map(|c| Ok(c.to_string())).collect();
        Ok(stream::iter(fragments).boxed())
    }
}

/// Search engine stand-in that records every query.
#[derive(Default)]
pub struct RecordingSearch {
    pub hits: Vec<SearchHit>,
    pub queries: Mutex<Vec<String>>,
}

impl RecordingSearch {
    pub fn with_snippets(snippets: &[&str]) -> Arc<Self> {
        Arc::new(Self {
            hits: snippets
                .iter()
                .map(|s| SearchHit {
                    snippet: s.to_string(),
                    ..Default::default()
                })
                .collect(),
            queries: Mutex::new(Vec::new()),
        })
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebSearch for RecordingSearch {
    async fn search(&self, query: &str, _limit: usize) -> Result<Vec<SearchHit>> {
        self.queries.lock().unwrap().push(query.to_string());
        Ok(self.hits.clone())
    }
}

/// Messenger stand-in that records `(reply_token, text)` pairs.
#[derive(Default)]
pub struct RecordingMessenger {
    pub fail: bool,
    pub replies: Mutex<Vec<(String, String)>>,
}

impl RecordingMessenger {
    pub fn replies(&self) -> Vec<(String, String)> {
        self.replies.lock().unwrap().clone()
    }
}

#[async_trait]
impl Messenger for RecordingMessenger {
    async fn reply(&self, reply_token: &str, text: &str) -> Result<()> {
        self.replies
            .lock()
            .unwrap()
            .push((reply_token.to_string(), text.to_string()));
        if self.fail {
            return Err(anyhow!("Invalid reply token"));
        }
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub model: Arc<ScriptedModel>,
    pub search: Arc<RecordingSearch>,
    pub messenger: Arc<RecordingMessenger>,
    pub conversation: Arc<Conversation>,
}

/// Creates a test application router wired to in-memory stand-ins for
/// the model, search engine and LINE.
pub fn test_app(
    model: Arc<ScriptedModel>,
    search: Arc<RecordingSearch>,
    messenger: Arc<RecordingMessenger>,
) -> TestApp {
    let conversation = Arc::new(
        Conversation::builder()
            .language_model(model.clone())
            .web_search(search.clone())
            .build()
            .expect("Failed to build conversation"),
    );
    let state = AppState::new(conversation.clone(), messenger.clone(), CHANNEL_SECRET);

    TestApp {
        router: app(Arc::new(state)),
        model,
        search,
        messenger,
        conversation,
    }
}

/// A webhook body with one text message event per `(user_id,
/// reply_token, text)`.
pub fn text_events(messages: &[(&str, &str, &str)]) -> String {
    let events: Vec<serde_json::Value> = messages
        .iter()
        .enumerate()
        .map(|(i, (user_id, reply_token, text))| {
            serde_json::json!({
                "type": "message",
                "mode": "active",
                "timestamp": 1704067200000i64 + i as i64,
                "replyToken": reply_token,
                "source": {"type": "user", "userId": user_id},
                "message": {"id": format!("{}", 1000 + i), "type": "text", "text": text},
            })
        })
        .collect();
    serde_json::json!({"destination": "Ubot", "events": events}).to_string()
}

/// POST `body` to the webhook with a valid signature.
pub fn signed_request(body: &str) -> Request<Body> {
    Request::builder()
        .uri("/callback")
        .method("POST")
        .header("content-type", "application/json")
        .header(SIGNATURE_HEADER, sign(CHANNEL_SECRET, body.as_bytes()))
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
