//! Produces the model's reply to a message given the persona and the
//! user's recent turns.

use std::sync::Arc;

use futures::stream::{self, BoxStream};
use futures_util::StreamExt;

use super::history::Turn;
use crate::core::Outcome;
use crate::openai::{LanguageModel, Message, ResponseFormat, Role};

/// Sent to the user whenever the model can't produce a reply.
pub const FALLBACK_REPLY: &str = "對不起，AI 處理訊息時發生錯誤。";

/// Model acknowledgement that follows the persona preamble.
const PREAMBLE_ACK: &str = "好的。";

/// Reply fragments in order. Finite and not restartable; the stream
/// ending is the completion signal.
pub type Fragments = BoxStream<'static, String>;

/// Persona preamble as a leading exchange, then history, then the new
/// message.
pub fn build_context(message: &str, system: Option<&str>, history: &[Turn]) -> Vec<Message> {
    let mut context = Vec::with_capacity(history.len() + 3);
    if let Some(system) = system.filter(|s| !s.trim().is_empty()) {
        context.push(Message::new(Role::User, system));
        context.push(Message::new(Role::Assistant, PREAMBLE_ACK));
    }
    context.extend(history.iter().map(Message::from));
    context.push(Message::new(Role::User, message));
    context
}

#[derive(Clone)]
pub struct ResponseGenerator {
    llm: Arc<dyn LanguageModel>,
}

impl ResponseGenerator {
    pub fn new(llm: Arc<dyn LanguageModel>) -> Self {
        Self { llm }
    }

    /// Complete reply in one value. Never errors, failures become
    /// `FALLBACK_REPLY`.
    pub async fn generate(
        &self,
        message: &str,
        system: Option<&str>,
        history: &[Turn],
    ) -> Outcome<String> {
        let context = build_context(message, system, history);
        Outcome::absorb(
            self.llm.complete(&context, ResponseFormat::Text).await,
            "Response generation",
            || FALLBACK_REPLY.to_string(),
        )
    }

    /// Reply as a sequence of fragments. With `streaming` off the
    /// sequence holds exactly one fragment.
    ///
    /// A failure before anything was produced yields `FALLBACK_REPLY`
    /// as the only fragment. A failure mid-stream appends it after the
    /// fragments already sent.
    pub async fn fragments(
        &self,
        message: &str,
        system: Option<&str>,
        history: &[Turn],
        streaming: bool,
    ) -> Fragments {
        if !streaming {
            let reply = self.generate(message, system, history).await.into_inner();
            return stream::once(async move { reply }).boxed();
        }

        let context = build_context(message, system, history);
        let mut upstream = match self.llm.complete_stream(&context).await {
            Ok(upstream) => upstream,
            Err(err) => {
                tracing::warn!("Response generation failed, using fallback: {:#}", err);
                return stream::once(async { FALLBACK_REPLY.to_string() }).boxed();
            }
        };

        Box::pin(async_stream::stream! {
            let mut produced = false;
            while let Some(fragment) = upstream.next().await {
                match fragment {
                    Ok(text) => {
                        produced = true;
                        yield text;
                    }
                    Err(err) => {
                        tracing::warn!("Response stream failed, using fallback: {:#}", err);
                        yield FALLBACK_REPLY.to_string();
                        return;
                    }
                }
            }
            // An empty stream is no reply at all
            if !produced {
                tracing::warn!("Response stream ended without content, using fallback");
                yield FALLBACK_REPLY.to_string();
            }
        })
    }
}
