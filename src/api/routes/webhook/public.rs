//! Public types for the LINE webhook
use serde::Deserialize;

/// Body of a webhook call. One call can carry several events.
#[derive(Debug, Deserialize)]
pub struct WebhookPayload {
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub events: Vec<WebhookEvent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSource {
    #[serde(rename = "type", default)]
    pub kind: String,
    pub user_id: Option<String>,
    pub group_id: Option<String>,
    pub room_id: Option<String>,
}

impl EventSource {
    /// Key for the conversation history. Group chats without a user id
    /// share the group's history.
    pub fn conversation_key(&self) -> Option<&str> {
        self.user_id
            .as_deref()
            .or(self.group_id.as_deref())
            .or(self.room_id.as_deref())
    }
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MessageContent {
    Text {
        #[serde(default)]
        id: Option<String>,
        text: String,
    },
    // Stickers, images, audio, location...
    #[serde(other)]
    Unsupported,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum WebhookEvent {
    Message {
        #[serde(rename = "replyToken", default)]
        reply_token: Option<String>,
        #[serde(default)]
        source: EventSource,
        message: MessageContent,
    },
    // Follow, unfollow, postback, join...
    #[serde(other)]
    Unsupported,
}

/// The parts of a text message event needed to answer it.
#[derive(Debug, PartialEq)]
pub struct TextMessageEvent<'a> {
    pub reply_token: &'a str,
    pub user_id: &'a str,
    pub text: &'a str,
}

impl WebhookEvent {
    /// `Some` for text messages that can be replied to.
    pub fn text_message(&self) -> Option<TextMessageEvent<'_>> {
        match self {
            WebhookEvent::Message {
                reply_token: Some(reply_token),
                source,
                message: MessageContent::Text { text, .. },
            } => Some(TextMessageEvent {
                reply_token,
                user_id: source.conversation_key()?,
                text,
            }),
            _ => None,
        }
    }
}
