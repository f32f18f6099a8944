//! Router for the LINE webhook

use std::sync::Arc;

use anyhow::anyhow;
use axum::{Router, body::Bytes, extract::State, http::HeaderMap};

use super::public::{WebhookEvent, WebhookPayload};
use super::signature::{SIGNATURE_HEADER, verify_signature};
use crate::api::public::ApiError;
use crate::api::state::AppState;

type SharedState = Arc<AppState>;

/// Answer one event. Everything downstream of the signature check is
/// absorbed here so a failing event never fails the webhook call.
async fn handle_event(state: &AppState, event: &WebhookEvent) {
    let Some(msg) = event.text_message() else {
        tracing::debug!("Skipping unsupported event: {:?}", event);
        return;
    };

    tracing::info!("Message from {}: {}", msg.user_id, msg.text);
    let reply = state.conversation.reply(msg.user_id, msg.text).await;

    if let Err(err) = state.messenger.reply(msg.reply_token, &reply).await {
        tracing::error!("Failed to send reply to {}: {:#}", msg.user_id, err);
    }
}

/// Handle webhook calls from the LINE platform
async fn callback(
    State(state): State<SharedState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, ApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::bad_request(anyhow!("Missing X-Line-Signature header")))?;

    if !verify_signature(&state.channel_secret, &body, signature) {
        return Err(ApiError::bad_request(anyhow!(
            "Invalid signature. Check LINE_CHANNEL_SECRET"
        )));
    }

    tracing::debug!("Request body: {}", String::from_utf8_lossy(&body));
    let payload: WebhookPayload = serde_json::from_slice(&body)
        .map_err(|e| ApiError::bad_request(anyhow!("Invalid webhook payload: {}", e)))?;

    for event in payload.events.iter() {
        handle_event(&state, event).await;
    }

    Ok("OK")
}

/// Create the webhook router
pub fn router() -> Router<SharedState> {
    Router::new().route("/callback", axum::routing::post(callback))
}
