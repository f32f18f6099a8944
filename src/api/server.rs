use std::sync::Arc;

use anyhow::{Context, Result};
use axum::Router;
use tower_http::trace::TraceLayer;

use super::routes;
use crate::api::state::AppState;
use crate::core::{AppConfig, init_tracing};
use crate::openai::{LanguageModel, Message, OpenAiClient, ResponseFormat, Role};

pub fn app(shared_state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::router())
        .layer(TraceLayer::new_for_http())
        .with_state(shared_state)
}

/// Send a throwaway completion so a bad key or model name stops the
/// process before it accepts traffic.
async fn check_model(llm: &dyn LanguageModel) -> Result<()> {
    llm.complete(&[Message::new(Role::User, "測試訊息")], ResponseFormat::Text)
        .await
        .context("Language model connection check failed")?;
    tracing::info!("Language model connection OK");
    Ok(())
}

// Run the server
pub async fn serve(
    host: String,
    port: String,
    config: AppConfig,
    skip_model_check: bool,
) -> Result<()> {
    // axum logs rejections from built-in extractors with the `axum::rejection`
    // target, at `TRACE` level. `axum::rejection=trace` enables showing those events
    init_tracing(&format!(
        "{}=debug,tower_http=debug,axum::rejection=trace",
        env!("CARGO_CRATE_NAME")
    ));

    let llm = Arc::new(OpenAiClient::new(
        &config.llm_api_url,
        &config.llm_api_key,
        &config.llm_model,
    ));
    if skip_model_check {
        tracing::warn!("Skipping language model connection check");
    } else {
        check_model(llm.as_ref()).await?;
    }

    let app_state = AppState::from_config(&config, llm)?;
    let app = app(Arc::new(app_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port))
        .await
        .with_context(|| format!("Failed to bind {}:{}", host, port))?;

    tracing::debug!("Server started. Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
