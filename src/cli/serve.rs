use anyhow::Result;

use crate::api;
use crate::core::AppConfig;

pub async fn run(
    host: String,
    port: String,
    config: AppConfig,
    skip_model_check: bool,
) -> Result<()> {
    api::serve(host, port, config, skip_model_check).await
}
