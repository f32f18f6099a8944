use anyhow::Result;
use linebot_search::cli;

#[tokio::main]
async fn main() -> Result<()> {
    cli::run().await
}
