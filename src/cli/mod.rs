use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::core::AppConfig;

pub mod chat;
pub mod serve;

#[derive(Subcommand)]
enum Command {
    /// Run the LINE webhook server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "0.0.0.0")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "5000")]
        port: String,

        /// Start without checking the language model connection
        #[arg(long, action, default_value = "false")]
        skip_model_check: bool,
    },
    /// Chat with the bot in the terminal, with web search and history
    Chat {
        /// History key to chat as
        #[arg(long, default_value = "cli")]
        user: String,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();

    // Missing secrets are fatal before anything else happens
    let config = AppConfig::from_env()?;

    // Handle each sub command
    match args.command {
        Some(Command::Serve {
            host,
            port,
            skip_model_check,
        }) => {
            serve::run(host, port, config, skip_model_check).await?;
        }
        Some(Command::Chat { user }) => {
            chat::run(config, &user).await?;
        }
        None => {}
    }

    Ok(())
}
