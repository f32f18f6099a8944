use std::io::Write;
use std::sync::Arc;

use anyhow::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tokio::sync::mpsc;

use crate::ai::chat::Conversation;
use crate::core::{AppConfig, init_tracing};
use crate::openai::OpenAiClient;
use crate::search::backend_from_config;

pub async fn run(config: AppConfig, user_id: &str) -> Result<()> {
    init_tracing("warn");

    let mut rl = DefaultEditor::new()?;

    let llm = Arc::new(OpenAiClient::new(
        &config.llm_api_url,
        &config.llm_api_key,
        &config.llm_model,
    ));
    // Always stream in the terminal so the reply prints as it arrives
    let conversation = Conversation::builder()
        .language_model(llm)
        .web_search(backend_from_config(&config.search_backend))
        .system_message(&config.system_message)
        .streaming(true)
        .search_results(config.search_results)
        .build()?;

    loop {
        let readline = rl.readline(">>> ");
        match readline {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(line);

                let (tx, mut rx) = mpsc::unbounded_channel::<String>();
                let printer = tokio::spawn(async move {
                    let mut stdout = std::io::stdout();
                    while let Some(fragment) = rx.recv().await {
                        print!("{}", fragment);
                        let _ = stdout.flush();
                    }
                    println!();
                });

                conversation.reply_with_sink(user_id, line, Some(&tx)).await;
                // Closing the channel lets the printer finish
                drop(tx);
                printer.await?;
            }
            Err(ReadlineError::Interrupted) => break,
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
