#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod args;

use std::io::Write;

use args::Args;
use clap::Parser;
use futures_util::StreamExt;
use parley_config::Config;
use parley_core::{ChatCompleteRequest, ChatError, Message, MessagePart};
use parley_gemini::{ChatCompleteModel, ChatCompleterOptions, Client};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize telemetry
    let _telemetry_guard = parley_telemetry::init(config.telemetry.as_ref(), &args.log)?;

    let model = ChatCompleteModel::custom(args.model.clone().unwrap_or_else(|| config.gemini.model.clone()));
    tracing::info!(
        config_path = %args.config.display(),
        model = %model,
        "starting parley"
    );

    let client = Client::from_config(&config.gemini)?;
    let completer = client.chat_completer(ChatCompleterOptions { model });

    let mut request = ChatCompleteRequest::new(vec![Message::user_text(args.prompt())]);
    request.system = args.system;
    request.temperature = args.temperature;

    // Cancel the stream on Ctrl+C
    let cancel = CancellationToken::new();
    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        shutdown_signal().await;
        cancel_clone.cancel();
    });

    let mut response = completer.chat_complete(cancel, request).await?;

    let mut stdout = std::io::stdout().lock();
    while let Some(part) = response.parts.next().await {
        match part {
            Ok(MessagePart::Text(text)) => {
                stdout.write_all(text.as_bytes())?;
                stdout.flush()?;
            }
            Ok(MessagePart::ToolCall(call)) => {
                tracing::info!(id = %call.id, name = %call.name, args = %call.args, "model requested tool call");
            }
            Ok(other) => tracing::warn!(part = ?other, "ignoring unexpected output part"),
            Err(ChatError::Cancelled) => {
                tracing::info!("completion cancelled");
                break;
            }
            Err(e) => return Err(e.into()),
        }
    }
    writeln!(stdout)?;

    let usage = response.meta.usage();
    tracing::info!(
        prompt_tokens = usage.prompt_tokens,
        thoughts_tokens = usage.thoughts_tokens,
        completion_tokens = usage.completion_tokens,
        total_tokens = usage.total_tokens,
        "completion finished"
    );

    Ok(())
}

/// Wait for Ctrl+C
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::warn!(error = %e, "failed to install Ctrl+C handler");
        std::future::pending::<()>().await;
    }

    tracing::info!("interrupt received");
}
