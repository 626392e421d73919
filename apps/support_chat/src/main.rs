use std::{
    io::{IsTerminal, Write},
    path::PathBuf,
    sync::Arc,
};

use anyhow::{Context, Result};
use clap::Parser;
use client_core::{
    ControllerConfig, HttpChatClient, SessionController, SessionEvent, UuidIdGenerator,
};
use tokio::{
    io::{AsyncBufReadExt, BufReader},
    sync::broadcast::{self, error::RecvError},
    task::JoinHandle,
};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod config;
mod input;
mod render;

use config::{load_settings, DEFAULT_CONFIG_PATH};
use input::{parse_input, InputAction};

#[derive(Parser, Debug)]
#[command(name = "support-chat", about = "Terminal client for the support chat service")]
struct Args {
    /// Base URL of the chat service; overrides the config file and environment.
    #[arg(long)]
    api_url: Option<String>,
    /// Seconds to wait for a reply before giving up; 0 waits forever.
    #[arg(long)]
    timeout_secs: Option<u64>,
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();
    let args = Args::parse();

    let mut settings = load_settings(&args.config);
    if let Some(api_url) = args.api_url {
        settings.api_url = api_url;
    }
    if let Some(timeout_secs) = args.timeout_secs {
        settings.exchange_timeout_secs = timeout_secs;
    }

    let client = HttpChatClient::new(&settings.api_url)
        .with_context(|| format!("cannot use chat service url '{}'", settings.api_url))?;
    info!(chat_url = %client.chat_url(), "using chat service");
    let controller = SessionController::new_with_dependencies(
        Arc::new(client),
        &UuidIdGenerator,
        ControllerConfig {
            exchange_timeout: settings.exchange_timeout(),
        },
    );

    run(controller).await
}

async fn run(controller: Arc<SessionController>) -> Result<()> {
    println!("{}", render::header(controller.session_id()));
    println!("{}", render::welcome());
    print!("> ");
    let _ = std::io::stdout().flush();

    let renderer = tokio::spawn(render_events(controller.subscribe()));
    let interactive = std::io::stdin().is_terminal();
    let mut pending: Option<JoinHandle<()>> = None;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines
        .next_line()
        .await
        .context("failed to read from stdin")?
    {
        let snapshot = controller.snapshot().await;
        match parse_input(&line, snapshot.messages.is_empty(), snapshot.ended) {
            InputAction::Quit => break,
            InputAction::Nothing => {}
            InputAction::SessionEnded => println!("{}", render::ENDED_PROMPT),
            InputAction::QuickStartUnavailable => {
                println!("Quick starts are only available before the conversation begins.")
            }
            InputAction::UnknownCommand(command) => println!("Unknown command: {command}"),
            InputAction::Send(text) => {
                if exchange_in_flight(pending.as_ref(), controller.is_busy().await) {
                    println!("Still waiting for a reply; please hold on.");
                    continue;
                }
                let handle = controller.spawn_submit(text);
                if interactive {
                    pending = Some(handle);
                } else {
                    handle.await.context("exchange task panicked")?;
                }
            }
        }
    }

    if let Some(handle) = pending.take() {
        handle.await.context("exchange task panicked")?;
    }
    // Dropping the last controller handle closes the event channel, so the
    // renderer drains what is buffered and exits.
    drop(controller);
    let _ = renderer.await;
    Ok(())
}

/// A spawned submit may not have marked the session busy yet, so an unfinished
/// handle counts as in flight too.
fn exchange_in_flight(pending: Option<&JoinHandle<()>>, busy: bool) -> bool {
    busy || pending.is_some_and(|handle| !handle.is_finished())
}

async fn render_events(mut events: broadcast::Receiver<SessionEvent>) {
    let mut ended = false;
    loop {
        match events.recv().await {
            Ok(SessionEvent::MessageAppended { message, .. }) => {
                println!("{}", render::render_message(&message));
            }
            Ok(SessionEvent::BusyChanged(true)) => println!("{}", render::TYPING_INDICATOR),
            Ok(SessionEvent::BusyChanged(false)) => {
                print!("{}\n> ", render::prompt(ended));
                let _ = std::io::stdout().flush();
            }
            Ok(SessionEvent::SessionEnded) => ended = true,
            Err(RecvError::Lagged(skipped)) => {
                tracing::warn!(skipped, "renderer fell behind session events");
            }
            Err(RecvError::Closed) => break,
        }
    }
}
