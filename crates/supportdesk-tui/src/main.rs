//! SupportDesk - triage customer messages with an LLM from the terminal
//!
//! Each submitted message is classified (category, sentiment) and answered
//! with a suggested reply by the configured provider (Gemini by default).

mod app;
mod handler;
mod tui;
mod typewriter;
mod ui;

use std::fs::{self, OpenOptions};
use std::sync::Mutex;
use anyhow::{Context, Result};
use supportdesk_core::Config;
use tracing_subscriber::{fmt, EnvFilter};

use app::App;
use tui::EventHandler;

/// Log to a file: stderr belongs to the terminal UI.
fn init_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .context("Could not determine local data directory")?
        .join("supportdesk");
    fs::create_dir_all(&log_dir)?;

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_dir.join("supportdesk.log"))?;

    let filter = EnvFilter::try_from_env("SUPPORTDESK_LOG")
        .unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // API keys may live in a .env next to where the app is started
    let _ = dotenvy::dotenv();

    init_logging()?;

    let config = Config::load().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "could not read config, using defaults");
        Config::new()
    });

    let mut app = App::from_config(&config);
    tracing::info!(provider = %app.provider_label, model = %app.model_label, "starting supportdesk");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();

    let result = run(&mut terminal, &mut app, &mut events).await;

    tui::restore()?;
    result
}

async fn run(terminal: &mut tui::Tui, app: &mut App, events: &mut EventHandler) -> Result<()> {
    while !app.should_quit {
        terminal.draw(|frame| ui::render(app, frame))?;

        match events.next().await {
            Some(event) => handler::handle_event(app, event).await?,
            None => break,
        }
    }

    tracing::info!(messages = app.history.len(), "exiting");
    Ok(())
}
