// src/main.rs

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod config;
mod content;
mod error;
mod game;
mod session;
mod state;
mod web;

use crate::config::load_settings;
use crate::content::WordDeck;
use crate::error::Result as AppResult;
use crate::session::SessionHandle;
use crate::state::AppState;
use crate::web::run_server;

#[tokio::main]
async fn main() -> AppResult<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{}=info,tower_http=debug", env!("CARGO_PKG_NAME")).into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let app_settings = load_settings()?;
    tracing::info!("Configuration loaded: {:?}", app_settings);

    // Word content failures fall back to the built-in deck; players never
    // see a content error.
    let word_deck = WordDeck::load(&app_settings.content).await;

    let session = SessionHandle::spawn(32, word_deck);
    let app_state = AppState { session };

    run_server(app_state, app_settings.server).await?;

    Ok(())
}
