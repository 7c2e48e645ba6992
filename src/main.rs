//! FactLens — Binary Entrypoint
//! Boots the Axum HTTP server, wiring routes, shared state, and middleware.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use factlens::analyze::{DynCompletionClient, OpenAiProvider};
use factlens::api::{self, AppState};
use factlens::cache::ResultCache;
use factlens::lexicon::LexiconStore;

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("factlens=info,warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();
    init_tracing();

    // Lexicon loads in the background; requests served before completion get
    // neutral detector/scorer defaults instead of waiting.
    let lexicon = LexiconStore::new();
    lexicon.spawn_background_load();

    let client: DynCompletionClient = Arc::new(OpenAiProvider::from_env());
    let state = AppState::new(lexicon, Arc::new(ResultCache::new()), client);
    let router = api::router(state);

    let port: u16 = std::env::var("PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!(%addr, "factlens listening");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router).await?;
    Ok(())
}
