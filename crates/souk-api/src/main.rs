//! # souk-api — Binary Entry Point
//!
//! Starts the Axum HTTP server for the Souk back office API.

use anyhow::Context;
use clap::Parser;

use souk_api::state::{AppConfig, AppState};

/// Souk back office API server.
#[derive(Debug, Parser)]
#[command(name = "souk-api", version, about)]
struct Args {
    /// Port the HTTP server binds to.
    #[arg(long, env = "PORT", default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let auth_token = std::env::var("SOUK_AUTH_TOKEN").ok();
    if auth_token.is_none() {
        tracing::warn!("SOUK_AUTH_TOKEN not set — authentication disabled");
    }
    let config = AppConfig {
        port: args.port,
        auth_token,
    };

    let db = souk_api::db::init_pool()
        .await
        .context("database initialization failed")?;

    let state = AppState::new(config, db);
    state
        .hydrate_from_db()
        .await
        .context("database hydration failed")?;

    let app = souk_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], args.port));
    tracing::info!("Souk API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
