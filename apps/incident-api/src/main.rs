//! Incident report server
//!
//! Turns an officer's structured incident submission into a drafted 434
//! incident report or a disciplinary ticket:
//!
//! - `POST /generate-report`: narrative + checklist from the completion
//!   service, written onto the report template and returned as a PDF
//! - `POST /generate-ticket`: offense codes matched from the catalog
//! - `GET /health`

use std::net::SocketAddr;

use axum::{
    routing::{get, post},
    Router,
};
use clap::Parser;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

mod completion;
mod config;
mod error;
mod handlers;
mod pipeline;
mod state;

use config::Args;
use state::AppState;

/// Build the application router around a ready state
pub(crate) fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(handlers::health))
        .route("/generate-report", post(handlers::generate_report))
        .route("/generate-ticket", post(handlers::generate_ticket))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();
    let args = Args::parse();

    let log_level = if args.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(log_level.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Initializing incident API...");
    let state = config::build_state(&args)?;
    if let Some(path) = &state.artifact_path {
        info!("Filled reports are also saved to {}", path.display());
    }

    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
