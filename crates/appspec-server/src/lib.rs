//! Appspec Server
//!
//! HTTP front end that turns free-text application descriptions into
//! structured requirements and exposes the failure log for inspection.

#![warn(missing_docs)]

pub mod config;
pub mod handlers;

use appspec_extractor::{Extractor, FailureLogSink};
use appspec_llm::{LlmError, LlmProvider, OpenAiProvider};
use appspec_store::SqliteFailureLog;
use config::ServerConfig;
use handlers::{create_router, AppState};
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Server error
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    /// Server binding error
    #[error("Failed to bind server: {0}")]
    Bind(#[from] std::io::Error),

    /// LLM provider could not be constructed
    #[error("LLM provider error: {0}")]
    Llm(#[from] LlmError),

    /// Server error
    #[error("Server error: {0}")]
    Server(String),
}

/// Install the global tracing subscriber
///
/// Honors `RUST_LOG`, defaulting to `info`. Calling it twice is harmless.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Build application state from configuration
///
/// A failure log that cannot be opened is reported and left out; the
/// server keeps answering requests without it.
pub fn build_state(config: &ServerConfig) -> Result<AppState, ServerError> {
    let sink = match &config.database_path {
        Some(path) => match SqliteFailureLog::open(path) {
            Ok(log) => {
                info!("Failure log ready at {}", path);
                FailureLogSink::new(Arc::new(log))
            }
            Err(e) => {
                warn!("Failure log unavailable ({}): {}", path, e);
                FailureLogSink::disabled()
            }
        },
        None => {
            info!("No DATABASE_URL configured, failure logging disabled");
            FailureLogSink::disabled()
        }
    };

    let provider: Option<Arc<dyn LlmProvider>> = match config.openai_config() {
        Some(openai) => Some(Arc::new(OpenAiProvider::new(openai)?)),
        None => None,
    };

    let extractor = Extractor::new(provider, sink, config.extractor_config());

    Ok(AppState {
        extractor: Arc::new(extractor),
    })
}

/// Start the HTTP server
///
/// Builds state from `config`, binds the listener and serves until Ctrl-C.
/// Queued failure log writes are finished before returning.
pub async fn start_server(config: ServerConfig) -> Result<(), ServerError> {
    info!("Starting Appspec server");
    info!("Bind address: {}", config.bind_addr());

    let state = build_state(&config)?;
    info!(
        "LLM mode: {} (model {})",
        state.extractor.mode().as_str(),
        config.llm.model
    );

    let extractor = Arc::clone(&state.extractor);
    let app = create_router(state);

    let listener = TcpListener::bind(&config.bind_addr()).await?;
    info!("Server listening on {}", config.bind_addr());

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| ServerError::Server(e.to_string()))?;

    info!("Shutting down, waiting for pending failure log writes");
    extractor.sink().flush().await;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Cannot listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
