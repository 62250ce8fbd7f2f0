//! ServerBuilder for fluent API to build the HTTP server

use super::router::build_routes;
use super::state::AppState;
use crate::config::AppConfig;
use crate::storage::Storage;
use anyhow::Result;
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Builder for the API server
///
/// # Example
///
/// ```ignore
/// let config = AppConfig::load(Some("config.yaml"))?;
/// let storage = Storage::from_config(&config.storage).await?;
/// ServerBuilder::new()
///     .with_config(config)
///     .with_storage(storage)
///     .serve("0.0.0.0:3000")
///     .await?;
/// ```
pub struct ServerBuilder {
    config: AppConfig,
    storage: Option<Storage>,
}

impl ServerBuilder {
    pub fn new() -> Self {
        Self {
            config: AppConfig::default(),
            storage: None,
        }
    }

    pub fn with_config(mut self, config: AppConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the record stores; in-memory stores are used when none is given
    pub fn with_storage(mut self, storage: Storage) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Assemble the shared handler state
    pub fn build_state(self) -> Result<AppState> {
        self.config.validate()?;
        let storage = self.storage.unwrap_or_else(Storage::in_memory);
        Ok(AppState::new(self.config, storage))
    }

    /// Build the router with tracing and CORS layers
    pub fn build(self) -> Result<Router> {
        let state = self.build_state()?;

        Ok(build_routes(state)
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive()))
    }

    /// Serve the application until Ctrl+C or SIGTERM
    pub async fn serve(self, addr: &str) -> Result<()> {
        let app = self.build()?;
        let listener = TcpListener::bind(addr).await?;

        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("Server shutdown complete");
        Ok(())
    }
}

impl Default for ServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C)
async fn shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            tracing::info!("Received SIGTERM signal, initiating graceful shutdown...");
        },
    }
}
