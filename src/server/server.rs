//! Scheduler server implementation
//!
//! Serves the REST API and, when enabled, drives the periodic tick that
//! promotes due entries.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::Router;
use chrono::Utc;
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::scheduler::PublishingScheduler;

use super::api::create_router;
use super::config::ServerConfig;

// ============================================================================
// App State
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Publishing scheduler
    pub scheduler: Arc<PublishingScheduler>,

    /// Server start time
    pub start_time: Instant,

    /// Configuration
    pub config: ServerConfig,
}

// ============================================================================
// Scheduler Server
// ============================================================================

/// HTTP front end for the publishing scheduler
pub struct SchedulerServer {
    config: ServerConfig,
    state: AppState,
}

impl SchedulerServer {
    /// Create a new server around a scheduler
    pub fn new(config: ServerConfig, scheduler: Arc<PublishingScheduler>) -> Self {
        let state = AppState {
            scheduler,
            start_time: Instant::now(),
            config: config.clone(),
        };

        Self { config, state }
    }

    /// Get the application state
    pub fn state(&self) -> AppState {
        self.state.clone()
    }

    /// Build the router with all routes
    pub fn build_router(&self) -> Router {
        let mut router = create_router(self.state.clone());

        // Add CORS layer if enabled
        if self.config.enable_cors {
            router = router.layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            );
        }

        // Add tracing layer if enabled
        if self.config.enable_request_logging {
            router = router.layer(TraceLayer::new_for_http());
        }

        router
    }

    /// Start with graceful shutdown
    pub async fn start_with_shutdown(
        &self,
        shutdown_signal: impl std::future::Future<Output = ()> + Send + 'static,
    ) -> Result<(), ServerError> {
        let router = self.build_router();
        let addr = self.config.bind_address;

        tracing::info!("Starting scheduler server on {}", addr);

        let ticker = self
            .config
            .enable_tick_loop
            .then(|| self.start_tick_loop());

        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| ServerError::BindError(e.to_string()))?;

        let served = axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal)
            .await
            .map_err(|e| ServerError::ServeError(e.to_string()));

        if let Some(handle) = ticker {
            handle.abort();
        }

        served?;
        tracing::info!("Scheduler server shutdown complete");
        Ok(())
    }

    /// Start until Ctrl-C
    pub async fn start(&self) -> Result<(), ServerError> {
        self.start_with_shutdown(shutdown_signal()).await
    }

    /// Spawn the periodic tick task
    fn start_tick_loop(&self) -> JoinHandle<()> {
        let scheduler = self.state.scheduler.clone();
        let every = Duration::from_secs(scheduler.config().tick_interval_secs.max(1));

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                match scheduler.tick(Utc::now(), false).await {
                    Ok(report) if report.skipped => {
                        tracing::debug!("Previous tick still running");
                    }
                    Ok(_) => {}
                    Err(e) => tracing::error!(error = %e, "Tick failed"),
                }
            }
        })
    }

    /// Get server info
    pub fn info(&self) -> ServerInfo {
        ServerInfo {
            bind_address: self.config.bind_address,
            tick_interval_secs: self.state.scheduler.config().tick_interval_secs,
            tick_loop_enabled: self.config.enable_tick_loop,
            cors_enabled: self.config.enable_cors,
            request_logging_enabled: self.config.enable_request_logging,
        }
    }
}

/// Resolve on Ctrl-C
pub async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

/// Server information
#[derive(Debug, Clone)]
pub struct ServerInfo {
    pub bind_address: SocketAddr,
    pub tick_interval_secs: u64,
    pub tick_loop_enabled: bool,
    pub cors_enabled: bool,
    pub request_logging_enabled: bool,
}

impl ServerInfo {
    /// Format as display string
    pub fn display(&self) -> String {
        format!(
            "Scheduler Server\n\
             {:-<40}\n\
             Bind Address: {}\n\
             Tick Loop: {} (every {}s)\n\
             CORS: {}\n\
             Request Logging: {}",
            "",
            self.bind_address,
            if self.tick_loop_enabled { "enabled" } else { "disabled" },
            self.tick_interval_secs,
            if self.cors_enabled { "enabled" } else { "disabled" },
            if self.request_logging_enabled { "enabled" } else { "disabled" }
        )
    }
}

// ============================================================================
// Server Errors
// ============================================================================

/// Server errors
#[derive(Debug, Clone)]
pub enum ServerError {
    /// Failed to bind to address
    BindError(String),

    /// Server error
    ServeError(String),
}

impl std::fmt::Display for ServerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BindError(msg) => write!(f, "Failed to bind: {}", msg),
            Self::ServeError(msg) => write!(f, "Server error: {}", msg),
        }
    }
}

impl std::error::Error for ServerError {}

// ============================================================================
// Tests
// ============================================================================
