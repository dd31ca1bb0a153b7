//! HTTP server for the publishing scheduler
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────┐
//! │          Scheduler Server            │
//! │                                      │
//! │  ┌────────────────────────────────┐  │
//! │  │           REST API             │  │
//! │  │  GET  /api/health              │  │
//! │  │  POST /api/schedule            │  │
//! │  │  GET  /api/forecast            │  │
//! │  │  GET  /api/forecast/{platform} │  │
//! │  │  POST /api/tick                │  │
//! │  │  GET  /metrics                 │  │
//! │  └────────────────────────────────┘  │
//! │                                      │
//! │  ┌────────────────────────────────┐  │
//! │  │       Periodic Tick Loop       │  │
//! │  │  - scheduled -> pending        │  │
//! │  └────────────────────────────────┘  │
//! └──────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use reelcast::server::{SchedulerServer, ServerConfig};
//!
//! let server = SchedulerServer::new(ServerConfig::default(), scheduler);
//! server.start().await?;
//! ```

pub mod api;
pub mod config;
pub mod server;

// Re-export main types
pub use api::{create_router, ApiResponse};
pub use config::ServerConfig;
pub use server::{AppState, SchedulerServer, ServerError};
