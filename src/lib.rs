//! reelcast - Clip publishing scheduler
//!
//! Decides when each clip is published on each social platform: scores clips,
//! forecasts per-platform capacity under publishing windows, and settles
//! collisions by displacing the lower-priority post.
//!
//! # Architecture
//!
//! The library is organized into several modules:
//!
//! - [`config`] - Configuration management and settings
//! - [`models`] - Core data structures and types
//! - [`scheduler`] - Priority, slot search, forecast, conflict resolution
//! - [`storage`] - Schedule store, content catalog and audit sink (SQLite, in-memory)
//! - [`server`] - REST API and periodic tick loop
//! - [`metrics`] - Prometheus metrics
//! - [`error`] - Unified error type
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use reelcast::config::Config;
//! use reelcast::scheduler::PublishingScheduler;
//! use reelcast::storage::Database;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::from_env()?;
//!     let db = Database::open(&config.database.sqlite_path)?;
//!     let scheduler = PublishingScheduler::new(
//!         Arc::new(db.schedule_store()),
//!         Arc::new(db.catalog()),
//!         Arc::new(db.audit_sink()),
//!         config.window_table()?,
//!         config.scheduler.clone(),
//!     );
//!     let forecast = scheduler.get_forecast(chrono::Utc::now()).await?;
//!     println!("{} platforms", forecast.len());
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod models;
pub mod scheduler;
pub mod server;
pub mod storage;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::config::Config;
    pub use crate::error::{Error, ErrorCategory, ReelcastErrorTrait, Result};
    pub use crate::models::{Clip, EntryStatus, Platform, ScheduleEntry, ScheduleOrigin};
    pub use crate::scheduler::{
        PublishingScheduler, ScheduleRequest, ScheduleResult, SchedulerConfig, WindowTable,
    };
    pub use crate::storage::{Database, MemoryCatalog, MemoryScheduleStore};
}

// Direct re-exports for convenience
pub use models::{Platform, ScheduleEntry};
