//! Publishing scheduler, conflict resolution and priority engine
//!
//! This module decides when each clip goes out on each platform.
//!
//! # Overview
//!
//! Every platform has a fixed daily publishing window and a minimum gap
//! between two posts on the same account. A placement request is scored,
//! moved into the platform window, and checked against the existing schedule.
//! When it collides with an entry, the higher priority keeps the slot and the
//! other side moves to the next open slot.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                    PublishingScheduler                       │
//! │  schedule()            get_forecast()            tick()      │
//! │      │                       │                      │        │
//! │  ┌───▼──────────┐   ┌────────▼───────┐              │        │
//! │  │   Priority   │   │    Forecast    │              │        │
//! │  │  Calculator  │   │     Engine     │              │        │
//! │  └──────────────┘   └────────┬───────┘              │        │
//! │  ┌──────────────┐            │                      │        │
//! │  │   Conflict   ├──────┐     │                      │        │
//! │  │   Resolver   │   ┌──▼─────▼──┐                   │        │
//! │  └──────┬───────┘   │   Slot    │                   │        │
//! │         │           │  Finder   │                   │        │
//! │         │           └─────┬─────┘                   │        │
//! └─────────┼─────────────────┼─────────────────────────┼────────┘
//!           ▼                 ▼                         ▼
//!     ┌───────────────────────────────────────────────────────┐
//!     │      ScheduleStore / ContentCatalog / AuditSink       │
//!     └───────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`window`] - Publishing windows and wrap-aware time arithmetic
//! - [`priority`] - Weighted clip priority scoring
//! - [`slot`] - Bounded next-open-slot search
//! - [`forecast`] - Per-platform daily capacity and risk
//! - [`conflict`] - Priority-based displacement
//! - [`engine`] - The scheduler facade and tick
//! - [`error`] - Scheduler error types
//!
//! # Quick Start
//!
//! ```ignore
//! use reelcast::scheduler::{PublishingScheduler, ScheduleRequest, SchedulerConfig, WindowTable};
//! use reelcast::storage::Database;
//! use std::sync::Arc;
//!
//! let db = Database::open("data/reelcast.db")?;
//! let scheduler = PublishingScheduler::new(
//!     Arc::new(db.schedule_store()),
//!     Arc::new(db.catalog()),
//!     Arc::new(db.audit_sink()),
//!     WindowTable::default(),
//!     SchedulerConfig::default(),
//! );
//!
//! let result = scheduler.schedule(request).await?;
//! println!("{:?}", result.scheduled_for());
//! ```

pub mod conflict;
pub mod engine;
pub mod error;
pub mod forecast;
pub mod priority;
pub mod slot;
pub mod window;

pub use conflict::{
    ConflictOutcome, ConflictPlan, ConflictRequest, ConflictResolver, Displacement, Resolution,
    TieBreak,
};
pub use engine::{PublishingScheduler, ScheduleRequest, ScheduleResult, SchedulerConfig, TickReport};
pub use error::{RejectionKind, SchedulerError, SchedulerResult};
pub use forecast::{ForecastEngine, ForecastResult, RiskLevel};
pub use priority::{PriorityBreakdown, PriorityCalculator};
pub use slot::{SlotFinder, SlotQuery, SlotSearch, SlotSearchConfig};
pub use window::{day_bounds, default_windows, PlatformWindow, WindowTable};
