//! Persistence collaborators for the scheduler
//!
//! The scheduling core never talks to a database directly. It goes through
//! three narrow traits so that the backend can be swapped:
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                  PublishingScheduler                        │
//! │      (priority, forecast, slot search, conflicts)           │
//! └─────────────────────────────────────────────────────────────┘
//!            │                   │                   │
//!            ▼                   ▼                   ▼
//!    ┌───────────────┐   ┌───────────────┐   ┌───────────────┐
//!    │ ScheduleStore │   │ContentCatalog │   │   AuditSink   │
//!    └───────────────┘   └───────────────┘   └───────────────┘
//!            │                   │                   │
//!      ┌─────┴─────┐       ┌─────┴─────┐       ┌─────┴─────┐
//!      ▼           ▼       ▼           ▼       ▼           ▼
//!   Memory      SQLite   Memory      SQLite  Tracing     SQLite
//! ```

pub mod audit;
pub mod memory;
pub mod sqlite;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{
    Campaign, Clip, EntryStatus, NewScheduleEntry, Platform, ScheduleEntry, SocialAccount,
};

pub use audit::{emit_event, AuditEvent, AuditEventType, AuditSink, MemoryAuditSink, TracingAuditSink};
pub use memory::{MemoryCatalog, MemoryScheduleStore};
pub use sqlite::{Database, SqliteAuditSink, SqliteCatalog, SqliteScheduleStore};

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by storage backends
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{entity} '{id}' not found")]
    NotFound { entity: &'static str, id: String },

    /// Optimistic concurrency check failed
    #[error("Version conflict on entry '{id}': expected {expected}, found {actual}")]
    VersionConflict { id: String, expected: u64, actual: u64 },

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Stored row could not be decoded
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn entry_not_found(id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: "schedule entry",
            id: id.into(),
        }
    }

    /// Check if retrying the operation may succeed
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::VersionConflict { .. } | Self::Backend(_) => true,
            Self::Sqlite(rusqlite::Error::SqliteFailure(e, _)) => matches!(
                e.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ),
            _ => false,
        }
    }
}

/// Result type for storage operations
pub type StoreResult<T> = Result<T, StoreError>;

// ============================================================================
// Query Types
// ============================================================================

/// Half-open time range `[start, end)`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeRange {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeRange {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at < self.end
    }
}

/// Filter for schedule entry lookups
#[derive(Debug, Clone, Default)]
pub struct EntryQuery {
    pub platform: Option<Platform>,
    pub account_id: Option<String>,

    /// Accepted statuses; empty means any
    pub statuses: Vec<EntryStatus>,
    pub range: Option<TimeRange>,
    pub exclude_id: Option<String>,
    pub limit: Option<usize>,
}

impl EntryQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn statuses(mut self, statuses: &[EntryStatus]) -> Self {
        self.statuses = statuses.to_vec();
        self
    }

    pub fn range(mut self, range: TimeRange) -> Self {
        self.range = Some(range);
        self
    }

    pub fn exclude(mut self, id: impl Into<String>) -> Self {
        self.exclude_id = Some(id.into());
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Check whether an entry satisfies this filter
    pub fn matches(&self, entry: &ScheduleEntry) -> bool {
        self.platform.map_or(true, |p| entry.platform == p)
            && self
                .account_id
                .as_deref()
                .map_or(true, |a| entry.account_id == a)
            && (self.statuses.is_empty() || self.statuses.contains(&entry.status))
            && self.range.map_or(true, |r| r.contains(entry.scheduled_for))
            && self.exclude_id.as_deref().map_or(true, |id| entry.id != id)
    }
}

/// Partial update applied to a schedule entry
#[derive(Debug, Clone, Default)]
pub struct EntryUpdate {
    pub scheduled_for: Option<DateTime<Utc>>,
    pub status: Option<EntryStatus>,

    /// Reject the update unless the stored version matches
    pub expected_version: Option<u64>,
}

impl EntryUpdate {
    pub fn reschedule(at: DateTime<Utc>) -> Self {
        Self {
            scheduled_for: Some(at),
            ..Default::default()
        }
    }

    pub fn transition(status: EntryStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn if_version(mut self, version: u64) -> Self {
        self.expected_version = Some(version);
        self
    }
}

/// Clips, campaigns and accounts in one serializable bundle
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogSnapshot {
    #[serde(default)]
    pub clips: Vec<Clip>,
    #[serde(default)]
    pub campaigns: Vec<Campaign>,
    #[serde(default)]
    pub accounts: Vec<SocialAccount>,
}

// ============================================================================
// Collaborator Traits
// ============================================================================

/// Persistent store of schedule entries
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    /// Entries matching the query, ordered by `scheduled_for` then creation time
    async fn find_entries(&self, query: &EntryQuery) -> StoreResult<Vec<ScheduleEntry>>;

    async fn get_entry(&self, id: &str) -> StoreResult<Option<ScheduleEntry>>;

    async fn create_entry(&self, entry: NewScheduleEntry) -> StoreResult<ScheduleEntry>;

    /// Apply an update and return the stored entry with its bumped version
    async fn update_entry(&self, id: &str, update: &EntryUpdate) -> StoreResult<ScheduleEntry>;

    async fn count_entries(
        &self,
        platform: Platform,
        status: EntryStatus,
        range: TimeRange,
    ) -> StoreResult<usize>;
}

/// Read access to clips, their campaigns and social accounts
#[async_trait]
pub trait ContentCatalog: Send + Sync {
    async fn get_clip(&self, id: &str) -> StoreResult<Option<Clip>>;

    async fn get_campaigns_for_clip(&self, clip_id: &str) -> StoreResult<Vec<Campaign>>;

    async fn get_account(&self, id: &str) -> StoreResult<Option<SocialAccount>>;
}
