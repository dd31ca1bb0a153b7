//! SQLite-backed store, catalog and audit sink
//!
//! All three share one connection guarded by a `Mutex`. Timestamps are stored
//! as unix milliseconds so range filters and ordering happen in SQL.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use uuid::Uuid;

use super::audit::{AuditEvent, AuditSink};
use super::{
    CatalogSnapshot, ContentCatalog, EntryQuery, EntryUpdate, ScheduleStore, StoreError,
    StoreResult, TimeRange,
};
use crate::models::{
    Campaign, Clip, EntryStatus, NewScheduleEntry, Platform, ScheduleEntry, ScheduleOrigin,
    SocialAccount,
};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS schedule_entries (
        id TEXT PRIMARY KEY,
        clip_id TEXT NOT NULL,
        platform TEXT NOT NULL,
        account_id TEXT NOT NULL,
        scheduled_for INTEGER NOT NULL,
        window_end INTEGER,
        origin TEXT NOT NULL,
        status TEXT NOT NULL,
        priority REAL,
        version INTEGER NOT NULL DEFAULT 1,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_schedule_entries_slot
        ON schedule_entries(platform, account_id, scheduled_for);

    CREATE INDEX IF NOT EXISTS idx_schedule_entries_status
        ON schedule_entries(status, scheduled_for);

    CREATE INDEX IF NOT EXISTS idx_schedule_entries_priority
        ON schedule_entries(priority);

    CREATE TABLE IF NOT EXISTS clips (
        id TEXT PRIMARY KEY,
        visual_score REAL NOT NULL,
        engagement_score REAL,
        created_at INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS campaigns (
        id TEXT PRIMARY KEY,
        clip_id TEXT NOT NULL,
        budget_cents INTEGER NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_campaigns_clip ON campaigns(clip_id);

    CREATE TABLE IF NOT EXISTS social_accounts (
        id TEXT PRIMARY KEY,
        handle TEXT NOT NULL,
        platform TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS audit_events (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        event_type TEXT NOT NULL,
        entity_type TEXT NOT NULL,
        entity_id TEXT NOT NULL,
        metadata TEXT NOT NULL,
        occurred_at INTEGER NOT NULL
    );
"#;

const ENTRY_COLUMNS: &str = "id, clip_id, platform, account_id, scheduled_for, window_end, \
     origin, status, priority, version, created_at, updated_at";

// ============================================================================
// Database
// ============================================================================

/// Shared SQLite connection
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open (or create) a database file
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    StoreError::backend(format!("Failed to create {}: {e}", parent.display()))
                })?;
            }
        }

        let conn = Connection::open(path)?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;

        let db = Self::from_connection(conn)?;
        tracing::info!(path = %path.display(), "SQLite database initialized");
        Ok(db)
    }

    /// Create an in-memory database (for testing)
    pub fn in_memory() -> StoreResult<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::backend("SQLite connection mutex poisoned"))
    }

    pub fn schedule_store(&self) -> SqliteScheduleStore {
        SqliteScheduleStore { db: self.clone() }
    }

    pub fn catalog(&self) -> SqliteCatalog {
        SqliteCatalog { db: self.clone() }
    }

    pub fn audit_sink(&self) -> SqliteAuditSink {
        SqliteAuditSink { db: self.clone() }
    }

    /// Upsert every record of a snapshot in one transaction
    pub fn import_catalog(&self, snapshot: &CatalogSnapshot) -> StoreResult<usize> {
        let mut conn = self.lock()?;
        let tx = conn.transaction()?;

        for clip in &snapshot.clips {
            tx.execute(
                "INSERT OR REPLACE INTO clips (id, visual_score, engagement_score, created_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    clip.id,
                    clip.visual_score,
                    clip.engagement_score,
                    to_millis(clip.created_at)
                ],
            )?;
        }
        for campaign in &snapshot.campaigns {
            tx.execute(
                "INSERT OR REPLACE INTO campaigns (id, clip_id, budget_cents) VALUES (?1, ?2, ?3)",
                params![campaign.id, campaign.clip_id, campaign.budget_cents],
            )?;
        }
        for account in &snapshot.accounts {
            tx.execute(
                "INSERT OR REPLACE INTO social_accounts (id, handle, platform) VALUES (?1, ?2, ?3)",
                params![account.id, account.handle, account.platform.as_str()],
            )?;
        }

        tx.commit()?;
        let total = snapshot.clips.len() + snapshot.campaigns.len() + snapshot.accounts.len();
        tracing::info!(
            clips = snapshot.clips.len(),
            campaigns = snapshot.campaigns.len(),
            accounts = snapshot.accounts.len(),
            "Catalog imported"
        );
        Ok(total)
    }

    /// Number of stored audit events
    pub fn audit_event_count(&self) -> StoreResult<usize> {
        let conn = self.lock()?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM audit_events", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

// ============================================================================
// Row Conversion
// ============================================================================

fn to_millis(at: DateTime<Utc>) -> i64 {
    at.timestamp_millis()
}

fn from_millis(millis: i64) -> StoreResult<DateTime<Utc>> {
    DateTime::from_timestamp_millis(millis)
        .ok_or_else(|| StoreError::Corrupt(format!("timestamp out of range: {millis}")))
}

fn parse_platform(s: &str) -> StoreResult<Platform> {
    Platform::parse(s).ok_or_else(|| StoreError::Corrupt(format!("unknown platform '{s}'")))
}

/// Raw column values, decoded outside the rusqlite row callback
struct EntryRow {
    id: String,
    clip_id: String,
    platform: String,
    account_id: String,
    scheduled_for: i64,
    window_end: Option<i64>,
    origin: String,
    status: String,
    priority: Option<f64>,
    version: i64,
    created_at: i64,
    updated_at: i64,
}

impl EntryRow {
    fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            clip_id: row.get(1)?,
            platform: row.get(2)?,
            account_id: row.get(3)?,
            scheduled_for: row.get(4)?,
            window_end: row.get(5)?,
            origin: row.get(6)?,
            status: row.get(7)?,
            priority: row.get(8)?,
            version: row.get(9)?,
            created_at: row.get(10)?,
            updated_at: row.get(11)?,
        })
    }

    fn decode(self) -> StoreResult<ScheduleEntry> {
        Ok(ScheduleEntry {
            platform: parse_platform(&self.platform)?,
            origin: ScheduleOrigin::parse(&self.origin)
                .ok_or_else(|| StoreError::Corrupt(format!("unknown origin '{}'", self.origin)))?,
            status: EntryStatus::parse(&self.status)
                .ok_or_else(|| StoreError::Corrupt(format!("unknown status '{}'", self.status)))?,
            scheduled_for: from_millis(self.scheduled_for)?,
            window_end: self.window_end.map(from_millis).transpose()?,
            created_at: from_millis(self.created_at)?,
            updated_at: from_millis(self.updated_at)?,
            version: self.version as u64,
            priority: self.priority,
            id: self.id,
            clip_id: self.clip_id,
            account_id: self.account_id,
        })
    }
}

fn load_entry(conn: &Connection, id: &str) -> StoreResult<Option<ScheduleEntry>> {
    let sql = format!("SELECT {ENTRY_COLUMNS} FROM schedule_entries WHERE id = ?1");
    conn.query_row(&sql, params![id], EntryRow::read)
        .optional()?
        .map(EntryRow::decode)
        .transpose()
}

// ============================================================================
// Schedule Store
// ============================================================================

/// SQLite implementation of [`ScheduleStore`]
#[derive(Clone)]
pub struct SqliteScheduleStore {
    db: Database,
}

impl SqliteScheduleStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ScheduleStore for SqliteScheduleStore {
    async fn find_entries(&self, query: &EntryQuery) -> StoreResult<Vec<ScheduleEntry>> {
        let mut clauses: Vec<String> = Vec::new();
        let mut values: Vec<rusqlite::types::Value> = Vec::new();

        if let Some(platform) = query.platform {
            values.push(platform.as_str().to_string().into());
            clauses.push(format!("platform = ?{}", values.len()));
        }
        if let Some(account) = &query.account_id {
            values.push(account.clone().into());
            clauses.push(format!("account_id = ?{}", values.len()));
        }
        if !query.statuses.is_empty() {
            let mut placeholders = Vec::with_capacity(query.statuses.len());
            for status in &query.statuses {
                values.push(status.as_str().to_string().into());
                placeholders.push(format!("?{}", values.len()));
            }
            clauses.push(format!("status IN ({})", placeholders.join(", ")));
        }
        if let Some(range) = query.range {
            values.push(to_millis(range.start).into());
            clauses.push(format!("scheduled_for >= ?{}", values.len()));
            values.push(to_millis(range.end).into());
            clauses.push(format!("scheduled_for < ?{}", values.len()));
        }
        if let Some(exclude) = &query.exclude_id {
            values.push(exclude.clone().into());
            clauses.push(format!("id != ?{}", values.len()));
        }

        let mut sql = format!("SELECT {ENTRY_COLUMNS} FROM schedule_entries");
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY scheduled_for ASC, created_at ASC");
        if let Some(limit) = query.limit {
            sql.push_str(&format!(" LIMIT {limit}"));
        }

        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(values), EntryRow::read)?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter().map(EntryRow::decode).collect()
    }

    async fn get_entry(&self, id: &str) -> StoreResult<Option<ScheduleEntry>> {
        let conn = self.db.lock()?;
        load_entry(&conn, id)
    }

    async fn create_entry(&self, new: NewScheduleEntry) -> StoreResult<ScheduleEntry> {
        let now = Utc::now();
        let entry = ScheduleEntry {
            id: Uuid::new_v4().to_string(),
            clip_id: new.clip_id,
            platform: new.platform,
            account_id: new.account_id,
            scheduled_for: new.scheduled_for,
            window_end: new.window_end,
            origin: new.origin,
            status: new.status,
            priority: new.priority,
            version: 1,
            created_at: now,
            updated_at: now,
        };

        let conn = self.db.lock()?;
        conn.execute(
            r#"
                INSERT INTO schedule_entries
                    (id, clip_id, platform, account_id, scheduled_for, window_end,
                     origin, status, priority, version, created_at, updated_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
                "#,
            params![
                entry.id,
                entry.clip_id,
                entry.platform.as_str(),
                entry.account_id,
                to_millis(entry.scheduled_for),
                entry.window_end.map(to_millis),
                entry.origin.as_str(),
                entry.status.as_str(),
                entry.priority,
                entry.version as i64,
                to_millis(entry.created_at),
                to_millis(entry.updated_at),
            ],
        )?;

        Ok(entry)
    }

    async fn update_entry(&self, id: &str, update: &EntryUpdate) -> StoreResult<ScheduleEntry> {
        let mut conn = self.db.lock()?;
        let tx = conn.transaction()?;

        let current = load_entry(&tx, id)?.ok_or_else(|| StoreError::entry_not_found(id))?;
        if let Some(expected) = update.expected_version {
            if current.version != expected {
                return Err(StoreError::VersionConflict {
                    id: id.to_string(),
                    expected,
                    actual: current.version,
                });
            }
        }

        let scheduled_for = update.scheduled_for.unwrap_or(current.scheduled_for);
        let status = update.status.unwrap_or(current.status);
        let changed = tx.execute(
            "UPDATE schedule_entries
             SET scheduled_for = ?1, status = ?2, version = version + 1, updated_at = ?3
             WHERE id = ?4 AND version = ?5",
            params![
                to_millis(scheduled_for),
                status.as_str(),
                to_millis(Utc::now()),
                id,
                current.version as i64
            ],
        )?;
        if changed == 0 {
            return Err(StoreError::VersionConflict {
                id: id.to_string(),
                expected: current.version,
                actual: current.version + 1,
            });
        }

        let updated = load_entry(&tx, id)?.ok_or_else(|| StoreError::entry_not_found(id))?;
        tx.commit()?;
        Ok(updated)
    }

    async fn count_entries(
        &self,
        platform: Platform,
        status: EntryStatus,
        range: TimeRange,
    ) -> StoreResult<usize> {
        let conn = self.db.lock()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM schedule_entries
             WHERE platform = ?1 AND status = ?2 AND scheduled_for >= ?3 AND scheduled_for < ?4",
            params![
                platform.as_str(),
                status.as_str(),
                to_millis(range.start),
                to_millis(range.end)
            ],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// SQLite implementation of [`ContentCatalog`]
#[derive(Clone)]
pub struct SqliteCatalog {
    db: Database,
}

#[async_trait]
impl ContentCatalog for SqliteCatalog {
    async fn get_clip(&self, id: &str) -> StoreResult<Option<Clip>> {
        let conn = self.db.lock()?;
        let row = conn
            .query_row(
                "SELECT id, visual_score, engagement_score, created_at FROM clips WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, f64>(1)?,
                        row.get::<_, Option<f64>>(2)?,
                        row.get::<_, i64>(3)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, visual_score, engagement_score, created_at)| {
            Ok(Clip {
                id,
                visual_score,
                engagement_score,
                created_at: from_millis(created_at)?,
            })
        })
        .transpose()
    }

    async fn get_campaigns_for_clip(&self, clip_id: &str) -> StoreResult<Vec<Campaign>> {
        let conn = self.db.lock()?;
        let mut stmt = conn.prepare(
            "SELECT id, clip_id, budget_cents FROM campaigns WHERE clip_id = ?1 ORDER BY id",
        )?;
        let campaigns = stmt
            .query_map(params![clip_id], |row| {
                Ok(Campaign {
                    id: row.get(0)?,
                    clip_id: row.get(1)?,
                    budget_cents: row.get(2)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(campaigns)
    }

    async fn get_account(&self, id: &str) -> StoreResult<Option<SocialAccount>> {
        let conn = self.db.lock()?;
        let row = conn
            .query_row(
                "SELECT id, handle, platform FROM social_accounts WHERE id = ?1",
                params![id],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        row.map(|(id, handle, platform)| {
            Ok(SocialAccount {
                id,
                handle,
                platform: parse_platform(&platform)?,
            })
        })
        .transpose()
    }
}

// ============================================================================
// Audit Sink
// ============================================================================

/// Persists audit events to the `audit_events` table
#[derive(Clone)]
pub struct SqliteAuditSink {
    db: Database,
}

#[async_trait]
impl AuditSink for SqliteAuditSink {
    async fn log_event(&self, event: AuditEvent) -> StoreResult<()> {
        let metadata = serde_json::to_string(&event.metadata)?;
        let conn = self.db.lock()?;
        conn.execute(
            "INSERT INTO audit_events (event_type, entity_type, entity_id, metadata, occurred_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                event.event_type.as_str(),
                event.entity_type,
                event.entity_id,
                metadata,
                to_millis(event.occurred_at)
            ],
        )?;
        Ok(())
    }
}
