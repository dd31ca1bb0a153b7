//! In-memory store and catalog
//!
//! Backs the test suites and embedders that do not need persistence. The CLI
//! and server always use the SQLite store.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{
    CatalogSnapshot, ContentCatalog, EntryQuery, EntryUpdate, ScheduleStore, StoreError,
    StoreResult, TimeRange,
};
use crate::models::{
    Campaign, Clip, EntryStatus, NewScheduleEntry, Platform, ScheduleEntry, SocialAccount,
};

// ============================================================================
// Schedule Store
// ============================================================================

/// Schedule entries held in a map
#[derive(Debug, Default)]
pub struct MemoryScheduleStore {
    entries: RwLock<HashMap<String, ScheduleEntry>>,
}

impl MemoryScheduleStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fully formed entry, replacing any entry with the same id
    pub async fn insert(&self, entry: ScheduleEntry) {
        self.entries.write().await.insert(entry.id.clone(), entry);
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// All entries ordered by slot
    pub async fn all(&self) -> Vec<ScheduleEntry> {
        let mut entries: Vec<_> = self.entries.read().await.values().cloned().collect();
        sort_entries(&mut entries);
        entries
    }
}

fn sort_entries(entries: &mut [ScheduleEntry]) {
    entries.sort_by(|a, b| {
        a.scheduled_for
            .cmp(&b.scheduled_for)
            .then_with(|| a.created_at.cmp(&b.created_at))
    });
}

#[async_trait]
impl ScheduleStore for MemoryScheduleStore {
    async fn find_entries(&self, query: &EntryQuery) -> StoreResult<Vec<ScheduleEntry>> {
        let mut found: Vec<_> = self
            .entries
            .read()
            .await
            .values()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        sort_entries(&mut found);
        if let Some(limit) = query.limit {
            found.truncate(limit);
        }
        Ok(found)
    }

    async fn get_entry(&self, id: &str) -> StoreResult<Option<ScheduleEntry>> {
        Ok(self.entries.read().await.get(id).cloned())
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
        self.entries
            .write()
            .await
            .insert(entry.id.clone(), entry.clone());
        Ok(entry)
    }

    async fn update_entry(&self, id: &str, update: &EntryUpdate) -> StoreResult<ScheduleEntry> {
        let mut entries = self.entries.write().await;
        let entry = entries
            .get_mut(id)
            .ok_or_else(|| StoreError::entry_not_found(id))?;

        if let Some(expected) = update.expected_version {
            if entry.version != expected {
                return Err(StoreError::VersionConflict {
                    id: id.to_string(),
                    expected,
                    actual: entry.version,
                });
            }
        }

        if let Some(at) = update.scheduled_for {
            entry.scheduled_for = at;
        }
        if let Some(status) = update.status {
            entry.status = status;
        }
        entry.version += 1;
        entry.updated_at = Utc::now();

        Ok(entry.clone())
    }

    async fn count_entries(
        &self,
        platform: Platform,
        status: EntryStatus,
        range: TimeRange,
    ) -> StoreResult<usize> {
        Ok(self
            .entries
            .read()
            .await
            .values()
            .filter(|e| e.platform == platform && e.status == status && range.contains(e.scheduled_for))
            .count())
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Clips, campaigns and accounts held in maps
#[derive(Debug, Default)]
pub struct MemoryCatalog {
    clips: RwLock<HashMap<String, Clip>>,
    campaigns: RwLock<Vec<Campaign>>,
    accounts: RwLock<HashMap<String, SocialAccount>>,
}

impl MemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from a snapshot
    pub async fn from_snapshot(snapshot: CatalogSnapshot) -> Self {
        let catalog = Self::new();
        for clip in snapshot.clips {
            catalog.add_clip(clip).await;
        }
        for campaign in snapshot.campaigns {
            catalog.add_campaign(campaign).await;
        }
        for account in snapshot.accounts {
            catalog.add_account(account).await;
        }
        catalog
    }

    pub async fn add_clip(&self, clip: Clip) {
        self.clips.write().await.insert(clip.id.clone(), clip);
    }

    pub async fn add_campaign(&self, campaign: Campaign) {
        self.campaigns.write().await.push(campaign);
    }

    pub async fn add_account(&self, account: SocialAccount) {
        self.accounts
            .write()
            .await
            .insert(account.id.clone(), account);
    }
}

#[async_trait]
impl ContentCatalog for MemoryCatalog {
    async fn get_clip(&self, id: &str) -> StoreResult<Option<Clip>> {
        Ok(self.clips.read().await.get(id).cloned())
    }

    async fn get_campaigns_for_clip(&self, clip_id: &str) -> StoreResult<Vec<Campaign>> {
        Ok(self
            .campaigns
            .read()
            .await
            .iter()
            .filter(|c| c.clip_id == clip_id)
            .cloned()
            .collect())
    }

    async fn get_account(&self, id: &str) -> StoreResult<Option<SocialAccount>> {
        Ok(self.accounts.read().await.get(id).cloned())
    }
}
