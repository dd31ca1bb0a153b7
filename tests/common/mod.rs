//! Common test utilities

#![allow(dead_code)]

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use reelcast::models::{Campaign, Clip, Platform, ScheduleOrigin, SocialAccount};
use reelcast::scheduler::{PublishingScheduler, ScheduleRequest, SchedulerConfig, WindowTable};
use reelcast::storage::{MemoryAuditSink, MemoryCatalog, MemoryScheduleStore};

/// Instant on 2024-06-10 (UTC)
pub fn at(hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10, hour, minute, 0).unwrap()
}

/// Instant `days` after 2024-06-10 (UTC)
pub fn on_day(days: u32, hour: u32, minute: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 10 + days, hour, minute, 0).unwrap()
}

/// In-memory scheduler with handles on every collaborator
pub struct TestEnv {
    pub store: Arc<MemoryScheduleStore>,
    pub catalog: Arc<MemoryCatalog>,
    pub audit: Arc<MemoryAuditSink>,
    pub scheduler: Arc<PublishingScheduler>,
}

impl TestEnv {
    pub fn new() -> Self {
        Self::with(WindowTable::default(), SchedulerConfig::default())
    }

    pub fn with_config(config: SchedulerConfig) -> Self {
        Self::with(WindowTable::default(), config)
    }

    pub fn with(windows: WindowTable, config: SchedulerConfig) -> Self {
        let store = Arc::new(MemoryScheduleStore::new());
        let catalog = Arc::new(MemoryCatalog::new());
        let audit = Arc::new(MemoryAuditSink::new());
        let scheduler = Arc::new(PublishingScheduler::new(
            store.clone(),
            catalog.clone(),
            audit.clone(),
            windows,
            config,
        ));
        Self {
            store,
            catalog,
            audit,
            scheduler,
        }
    }

    /// Add a clip with no engagement data
    pub async fn clip(&self, id: &str, visual: f64, created_at: DateTime<Utc>) {
        self.catalog
            .add_clip(Clip {
                id: id.to_string(),
                visual_score: visual,
                engagement_score: None,
                created_at,
            })
            .await;
    }

    pub async fn clip_with_engagement(
        &self,
        id: &str,
        visual: f64,
        engagement: f64,
        created_at: DateTime<Utc>,
    ) {
        self.catalog
            .add_clip(Clip {
                id: id.to_string(),
                visual_score: visual,
                engagement_score: Some(engagement),
                created_at,
            })
            .await;
    }

    pub async fn campaign(&self, id: &str, clip_id: &str, budget_cents: i64) {
        self.catalog
            .add_campaign(Campaign {
                id: id.to_string(),
                clip_id: clip_id.to_string(),
                budget_cents,
            })
            .await;
    }

    pub async fn account(&self, id: &str, platform: Platform) {
        self.catalog
            .add_account(SocialAccount {
                id: id.to_string(),
                handle: format!("@{id}"),
                platform,
            })
            .await;
    }
}

/// Manual request with no deadline
pub fn request(clip: &str, platform: Platform, account: &str, desired: DateTime<Utc>) -> ScheduleRequest {
    ScheduleRequest {
        clip_id: clip.to_string(),
        platform,
        account_id: account.to_string(),
        desired_time: desired,
        window_end: None,
        origin: ScheduleOrigin::Manual,
    }
}
