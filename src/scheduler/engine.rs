//! Publishing scheduler
//!
//! Entry point used by the HTTP and CLI layers. A placement validates the
//! clip and account, scores the clip, moves the desired time into the
//! platform window, settles conflicts and persists the entry. Placements are
//! serialized by an in-process lock; writers in other processes are caught by
//! the per-entry version token.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use super::conflict::{ConflictOutcome, ConflictRequest, ConflictResolver, Resolution, TieBreak};
use super::error::{RejectionKind, SchedulerError, SchedulerResult};
use super::forecast::{ForecastEngine, ForecastResult};
use super::priority::{PriorityBreakdown, PriorityCalculator};
use super::slot::{SlotFinder, SlotSearchConfig};
use super::window::WindowTable;
use crate::config::ConfigError;
use crate::metrics;
use crate::models::{EntryStatus, NewScheduleEntry, Platform, ScheduleOrigin};
use crate::storage::{
    emit_event, AuditEvent, AuditEventType, AuditSink, ContentCatalog, EntryQuery, EntryUpdate,
    ScheduleStore, StoreError, TimeRange,
};

// ============================================================================
// Configuration
// ============================================================================

/// Tuning for the publishing scheduler
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Minutes added before the first slot candidate
    pub buffer_minutes: u32,

    /// Maximum slot candidates examined per search
    pub search_budget: u32,

    /// Policy for equal-priority collisions
    pub tie_break: TieBreak,

    /// Maximum entries promoted per tick
    pub tick_batch_size: usize,

    /// Seconds between ticks when running as a server
    pub tick_interval_secs: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        let search = SlotSearchConfig::default();
        Self {
            buffer_minutes: search.buffer_minutes,
            search_budget: search.search_budget,
            tie_break: TieBreak::default(),
            tick_batch_size: 100,
            tick_interval_secs: 60,
        }
    }
}

impl SchedulerConfig {
    pub fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn with_search_budget(mut self, budget: u32) -> Self {
        self.search_budget = budget;
        self
    }

    pub fn with_buffer_minutes(mut self, minutes: u32) -> Self {
        self.buffer_minutes = minutes;
        self
    }

    pub fn with_tick_batch_size(mut self, size: usize) -> Self {
        self.tick_batch_size = size;
        self
    }

    pub fn slot_search(&self) -> SlotSearchConfig {
        SlotSearchConfig {
            buffer_minutes: self.buffer_minutes,
            search_budget: self.search_budget,
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.search_budget == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.search_budget".to_string(),
                reason: "Must examine at least 1 candidate".to_string(),
            });
        }

        if self.tick_batch_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.tick_batch_size".to_string(),
                reason: "Must promote at least 1 entry per tick".to_string(),
            });
        }

        if self.tick_interval_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "scheduler.tick_interval_secs".to_string(),
                reason: "Interval must be greater than 0".to_string(),
            });
        }

        Ok(())
    }
}

// ============================================================================
// Requests and Results
// ============================================================================

/// Request to place a clip on a platform
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub clip_id: String,
    pub platform: Platform,
    pub account_id: String,
    pub desired_time: DateTime<Utc>,

    /// Latest acceptable publish time
    #[serde(default)]
    pub window_end: Option<DateTime<Utc>>,

    #[serde(default)]
    pub origin: ScheduleOrigin,
}

/// Outcome of a placement
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ScheduleResult {
    Scheduled {
        entry_id: String,
        scheduled_for: DateTime<Utc>,
        priority: PriorityBreakdown,

        /// Human-readable notes on every change made to the desired time
        adjustments: Vec<String>,
        conflict: ConflictOutcome,
    },
    Rejected {
        kind: RejectionKind,
        reason: String,
    },
}

impl ScheduleResult {
    pub fn is_scheduled(&self) -> bool {
        matches!(self, Self::Scheduled { .. })
    }

    pub fn entry_id(&self) -> Option<&str> {
        match self {
            Self::Scheduled { entry_id, .. } => Some(entry_id),
            Self::Rejected { .. } => None,
        }
    }

    pub fn scheduled_for(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Scheduled { scheduled_for, .. } => Some(*scheduled_for),
            Self::Rejected { .. } => None,
        }
    }

    pub fn rejection(&self) -> Option<RejectionKind> {
        match self {
            Self::Scheduled { .. } => None,
            Self::Rejected { kind, .. } => Some(*kind),
        }
    }
}

/// Summary of one tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickReport {
    /// Entries moved to pending (always 0 on a dry run)
    pub promoted: usize,

    /// Entries promoted, or that would be promoted on a dry run
    pub ids: Vec<String>,
    pub dry_run: bool,

    /// Another tick was already running
    pub skipped: bool,
}

// ============================================================================
// Scheduler
// ============================================================================

/// Places clips and promotes due entries
pub struct PublishingScheduler {
    store: Arc<dyn ScheduleStore>,
    catalog: Arc<dyn ContentCatalog>,
    audit: Arc<dyn AuditSink>,
    windows: Arc<WindowTable>,
    resolver: ConflictResolver,
    forecasts: ForecastEngine,
    config: SchedulerConfig,
    placement_lock: Mutex<()>,
    tick_lock: Mutex<()>,
}

impl PublishingScheduler {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        catalog: Arc<dyn ContentCatalog>,
        audit: Arc<dyn AuditSink>,
        windows: WindowTable,
        config: SchedulerConfig,
    ) -> Self {
        let windows = Arc::new(windows);
        let slots = SlotFinder::new(store.clone(), windows.clone(), config.slot_search());
        let resolver = ConflictResolver::new(
            slots.clone(),
            store.clone(),
            catalog.clone(),
            audit.clone(),
            config.tie_break,
        );
        let forecasts = ForecastEngine::new(store.clone(), slots);

        Self {
            store,
            catalog,
            audit,
            windows,
            resolver,
            forecasts,
            config,
            placement_lock: Mutex::new(()),
            tick_lock: Mutex::new(()),
        }
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn windows(&self) -> &WindowTable {
        &self.windows
    }

    /// Place a clip using the current time
    pub async fn schedule(&self, request: ScheduleRequest) -> SchedulerResult<ScheduleResult> {
        self.schedule_at(request, Utc::now()).await
    }

    /// Place a clip as of `now`.
    ///
    /// Domain failures come back as [`ScheduleResult::Rejected`]; only
    /// infrastructure failures are returned as errors.
    pub async fn schedule_at(
        &self,
        request: ScheduleRequest,
        now: DateTime<Utc>,
    ) -> SchedulerResult<ScheduleResult> {
        let _placement = self.placement_lock.lock().await;
        let platform = request.platform.as_str();

        match self.place(&request, now).await {
            Ok(result) => {
                metrics::record_schedule_outcome(platform, "scheduled");
                Ok(result)
            }
            Err(err) => match err.rejection_kind() {
                Some(kind) => {
                    tracing::warn!(
                        clip_id = %request.clip_id,
                        platform = %request.platform,
                        account = %request.account_id,
                        error = %err,
                        "Schedule request rejected"
                    );
                    metrics::record_schedule_outcome(platform, "rejected");
                    Ok(ScheduleResult::Rejected {
                        kind,
                        reason: err.to_string(),
                    })
                }
                None => {
                    tracing::error!(
                        clip_id = %request.clip_id,
                        platform = %request.platform,
                        error = %err,
                        "Schedule request failed"
                    );
                    metrics::record_schedule_outcome(platform, "error");
                    Err(err)
                }
            },
        }
    }

    async fn place(
        &self,
        request: &ScheduleRequest,
        now: DateTime<Utc>,
    ) -> SchedulerResult<ScheduleResult> {
        let clip = self
            .catalog
            .get_clip(&request.clip_id)
            .await?
            .ok_or_else(|| SchedulerError::not_found("clip", &request.clip_id))?;
        let account = self
            .catalog
            .get_account(&request.account_id)
            .await?
            .ok_or_else(|| SchedulerError::not_found("account", &request.account_id))?;
        if account.platform != request.platform {
            return Err(SchedulerError::PlatformMismatch {
                account_id: account.id,
                account_platform: account.platform,
                requested: request.platform,
            });
        }

        let window = *self.windows.get(request.platform)?;
        let campaigns = self.catalog.get_campaigns_for_clip(&clip.id).await?;
        let priority = PriorityCalculator::breakdown(&clip, &campaigns, request.platform, now);

        let mut adjustments = Vec::new();
        let mut desired = request.desired_time;
        if desired < now {
            adjustments.push(format!(
                "Desired time {} is in the past; moved to now ({})",
                desired.format("%Y-%m-%d %H:%M"),
                now.format("%Y-%m-%d %H:%M"),
            ));
            desired = now;
        }
        if !window.contains(desired) {
            let aligned = window
                .align(desired)
                .ok_or(SchedulerError::NoSlotAvailable {
                    platform: request.platform,
                    after: desired,
                    attempts: 0,
                })?;
            adjustments.push(format!(
                "Moved from {} to {} to fit the {} platform window ({} UTC)",
                desired.format("%Y-%m-%d %H:%M"),
                aligned.format("%Y-%m-%d %H:%M"),
                request.platform.display_name(),
                window.label(),
            ));
            desired = aligned;
        }

        let plan = self
            .resolver
            .plan(&ConflictRequest {
                clip_id: clip.id.clone(),
                platform: request.platform,
                account_id: request.account_id.clone(),
                proposed_time: desired,
                proposed_priority: priority.total,
            })
            .await?;

        let slot = plan.challenger_slot();
        if let Some(window_end) = request.window_end {
            if slot > window_end {
                return Err(SchedulerError::WindowEndExceeded { slot, window_end });
            }
        }
        if plan.outcome.resolution == Resolution::ChallengerShifted {
            adjustments.push(plan.outcome.description.clone());
        }

        let moved = self.resolver.commit(&plan).await?;

        let created = self
            .store
            .create_entry(NewScheduleEntry {
                clip_id: clip.id.clone(),
                platform: request.platform,
                account_id: request.account_id.clone(),
                scheduled_for: slot,
                window_end: request.window_end,
                origin: request.origin,
                status: EntryStatus::Scheduled,
                priority: Some(priority.total),
            })
            .await;

        let entry = match created {
            Ok(entry) => entry,
            Err(err) => {
                if let (Some(moved), Some(original)) =
                    (moved, plan.outcome.incumbent_original_slot)
                {
                    if let Err(restore_err) = self.resolver.restore(&moved, original).await {
                        tracing::error!(
                            entry_id = %moved.id,
                            error = %restore_err,
                            "Failed to restore displaced entry"
                        );
                    }
                }
                return Err(err.into());
            }
        };

        emit_event(
            self.audit.as_ref(),
            AuditEvent::for_entry(
                AuditEventType::ScheduleCreated,
                &entry.id,
                json!({
                    "clip_id": entry.clip_id,
                    "platform": entry.platform,
                    "account_id": entry.account_id,
                    "scheduled_for": entry.scheduled_for,
                    "priority": priority.total,
                    "origin": entry.origin,
                    "adjustments": adjustments,
                }),
            ),
        )
        .await;

        tracing::info!(
            entry_id = %entry.id,
            clip_id = %entry.clip_id,
            platform = %entry.platform,
            account = %entry.account_id,
            scheduled_for = %entry.scheduled_for,
            priority = priority.total,
            resolution = %plan.outcome.resolution,
            "Clip scheduled"
        );

        Ok(ScheduleResult::Scheduled {
            entry_id: entry.id,
            scheduled_for: entry.scheduled_for,
            priority,
            adjustments,
            conflict: plan.outcome,
        })
    }

    /// Forecast every configured platform
    pub async fn get_forecast(
        &self,
        now: DateTime<Utc>,
    ) -> SchedulerResult<BTreeMap<Platform, ForecastResult>> {
        self.forecasts.forecast_all(self.windows.platforms(), now).await
    }

    /// Forecast a single platform
    pub async fn forecast(
        &self,
        platform: Platform,
        now: DateTime<Utc>,
    ) -> SchedulerResult<ForecastResult> {
        self.forecasts.forecast(platform, now).await
    }

    /// Promote due scheduled entries to pending.
    ///
    /// Only one tick runs at a time; an overlapping call returns a report
    /// with `skipped` set. Each promotion is a version-checked claim, so an
    /// entry another process claimed first is left alone.
    pub async fn tick(&self, now: DateTime<Utc>, dry_run: bool) -> SchedulerResult<TickReport> {
        let Ok(_tick) = self.tick_lock.try_lock() else {
            tracing::debug!("Tick already in progress, skipping");
            metrics::record_tick_skipped();
            return Ok(TickReport {
                dry_run,
                skipped: true,
                ..Default::default()
            });
        };

        let due = self
            .store
            .find_entries(
                &EntryQuery::new()
                    .statuses(&[EntryStatus::Scheduled])
                    .range(TimeRange::new(
                        DateTime::<Utc>::MIN_UTC,
                        now.checked_add_signed(Duration::milliseconds(1))
                            .unwrap_or(DateTime::<Utc>::MAX_UTC),
                    ))
                    .limit(self.config.tick_batch_size),
            )
            .await?;

        let mut report = TickReport {
            dry_run,
            ..Default::default()
        };

        if dry_run {
            report.ids = due.into_iter().map(|e| e.id).collect();
            tracing::info!(due = report.ids.len(), "Dry-run tick");
            return Ok(report);
        }

        for entry in due {
            let claim = EntryUpdate::transition(EntryStatus::Pending).if_version(entry.version);
            match self.store.update_entry(&entry.id, &claim).await {
                Ok(promoted) => {
                    emit_event(
                        self.audit.as_ref(),
                        AuditEvent::for_entry(
                            AuditEventType::TickPromoted,
                            &promoted.id,
                            json!({
                                "platform": promoted.platform,
                                "scheduled_for": promoted.scheduled_for,
                            }),
                        ),
                    )
                    .await;
                    report.ids.push(promoted.id);
                }
                Err(StoreError::VersionConflict { id, .. }) | Err(StoreError::NotFound { id, .. }) => {
                    tracing::debug!(entry_id = %id, "Entry claimed elsewhere, skipping");
                }
                Err(e) => return Err(e.into()),
            }
        }

        report.promoted = report.ids.len();
        metrics::record_tick(report.promoted);
        if report.promoted > 0 {
            tracing::info!(promoted = report.promoted, "Tick promoted due entries");
        }
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Clip, ScheduleEntry, SocialAccount};
    use crate::storage::{MemoryAuditSink, MemoryCatalog, MemoryScheduleStore, StoreResult};
    use async_trait::async_trait;
    use chrono::TimeZone;
    use std::sync::atomic::{AtomicBool, Ordering};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 9, 2, hour, minute, 0).unwrap()
    }

    struct Harness {
        store: Arc<MemoryScheduleStore>,
        audit: Arc<MemoryAuditSink>,
        scheduler: PublishingScheduler,
    }

    async fn harness(config: SchedulerConfig) -> Harness {
        let store = Arc::new(MemoryScheduleStore::new());
        let audit = Arc::new(MemoryAuditSink::new());
        let scheduler = PublishingScheduler::new(
            store.clone(),
            catalog().await,
            audit.clone(),
            WindowTable::default(),
            config,
        );
        Harness {
            store,
            audit,
            scheduler,
        }
    }

    async fn catalog() -> Arc<MemoryCatalog> {
        let catalog = Arc::new(MemoryCatalog::new());
        for (id, visual) in [("low", 20.0), ("high", 90.0), ("mid", 50.0), ("mid-2", 50.0)] {
            catalog
                .add_clip(Clip {
                    id: id.to_string(),
                    visual_score: visual,
                    engagement_score: None,
                    created_at: at(0, 0),
                })
                .await;
        }
        catalog
            .add_account(SocialAccount {
                id: "ig-main".to_string(),
                handle: "@main".to_string(),
                platform: Platform::Instagram,
            })
            .await;
        catalog
    }

    /// Memory store whose inserts can be switched off
    #[derive(Default)]
    struct RefusingStore {
        inner: MemoryScheduleStore,
        refuse_creates: AtomicBool,
    }

    #[async_trait]
    impl ScheduleStore for RefusingStore {
        async fn find_entries(&self, query: &EntryQuery) -> StoreResult<Vec<ScheduleEntry>> {
            self.inner.find_entries(query).await
        }

        async fn get_entry(&self, id: &str) -> StoreResult<Option<ScheduleEntry>> {
            self.inner.get_entry(id).await
        }

        async fn create_entry(&self, entry: NewScheduleEntry) -> StoreResult<ScheduleEntry> {
            if self.refuse_creates.load(Ordering::SeqCst) {
                return Err(StoreError::backend("disk full"));
            }
            self.inner.create_entry(entry).await
        }

        async fn update_entry(&self, id: &str, update: &EntryUpdate) -> StoreResult<ScheduleEntry> {
            self.inner.update_entry(id, update).await
        }

        async fn count_entries(
            &self,
            platform: Platform,
            status: EntryStatus,
            range: TimeRange,
        ) -> StoreResult<usize> {
            self.inner.count_entries(platform, status, range).await
        }
    }

    fn request(clip: &str, desired: DateTime<Utc>) -> ScheduleRequest {
        ScheduleRequest {
            clip_id: clip.to_string(),
            platform: Platform::Instagram,
            account_id: "ig-main".to_string(),
            desired_time: desired,
            window_end: None,
            origin: ScheduleOrigin::Manual,
        }
    }

    #[tokio::test]
    async fn test_schedule_aligns_into_window() {
        let h = harness(SchedulerConfig::default()).await;
        let result = h
            .scheduler
            .schedule_at(request("mid", at(17, 0)), at(9, 0))
            .await
            .unwrap();

        assert_eq!(result.scheduled_for(), Some(at(18, 0)));
        let ScheduleResult::Scheduled { adjustments, .. } = result else {
            panic!("expected scheduled");
        };
        assert!(adjustments.iter().any(|a| a.contains("platform window")));
    }

    #[tokio::test]
    async fn test_past_time_moves_to_now() {
        let h = harness(SchedulerConfig::default()).await;
        let result = h
            .scheduler
            .schedule_at(request("mid", at(18, 30)), at(19, 0))
            .await
            .unwrap();
        assert_eq!(result.scheduled_for(), Some(at(19, 0)));
    }

    #[tokio::test]
    async fn test_failed_insert_restores_displaced_entry() {
        let store = Arc::new(RefusingStore::default());
        let audit = Arc::new(MemoryAuditSink::new());
        let scheduler = PublishingScheduler::new(
            store.clone(),
            catalog().await,
            audit.clone(),
            WindowTable::default(),
            SchedulerConfig::default(),
        );

        let low_id = scheduler
            .schedule_at(request("low", at(20, 0)), at(9, 0))
            .await
            .unwrap()
            .entry_id()
            .unwrap()
            .to_string();

        store.refuse_creates.store(true, Ordering::SeqCst);
        let result = scheduler
            .schedule_at(request("high", at(20, 0)), at(9, 0))
            .await;
        assert!(matches!(result, Err(SchedulerError::Store(_))));

        let low = store.get_entry(&low_id).await.unwrap().unwrap();
        assert_eq!(low.scheduled_for, at(20, 0));
        // displaced, then moved back
        assert_eq!(low.version, 3);
        assert_eq!(low.status, EntryStatus::Scheduled);
        assert_eq!(store.inner.len().await, 1);
    }

    #[tokio::test]
    async fn test_desired_time_at_end_of_calendar_is_rejected() {
        let h = harness(SchedulerConfig::default()).await;
        let last = DateTime::<Utc>::MAX_UTC - Duration::minutes(10);

        // 23:50 is outside the Instagram window and there is no next day
        let result = h.scheduler.schedule_at(request("mid", last), at(9, 0)).await.unwrap();
        assert_eq!(result.rejection(), Some(RejectionKind::NoSlotAvailable));
        assert!(h.store.is_empty().await);

        let report = h.scheduler.tick(DateTime::<Utc>::MAX_UTC, true).await.unwrap();
        assert!(report.ids.is_empty());
    }

    #[tokio::test]
    async fn test_unknown_clip_is_rejected() {
        let h = harness(SchedulerConfig::default()).await;
        let result = h
            .scheduler
            .schedule_at(request("ghost", at(19, 0)), at(9, 0))
            .await
            .unwrap();
        assert_eq!(result.rejection(), Some(RejectionKind::NotFound));
        assert!(h.store.is_empty().await);
    }

    #[tokio::test]
    async fn test_platform_mismatch_is_rejected() {
        let h = harness(SchedulerConfig::default()).await;
        let mut req = request("mid", at(19, 0));
        req.platform = Platform::Tiktok;
        let result = h.scheduler.schedule_at(req, at(9, 0)).await.unwrap();
        assert_eq!(result.rejection(), Some(RejectionKind::PlatformMismatch));
    }

    #[tokio::test]
    async fn test_window_end_checked_before_displacement() {
        let h = harness(SchedulerConfig::default()).await;
        let first = h
            .scheduler
            .schedule_at(request("mid", at(20, 0)), at(9, 0))
            .await
            .unwrap();

        // Would win the slot, but the slot itself is past the deadline
        let mut req = request("high", at(20, 0));
        req.window_end = Some(at(19, 30));
        let result = h.scheduler.schedule_at(req, at(9, 0)).await.unwrap();
        assert_eq!(result.rejection(), Some(RejectionKind::NoSlotAvailable));

        // Loses the slot and the shifted slot is past the deadline
        let mut req = request("mid-2", at(20, 0));
        req.window_end = Some(at(20, 30));
        let result = h.scheduler.schedule_at(req, at(9, 0)).await.unwrap();
        assert_eq!(result.rejection(), Some(RejectionKind::NoSlotAvailable));

        let held = h.store.get_entry(first.entry_id().unwrap()).await.unwrap().unwrap();
        assert_eq!(held.scheduled_for, at(20, 0));
        assert_eq!(h.store.len().await, 1);
    }

    #[tokio::test]
    async fn test_tick_promotes_once() {
        let h = harness(SchedulerConfig::default()).await;
        h.scheduler
            .schedule_at(request("mid", at(18, 0)), at(9, 0))
            .await
            .unwrap();

        let dry = h.scheduler.tick(at(18, 0), true).await.unwrap();
        assert!(dry.dry_run);
        assert_eq!(dry.promoted, 0);
        assert_eq!(dry.ids.len(), 1);

        let first = h.scheduler.tick(at(18, 0), false).await.unwrap();
        assert_eq!(first.promoted, 1);
        let second = h.scheduler.tick(at(18, 1), false).await.unwrap();
        assert_eq!(second.promoted, 0);

        let types = h.audit.event_types().await;
        assert_eq!(types.last(), Some(&AuditEventType::TickPromoted));
    }

    #[tokio::test]
    async fn test_tick_ignores_future_entries() {
        let h = harness(SchedulerConfig::default()).await;
        h.scheduler
            .schedule_at(request("mid", at(21, 0)), at(9, 0))
            .await
            .unwrap();
        let report = h.scheduler.tick(at(20, 59), false).await.unwrap();
        assert_eq!(report.promoted, 0);
    }

    #[tokio::test]
    async fn test_tick_respects_batch_size() {
        let h = harness(SchedulerConfig::default().with_tick_batch_size(1)).await;
        h.scheduler
            .schedule_at(request("mid", at(18, 0)), at(9, 0))
            .await
            .unwrap();
        h.scheduler
            .schedule_at(request("mid-2", at(20, 0)), at(9, 0))
            .await
            .unwrap();

        let report = h.scheduler.tick(at(22, 0), false).await.unwrap();
        assert_eq!(report.promoted, 1);
        let report = h.scheduler.tick(at(22, 0), false).await.unwrap();
        assert_eq!(report.promoted, 1);
    }

    #[test]
    fn test_config_validation() {
        assert!(SchedulerConfig::default().validate().is_ok());
        assert!(SchedulerConfig::default().with_search_budget(0).validate().is_err());
        assert!(SchedulerConfig::default().with_tick_batch_size(0).validate().is_err());
    }

    #[test]
    fn test_schedule_request_defaults() {
        let req: ScheduleRequest = serde_json::from_str(
            r#"{"clip_id":"c","platform":"ig","account_id":"a","desired_time":"2024-09-02T19:00:00Z"}"#,
        )
        .unwrap();
        assert_eq!(req.platform, Platform::Instagram);
        assert_eq!(req.origin, ScheduleOrigin::Manual);
        assert!(req.window_end.is_none());
    }
}
