//! Integration tests for the publishing scheduler
//!
//! These tests verify the complete workflow of:
//! - Window alignment and slot search
//! - Priority scoring through a real placement
//! - Conflict displacement and audit trail
//! - Tick promotion and its concurrency guard
//! - SQLite persistence end to end

mod common;

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use common::{at, on_day, request, TestEnv};
use proptest::prelude::*;
use reelcast::models::{Clip, EntryStatus, NewScheduleEntry, Platform, ScheduleOrigin, SocialAccount};
use reelcast::scheduler::{
    PlatformWindow, PriorityCalculator, PublishingScheduler, RejectionKind, Resolution,
    ScheduleResult, SchedulerConfig, SlotFinder, SlotQuery, SlotSearch, SlotSearchConfig,
    TieBreak, WindowTable,
};
use reelcast::storage::{
    AuditEventType, CatalogSnapshot, Database, EntryQuery, MemoryScheduleStore, ScheduleStore,
};

fn scheduled(result: ScheduleResult) -> (String, DateTime<Utc>, Vec<String>, Resolution) {
    match result {
        ScheduleResult::Scheduled {
            entry_id,
            scheduled_for,
            adjustments,
            conflict,
            ..
        } => (entry_id, scheduled_for, adjustments, conflict.resolution),
        ScheduleResult::Rejected { kind, reason } => {
            panic!("expected placement, got {kind:?}: {reason}")
        }
    }
}

// ============================================================================
// Reference Scenarios
// ============================================================================

#[tokio::test]
async fn test_request_before_window_aligns_to_window_start() {
    let env = TestEnv::new();
    env.clip("clip", 50.0, at(0, 0)).await;
    env.account("ig", Platform::Instagram).await;

    let result = env
        .scheduler
        .schedule_at(request("clip", Platform::Instagram, "ig", at(17, 0)), at(8, 0))
        .await
        .unwrap();

    let (_, slot, adjustments, _) = scheduled(result);
    assert_eq!(slot, at(18, 0));
    assert!(adjustments.iter().any(|a| a.contains("platform window")));
}

#[tokio::test]
async fn test_equal_priority_second_request_is_shifted() {
    let env = TestEnv::new();
    env.clip("first", 50.0, at(0, 0)).await;
    env.clip("second", 50.0, at(0, 0)).await;
    env.account("ig", Platform::Instagram).await;

    let (first_id, first_slot, _, _) = scheduled(
        env.scheduler
            .schedule_at(request("first", Platform::Instagram, "ig", at(20, 0)), at(8, 0))
            .await
            .unwrap(),
    );
    let (_, second_slot, adjustments, resolution) = scheduled(
        env.scheduler
            .schedule_at(request("second", Platform::Instagram, "ig", at(20, 5)), at(8, 0))
            .await
            .unwrap(),
    );

    assert_eq!(first_slot, at(20, 0));
    assert!(second_slot >= at(21, 0));
    assert_eq!(resolution, Resolution::ChallengerShifted);
    assert!(!adjustments.is_empty());

    let first = env.store.get_entry(&first_id).await.unwrap().unwrap();
    assert_eq!(first.scheduled_for, at(20, 0));
    assert_eq!(first.version, 1);
}

#[tokio::test]
async fn test_reference_priority_through_placement() {
    let env = TestEnv::new();
    let now = at(9, 0);
    env.clip_with_engagement("clip", 90.0, 50.0, now - Duration::hours(80))
        .await;
    env.account("tt", Platform::Tiktok).await;

    let result = env
        .scheduler
        .schedule_at(request("clip", Platform::Tiktok, "tt", at(17, 0)), now)
        .await
        .unwrap();

    let ScheduleResult::Scheduled { priority, .. } = result else {
        panic!("expected placement");
    };
    assert!((priority.visual - 36.0).abs() < 1e-9);
    assert!((priority.engagement - 15.0).abs() < 1e-9);
    assert!((priority.virality - 14.04).abs() < 1e-9);
    assert!((priority.campaign - 0.0).abs() < 1e-9);
    assert!((priority.delay - 20.0).abs() < 1e-9);
    assert!((priority.total - 85.04).abs() < 1e-9);

    let entries = env.store.all().await;
    assert_eq!(entries[0].priority, Some(priority.total));
}

#[tokio::test]
async fn test_empty_youtube_forecast() {
    let env = TestEnv::new();
    let forecasts = env.scheduler.get_forecast(at(10, 0)).await.unwrap();

    let youtube = &forecasts[&Platform::Youtube];
    assert_eq!(youtube.max_slots_per_day, 24);
    assert_eq!(youtube.slots_remaining_today, 24);
    assert_eq!(youtube.risk.as_str(), "low");
    assert_eq!(forecasts.len(), 3);
}

// ============================================================================
// Conflict Resolution
// ============================================================================

#[tokio::test]
async fn test_higher_priority_displaces_and_audits_in_order() {
    let env = TestEnv::new();
    env.clip("weak", 20.0, at(0, 0)).await;
    env.clip("strong", 90.0, at(0, 0)).await;
    env.account("ig", Platform::Instagram).await;

    let (weak_id, _, _, _) = scheduled(
        env.scheduler
            .schedule_at(request("weak", Platform::Instagram, "ig", at(20, 0)), at(8, 0))
            .await
            .unwrap(),
    );
    let result = env
        .scheduler
        .schedule_at(request("strong", Platform::Instagram, "ig", at(20, 0)), at(8, 0))
        .await
        .unwrap();

    let ScheduleResult::Scheduled {
        scheduled_for,
        conflict,
        ..
    } = result
    else {
        panic!("expected placement");
    };
    assert_eq!(scheduled_for, at(20, 0));
    assert_eq!(conflict.resolution, Resolution::IncumbentDisplaced);
    assert_eq!(conflict.conflicting_entry_id.as_deref(), Some(weak_id.as_str()));
    assert_eq!(conflict.incumbent_original_slot, Some(at(20, 0)));

    let weak = env.store.get_entry(&weak_id).await.unwrap().unwrap();
    assert_eq!(Some(weak.scheduled_for), conflict.incumbent_final_slot);
    assert!(weak.scheduled_for >= at(21, 0));
    assert_eq!(weak.version, 2);

    assert_eq!(
        env.audit.event_types().await,
        vec![
            AuditEventType::ScheduleCreated,
            AuditEventType::ConflictDetected,
            AuditEventType::ConflictResolved,
            AuditEventType::ScheduleCreated,
        ]
    );
}

#[tokio::test]
async fn test_older_clip_tie_break_displaces_incumbent() {
    let env = TestEnv::with_config(SchedulerConfig::default().with_tie_break(TieBreak::OlderClip));
    // Same age bucket, so equal priority
    env.clip("young", 50.0, at(1, 0)).await;
    env.clip("old", 50.0, at(0, 0)).await;
    env.account("ig", Platform::Instagram).await;

    env.scheduler
        .schedule_at(request("young", Platform::Instagram, "ig", at(19, 0)), at(8, 0))
        .await
        .unwrap();
    let (_, slot, _, resolution) = scheduled(
        env.scheduler
            .schedule_at(request("old", Platform::Instagram, "ig", at(19, 0)), at(8, 0))
            .await
            .unwrap(),
    );

    assert_eq!(slot, at(19, 0));
    assert_eq!(resolution, Resolution::IncumbentDisplaced);
}

#[tokio::test]
async fn test_other_accounts_never_conflict() {
    let env = TestEnv::new();
    env.clip("a", 50.0, at(0, 0)).await;
    env.clip("b", 50.0, at(0, 0)).await;
    env.account("ig-1", Platform::Instagram).await;
    env.account("ig-2", Platform::Instagram).await;

    for (clip, account) in [("a", "ig-1"), ("b", "ig-2")] {
        let (_, slot, _, resolution) = scheduled(
            env.scheduler
                .schedule_at(request(clip, Platform::Instagram, account, at(20, 0)), at(8, 0))
                .await
                .unwrap(),
        );
        assert_eq!(slot, at(20, 0));
        assert_eq!(resolution, Resolution::None);
    }
}

#[tokio::test]
async fn test_sequential_placements_keep_min_gap() {
    let env = TestEnv::new();
    env.account("ig", Platform::Instagram).await;

    let plan = [
        (10.0, at(18, 0)),
        (80.0, at(18, 10)),
        (40.0, at(18, 30)),
        (95.0, at(19, 45)),
        (30.0, at(20, 0)),
        (60.0, at(20, 20)),
        (50.0, at(22, 50)),
        (70.0, at(18, 5)),
    ];
    for (i, (visual, desired)) in plan.iter().enumerate() {
        let clip = format!("clip-{i}");
        env.clip(&clip, *visual, at(0, 0)).await;
        env.scheduler
            .schedule_at(request(&clip, Platform::Instagram, "ig", *desired), at(8, 0))
            .await
            .unwrap();
    }

    let window = PlatformWindow::new(Platform::Instagram, 18, 23, 60);
    let entries = env
        .store
        .find_entries(&EntryQuery::new().account("ig").statuses(&EntryStatus::ACTIVE))
        .await
        .unwrap();
    assert!(entries.len() >= 5);

    for entry in &entries {
        assert!(window.contains(entry.scheduled_for), "{} outside window", entry.scheduled_for);
    }
    for pair in entries.windows(2) {
        let gap = pair[1].scheduled_for - pair[0].scheduled_for;
        assert!(gap >= Duration::minutes(60), "entries only {gap} apart");
    }
}

#[tokio::test]
async fn test_window_end_rejection_leaves_schedule_untouched() {
    let env = TestEnv::new();
    env.clip("held", 50.0, at(0, 0)).await;
    env.clip("late", 50.0, at(0, 0)).await;
    env.account("ig", Platform::Instagram).await;

    env.scheduler
        .schedule_at(request("held", Platform::Instagram, "ig", at(22, 0)), at(8, 0))
        .await
        .unwrap();

    let mut req = request("late", Platform::Instagram, "ig", at(22, 0));
    req.window_end = Some(at(23, 0));
    let result = env.scheduler.schedule_at(req, at(8, 0)).await.unwrap();

    assert_eq!(result.rejection(), Some(RejectionKind::NoSlotAvailable));
    assert_eq!(env.store.len().await, 1);
    assert_eq!(
        env.audit.event_types().await,
        vec![AuditEventType::ScheduleCreated]
    );
}

#[tokio::test]
async fn test_exhausted_search_is_rejected_not_failed() {
    let env = TestEnv::with_config(SchedulerConfig::default().with_search_budget(1));
    env.clip("a", 50.0, at(0, 0)).await;
    env.clip("b", 50.0, at(0, 0)).await;
    env.clip("c", 50.0, at(0, 0)).await;
    env.account("ig", Platform::Instagram).await;

    env.scheduler
        .schedule_at(request("a", Platform::Instagram, "ig", at(19, 0)), at(8, 0))
        .await
        .unwrap();
    env.scheduler
        .schedule_at(request("b", Platform::Instagram, "ig", at(20, 5)), at(8, 0))
        .await
        .unwrap();

    // Shifted search starts at 20:05 and 20:05 is taken
    let result = env
        .scheduler
        .schedule_at(request("c", Platform::Instagram, "ig", at(19, 0)), at(8, 0))
        .await
        .unwrap();
    assert_eq!(result.rejection(), Some(RejectionKind::NoSlotAvailable));
}

#[tokio::test]
async fn test_concurrent_placements_do_not_double_book() {
    let env = TestEnv::new();
    env.clip("a", 50.0, at(0, 0)).await;
    env.clip("b", 50.0, at(0, 0)).await;
    env.account("ig", Platform::Instagram).await;

    let s1 = env.scheduler.clone();
    let s2 = env.scheduler.clone();
    let (r1, r2) = tokio::join!(
        s1.schedule_at(request("a", Platform::Instagram, "ig", at(20, 0)), at(8, 0)),
        s2.schedule_at(request("b", Platform::Instagram, "ig", at(20, 0)), at(8, 0)),
    );

    let t1 = r1.unwrap().scheduled_for().unwrap();
    let t2 = r2.unwrap().scheduled_for().unwrap();
    assert!((t1 - t2).abs() >= Duration::minutes(60));
}

// ============================================================================
// Validation
// ============================================================================

#[tokio::test]
async fn test_missing_account_and_mismatch_are_rejected() {
    let env = TestEnv::new();
    env.clip("clip", 50.0, at(0, 0)).await;
    env.account("yt", Platform::Youtube).await;

    let result = env
        .scheduler
        .schedule_at(request("clip", Platform::Youtube, "nobody", at(12, 0)), at(8, 0))
        .await
        .unwrap();
    assert_eq!(result.rejection(), Some(RejectionKind::NotFound));

    let result = env
        .scheduler
        .schedule_at(request("clip", Platform::Tiktok, "yt", at(18, 0)), at(8, 0))
        .await
        .unwrap();
    assert_eq!(result.rejection(), Some(RejectionKind::PlatformMismatch));
    assert!(env.store.is_empty().await);
}

#[tokio::test]
async fn test_unconfigured_platform_is_an_error() {
    let windows = WindowTable::new(vec![PlatformWindow::new(Platform::Youtube, 0, 24, 60)]).unwrap();
    let env = TestEnv::with(windows, SchedulerConfig::default());
    env.clip("clip", 50.0, at(0, 0)).await;
    env.account("tt", Platform::Tiktok).await;

    let result = env
        .scheduler
        .schedule_at(request("clip", Platform::Tiktok, "tt", at(18, 0)), at(8, 0))
        .await;
    assert!(result.is_err());

    let forecasts = env.scheduler.get_forecast(at(8, 0)).await.unwrap();
    assert_eq!(forecasts.len(), 1);
}

// ============================================================================
// Tick
// ============================================================================

#[tokio::test]
async fn test_tick_promotes_due_entries_once() {
    let env = TestEnv::new();
    env.account("yt", Platform::Youtube).await;
    for i in 0..5 {
        let clip = format!("clip-{i}");
        env.clip(&clip, 50.0, at(0, 0)).await;
        env.scheduler
            .schedule_at(request(&clip, Platform::Youtube, "yt", at(9 + i, 0)), at(8, 0))
            .await
            .unwrap();
    }

    let dry = env.scheduler.tick(at(11, 0), true).await.unwrap();
    assert_eq!(dry.ids.len(), 3);
    assert_eq!(dry.promoted, 0);

    let report = env.scheduler.tick(at(11, 0), false).await.unwrap();
    assert_eq!(report.promoted, 3);

    let again = env.scheduler.tick(at(11, 0), false).await.unwrap();
    assert_eq!(again.promoted, 0);

    let pending = env
        .store
        .find_entries(&EntryQuery::new().statuses(&[EntryStatus::Pending]))
        .await
        .unwrap();
    assert_eq!(pending.len(), 3);
}

#[tokio::test]
async fn test_concurrent_ticks_never_double_promote() {
    let env = TestEnv::new();
    env.account("yt", Platform::Youtube).await;
    for i in 0..6 {
        let clip = format!("clip-{i}");
        env.clip(&clip, 50.0, at(0, 0)).await;
        env.scheduler
            .schedule_at(request(&clip, Platform::Youtube, "yt", at(9 + i, 0)), at(8, 0))
            .await
            .unwrap();
    }

    let s1 = env.scheduler.clone();
    let s2 = env.scheduler.clone();
    let (a, b) = tokio::join!(s1.tick(at(23, 0), false), s2.tick(at(23, 0), false));
    let (a, b) = (a.unwrap(), b.unwrap());

    assert_eq!(a.promoted + b.promoted, 6);
    for id in &a.ids {
        assert!(!b.ids.contains(id));
    }
}

#[tokio::test]
async fn test_entry_claimed_elsewhere_is_skipped() {
    let store = Arc::new(MemoryScheduleStore::new());
    let entry = store
        .create_entry(NewScheduleEntry {
            clip_id: "clip".to_string(),
            platform: Platform::Youtube,
            account_id: "yt".to_string(),
            scheduled_for: at(9, 0),
            window_end: None,
            origin: ScheduleOrigin::Auto,
            status: EntryStatus::Scheduled,
            priority: None,
        })
        .await
        .unwrap();

    let scheduler = PublishingScheduler::new(
        store.clone(),
        Arc::new(reelcast::storage::MemoryCatalog::new()),
        Arc::new(reelcast::storage::TracingAuditSink),
        WindowTable::default(),
        SchedulerConfig::default(),
    );

    // Another process claims the entry first
    store
        .update_entry(
            &entry.id,
            &reelcast::storage::EntryUpdate::transition(EntryStatus::Pending).if_version(1),
        )
        .await
        .unwrap();

    let report = scheduler.tick(at(10, 0), false).await.unwrap();
    assert_eq!(report.promoted, 0);
}

#[tokio::test]
async fn test_promoted_entry_keeps_its_slot() {
    let env = TestEnv::new();
    env.clip("weak", 20.0, at(0, 0)).await;
    env.clip("strong", 90.0, at(0, 0)).await;
    env.account("yt", Platform::Youtube).await;

    let (weak_id, _, _, _) = scheduled(
        env.scheduler
            .schedule_at(request("weak", Platform::Youtube, "yt", at(9, 0)), at(8, 0))
            .await
            .unwrap(),
    );
    let report = env.scheduler.tick(at(9, 0), false).await.unwrap();
    assert_eq!(report.promoted, 1);

    let (_, slot, adjustments, resolution) = scheduled(
        env.scheduler
            .schedule_at(request("strong", Platform::Youtube, "yt", at(9, 10)), at(9, 0))
            .await
            .unwrap(),
    );
    assert_eq!(resolution, Resolution::ChallengerShifted);
    assert!(slot >= at(10, 0));
    assert!(adjustments.iter().any(|a| a.contains("pending")));

    let weak = env.store.get_entry(&weak_id).await.unwrap().unwrap();
    assert_eq!(weak.status, EntryStatus::Pending);
    assert_eq!(weak.scheduled_for, at(9, 0));
}

#[tokio::test]
async fn test_far_future_requests_do_not_overflow() {
    let env = TestEnv::new();
    env.clip("a", 50.0, at(0, 0)).await;
    env.clip("b", 50.0, at(0, 0)).await;
    env.account("yt", Platform::Youtube).await;
    env.account("ig", Platform::Instagram).await;
    let last = DateTime::<Utc>::MAX_UTC - Duration::minutes(10);

    let first = env
        .scheduler
        .schedule_at(request("a", Platform::Youtube, "yt", last), at(8, 0))
        .await
        .unwrap();
    assert_eq!(first.scheduled_for(), Some(last));

    let second = env
        .scheduler
        .schedule_at(request("b", Platform::Youtube, "yt", last), at(8, 0))
        .await
        .unwrap();
    assert_eq!(second.rejection(), Some(RejectionKind::NoSlotAvailable));

    let outside = env
        .scheduler
        .schedule_at(request("b", Platform::Instagram, "ig", last), at(8, 0))
        .await
        .unwrap();
    assert_eq!(outside.rejection(), Some(RejectionKind::NoSlotAvailable));

    let forecasts = env
        .scheduler
        .get_forecast(DateTime::<Utc>::MAX_UTC)
        .await
        .unwrap();
    assert_eq!(forecasts[&Platform::Youtube].next_slot, None);
    assert_eq!(forecasts[&Platform::Youtube].scheduled_count, 1);

    let report = env
        .scheduler
        .tick(DateTime::<Utc>::MAX_UTC, false)
        .await
        .unwrap();
    assert_eq!(report.promoted, 1);
}

// ============================================================================
// SQLite End to End
// ============================================================================

#[tokio::test]
async fn test_sqlite_backed_scheduling_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("reelcast.db");

    let snapshot = CatalogSnapshot {
        clips: vec![
            Clip {
                id: "weak".to_string(),
                visual_score: 20.0,
                engagement_score: None,
                created_at: at(0, 0),
            },
            Clip {
                id: "strong".to_string(),
                visual_score: 90.0,
                engagement_score: Some(40.0),
                created_at: at(0, 0),
            },
        ],
        campaigns: vec![],
        accounts: vec![SocialAccount {
            id: "ig".to_string(),
            handle: "@ig".to_string(),
            platform: Platform::Instagram,
        }],
    };

    let weak_id = {
        let db = Database::open(&path).unwrap();
        assert_eq!(db.import_catalog(&snapshot).unwrap(), 3);

        let scheduler = PublishingScheduler::new(
            Arc::new(db.schedule_store()),
            Arc::new(db.catalog()),
            Arc::new(db.audit_sink()),
            WindowTable::default(),
            SchedulerConfig::default(),
        );
        let weak = scheduler
            .schedule_at(request("weak", Platform::Instagram, "ig", at(19, 0)), at(8, 0))
            .await
            .unwrap();
        let strong = scheduler
            .schedule_at(request("strong", Platform::Instagram, "ig", at(19, 0)), at(8, 0))
            .await
            .unwrap();
        assert_eq!(strong.scheduled_for(), Some(at(19, 0)));
        weak.entry_id().unwrap().to_string()
    };

    let db = Database::open(&path).unwrap();
    let store = db.schedule_store();
    let weak = store.get_entry(&weak_id).await.unwrap().unwrap();
    assert!(weak.scheduled_for >= at(20, 0));
    assert_eq!(weak.version, 2);
    assert_eq!(store.find_entries(&EntryQuery::new()).await.unwrap().len(), 2);
    assert_eq!(db.audit_event_count().unwrap(), 4);
}

// ============================================================================
// Property Tests
// ============================================================================

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap()
}

fn platform_strategy() -> impl Strategy<Value = Platform> {
    prop_oneof![
        Just(Platform::Tiktok),
        Just(Platform::Instagram),
        Just(Platform::Youtube),
    ]
}

proptest! {
    #[test]
    fn prop_priority_stays_in_range(
        visual in 0.0f64..=100.0,
        engagement in proptest::option::of(0.0f64..=100.0),
        age_hours in 0i64..500,
        budgets in proptest::collection::vec(0i64..5_000_000, 0..4),
        platform in platform_strategy(),
    ) {
        let now = at(12, 0);
        let clip = Clip {
            id: "clip".to_string(),
            visual_score: visual,
            engagement_score: engagement,
            created_at: now - Duration::hours(age_hours),
        };
        let campaigns: Vec<_> = budgets
            .iter()
            .enumerate()
            .map(|(i, b)| reelcast::models::Campaign {
                id: format!("camp-{i}"),
                clip_id: "clip".to_string(),
                budget_cents: *b,
            })
            .collect();

        let breakdown = PriorityCalculator::breakdown(&clip, &campaigns, platform, now);
        prop_assert!(breakdown.total >= 0.0);
        prop_assert!(breakdown.total <= 100.0);
        prop_assert!(breakdown.raw_virality <= 100.0);
        prop_assert!(breakdown.campaign_weight <= 100.0);
    }

    #[test]
    fn prop_found_slot_is_inside_window_and_clear(
        start in 0u32..24,
        end in 1u32..=24,
        gap in 1u32..=120,
        after_minutes in 0i64..(7 * 24 * 60),
        occupied in proptest::collection::vec(0i64..(9 * 24 * 60), 0..12),
    ) {
        let window = PlatformWindow::new(Platform::Tiktok, start, end, gap);
        prop_assume!(window.validate().is_ok());

        let base = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let after = base + Duration::minutes(after_minutes);

        let outcome = runtime().block_on(async {
            let store = Arc::new(MemoryScheduleStore::new());
            for offset in &occupied {
                store
                    .create_entry(NewScheduleEntry {
                        clip_id: "filler".to_string(),
                        platform: Platform::Tiktok,
                        account_id: "acct".to_string(),
                        scheduled_for: base + Duration::minutes(*offset),
                        window_end: None,
                        origin: ScheduleOrigin::Auto,
                        status: EntryStatus::Scheduled,
                        priority: None,
                    })
                    .await
                    .unwrap();
            }
            let finder = SlotFinder::new(
                store.clone(),
                Arc::new(WindowTable::new(vec![window]).unwrap()),
                SlotSearchConfig::default(),
            );
            let search = finder
                .find_next_slot(&SlotQuery::account(Platform::Tiktok, "acct"), after)
                .await
                .unwrap();
            (search, store.all().await)
        });

        let (search, entries) = outcome;
        if let SlotSearch::Found { slot } = search {
            prop_assert!(window.contains(slot));
            prop_assert!(slot >= after + Duration::minutes(5));
            for entry in &entries {
                prop_assert!((entry.scheduled_for - slot).abs() >= window.min_gap());
            }
        }
    }
}

#[test]
fn test_later_day_helper() {
    assert_eq!(on_day(1, 0, 0) - at(0, 0), Duration::days(1));
}
