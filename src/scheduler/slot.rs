//! Next-open-slot search
//!
//! Walks forward from a reference instant. Candidates outside the platform
//! window jump to the next window start; candidates within the minimum gap of
//! an active entry advance by one gap. The walk is bounded by an explicit
//! attempt budget, and running out of attempts is reported as
//! [`SlotSearch::Exhausted`] rather than as an error.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::SchedulerResult;
use super::window::{PlatformWindow, WindowTable};
use crate::models::{EntryStatus, Platform, ScheduleEntry};
use crate::storage::{EntryQuery, ScheduleStore, TimeRange};

/// Tuning for the slot search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotSearchConfig {
    /// Minutes added to the reference instant before the first candidate
    pub buffer_minutes: u32,

    /// Maximum number of candidates examined
    pub search_budget: u32,
}

impl Default for SlotSearchConfig {
    fn default() -> Self {
        Self {
            buffer_minutes: 5,
            search_budget: 20,
        }
    }
}

/// Which entries a candidate must keep its distance from
#[derive(Debug, Clone, Copy)]
pub struct SlotQuery<'a> {
    pub platform: Platform,

    /// Restrict conflicts to one account; `None` checks the whole platform
    pub account_id: Option<&'a str>,

    /// Entry to disregard, typically the one being moved
    pub ignore_entry: Option<&'a str>,
}

impl<'a> SlotQuery<'a> {
    pub fn platform(platform: Platform) -> Self {
        Self {
            platform,
            account_id: None,
            ignore_entry: None,
        }
    }

    pub fn account(platform: Platform, account_id: &'a str) -> Self {
        Self {
            platform,
            account_id: Some(account_id),
            ignore_entry: None,
        }
    }

    pub fn ignoring(mut self, entry_id: &'a str) -> Self {
        self.ignore_entry = Some(entry_id);
        self
    }
}

/// Outcome of a slot search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SlotSearch {
    Found { slot: DateTime<Utc> },
    Exhausted {
        attempts: u32,
        last_candidate: DateTime<Utc>,
    },
}

impl SlotSearch {
    pub fn slot(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Found { slot } => Some(*slot),
            Self::Exhausted { .. } => None,
        }
    }
}

/// Finds open publishing slots against the schedule store
#[derive(Clone)]
pub struct SlotFinder {
    store: Arc<dyn ScheduleStore>,
    windows: Arc<WindowTable>,
    config: SlotSearchConfig,
}

impl SlotFinder {
    pub fn new(
        store: Arc<dyn ScheduleStore>,
        windows: Arc<WindowTable>,
        config: SlotSearchConfig,
    ) -> Self {
        Self {
            store,
            windows,
            config,
        }
    }

    pub fn config(&self) -> &SlotSearchConfig {
        &self.config
    }

    pub fn window(&self, platform: Platform) -> SchedulerResult<&PlatformWindow> {
        self.windows.get(platform)
    }

    /// Find the first open slot after `after` plus the search buffer
    pub async fn find_next_slot(
        &self,
        query: &SlotQuery<'_>,
        after: DateTime<Utc>,
    ) -> SchedulerResult<SlotSearch> {
        let window = *self.windows.get(query.platform)?;
        let gap = window.min_gap();
        let buffer = Duration::minutes(i64::from(self.config.buffer_minutes));
        let Some(mut candidate) = after
            .checked_add_signed(buffer)
            .and_then(|t| window.align(t))
        else {
            return Ok(self.out_of_range(query, after, 0));
        };

        for attempt in 1..=self.config.search_budget {
            match self.nearest_conflict(query, &window, candidate).await? {
                None => {
                    tracing::debug!(
                        platform = %query.platform,
                        account = ?query.account_id,
                        slot = %candidate,
                        attempt,
                        "Open slot found"
                    );
                    return Ok(SlotSearch::Found { slot: candidate });
                }
                Some(existing) => {
                    tracing::trace!(
                        candidate = %candidate,
                        conflicting_entry = %existing.id,
                        "Slot taken, advancing by min gap"
                    );
                    match candidate.checked_add_signed(gap).and_then(|t| window.align(t)) {
                        Some(next) => candidate = next,
                        None => return Ok(self.out_of_range(query, candidate, attempt)),
                    }
                }
            }
        }

        tracing::warn!(
            platform = %query.platform,
            account = ?query.account_id,
            after = %after,
            attempts = self.config.search_budget,
            "Slot search exhausted"
        );
        Ok(SlotSearch::Exhausted {
            attempts: self.config.search_budget,
            last_candidate: candidate,
        })
    }

    /// Search ran past the last representable instant
    fn out_of_range(
        &self,
        query: &SlotQuery<'_>,
        last_candidate: DateTime<Utc>,
        attempts: u32,
    ) -> SlotSearch {
        tracing::warn!(
            platform = %query.platform,
            account = ?query.account_id,
            last_candidate = %last_candidate,
            attempts,
            "Slot search reached the end of the calendar"
        );
        SlotSearch::Exhausted {
            attempts,
            last_candidate,
        }
    }

    /// Active entry closest to `at` that lies within the platform's min gap
    pub async fn find_conflict(
        &self,
        query: &SlotQuery<'_>,
        at: DateTime<Utc>,
    ) -> SchedulerResult<Option<ScheduleEntry>> {
        let window = *self.windows.get(query.platform)?;
        self.nearest_conflict(query, &window, at).await
    }

    async fn nearest_conflict(
        &self,
        query: &SlotQuery<'_>,
        window: &PlatformWindow,
        at: DateTime<Utc>,
    ) -> SchedulerResult<Option<ScheduleEntry>> {
        let gap = window.min_gap();

        let mut filter = EntryQuery::new()
            .platform(query.platform)
            .statuses(&EntryStatus::ACTIVE)
            .range(TimeRange::new(
                at.checked_sub_signed(gap).unwrap_or(DateTime::<Utc>::MIN_UTC),
                at.checked_add_signed(gap).unwrap_or(DateTime::<Utc>::MAX_UTC),
            ));
        if let Some(account) = query.account_id {
            filter = filter.account(account);
        }
        if let Some(ignore) = query.ignore_entry {
            filter = filter.exclude(ignore);
        }

        let entries = self.store.find_entries(&filter).await?;
        Ok(entries
            .into_iter()
            .filter(|e| (e.scheduled_for - at).abs() < gap)
            .min_by_key(|e| ((e.scheduled_for - at).abs(), e.created_at)))
    }
}
