//! Per-platform capacity forecast

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use super::error::SchedulerResult;
use super::slot::{SlotFinder, SlotQuery, SlotSearch};
use super::window::day_bounds;
use crate::metrics;
use crate::models::{EntryStatus, Platform};
use crate::storage::{ScheduleStore, TimeRange};

/// Utilization bucket for a platform's day
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    /// Bucket a utilization ratio: below 0.5 is low, below 0.8 medium
    pub fn from_utilization(utilization: f64) -> Self {
        if utilization < 0.5 {
            Self::Low
        } else if utilization < 0.8 {
            Self::Medium
        } else {
            Self::High
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Capacity snapshot for one platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
    pub platform: Platform,
    pub next_slot: Option<DateTime<Utc>>,
    pub slots_remaining_today: u32,
    pub max_slots_per_day: u32,
    pub scheduled_count: u32,
    pub utilization: f64,
    pub risk: RiskLevel,
    pub window_start_hour: u32,
    pub window_end_hour: u32,
    pub min_gap_minutes: u32,
}

/// Computes slot availability from windows and the current schedule
#[derive(Clone)]
pub struct ForecastEngine {
    store: Arc<dyn ScheduleStore>,
    slots: SlotFinder,
}

impl ForecastEngine {
    pub fn new(store: Arc<dyn ScheduleStore>, slots: SlotFinder) -> Self {
        Self { store, slots }
    }

    /// Forecast a single platform for the UTC day containing `reference`
    pub async fn forecast(
        &self,
        platform: Platform,
        reference: DateTime<Utc>,
    ) -> SchedulerResult<ForecastResult> {
        let window = *self.slots.window(platform)?;
        let max_slots_per_day = window.max_slots_per_day();

        let (day_start, day_end) = day_bounds(reference);
        let scheduled = self
            .store
            .count_entries(
                platform,
                EntryStatus::Scheduled,
                TimeRange::new(day_start, day_end),
            )
            .await?;
        let scheduled_count = u32::try_from(scheduled).unwrap_or(u32::MAX);

        let slots_remaining_today = max_slots_per_day.saturating_sub(scheduled_count);
        let utilization = if max_slots_per_day == 0 {
            1.0
        } else {
            f64::from(scheduled_count) / f64::from(max_slots_per_day)
        };
        let risk = RiskLevel::from_utilization(utilization);

        let next_slot = match self
            .slots
            .find_next_slot(&SlotQuery::platform(platform), reference)
            .await?
        {
            SlotSearch::Found { slot } => Some(slot),
            SlotSearch::Exhausted { .. } => None,
        };

        metrics::set_slots_remaining(platform.as_str(), slots_remaining_today);
        tracing::debug!(
            platform = %platform,
            scheduled = scheduled_count,
            remaining = slots_remaining_today,
            risk = %risk,
            "Forecast computed"
        );

        Ok(ForecastResult {
            platform,
            next_slot,
            slots_remaining_today,
            max_slots_per_day,
            scheduled_count,
            utilization,
            risk,
            window_start_hour: window.start_hour,
            window_end_hour: window.end_hour,
            min_gap_minutes: window.min_gap_minutes,
        })
    }

    /// Forecast every configured platform
    pub async fn forecast_all(
        &self,
        platforms: impl IntoIterator<Item = Platform>,
        reference: DateTime<Utc>,
    ) -> SchedulerResult<BTreeMap<Platform, ForecastResult>> {
        let mut forecasts = BTreeMap::new();
        for platform in platforms {
            forecasts.insert(platform, self.forecast(platform, reference).await?);
        }
        Ok(forecasts)
    }
}
