//! Daily publishing windows
//!
//! A window is an hour range during which a platform accepts posts, together
//! with the minimum gap between two posts on the same account. Windows whose
//! end hour is lower than their start hour wrap past midnight; an end hour of
//! 24 means midnight. All times are interpreted in UTC.

use chrono::{DateTime, Days, Duration, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::error::{SchedulerError, SchedulerResult};
use crate::models::Platform;

// ============================================================================
// Platform Window
// ============================================================================

/// Publishing window for a single platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformWindow {
    pub platform: Platform,

    /// First hour (0-23) at which posts are accepted
    pub start_hour: u32,

    /// Hour (1-24) at which the window closes, exclusive
    pub end_hour: u32,

    /// Minimum minutes between two posts on the same account
    pub min_gap_minutes: u32,
}

impl PlatformWindow {
    pub fn new(platform: Platform, start_hour: u32, end_hour: u32, min_gap_minutes: u32) -> Self {
        Self {
            platform,
            start_hour,
            end_hour,
            min_gap_minutes,
        }
    }

    /// Check if the window wraps past midnight
    pub fn wraps_midnight(&self) -> bool {
        self.end_hour < self.start_hour
    }

    /// Check whether an hour of the day falls inside the window
    pub fn contains_hour(&self, hour: u32) -> bool {
        if self.wraps_midnight() {
            hour >= self.start_hour || hour < self.end_hour
        } else {
            self.start_hour <= hour && hour < self.end_hour
        }
    }

    /// Check whether an instant falls inside the window
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.contains_hour(at.hour())
    }

    /// Window length in minutes
    pub fn duration_minutes(&self) -> u32 {
        if self.wraps_midnight() {
            (24 - self.start_hour + self.end_hour) * 60
        } else {
            (self.end_hour - self.start_hour) * 60
        }
    }

    /// Number of posts that fit in one day at the minimum gap
    pub fn max_slots_per_day(&self) -> u32 {
        if self.min_gap_minutes == 0 {
            return 0;
        }
        self.duration_minutes() / self.min_gap_minutes
    }

    /// Minimum gap as a duration
    pub fn min_gap(&self) -> Duration {
        Duration::minutes(i64::from(self.min_gap_minutes))
    }

    /// Move an instant forward to the next moment inside the window.
    ///
    /// Instants already inside are returned unchanged. Otherwise the result is
    /// the window start on the same day when the hour precedes the start, or
    /// on the following day. `None` when that day is past the last
    /// representable date.
    pub fn align(&self, at: DateTime<Utc>) -> Option<DateTime<Utc>> {
        if self.contains(at) {
            return Some(at);
        }

        let start_time = NaiveTime::MIN + Duration::hours(i64::from(self.start_hour));
        let day = if at.hour() < self.start_hour {
            at.date_naive()
        } else {
            at.date_naive().checked_add_days(Days::new(1))?
        };

        Some(day.and_time(start_time).and_utc())
    }

    /// Human-readable label, e.g. `18:00-23:00`
    pub fn label(&self) -> String {
        format!("{:02}:00-{:02}:00", self.start_hour, self.end_hour)
    }

    /// Validate window bounds
    pub fn validate(&self) -> SchedulerResult<()> {
        if self.start_hour > 23 {
            return Err(SchedulerError::invalid_window(
                self.platform,
                format!("start_hour {} must be 0-23", self.start_hour),
            ));
        }
        if self.end_hour == 0 || self.end_hour > 24 {
            return Err(SchedulerError::invalid_window(
                self.platform,
                format!("end_hour {} must be 1-24", self.end_hour),
            ));
        }
        if self.start_hour == self.end_hour {
            return Err(SchedulerError::invalid_window(
                self.platform,
                "start_hour and end_hour must differ",
            ));
        }
        if self.min_gap_minutes == 0 {
            return Err(SchedulerError::invalid_window(
                self.platform,
                "min_gap_minutes must be greater than 0",
            ));
        }
        if self.min_gap_minutes > self.duration_minutes() {
            return Err(SchedulerError::invalid_window(
                self.platform,
                format!(
                    "min_gap_minutes {} exceeds window length {}",
                    self.min_gap_minutes,
                    self.duration_minutes()
                ),
            ));
        }
        Ok(())
    }
}

/// Built-in windows used when configuration does not override them
pub fn default_windows() -> Vec<PlatformWindow> {
    vec![
        PlatformWindow::new(Platform::Tiktok, 16, 24, 30),
        PlatformWindow::new(Platform::Instagram, 18, 23, 60),
        PlatformWindow::new(Platform::Youtube, 0, 24, 60),
    ]
}

/// `[midnight, next midnight)` of the UTC day containing `at`.
///
/// On the last representable day the end saturates at the maximum instant.
pub fn day_bounds(at: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = at.date_naive().and_time(NaiveTime::MIN).and_utc();
    let end = start
        .checked_add_signed(Duration::days(1))
        .unwrap_or(DateTime::<Utc>::MAX_UTC);
    (start, end)
}

// ============================================================================
// Window Table
// ============================================================================

/// Validated lookup of windows by platform
#[derive(Debug, Clone)]
pub struct WindowTable {
    windows: BTreeMap<Platform, PlatformWindow>,
}

impl WindowTable {
    /// Build a table, validating every window. Later entries override earlier ones.
    pub fn new(windows: impl IntoIterator<Item = PlatformWindow>) -> SchedulerResult<Self> {
        let mut table = BTreeMap::new();
        for window in windows {
            window.validate()?;
            table.insert(window.platform, window);
        }
        Ok(Self { windows: table })
    }

    /// Get the window for a platform
    pub fn get(&self, platform: Platform) -> SchedulerResult<&PlatformWindow> {
        self.windows
            .get(&platform)
            .ok_or(SchedulerError::PlatformNotConfigured { platform })
    }

    /// Configured platforms in stable order
    pub fn platforms(&self) -> impl Iterator<Item = Platform> + '_ {
        self.windows.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }
}

impl Default for WindowTable {
    fn default() -> Self {
        Self {
            windows: default_windows().into_iter().map(|w| (w.platform, w)).collect(),
        }
    }
}
