// Core data structures for the publishing scheduler

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::scheduler::error::SchedulerError;

// ============================================================================
// Platform
// ============================================================================

/// Target publishing platform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    #[serde(alias = "TikTok")]
    Tiktok,
    #[serde(alias = "Instagram", alias = "ig")]
    Instagram,
    #[serde(alias = "YouTube", alias = "yt")]
    Youtube,
}

impl Platform {
    /// Get all known platforms
    pub fn all() -> Vec<Self> {
        vec![Self::Tiktok, Self::Instagram, Self::Youtube]
    }

    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tiktok => "tiktok",
            Self::Instagram => "instagram",
            Self::Youtube => "youtube",
        }
    }

    /// Get display name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::Tiktok => "TikTok",
            Self::Instagram => "Instagram",
            Self::Youtube => "YouTube",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "tiktok" => Some(Self::Tiktok),
            "instagram" | "ig" => Some(Self::Instagram),
            "youtube" | "yt" => Some(Self::Youtube),
            _ => None,
        }
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = SchedulerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| SchedulerError::invalid_platform(s))
    }
}

// ============================================================================
// Schedule Entry
// ============================================================================

/// Lifecycle status of a schedule entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    Scheduled,
    Pending,
    Published,
    Failed,
}

impl EntryStatus {
    /// Statuses that still occupy a publishing slot
    pub const ACTIVE: [EntryStatus; 2] = [EntryStatus::Scheduled, EntryStatus::Pending];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Scheduled => "scheduled",
            Self::Pending => "pending",
            Self::Published => "published",
            Self::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "scheduled" => Some(Self::Scheduled),
            "pending" => Some(Self::Pending),
            "published" => Some(Self::Published),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }

    /// Check if the entry still holds its slot
    pub fn is_active(&self) -> bool {
        Self::ACTIVE.contains(self)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a schedule request came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScheduleOrigin {
    #[default]
    Manual,
    RuleEngine,
    Auto,
}

impl ScheduleOrigin {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Manual => "manual",
            Self::RuleEngine => "rule_engine",
            Self::Auto => "auto",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "manual" => Some(Self::Manual),
            "rule_engine" => Some(Self::RuleEngine),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }
}

/// One pending or scheduled publish action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduleEntry {
    pub id: String,
    pub clip_id: String,
    pub platform: Platform,
    pub account_id: String,
    pub scheduled_for: DateTime<Utc>,
    pub window_end: Option<DateTime<Utc>>,
    pub origin: ScheduleOrigin,
    pub status: EntryStatus,

    /// Computed priority; `None` means it was never computed
    pub priority: Option<f64>,

    /// Optimistic concurrency token, bumped on every update
    pub version: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleEntry {
    /// Priority used for conflict arbitration
    pub fn arbitration_priority(&self) -> f64 {
        self.priority.unwrap_or(0.0)
    }

    /// Absolute distance in minutes to another instant
    pub fn minutes_from(&self, at: DateTime<Utc>) -> i64 {
        (self.scheduled_for - at).num_minutes().abs()
    }
}

/// Fields needed to create a schedule entry
#[derive(Debug, Clone)]
pub struct NewScheduleEntry {
    pub clip_id: String,
    pub platform: Platform,
    pub account_id: String,
    pub scheduled_for: DateTime<Utc>,
    pub window_end: Option<DateTime<Utc>>,
    pub origin: ScheduleOrigin,
    pub status: EntryStatus,
    pub priority: Option<f64>,
}

// ============================================================================
// Catalog records
// ============================================================================

/// A publishable video clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Clip {
    pub id: String,

    /// Visual quality score (0-100)
    pub visual_score: f64,

    /// Engagement score from clip metadata, if measured
    #[serde(default)]
    pub engagement_score: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// An ad campaign promoting a clip
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    pub id: String,
    pub clip_id: String,
    pub budget_cents: i64,
}

/// A social account that publishes on exactly one platform
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SocialAccount {
    pub id: String,
    pub handle: String,
    pub platform: Platform,
}
