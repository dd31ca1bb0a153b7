//! Error types for the scheduler module

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::Platform;
use crate::storage::StoreError;

/// Result type for scheduler operations
pub type SchedulerResult<T> = Result<T, SchedulerError>;

/// Scheduler-specific errors
#[derive(Debug)]
pub enum SchedulerError {
    /// Clip, account or schedule entry does not exist
    NotFound { entity: &'static str, id: String },

    /// Account publishes on a different platform than requested
    PlatformMismatch {
        account_id: String,
        account_platform: Platform,
        requested: Platform,
    },

    /// Unknown platform name
    InvalidPlatform { name: String },

    /// No publishing window configured for the platform
    PlatformNotConfigured { platform: Platform },

    /// Slot search ran out of attempts
    NoSlotAvailable {
        platform: Platform,
        after: DateTime<Utc>,
        attempts: u32,
    },

    /// The displaced side of a conflict found no open slot
    ConflictResolutionFailed {
        entry_id: String,
        platform: Platform,
        attempts: u32,
    },

    /// Requested slot lies past the caller's window end
    WindowEndExceeded {
        slot: DateTime<Utc>,
        window_end: DateTime<Utc>,
    },

    /// Invalid publishing window configuration
    InvalidWindow { platform: Platform, reason: String },

    /// Persistence collaborator failed
    Store(StoreError),
}

/// Classification of rejections reported back to callers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    NotFound,
    PlatformMismatch,
    InvalidPlatform,
    NoSlotAvailable,
}

impl fmt::Display for SchedulerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound { entity, id } => write!(f, "{} '{}' not found", entity, id),
            Self::PlatformMismatch {
                account_id,
                account_platform,
                requested,
            } => write!(
                f,
                "Account '{}' publishes on {}, not {}",
                account_id, account_platform, requested
            ),
            Self::InvalidPlatform { name } => {
                write!(
                    f,
                    "Invalid platform '{}'. Valid options: tiktok, instagram, youtube",
                    name
                )
            }
            Self::PlatformNotConfigured { platform } => {
                write!(f, "No publishing window configured for {}", platform)
            }
            Self::NoSlotAvailable {
                platform,
                after,
                attempts,
            } => write!(
                f,
                "No available slot on {} after {} ({} attempts)",
                platform,
                after.format("%Y-%m-%d %H:%M"),
                attempts
            ),
            Self::ConflictResolutionFailed {
                entry_id,
                platform,
                attempts,
            } => write!(
                f,
                "No available slot on {} to displace entry '{}' ({} attempts)",
                platform, entry_id, attempts
            ),
            Self::WindowEndExceeded { slot, window_end } => write!(
                f,
                "No available slot before window end {} (earliest {})",
                window_end.format("%Y-%m-%d %H:%M"),
                slot.format("%Y-%m-%d %H:%M")
            ),
            Self::InvalidWindow { platform, reason } => {
                write!(f, "Invalid window for {}: {}", platform, reason)
            }
            Self::Store(e) => write!(f, "Store error: {}", e),
        }
    }
}

impl std::error::Error for SchedulerError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Store(e) => Some(e),
            _ => None,
        }
    }
}

impl From<StoreError> for SchedulerError {
    fn from(err: StoreError) -> Self {
        Self::Store(err)
    }
}

impl SchedulerError {
    /// Create a not found error
    pub fn not_found(entity: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity,
            id: id.into(),
        }
    }

    /// Create an invalid platform error
    pub fn invalid_platform(name: impl Into<String>) -> Self {
        Self::InvalidPlatform { name: name.into() }
    }

    /// Create an invalid window error
    pub fn invalid_window(platform: Platform, reason: impl Into<String>) -> Self {
        Self::InvalidWindow {
            platform,
            reason: reason.into(),
        }
    }

    /// Map domain errors to the rejection reported to callers.
    ///
    /// Returns `None` for infrastructure failures, which propagate as errors.
    pub fn rejection_kind(&self) -> Option<RejectionKind> {
        match self {
            Self::NotFound { .. } => Some(RejectionKind::NotFound),
            Self::PlatformMismatch { .. } => Some(RejectionKind::PlatformMismatch),
            Self::InvalidPlatform { .. } => Some(RejectionKind::InvalidPlatform),
            Self::NoSlotAvailable { .. }
            | Self::ConflictResolutionFailed { .. }
            | Self::WindowEndExceeded { .. } => Some(RejectionKind::NoSlotAvailable),
            Self::PlatformNotConfigured { .. } | Self::InvalidWindow { .. } | Self::Store(_) => {
                None
            }
        }
    }

    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            Self::NoSlotAvailable { .. } | Self::ConflictResolutionFailed { .. } => true,
            Self::Store(e) => e.is_recoverable(),
            _ => false,
        }
    }
}
