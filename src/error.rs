//! Crate-level error for the command line and server edges
//!
//! Library operations keep their own error types ([`SchedulerError`],
//! [`StoreError`], [`ConfigError`], [`ServerError`]). The binary folds them
//! into [`Error`] so that one place decides how a failure is reported and
//! which exit status it maps to.

use std::fmt;
use std::io;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use thiserror::Error;

pub use crate::config::ConfigError;
pub use crate::scheduler::error::{RejectionKind, SchedulerError};
pub use crate::server::ServerError;
pub use crate::storage::StoreError;

/// Common interface for errors surfaced to operators
pub trait ReelcastErrorTrait: std::error::Error {
    /// Whether running the same command again may succeed
    fn is_recoverable(&self) -> bool;

    /// Coarse classification used for logging and exit codes
    fn category(&self) -> ErrorCategory;
}

/// Where a failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// The scheduler declined the request
    Rejected,
    /// Bad command line input or snapshot content
    Input,
    /// Configuration loading or validation
    Config,
    /// Database or filesystem
    Storage,
    /// HTTP listener
    Server,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rejected => "rejected",
            Self::Input => "input",
            Self::Config => "config",
            Self::Storage => "storage",
            Self::Server => "server",
        }
    }

    /// Process exit status for this category
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Rejected => 2,
            Self::Input | Self::Config => 64,
            Self::Storage | Self::Server => 1,
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unified error type for the reelcast binary
#[derive(Error, Debug)]
pub enum Error {
    /// Scheduler failure that is not a placement decision
    #[error(transparent)]
    Scheduler(#[from] SchedulerError),

    /// A schedule request was evaluated and declined
    #[error("Schedule request rejected ({kind:?}): {reason}")]
    Rejected { kind: RejectionKind, reason: String },

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Config file, environment or override could not be used
    #[error("Config error: {0}")]
    Config(String),

    #[error(transparent)]
    Server(#[from] ServerError),

    /// A command line value could not be interpreted
    #[error("Invalid {name} '{value}'")]
    InvalidArgument { name: &'static str, value: String },

    #[error("Failed to access {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Snapshot {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Rendering command output
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ReelcastErrorTrait for Error {
    fn is_recoverable(&self) -> bool {
        match self {
            Self::Scheduler(e) => e.is_recoverable(),
            Self::Store(e) => e.is_recoverable(),
            Self::Rejected { kind, .. } => *kind == RejectionKind::NoSlotAvailable,
            Self::Io { source, .. } => matches!(
                source.kind(),
                io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
            ),
            Self::Server(ServerError::BindError(_)) => true,
            Self::Server(_)
            | Self::Config(_)
            | Self::InvalidArgument { .. }
            | Self::Snapshot { .. }
            | Self::Json(_) => false,
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Rejected { .. } => ErrorCategory::Rejected,
            Self::Scheduler(SchedulerError::Store(_)) | Self::Store(_) | Self::Io { .. } => {
                ErrorCategory::Storage
            }
            Self::Scheduler(SchedulerError::InvalidWindow { .. })
            | Self::Scheduler(SchedulerError::PlatformNotConfigured { .. })
            | Self::Config(_) => ErrorCategory::Config,
            Self::Scheduler(e) if e.rejection_kind().is_some() => ErrorCategory::Rejected,
            Self::Scheduler(_) => ErrorCategory::Storage,
            Self::InvalidArgument { .. } | Self::Snapshot { .. } | Self::Json(_) => {
                ErrorCategory::Input
            }
            Self::Server(_) => ErrorCategory::Server,
        }
    }
}

impl Error {
    /// Wrap a configuration failure, keeping its full context chain
    pub fn config(err: impl fmt::Display) -> Self {
        Self::Config(format!("{err:#}"))
    }

    pub fn invalid_argument(name: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidArgument {
            name,
            value: value.into(),
        }
    }

    pub fn io(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn snapshot(path: impl AsRef<Path>, source: serde_json::Error) -> Self {
        Self::Snapshot {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    pub fn exit_code(&self) -> ExitCode {
        ExitCode::from(self.category().exit_code())
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Self::config(err)
    }
}

/// Result type alias using the unified Error type
pub type Result<T> = std::result::Result<T, Error>;
