//! Audit event sink
//!
//! Audit logging is fire-and-forget: a failing sink is reported at `warn`
//! level and never fails the scheduling operation that emitted the event.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::RwLock;

use super::StoreResult;

/// Kinds of audit events emitted by the scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditEventType {
    ScheduleCreated,
    ConflictDetected,
    ConflictResolved,
    TickPromoted,
}

impl AuditEventType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ScheduleCreated => "schedule_created",
            Self::ConflictDetected => "conflict_detected",
            Self::ConflictResolved => "conflict_resolved",
            Self::TickPromoted => "tick_promoted",
        }
    }
}

impl fmt::Display for AuditEventType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single audit record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    pub event_type: AuditEventType,
    pub entity_type: String,
    pub entity_id: String,
    pub metadata: serde_json::Value,
    pub occurred_at: DateTime<Utc>,
}

impl AuditEvent {
    pub fn new(
        event_type: AuditEventType,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
        metadata: serde_json::Value,
    ) -> Self {
        Self {
            event_type,
            entity_type: entity_type.into(),
            entity_id: entity_id.into(),
            metadata,
            occurred_at: Utc::now(),
        }
    }

    /// Event about a schedule entry
    pub fn for_entry(
        event_type: AuditEventType,
        entry_id: impl Into<String>,
        metadata: serde_json::Value,
    ) -> Self {
        Self::new(event_type, "schedule_entry", entry_id, metadata)
    }
}

/// Destination for audit events
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn log_event(&self, event: AuditEvent) -> StoreResult<()>;
}

/// Send an event, logging instead of propagating failures
pub async fn emit_event(sink: &dyn AuditSink, event: AuditEvent) {
    let event_type = event.event_type;
    let entity_id = event.entity_id.clone();
    if let Err(e) = sink.log_event(event).await {
        tracing::warn!(
            event_type = %event_type,
            entity_id = %entity_id,
            error = %e,
            "Failed to record audit event"
        );
    }
}

// ============================================================================
// Implementations
// ============================================================================

/// Writes audit events to the tracing subscriber
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAuditSink;

#[async_trait]
impl AuditSink for TracingAuditSink {
    async fn log_event(&self, event: AuditEvent) -> StoreResult<()> {
        tracing::info!(
            target: "reelcast::audit",
            event_type = %event.event_type,
            entity_type = %event.entity_type,
            entity_id = %event.entity_id,
            metadata = %event.metadata,
            "audit"
        );
        Ok(())
    }
}

/// Keeps audit events in memory
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    events: RwLock<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events
    pub async fn events(&self) -> Vec<AuditEvent> {
        self.events.read().await.clone()
    }

    /// Recorded event types in order
    pub async fn event_types(&self) -> Vec<AuditEventType> {
        self.events
            .read()
            .await
            .iter()
            .map(|e| e.event_type)
            .collect()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn log_event(&self, event: AuditEvent) -> StoreResult<()> {
        self.events.write().await.push(event);
        Ok(())
    }
}
