//! Priority-based conflict resolution
//!
//! A conflict exists when an active entry on the same platform and account
//! sits closer than the platform's minimum gap to the proposed time. The
//! higher-priority side keeps the slot and the other side moves to the next
//! open slot after `proposed_time + min_gap`. An incumbent that is already
//! `pending`, or whose new slot would pass its own `window_end`, is never
//! moved; the challenger shifts instead.
//!
//! Resolution runs in two steps. [`ConflictResolver::plan`] only reads: it
//! decides the winner and finds the new slot. [`ConflictResolver::commit`]
//! writes the displaced entry and emits audit events. Callers that need to
//! veto a plan (for example because the challenger slot passes a deadline)
//! inspect it between the two steps. [`ConflictResolver::resolve`] runs both.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::fmt;
use std::sync::Arc;

use super::error::{SchedulerError, SchedulerResult};
use super::slot::{SlotFinder, SlotQuery, SlotSearch};
use crate::metrics;
use crate::models::{EntryStatus, Platform, ScheduleEntry};
use crate::storage::{
    emit_event, AuditEvent, AuditEventType, AuditSink, ContentCatalog, EntryUpdate, ScheduleStore,
};

/// How equal priorities are settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// The entry already holding the slot keeps it
    #[default]
    Incumbent,

    /// The clip created first wins; unknown clips defer to the incumbent
    OlderClip,
}

impl TieBreak {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Incumbent => "incumbent",
            Self::OlderClip => "older_clip",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "incumbent" => Some(Self::Incumbent),
            "older_clip" => Some(Self::OlderClip),
            _ => None,
        }
    }
}

/// Placement the resolver is asked to arbitrate
#[derive(Debug, Clone)]
pub struct ConflictRequest {
    pub clip_id: String,
    pub platform: Platform,
    pub account_id: String,
    pub proposed_time: DateTime<Utc>,
    pub proposed_priority: f64,
}

/// How a conflict was settled
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Resolution {
    None,
    IncumbentDisplaced,
    ChallengerShifted,
}

impl Resolution {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::IncumbentDisplaced => "incumbent_displaced",
            Self::ChallengerShifted => "challenger_shifted",
        }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of arbitrating a placement
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictOutcome {
    pub conflict_found: bool,
    pub conflicting_entry_id: Option<String>,
    pub incumbent_priority: Option<f64>,
    pub resolution: Resolution,
    pub description: String,

    /// Where the requesting clip ends up
    pub challenger_slot: DateTime<Utc>,

    pub incumbent_original_slot: Option<DateTime<Utc>>,
    pub incumbent_final_slot: Option<DateTime<Utc>>,
}

impl ConflictOutcome {
    fn clear(at: DateTime<Utc>) -> Self {
        Self {
            conflict_found: false,
            conflicting_entry_id: None,
            incumbent_priority: None,
            resolution: Resolution::None,
            description: "No conflict".to_string(),
            challenger_slot: at,
            incumbent_original_slot: None,
            incumbent_final_slot: None,
        }
    }
}

/// Incumbent that must move, with its destination
#[derive(Debug, Clone)]
pub struct Displacement {
    pub entry: ScheduleEntry,
    pub new_slot: DateTime<Utc>,
}

/// Which side of a collision moves
enum Arbitration {
    Displace(Displacement),

    /// Challenger moves; the reason leads the outcome description
    Shift(String),
}

/// Decision reached by [`ConflictResolver::plan`], not yet written
#[derive(Debug, Clone)]
pub struct ConflictPlan {
    pub outcome: ConflictOutcome,
    pub displacement: Option<Displacement>,
    platform: Platform,
    clip_id: String,
}

impl ConflictPlan {
    pub fn challenger_slot(&self) -> DateTime<Utc> {
        self.outcome.challenger_slot
    }
}

/// Settles collisions between a new placement and the existing schedule
#[derive(Clone)]
pub struct ConflictResolver {
    slots: SlotFinder,
    store: Arc<dyn ScheduleStore>,
    catalog: Arc<dyn ContentCatalog>,
    audit: Arc<dyn AuditSink>,
    tie_break: TieBreak,
}

impl ConflictResolver {
    pub fn new(
        slots: SlotFinder,
        store: Arc<dyn ScheduleStore>,
        catalog: Arc<dyn ContentCatalog>,
        audit: Arc<dyn AuditSink>,
        tie_break: TieBreak,
    ) -> Self {
        Self {
            slots,
            store,
            catalog,
            audit,
            tie_break,
        }
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Plan and commit in one step
    pub async fn resolve(&self, request: &ConflictRequest) -> SchedulerResult<ConflictOutcome> {
        let plan = self.plan(request).await?;
        self.commit(&plan).await?;
        Ok(plan.outcome)
    }

    /// Decide the outcome of a placement without writing anything
    pub async fn plan(&self, request: &ConflictRequest) -> SchedulerResult<ConflictPlan> {
        let query = SlotQuery::account(request.platform, &request.account_id);
        let window = *self.slots.window(request.platform)?;
        let gap = window.min_gap();

        let Some(incumbent) = self.slots.find_conflict(&query, request.proposed_time).await? else {
            return Ok(self.wrap(request, ConflictOutcome::clear(request.proposed_time), None));
        };

        let incumbent_priority = incumbent.arbitration_priority();
        let Some(search_from) = request.proposed_time.checked_add_signed(gap) else {
            return Err(SchedulerError::NoSlotAvailable {
                platform: request.platform,
                after: request.proposed_time,
                attempts: 0,
            });
        };

        let shift_reason = match self
            .arbitrate(request, &incumbent, incumbent_priority, search_from)
            .await?
        {
            Arbitration::Displace(displacement) => {
                let outcome = ConflictOutcome {
                    conflict_found: true,
                    conflicting_entry_id: Some(incumbent.id.clone()),
                    incumbent_priority: Some(incumbent_priority),
                    resolution: Resolution::IncumbentDisplaced,
                    description: format!(
                        "Priority {:.2} beats {:.2}; entry {} moved from {} to {}",
                        request.proposed_priority,
                        incumbent_priority,
                        incumbent.id,
                        incumbent.scheduled_for.format("%Y-%m-%d %H:%M"),
                        displacement.new_slot.format("%Y-%m-%d %H:%M"),
                    ),
                    challenger_slot: request.proposed_time,
                    incumbent_original_slot: Some(incumbent.scheduled_for),
                    incumbent_final_slot: Some(displacement.new_slot),
                };
                return Ok(self.wrap(request, outcome, Some(displacement)));
            }
            Arbitration::Shift(reason) => reason,
        };

        let shifted = match self.slots.find_next_slot(&query, search_from).await? {
            SlotSearch::Found { slot } => slot,
            SlotSearch::Exhausted { attempts, .. } => {
                return Err(SchedulerError::NoSlotAvailable {
                    platform: request.platform,
                    after: search_from,
                    attempts,
                });
            }
        };

        let outcome = ConflictOutcome {
            conflict_found: true,
            conflicting_entry_id: Some(incumbent.id.clone()),
            incumbent_priority: Some(incumbent_priority),
            resolution: Resolution::ChallengerShifted,
            description: format!("{shift_reason}; shifted to {}", shifted.format("%Y-%m-%d %H:%M")),
            challenger_slot: shifted,
            incumbent_original_slot: Some(incumbent.scheduled_for),
            incumbent_final_slot: Some(incumbent.scheduled_for),
        };
        Ok(self.wrap(request, outcome, None))
    }

    /// Decide which side of a collision moves.
    ///
    /// The incumbent is displaced only when the challenger outranks it, the
    /// incumbent is still `scheduled`, no second entry collides with the
    /// challenger, and the incumbent's new slot respects its own deadline.
    async fn arbitrate(
        &self,
        request: &ConflictRequest,
        incumbent: &ScheduleEntry,
        incumbent_priority: f64,
        search_from: DateTime<Utc>,
    ) -> SchedulerResult<Arbitration> {
        let challenger_wins = self.challenger_wins(request, incumbent).await?;

        tracing::info!(
            platform = %request.platform,
            account = %request.account_id,
            conflicting_entry = %incumbent.id,
            incumbent_status = incumbent.status.as_str(),
            proposed = %request.proposed_time,
            incumbent_slot = %incumbent.scheduled_for,
            challenger_priority = request.proposed_priority,
            incumbent_priority,
            challenger_wins,
            "Scheduling conflict detected"
        );

        let beats = format!(
            "Priority {:.2} beats {:.2}",
            request.proposed_priority, incumbent_priority
        );

        if !challenger_wins {
            return Ok(Arbitration::Shift(format!(
                "Priority {:.2} does not beat {:.2} of entry {}",
                request.proposed_priority, incumbent_priority, incumbent.id,
            )));
        }

        if incumbent.status != EntryStatus::Scheduled {
            return Ok(Arbitration::Shift(format!(
                "{beats} but entry {} is already {}",
                incumbent.id,
                incumbent.status.as_str(),
            )));
        }

        let ignoring =
            SlotQuery::account(request.platform, &request.account_id).ignoring(&incumbent.id);
        if self
            .slots
            .find_conflict(&ignoring, request.proposed_time)
            .await?
            .is_some()
        {
            return Ok(Arbitration::Shift(format!(
                "{beats} but the slot is also held by another entry"
            )));
        }

        let new_slot = match self.slots.find_next_slot(&ignoring, search_from).await? {
            SlotSearch::Found { slot } => slot,
            SlotSearch::Exhausted { attempts, .. } => {
                return Err(SchedulerError::ConflictResolutionFailed {
                    entry_id: incumbent.id.clone(),
                    platform: request.platform,
                    attempts,
                });
            }
        };

        if let Some(deadline) = incumbent.window_end.filter(|end| new_slot > *end) {
            return Ok(Arbitration::Shift(format!(
                "{beats} but entry {} cannot move past its deadline {}",
                incumbent.id,
                deadline.format("%Y-%m-%d %H:%M"),
            )));
        }

        Ok(Arbitration::Displace(Displacement {
            entry: incumbent.clone(),
            new_slot,
        }))
    }

    /// Write a planned displacement and emit its audit events.
    ///
    /// Returns the displaced entry as stored after the move.
    pub async fn commit(&self, plan: &ConflictPlan) -> SchedulerResult<Option<ScheduleEntry>> {
        let outcome = &plan.outcome;
        if !outcome.conflict_found {
            return Ok(None);
        }

        let Some(conflicting_id) = outcome.conflicting_entry_id.as_deref() else {
            return Ok(None);
        };

        let moved = match &plan.displacement {
            Some(displacement) => {
                let update = EntryUpdate::reschedule(displacement.new_slot)
                    .if_version(displacement.entry.version);
                Some(self.store.update_entry(&displacement.entry.id, &update).await?)
            }
            None => None,
        };

        emit_event(
            self.audit.as_ref(),
            AuditEvent::for_entry(
                AuditEventType::ConflictDetected,
                conflicting_id,
                json!({
                    "platform": plan.platform,
                    "challenger_clip_id": plan.clip_id,
                    "incumbent_priority": outcome.incumbent_priority,
                    "resolution": outcome.resolution,
                    "challenger_slot": outcome.challenger_slot,
                    "description": outcome.description,
                }),
            ),
        )
        .await;

        if let Some(entry) = &moved {
            emit_event(
                self.audit.as_ref(),
                AuditEvent::for_entry(
                    AuditEventType::ConflictResolved,
                    &entry.id,
                    json!({
                        "platform": plan.platform,
                        "from": outcome.incumbent_original_slot,
                        "to": entry.scheduled_for,
                        "displaced_by_clip_id": plan.clip_id,
                    }),
                ),
            )
            .await;
        }

        metrics::record_conflict(plan.platform.as_str(), outcome.resolution.as_str());
        Ok(moved)
    }

    /// Put a displaced entry back on its original slot
    pub async fn restore(
        &self,
        moved: &ScheduleEntry,
        original_slot: DateTime<Utc>,
    ) -> SchedulerResult<ScheduleEntry> {
        let update = EntryUpdate::reschedule(original_slot).if_version(moved.version);
        let restored = self.store.update_entry(&moved.id, &update).await?;
        tracing::warn!(
            entry_id = %moved.id,
            slot = %original_slot,
            "Restored displaced entry"
        );
        Ok(restored)
    }

    async fn challenger_wins(
        &self,
        request: &ConflictRequest,
        incumbent: &ScheduleEntry,
    ) -> SchedulerResult<bool> {
        let incumbent_priority = incumbent.arbitration_priority();
        if request.proposed_priority > incumbent_priority {
            return Ok(true);
        }
        if request.proposed_priority < incumbent_priority {
            return Ok(false);
        }

        match self.tie_break {
            TieBreak::Incumbent => Ok(false),
            TieBreak::OlderClip => {
                let challenger = self.catalog.get_clip(&request.clip_id).await?;
                let holder = self.catalog.get_clip(&incumbent.clip_id).await?;
                Ok(match (challenger, holder) {
                    (Some(c), Some(h)) => c.created_at < h.created_at,
                    _ => false,
                })
            }
        }
    }

    fn wrap(
        &self,
        request: &ConflictRequest,
        outcome: ConflictOutcome,
        displacement: Option<Displacement>,
    ) -> ConflictPlan {
        ConflictPlan {
            outcome,
            displacement,
            platform: request.platform,
            clip_id: request.clip_id.clone(),
        }
    }
}
