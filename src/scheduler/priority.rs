//! Publish priority scoring
//!
//! Priority is a weighted composite of five signals, clamped to `[0, 100]`:
//!
//! | Component  | Source                                        | Weight |
//! |------------|-----------------------------------------------|--------|
//! | visual     | clip visual score                             | 0.4    |
//! | engagement | clip engagement score (0 when unmeasured)     | 0.3    |
//! | virality   | `min(100, visual * 0.6 * platform multiplier)` | 0.2    |
//! | campaign   | `min(100, total budget cents / 50000 * 100)`  | 0.1    |
//! | delay      | age staircase: 0 / 5 / 10 / 20                | 1.0    |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::error::{SchedulerError, SchedulerResult};
use crate::models::{Campaign, Clip, Platform};
use crate::storage::ContentCatalog;

const VISUAL_WEIGHT: f64 = 0.4;
const ENGAGEMENT_WEIGHT: f64 = 0.3;
const VIRALITY_WEIGHT: f64 = 0.2;
const CAMPAIGN_WEIGHT: f64 = 0.1;

/// Share of the visual score that feeds predicted virality
const VIRALITY_VISUAL_FACTOR: f64 = 0.6;

/// Campaign budget (in cents) that saturates the campaign weight
const CAMPAIGN_SATURATION_CENTS: f64 = 50_000.0;

/// Virality boost per platform
pub fn platform_multiplier(platform: Platform) -> f64 {
    match platform {
        Platform::Tiktok => 1.3,
        Platform::Instagram => 1.1,
        Platform::Youtube => 1.0,
    }
}

/// Boost for clips that have waited to be published
pub fn delay_penalty(age_hours: f64) -> f64 {
    if age_hours < 24.0 {
        0.0
    } else if age_hours < 48.0 {
        5.0
    } else if age_hours < 72.0 {
        10.0
    } else {
        20.0
    }
}

/// Per-component contributions to a clip's priority
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorityBreakdown {
    pub clip_id: String,
    pub platform: Platform,

    pub visual: f64,
    pub engagement: f64,
    pub virality: f64,
    pub campaign: f64,
    pub delay: f64,

    /// Predicted virality before weighting
    pub raw_virality: f64,

    /// Campaign weight before weighting
    pub campaign_weight: f64,
    pub age_hours: f64,

    /// Sum of contributions, clamped to `[0, 100]`
    pub total: f64,
}

impl PriorityBreakdown {
    /// Unclamped sum of the five contributions
    pub fn component_sum(&self) -> f64 {
        self.visual + self.engagement + self.virality + self.campaign + self.delay
    }
}

/// Computes priority breakdowns for clips
#[derive(Clone)]
pub struct PriorityCalculator {
    catalog: Arc<dyn ContentCatalog>,
}

impl PriorityCalculator {
    pub fn new(catalog: Arc<dyn ContentCatalog>) -> Self {
        Self { catalog }
    }

    /// Load a clip and its campaigns, then score it for a platform
    pub async fn compute_priority(
        &self,
        clip_id: &str,
        platform: Platform,
        now: DateTime<Utc>,
    ) -> SchedulerResult<PriorityBreakdown> {
        let clip = self
            .catalog
            .get_clip(clip_id)
            .await?
            .ok_or_else(|| SchedulerError::not_found("clip", clip_id))?;
        let campaigns = self.catalog.get_campaigns_for_clip(clip_id).await?;

        let breakdown = Self::breakdown(&clip, &campaigns, platform, now);
        tracing::debug!(
            clip_id = %clip_id,
            platform = %platform,
            priority = breakdown.total,
            "Computed clip priority"
        );
        Ok(breakdown)
    }

    /// Score a clip without touching the catalog
    pub fn breakdown(
        clip: &Clip,
        campaigns: &[Campaign],
        platform: Platform,
        now: DateTime<Utc>,
    ) -> PriorityBreakdown {
        let visual_score = clip.visual_score;
        let engagement_score = clip.engagement_score.unwrap_or(0.0);

        let raw_virality =
            (visual_score * VIRALITY_VISUAL_FACTOR * platform_multiplier(platform)).min(100.0);

        let total_budget: i64 = campaigns
            .iter()
            .filter(|c| c.clip_id == clip.id)
            .map(|c| c.budget_cents)
            .sum();
        let campaign_weight = (total_budget as f64 / CAMPAIGN_SATURATION_CENTS * 100.0).min(100.0);

        let age_hours = (now - clip.created_at).num_seconds() as f64 / 3600.0;

        let mut breakdown = PriorityBreakdown {
            clip_id: clip.id.clone(),
            platform,
            visual: visual_score * VISUAL_WEIGHT,
            engagement: engagement_score * ENGAGEMENT_WEIGHT,
            virality: raw_virality * VIRALITY_WEIGHT,
            campaign: campaign_weight * CAMPAIGN_WEIGHT,
            delay: delay_penalty(age_hours),
            raw_virality,
            campaign_weight,
            age_hours,
            total: 0.0,
        };
        breakdown.total = breakdown.component_sum().clamp(0.0, 100.0);
        breakdown
    }
}
