//! REST API handlers for the scheduler server
//!
//! This module defines the API routes and handlers.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::metrics;
use crate::models::{Platform, ScheduleOrigin};
use crate::scheduler::{RejectionKind, ScheduleRequest, ScheduleResult, SchedulerError};

use super::server::AppState;

// ============================================================================
// API Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    /// Failed response that still carries a payload
    pub fn failure_with(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: Some(data),
            error: Some(message.into()),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_secs: u64,
    pub platforms: Vec<Platform>,
}

/// Body of `POST /api/schedule`
#[derive(Debug, Deserialize)]
pub struct ScheduleBody {
    pub clip_id: String,

    /// Platform name, parsed leniently (`ig`, `yt` accepted)
    pub platform: String,
    pub account_id: String,

    /// Defaults to now
    #[serde(default)]
    pub desired_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub window_end: Option<DateTime<Utc>>,
    #[serde(default)]
    pub origin: ScheduleOrigin,
}

/// Query parameters for forecast endpoints
#[derive(Debug, Default, Deserialize)]
pub struct ForecastParams {
    /// Reference instant; defaults to now
    pub at: Option<DateTime<Utc>>,
}

/// Query parameters for `POST /api/tick`
#[derive(Debug, Default, Deserialize)]
pub struct TickParams {
    #[serde(default)]
    pub dry_run: bool,
    pub at: Option<DateTime<Utc>>,
}

/// HTTP status for a rejected placement
pub fn rejection_status(kind: RejectionKind) -> StatusCode {
    match kind {
        RejectionKind::NotFound => StatusCode::NOT_FOUND,
        RejectionKind::PlatformMismatch | RejectionKind::InvalidPlatform => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        RejectionKind::NoSlotAvailable => StatusCode::CONFLICT,
    }
}

fn error_response(err: &SchedulerError) -> Response {
    let status = match err {
        SchedulerError::PlatformNotConfigured { .. } => StatusCode::NOT_FOUND,
        other => other
            .rejection_kind()
            .map(rejection_status)
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
    };
    if status.is_server_error() {
        tracing::error!(error = %err, "Request failed");
    }
    (status, Json(ApiResponse::<()>::failure(err.to_string()))).into_response()
}

// ============================================================================
// API Routes
// ============================================================================

/// Create the API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health endpoints
        .route("/api/health", get(health_check))
        // Scheduling endpoints
        .route("/api/schedule", post(schedule_clip))
        .route("/api/forecast", get(forecast_all))
        .route("/api/forecast/{platform}", get(forecast_platform))
        .route("/api/tick", post(run_tick))
        // Prometheus exposition
        .route("/metrics", get(metrics_endpoint))
        .with_state(state)
}

// ============================================================================
// Health Handlers
// ============================================================================

/// Health check endpoint
async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let uptime = state.start_time.elapsed().as_secs();

    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: uptime,
        platforms: state.scheduler.windows().platforms().collect(),
    }))
}

// ============================================================================
// Scheduling Handlers
// ============================================================================

/// Place a clip
async fn schedule_clip(State(state): State<AppState>, Json(body): Json<ScheduleBody>) -> Response {
    let platform = match body.platform.parse::<Platform>() {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };

    let request = ScheduleRequest {
        clip_id: body.clip_id,
        platform,
        account_id: body.account_id,
        desired_time: body.desired_time.unwrap_or_else(Utc::now),
        window_end: body.window_end,
        origin: body.origin,
    };

    match state.scheduler.schedule(request).await {
        Ok(result @ ScheduleResult::Scheduled { .. }) => {
            (StatusCode::CREATED, Json(ApiResponse::success(result))).into_response()
        }
        Ok(ScheduleResult::Rejected { kind, reason }) => {
            let status = rejection_status(kind);
            let payload = ScheduleResult::Rejected {
                kind,
                reason: reason.clone(),
            };
            (status, Json(ApiResponse::failure_with(payload, reason))).into_response()
        }
        Err(e) => error_response(&e),
    }
}

/// Forecast every configured platform
async fn forecast_all(
    State(state): State<AppState>,
    Query(params): Query<ForecastParams>,
) -> Response {
    let at = params.at.unwrap_or_else(Utc::now);
    match state.scheduler.get_forecast(at).await {
        Ok(forecasts) => (StatusCode::OK, Json(ApiResponse::success(forecasts))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Forecast one platform
async fn forecast_platform(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<ForecastParams>,
) -> Response {
    let platform = match name.parse::<Platform>() {
        Ok(p) => p,
        Err(e) => return error_response(&e),
    };
    let at = params.at.unwrap_or_else(Utc::now);

    match state.scheduler.forecast(platform, at).await {
        Ok(forecast) => (StatusCode::OK, Json(ApiResponse::success(forecast))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Promote due entries
async fn run_tick(State(state): State<AppState>, Query(params): Query<TickParams>) -> Response {
    let at = params.at.unwrap_or_else(Utc::now);
    match state.scheduler.tick(at, params.dry_run).await {
        Ok(report) => (StatusCode::OK, Json(ApiResponse::success(report))).into_response(),
        Err(e) => error_response(&e),
    }
}

/// Prometheus text exposition
async fn metrics_endpoint() -> Response {
    match metrics::encode_metrics() {
        Ok(body) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            body,
        )
            .into_response(),
        Err(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response(),
    }
}

// ============================================================================
// Tests
// ============================================================================
