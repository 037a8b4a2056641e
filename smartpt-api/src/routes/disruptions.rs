//! Disruption report endpoints

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;

use smartpt_core::{aggregate, DisruptionKind, DisruptionReport, Severity};

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{DisruptionStore, NewDisruptionReport, ReportFilter, SessionStore};

#[derive(Deserialize)]
pub struct SubmitDisruptionRequest {
    #[serde(default)]
    pub route_number: String,
    #[serde(default)]
    pub location: String,
    #[serde(default)]
    pub severity: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub disruption: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub inspector: bool,
}

/// POST /disruptions
pub async fn submit<D, S>(
    State(state): State<Arc<AppState<D, S>>>,
    Json(req): Json<SubmitDisruptionRequest>,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError>
where
    D: DisruptionStore,
    S: SessionStore,
{
    if req.route_number.is_empty()
        || req.location.is_empty()
        || req.severity.is_empty()
        || req.description.is_empty()
        || req.disruption.is_empty()
        || req.user_id.is_empty()
    {
        return Err(ApiError::MissingFields);
    }

    let severity = Severity::parse(&req.severity)
        .map_err(|_| ApiError::Validation("Invalid severity level".to_string()))?;
    let disruption = DisruptionKind::parse(&req.disruption)
        .map_err(|_| ApiError::Validation("Invalid disruption type".to_string()))?;

    let report = state.disruption_store.insert(NewDisruptionReport {
        route_number: req.route_number,
        location: req.location,
        severity,
        description: req.description,
        disruption,
        user_id: req.user_id,
        inspector: req.inspector,
    })?;

    tracing::info!(id = %report.id, route = %report.route_number, "Disruption report submitted");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Disruption report submitted successfully",
            "data": report,
        })),
    ))
}

#[derive(Deserialize)]
pub struct ListQuery {
    pub limit: Option<i64>,
    pub offset: Option<i64>,
    pub route: Option<String>,
    pub severity: Option<String>,
    pub disruption_type: Option<String>,
    /// When true, reports past the active window are filtered out
    pub active: Option<bool>,
}

impl ListQuery {
    fn to_filter(&self) -> Result<ReportFilter, ApiError> {
        let severity = match self.severity.as_deref() {
            Some(s) => Some(
                Severity::parse(s)
                    .map_err(|_| ApiError::Validation("Invalid severity level".to_string()))?,
            ),
            None => None,
        };
        let disruption_type = match self.disruption_type.as_deref() {
            Some(s) => Some(
                DisruptionKind::parse(s)
                    .map_err(|_| ApiError::Validation("Invalid disruption type".to_string()))?,
            ),
            None => None,
        };
        Ok(ReportFilter {
            route: self.route.clone(),
            severity,
            disruption_type,
            limit: self.limit,
            offset: self.offset,
        })
    }
}

#[derive(Serialize)]
pub struct ListDisruptionsResponse {
    pub disruptions: Vec<DisruptionReport>,
    pub total: usize,
}

/// GET /disruptions
pub async fn list<D, S>(
    State(state): State<Arc<AppState<D, S>>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListDisruptionsResponse>, ApiError>
where
    D: DisruptionStore,
    S: SessionStore,
{
    let filter = query.to_filter()?;
    let mut disruptions = state.disruption_store.list(&filter)?;

    if query.active.unwrap_or(false) {
        let now = Utc::now();
        disruptions.retain(|report| !report.is_expired(now));
    }

    let total = disruptions.len();
    Ok(Json(ListDisruptionsResponse { disruptions, total }))
}

/// GET /disruptions/aggregated
pub async fn aggregated<D, S>(
    State(state): State<Arc<AppState<D, S>>>,
    Query(query): Query<ListQuery>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    D: DisruptionStore,
    S: SessionStore,
{
    let filter = query.to_filter()?;
    let mut reports = state.disruption_store.list(&filter)?;

    if query.active.unwrap_or(false) {
        let now = Utc::now();
        reports.retain(|report| !report.is_expired(now));
    }

    let groups = aggregate(&reports);
    let total = groups.len();
    Ok(Json(json!({ "disruptions": groups, "total": total })))
}

#[derive(Deserialize)]
pub struct RemoveQuery {
    pub id: Option<String>,
}

/// DELETE /disruptions?id=
pub async fn remove<D, S>(
    State(state): State<Arc<AppState<D, S>>>,
    Query(query): Query<RemoveQuery>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    D: DisruptionStore,
    S: SessionStore,
{
    let id = query
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::Validation("id parameter required".to_string()))?;

    if !state.disruption_store.delete(&id)? {
        return Err(ApiError::DisruptionNotFound);
    }

    tracing::info!(%id, "Disruption report deleted");
    Ok(Json(json!({ "message": "Disruption report deleted" })))
}
