//! Disruption confirmation endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Deserialize;
use serde_json::json;

use smartpt_core::{merge_description, merge_severity, Severity};

use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{DisruptionStore, NewConfirmation, SessionStore};

#[derive(Deserialize)]
pub struct ConfirmDisruptionRequest {
    #[serde(default)]
    pub disruption_id: String,
    #[serde(default)]
    pub user_id: String,
    pub severity: Option<String>,
    pub description: Option<String>,
}

/// POST /disruptions/confirm
///
/// Confirming never mutates the original report: severity may escalate and
/// the description may grow, but both land on a new appended row.
pub async fn confirm<D, S>(
    State(state): State<Arc<AppState<D, S>>>,
    Json(req): Json<ConfirmDisruptionRequest>,
) -> Result<Json<serde_json::Value>, ApiError>
where
    D: DisruptionStore,
    S: SessionStore,
{
    if req.disruption_id.is_empty() || req.user_id.is_empty() {
        return Err(ApiError::Validation(
            "Disruption ID and user ID are required".to_string(),
        ));
    }

    let original = state
        .disruption_store
        .get(&req.disruption_id)?
        .ok_or(ApiError::DisruptionNotFound)?;

    let severity = match req.severity.as_deref() {
        Some(s) => {
            let candidate = Severity::parse(s)
                .map_err(|_| ApiError::Validation("Invalid severity level".to_string()))?;
            merge_severity(original.severity, candidate)
        }
        None => original.severity,
    };

    let description = match req.description.as_deref() {
        Some(candidate) if !candidate.is_empty() => {
            merge_description(&original.description, candidate).to_string()
        }
        _ => original.description.clone(),
    };

    let confirmation = state.disruption_store.insert_confirmation(NewConfirmation {
        confirms: original.id.clone(),
        user_id: req.user_id,
        route_number: original.route_number,
        location: original.location,
        severity,
        description,
        disruption: original.disruption,
    })?;

    tracing::info!(
        confirms = %original.id,
        severity = severity.as_str(),
        "Disruption confirmed"
    );

    Ok(Json(json!({
        "message": "Disruption confirmed successfully",
        "data": confirmation,
    })))
}
