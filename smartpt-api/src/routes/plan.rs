//! Trip planning and geocoding endpoints

use std::sync::Arc;

use axum::extract::{Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};

use smartpt_core::RouteResult;

use crate::directions::GeocodeResult;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{DisruptionStore, SessionStore};

#[derive(Deserialize)]
pub struct PlanRequest {
    #[serde(default)]
    pub origin: String,
    #[serde(default)]
    pub destination: String,
    /// Epoch seconds
    pub departure_time: Option<i64>,
}

#[derive(Serialize)]
pub struct PlanResponse {
    pub routes: Vec<RouteResult>,
}

/// POST /routes
pub async fn plan_routes<D, S>(
    State(state): State<Arc<AppState<D, S>>>,
    Json(req): Json<PlanRequest>,
) -> Result<Json<PlanResponse>, ApiError>
where
    D: DisruptionStore,
    S: SessionStore,
{
    if req.origin.is_empty() || req.destination.is_empty() {
        return Err(ApiError::Validation(
            "Origin and destination are required".to_string(),
        ));
    }

    let routes = state
        .planner
        .calculate_routes(&req.origin, &req.destination, req.departure_time)
        .await;

    tracing::debug!(count = routes.len(), "Trip planned");
    Ok(Json(PlanResponse { routes }))
}

#[derive(Deserialize)]
pub struct GeocodeQuery {
    pub address: Option<String>,
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Serialize)]
pub struct GeocodeResponse {
    pub results: Vec<GeocodeResult>,
}

/// GET /geocode?address= or /geocode?lat=&lng=
pub async fn geocode<D, S>(
    State(state): State<Arc<AppState<D, S>>>,
    Query(query): Query<GeocodeQuery>,
) -> Result<Json<GeocodeResponse>, ApiError>
where
    D: DisruptionStore,
    S: SessionStore,
{
    let results = match (query.address, query.lat, query.lng) {
        (Some(address), _, _) if !address.trim().is_empty() => {
            state.geocoder.geocode(address.trim()).await?
        }
        (_, Some(lat), Some(lng)) => state.geocoder.reverse_geocode(lat, lng).await?,
        _ => {
            return Err(ApiError::Validation(
                "address or lat/lng parameters required".to_string(),
            ))
        }
    };

    Ok(Json(GeocodeResponse { results }))
}
