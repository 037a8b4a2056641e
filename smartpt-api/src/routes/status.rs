//! Store health endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde_json::json;

use crate::state::AppState;
use crate::store::{DisruptionStore, SessionStore, StoreStatus};

/// GET /disruptions/status
///
/// Always 200; the body distinguishes ready, table-missing (with a
/// remediation hint) and connection failure.
pub async fn status<D, S>(State(state): State<Arc<AppState<D, S>>>) -> Json<serde_json::Value>
where
    D: DisruptionStore,
    S: SessionStore,
{
    match state.disruption_store.status() {
        Ok(StoreStatus::Ready { total_records }) => Json(json!({
            "status": "ready",
            "message": "Database is ready",
            "table_exists": true,
            "total_records": total_records,
        })),
        Ok(StoreStatus::TableNotFound) => Json(json!({
            "status": "table_not_found",
            "message": "The disruption reports table does not exist",
            "setup_required": true,
            "setup_instructions": "Run the schema migration against your database (restart the server with a writable DATABASE_PATH)",
        })),
        Err(err) => {
            tracing::error!("Store status check failed: {}", err);
            Json(json!({
                "status": "error",
                "message": "Database connection failed",
                "error": err.to_string(),
                "setup_required": true,
            }))
        }
    }
}
