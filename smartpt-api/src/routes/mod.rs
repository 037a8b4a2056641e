//! HTTP routes for the gateway

mod auth;
mod chat;
mod confirm;
mod disruptions;
mod plan;
mod session;
mod status;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_cookies::CookieManagerLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::state::AppState;
use crate::store::{DisruptionStore, SessionStore};

/// Create the router with all routes
pub fn create_router<D, S>(state: Arc<AppState<D, S>>) -> Router
where
    D: DisruptionStore + 'static,
    S: SessionStore + 'static,
{
    Router::new()
        .route(
            "/disruptions",
            post(disruptions::submit)
                .get(disruptions::list)
                .delete(disruptions::remove),
        )
        .route("/disruptions/aggregated", get(disruptions::aggregated))
        .route("/disruptions/confirm", post(confirm::confirm))
        .route("/disruptions/status", get(status::status))
        .route("/routes", post(plan::plan_routes))
        .route("/geocode", get(plan::geocode))
        .route("/chat", post(chat::chat))
        .route("/auth/sign-up", post(auth::sign_up))
        .route("/auth/sign-in", post(auth::sign_in))
        .route("/auth/sign-out", post(auth::sign_out))
        .route("/auth/session", get(session::get_session_context))
        .route("/auth/user", get(auth::refresh_user))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
