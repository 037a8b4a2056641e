//! Account endpoints

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::AuthUser;
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{DisruptionStore, SessionStore};

#[derive(Deserialize)]
pub struct CredentialsRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct UserResponse {
    pub user: AuthUser,
}

/// POST /auth/sign-up
pub async fn sign_up<D, S>(
    State(state): State<Arc<AppState<D, S>>>,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<UserResponse>, ApiError>
where
    D: DisruptionStore,
    S: SessionStore,
{
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let user = state.auth.sign_up(&req.email, &req.password).await?;
    tracing::info!(user_id = %user.id, "User signed up");

    Ok(Json(UserResponse { user }))
}

/// POST /auth/sign-in
pub async fn sign_in<D, S>(
    State(state): State<Arc<AppState<D, S>>>,
    cookies: tower_cookies::Cookies,
    Json(req): Json<CredentialsRequest>,
) -> Result<Json<UserResponse>, ApiError>
where
    D: DisruptionStore,
    S: SessionStore,
{
    if req.email.is_empty() || req.password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let auth_session = state
        .auth
        .sign_in_with_password(&req.email, &req.password)
        .await?;

    let session = state
        .session_store
        .create(auth_session.user.clone(), &auth_session.access_token)?;
    super::session::set_session_cookie(&cookies, &session.id.0);

    tracing::info!(user_id = %auth_session.user.id, "User signed in");

    Ok(Json(UserResponse {
        user: auth_session.user,
    }))
}

/// POST /auth/sign-out
pub async fn sign_out<D, S>(
    State(state): State<Arc<AppState<D, S>>>,
    cookies: tower_cookies::Cookies,
) -> Json<serde_json::Value>
where
    D: DisruptionStore,
    S: SessionStore,
{
    if let Some(session) = super::session::get_session_from_cookies(&cookies, &state.session_store)
    {
        let _ = state.session_store.delete(&session.id);
        // Best-effort provider sign-out; the local session is gone either way
        if let Err(err) = state.auth.sign_out(&session.access_token).await {
            tracing::warn!("Provider sign-out failed: {}", err);
        }
    }

    super::session::clear_session_cookie(&cookies);

    Json(json!({ "message": "Signed out" }))
}

/// GET /auth/user
///
/// The explicit refresh: re-fetches the user from the provider and updates
/// the session's cached copy.
pub async fn refresh_user<D, S>(
    State(state): State<Arc<AppState<D, S>>>,
    cookies: tower_cookies::Cookies,
) -> Result<Json<UserResponse>, ApiError>
where
    D: DisruptionStore,
    S: SessionStore,
{
    let session = super::session::get_session_from_cookies(&cookies, &state.session_store)
        .ok_or(ApiError::NotAuthenticated)?;

    let user = state.auth.get_user(&session.access_token).await?;
    state.session_store.update_user(&session.id, user.clone())?;

    Ok(Json(UserResponse { user }))
}
