//! Session context endpoint and cookie helpers

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tower_cookies::Cookies;

use crate::auth::AuthUser;
use crate::state::AppState;
use crate::store::{DisruptionStore, Session, SessionId, SessionStore};

const SESSION_COOKIE: &str = "smartpt_session";

#[derive(Serialize)]
pub struct SessionContext {
    pub authenticated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AuthUser>,
    pub server_time: i64,
}

/// GET /auth/session
pub async fn get_session_context<D, S>(
    State(state): State<Arc<AppState<D, S>>>,
    cookies: Cookies,
) -> Json<SessionContext>
where
    D: DisruptionStore,
    S: SessionStore,
{
    let session = get_session_from_cookies(&cookies, &state.session_store);

    let context = match session {
        Some(session) => SessionContext {
            authenticated: true,
            user: Some(session.user),
            server_time: chrono::Utc::now().timestamp(),
        },
        None => SessionContext {
            authenticated: false,
            user: None,
            server_time: chrono::Utc::now().timestamp(),
        },
    };

    Json(context)
}

/// Helper to get the current session from cookies
pub fn get_session_from_cookies<S: SessionStore>(
    cookies: &Cookies,
    session_store: &S,
) -> Option<Session> {
    cookies.get(SESSION_COOKIE).and_then(|c| {
        let session_id = SessionId(c.value().to_string());
        session_store.get(&session_id).ok().flatten()
    })
}

/// Helper to set the session cookie
pub fn set_session_cookie(cookies: &Cookies, session_id: &str) {
    use tower_cookies::Cookie;
    let cookie = Cookie::build((SESSION_COOKIE, session_id.to_string()))
        .path("/")
        .http_only(true)
        .build();
    cookies.add(cookie);
}

/// Helper to clear the session cookie
pub fn clear_session_cookie(cookies: &Cookies) {
    use tower_cookies::Cookie;
    let cookie = Cookie::build((SESSION_COOKIE, ""))
        .path("/")
        .http_only(true)
        .max_age(tower_cookies::cookie::time::Duration::ZERO)
        .build();
    cookies.add(cookie);
}
