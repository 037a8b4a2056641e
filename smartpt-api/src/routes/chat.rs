//! Chat assistant endpoint

use std::sync::Arc;

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::chat::{build_prompt, ChatContext};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{DisruptionStore, SessionStore};

#[derive(Deserialize)]
pub struct ChatRequest {
    pub prompt: Option<String>,
    pub context: Option<ChatContext>,
}

#[derive(Serialize)]
pub struct ChatResponse {
    pub reply: String,
}

/// POST /chat
pub async fn chat<D, S>(
    State(state): State<Arc<AppState<D, S>>>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError>
where
    D: DisruptionStore,
    S: SessionStore,
{
    let prompt = req
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or(ApiError::MissingPrompt)?;

    let combined = build_prompt(prompt, req.context.as_ref());
    let reply = state.model.generate_reply(&combined).await?;

    Ok(Json(ChatResponse { reply }))
}
