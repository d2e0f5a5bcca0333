//! Conversation listing, lookup, and deletion.

use axum::extract::{Path, State};
use axum::response::{IntoResponse, Json};

use st_domain::model::Conversation;

use crate::api::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Most recently active first.
pub async fn list_conversations(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Conversation>>> {
    Ok(Json(state.conversations.list().await?))
}

pub async fn get_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Conversation>> {
    state
        .conversations
        .get(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("conversation"))
}

/// Deletes the conversation and its messages.  Waits for any in-flight
/// turn on the same conversation to finish first.
pub async fn delete_conversation(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let _permit = state.conversation_locks.acquire(&id).await?;
    if state.conversations.delete(&id).await? {
        Ok(Json(serde_json::json!({ "success": true })))
    } else {
        Err(ApiError::not_found("conversation"))
    }
}
