//! `POST /api/chat`

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Json;

use crate::api::error::{ApiError, ApiResult};
use crate::runtime::{run_chat, ChatReply, ChatRequest};
use crate::state::AppState;

/// Run one chat turn.
///
/// The turn runs on its own task so a client disconnect does not cut
/// persistence short: once accepted, the user message and the reply are
/// written even if nobody is left to read the response.
pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> ApiResult<Json<ChatReply>> {
    let Json(req) = body?;

    let handle = tokio::spawn(async move { run_chat(&state, req).await });
    let reply = handle.await.map_err(|e| {
        tracing::error!(error = %e, "chat task panicked");
        ApiError::new(
            axum::http::StatusCode::INTERNAL_SERVER_ERROR,
            "internal error",
        )
    })??;

    Ok(Json(reply))
}
