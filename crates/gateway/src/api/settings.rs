//! The global chat settings singleton (`/api/config`).

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Json;

use st_domain::catalog::Settings;

use crate::api::error::ApiResult;
use crate::state::AppState;

pub async fn get_config(State(state): State<AppState>) -> ApiResult<Json<Settings>> {
    Ok(Json(state.catalog.get_settings().await?))
}

/// Merge the supplied fields; absent fields keep their current value.
pub async fn set_config(
    State(state): State<AppState>,
    body: Result<Json<Settings>, JsonRejection>,
) -> ApiResult<Json<Settings>> {
    let Json(patch) = body?;
    let merged = state.catalog.set_settings(patch).await?;
    tracing::info!(
        default_endpoint = ?merged.default_endpoint_id,
        prompt_override = merged.system_prompt.is_some(),
        "settings updated"
    );
    Ok(Json(merged))
}
