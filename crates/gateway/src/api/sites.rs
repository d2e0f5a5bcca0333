//! Sites are read-only over HTTP.

use axum::extract::{Path, State};
use axum::response::Json;

use st_domain::catalog::Site;

use crate::api::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn list_sites(State(state): State<AppState>) -> ApiResult<Json<Vec<Site>>> {
    Ok(Json(state.catalog.list_sites().await?))
}

pub async fn get_site(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Site>> {
    state
        .catalog
        .get_site(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("site"))
}
