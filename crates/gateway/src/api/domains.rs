//! Domain CRUD.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};

use st_domain::catalog::{Domain, DomainPatch, NewDomain};

use crate::api::error::{ApiError, ApiResult};
use crate::state::AppState;

pub async fn list_domains(State(state): State<AppState>) -> ApiResult<Json<Vec<Domain>>> {
    Ok(Json(state.catalog.list_domains().await?))
}

pub async fn get_domain(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Domain>> {
    state
        .catalog
        .get_domain(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("domain"))
}

pub async fn create_domain(
    State(state): State<AppState>,
    body: Result<Json<NewDomain>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(new) = body?;
    if new.name.trim().is_empty() {
        return Err(ApiError::bad_request("name must not be empty"));
    }
    let domain = state.catalog.create_domain(new).await?;
    tracing::info!(domain_id = %domain.id, "domain created");
    Ok((StatusCode::CREATED, Json(domain)))
}

pub async fn update_domain(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<DomainPatch>, JsonRejection>,
) -> ApiResult<Json<Domain>> {
    let Json(patch) = body?;
    state
        .catalog
        .update_domain(&id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("domain"))
}

pub async fn delete_domain(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.catalog.delete_domain(&id).await? {
        tracing::info!(domain_id = %id, "domain deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("domain"))
    }
}
