//! Endpoint listing, default selection, CRUD, and workspace refresh.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use serde::Deserialize;

use st_domain::catalog::{Endpoint, EndpointPatch, NewEndpoint};
use st_store::Selection;

use crate::api::error::{ApiError, ApiResult};
use crate::runtime::refresh_catalog;
use crate::state::AppState;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/endpoints?domainId=
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    #[serde(default)]
    pub domain_id: Option<String>,
}

pub async fn list_endpoints(
    State(state): State<AppState>,
    query: Result<Query<ListQuery>, QueryRejection>,
) -> ApiResult<Json<Vec<Endpoint>>> {
    let Query(q) = query?;
    let listing = state.resolver.visible(q.domain_id.as_deref()).await?;
    Ok(Json(listing))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// GET /api/endpoints/default
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefaultQuery {
    #[serde(default)]
    pub domain_id: Option<String>,
    #[serde(default)]
    pub endpoint_id: Option<String>,
    /// Domain the caller had selected before; a change enables the
    /// domain-agent rule.
    #[serde(default)]
    pub previous_domain_id: Option<String>,
}

pub async fn default_endpoint(
    State(state): State<AppState>,
    query: Result<Query<DefaultQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(q) = query?;
    let domain_changed = q.previous_domain_id.is_some() && q.previous_domain_id != q.domain_id;
    let selection = Selection {
        requested: q.endpoint_id,
        active_domain: q.domain_id,
        domain_changed,
    };
    let resolved = state.resolver.resolve(&selection).await?;
    Ok(Json(serde_json::json!({
        "endpoint": resolved.as_ref().map(|r| &r.endpoint),
        "source": resolved.as_ref().map(|r| r.source.as_str()),
    })))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// POST /api/endpoints/refresh
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn refresh_endpoints(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let outcome = refresh_catalog(&state).await?;
    Ok(Json(outcome))
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// CRUD
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

pub async fn get_endpoint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Endpoint>> {
    state
        .catalog
        .get_endpoint(&id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("endpoint"))
}

pub async fn create_endpoint(
    State(state): State<AppState>,
    body: Result<Json<NewEndpoint>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(new) = body?;
    if new.name.trim().is_empty() {
        return Err(ApiError::bad_request("name must not be empty"));
    }
    let endpoint = state.catalog.create_endpoint(new).await?;
    tracing::info!(endpoint_id = %endpoint.id, kind = ?endpoint.kind, "endpoint created");
    Ok((StatusCode::CREATED, Json(endpoint)))
}

pub async fn update_endpoint(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<EndpointPatch>, JsonRejection>,
) -> ApiResult<Json<Endpoint>> {
    let Json(patch) = body?;
    state
        .catalog
        .update_endpoint(&id, patch)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("endpoint"))
}

pub async fn delete_endpoint(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    if state.catalog.delete_endpoint(&id).await? {
        tracing::info!(endpoint_id = %id, "endpoint deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(ApiError::not_found("endpoint"))
    }
}
