use axum::extract::State;
use axum::response::{IntoResponse, Json};

use crate::state::AppState;

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "modelServing": state.invoker.is_some(),
        "persistent": state.config.storage.state_path.is_some(),
    }))
}
