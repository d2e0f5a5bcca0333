pub mod chat;
pub mod conversations;
pub mod domains;
pub mod endpoints;
pub mod error;
pub mod health;
pub mod settings;
pub mod sites;

use axum::routing::{get, post};
use axum::Router;

use crate::state::AppState;

/// Build the `/api` router.  State is supplied by the caller.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/health", get(health::health))
        // Domains
        .route(
            "/api/domains",
            get(domains::list_domains).post(domains::create_domain),
        )
        .route(
            "/api/domains/:id",
            get(domains::get_domain)
                .put(domains::update_domain)
                .delete(domains::delete_domain),
        )
        // Sites
        .route("/api/sites", get(sites::list_sites))
        .route("/api/sites/:id", get(sites::get_site))
        // Endpoints
        .route(
            "/api/endpoints",
            get(endpoints::list_endpoints).post(endpoints::create_endpoint),
        )
        .route("/api/endpoints/default", get(endpoints::default_endpoint))
        .route("/api/endpoints/refresh", post(endpoints::refresh_endpoints))
        .route(
            "/api/endpoints/:id",
            get(endpoints::get_endpoint)
                .put(endpoints::update_endpoint)
                .delete(endpoints::delete_endpoint),
        )
        // Conversations
        .route("/api/conversations", get(conversations::list_conversations))
        .route(
            "/api/conversations/:id",
            get(conversations::get_conversation).delete(conversations::delete_conversation),
        )
        // Chat
        .route("/api/chat", post(chat::chat))
        // Global settings
        .route(
            "/api/config",
            get(settings::get_config).post(settings::set_config),
        )
}
