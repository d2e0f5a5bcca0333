//! Replace the catalog's endpoints with what the serving workspace lists.

use serde::Serialize;

use st_domain::catalog::Endpoint;
use st_domain::error::Result;
use st_domain::trace::TraceEvent;

use crate::state::AppState;

#[derive(Debug, Clone, Serialize)]
pub struct RefreshOutcome {
    /// Catalog endpoints after the refresh.
    pub endpoints: Vec<Endpoint>,
    /// Whether the workspace listing replaced the catalog.
    pub replaced: bool,
}

/// Pull the workspace listing into the catalog.
///
/// An unconfigured workspace, a failed call, or an empty listing all
/// leave the catalog untouched.  Only catalog storage errors propagate.
pub async fn refresh_catalog(state: &AppState) -> Result<RefreshOutcome> {
    let discovered = match state.discovery.as_ref() {
        None => {
            tracing::debug!("endpoint refresh skipped: no serving workspace configured");
            Vec::new()
        }
        Some(discovery) => match discovery.discover().await {
            Ok(list) => list,
            Err(e) => {
                tracing::warn!(error = %e, "endpoint discovery failed, keeping catalog");
                Vec::new()
            }
        },
    };

    let replaced = !discovered.is_empty();
    if replaced {
        state.catalog.replace_endpoints(discovered).await?;
    }
    let endpoints = state.catalog.list_all_endpoints().await?;

    TraceEvent::CatalogRefreshed {
        endpoints: endpoints.len(),
        replaced,
    }
    .emit();

    Ok(RefreshOutcome {
        endpoints,
        replaced,
    })
}
