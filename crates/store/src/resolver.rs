//! Endpoint visibility and default selection.
//!
//! This is the only module that looks at [`EndpointKind`].  Everything
//! else treats endpoints as opaque ids.

use std::sync::Arc;

use st_domain::catalog::{Endpoint, EndpointKind, Settings, GENERIC_DOMAIN_ID};
use st_domain::error::Result;
use st_domain::trace::TraceEvent;

use crate::catalog::CatalogStore;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Visibility
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Whether `endpoint` shows up when `domain` is the active domain.
///
/// Foundation models and unscoped endpoints are always visible.  A
/// domain-scoped endpoint is only visible inside its own domain; the
/// generic view (or no domain at all) never shows another domain's agent.
pub fn is_visible(endpoint: &Endpoint, domain: Option<&str>) -> bool {
    if endpoint.kind == EndpointKind::Foundation {
        return true;
    }
    let Some(scope) = endpoint.domain_id.as_deref() else {
        return true;
    };
    match domain {
        None | Some(GENERIC_DOMAIN_ID) => false,
        Some(active) => scope == active,
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Selection
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Inputs to a default-endpoint decision.
#[derive(Debug, Clone, Default)]
pub struct Selection {
    /// Endpoint the caller asked for explicitly.
    pub requested: Option<String>,
    pub active_domain: Option<String>,
    /// The active domain differs from the one used last time.
    pub domain_changed: bool,
}

/// Which precedence rule picked the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionSource {
    Explicit,
    DomainAgent,
    ConfiguredDefault,
    FlaggedDefault,
    FirstVisible,
}

impl SelectionSource {
    pub fn as_str(self) -> &'static str {
        match self {
            SelectionSource::Explicit => "explicit",
            SelectionSource::DomainAgent => "domain_agent",
            SelectionSource::ConfiguredDefault => "configured_default",
            SelectionSource::FlaggedDefault => "flagged_default",
            SelectionSource::FirstVisible => "first_visible",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolved {
    pub endpoint: Endpoint,
    pub source: SelectionSource,
}

/// Pure precedence over an already-loaded catalog.
///
/// `all` is the full endpoint list in listing order.  Returns `None`
/// when nothing is visible, which is a normal state rather than an error.
pub fn select(all: &[Endpoint], settings: &Settings, selection: &Selection) -> Option<Resolved> {
    let domain = selection.active_domain.as_deref();
    let found = |endpoint: &Endpoint, source| {
        Some(Resolved {
            endpoint: endpoint.clone(),
            source,
        })
    };

    if let Some(requested) = selection.requested.as_deref() {
        if let Some(ep) = all.iter().find(|e| e.id == requested) {
            return found(ep, SelectionSource::Explicit);
        }
    }

    let visible: Vec<&Endpoint> = all.iter().filter(|e| is_visible(e, domain)).collect();

    if selection.domain_changed {
        if let Some(active) = domain.filter(|d| *d != GENERIC_DOMAIN_ID) {
            if let Some(ep) = visible.iter().find(|e| {
                e.kind == EndpointKind::Agent && e.domain_id.as_deref() == Some(active)
            }) {
                return found(ep, SelectionSource::DomainAgent);
            }
        }
    }

    if let Some(configured) = settings.default_endpoint_id.as_deref() {
        if let Some(ep) = visible.iter().find(|e| e.id == configured) {
            return found(ep, SelectionSource::ConfiguredDefault);
        }
    }

    if let Some(ep) = visible.iter().find(|e| e.is_default) {
        return found(ep, SelectionSource::FlaggedDefault);
    }

    visible
        .first()
        .and_then(|ep| found(ep, SelectionSource::FirstVisible))
}

/// Flag the resolver's pick as default in a listing that has none flagged.
///
/// Only touches the returned copies; persisted flags change solely
/// through `update_endpoint`.
pub fn mark_default(listing: &mut [Endpoint], settings: &Settings, domain: Option<&str>) {
    if listing.iter().any(|e| e.is_default) {
        return;
    }
    let selection = Selection {
        active_domain: domain.map(str::to_owned),
        ..Default::default()
    };
    if let Some(pick) = select(listing, settings, &selection) {
        if let Some(ep) = listing.iter_mut().find(|e| e.id == pick.endpoint.id) {
            ep.is_default = true;
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Resolver over a live catalog
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Clone)]
pub struct EndpointResolver {
    catalog: Arc<dyn CatalogStore>,
}

impl EndpointResolver {
    pub fn new(catalog: Arc<dyn CatalogStore>) -> Self {
        Self { catalog }
    }

    /// Visible endpoints for `domain`, with a default flagged when the
    /// stored data has none.
    pub async fn visible(&self, domain: Option<&str>) -> Result<Vec<Endpoint>> {
        let mut listing = self.catalog.list_endpoints(domain).await?;
        let settings = self.catalog.get_settings().await?;
        mark_default(&mut listing, &settings, domain);
        Ok(listing)
    }

    pub async fn resolve(&self, selection: &Selection) -> Result<Option<Resolved>> {
        let all = self.catalog.list_all_endpoints().await?;
        let settings = self.catalog.get_settings().await?;
        let resolved = select(&all, &settings, selection);

        TraceEvent::EndpointResolved {
            requested: selection.requested.clone(),
            resolved: resolved.as_ref().map(|r| r.endpoint.id.clone()),
            source: resolved
                .as_ref()
                .map_or("none", |r| r.source.as_str())
                .to_owned(),
        }
        .emit();

        Ok(resolved)
    }
}
