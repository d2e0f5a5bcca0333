//! Catalog store: domains, sites, endpoints, and the settings singleton.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use st_domain::catalog::{
    Domain, DomainPatch, Endpoint, EndpointPatch, NewDomain, NewEndpoint, Settings, Site,
};
use st_domain::error::Result;
use st_domain::trace::TraceEvent;

use crate::resolver::is_visible;
use crate::seed;
use crate::slug::unique_id;
use crate::snapshot::Snapshot;

const SNAPSHOT_FILE: &str = "catalog.json";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Contract
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Reference data used by every chat turn.
///
/// Lookups return `Ok(None)` for missing ids; callers decide whether a
/// missing id is an error.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn list_domains(&self) -> Result<Vec<Domain>>;
    async fn get_domain(&self, id: &str) -> Result<Option<Domain>>;
    async fn create_domain(&self, new: NewDomain) -> Result<Domain>;
    async fn update_domain(&self, id: &str, patch: DomainPatch) -> Result<Option<Domain>>;
    async fn delete_domain(&self, id: &str) -> Result<bool>;

    async fn list_sites(&self) -> Result<Vec<Site>>;
    async fn get_site(&self, id: &str) -> Result<Option<Site>>;

    /// Endpoints visible in `domain` (see [`is_visible`]).
    async fn list_endpoints(&self, domain: Option<&str>) -> Result<Vec<Endpoint>>;
    /// Every endpoint, unfiltered, in listing order.
    async fn list_all_endpoints(&self) -> Result<Vec<Endpoint>>;
    async fn get_endpoint(&self, id: &str) -> Result<Option<Endpoint>>;
    async fn create_endpoint(&self, new: NewEndpoint) -> Result<Endpoint>;
    async fn update_endpoint(&self, id: &str, patch: EndpointPatch) -> Result<Option<Endpoint>>;
    async fn delete_endpoint(&self, id: &str) -> Result<bool>;
    /// Swap the whole endpoint list (used by discovery).
    async fn replace_endpoints(&self, endpoints: Vec<Endpoint>) -> Result<()>;

    async fn get_settings(&self) -> Result<Settings>;
    /// Shallow-merge `patch` into the singleton and return the result.
    async fn set_settings(&self, patch: Settings) -> Result<Settings>;

    /// Persist pending changes, if the backend buffers any.
    async fn flush(&self) -> Result<()> {
        Ok(())
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// In-memory implementation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Everything the catalog holds.  Also the on-disk snapshot shape.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CatalogData {
    #[serde(default)]
    pub domains: Vec<Domain>,
    #[serde(default)]
    pub sites: Vec<Site>,
    #[serde(default)]
    pub endpoints: Vec<Endpoint>,
    #[serde(default)]
    pub settings: Settings,
}

/// Catalog kept in memory, optionally mirrored to `catalog.json`.
pub struct MemoryCatalog {
    data: RwLock<CatalogData>,
    snapshot: Option<Snapshot>,
    dirty: AtomicBool,
}

impl MemoryCatalog {
    /// Ephemeral catalog seeded with the built-in data.
    pub fn seeded() -> Self {
        Self::from_data(seed::default_catalog())
    }

    pub fn from_data(data: CatalogData) -> Self {
        Self {
            data: RwLock::new(data),
            snapshot: None,
            dirty: AtomicBool::new(false),
        }
    }

    /// Load `state_dir/catalog.json`, seeding it when missing.
    pub fn open(state_dir: &Path) -> Result<Self> {
        let snapshot = Snapshot::new(state_dir, SNAPSHOT_FILE)?;
        let (data, fresh) = match snapshot.load::<CatalogData>()? {
            Some(data) => (data, false),
            None => (seed::default_catalog(), true),
        };

        tracing::info!(
            domains = data.domains.len(),
            sites = data.sites.len(),
            endpoints = data.endpoints.len(),
            seeded = fresh,
            path = %snapshot.path().display(),
            "catalog loaded"
        );

        Ok(Self {
            data: RwLock::new(data),
            snapshot: Some(snapshot),
            dirty: AtomicBool::new(fresh),
        })
    }

    fn mark_dirty(&self) {
        self.dirty.store(true, Ordering::Release);
    }
}

#[async_trait]
impl CatalogStore for MemoryCatalog {
    // ── domains ─────────────────────────────────────────────────────

    async fn list_domains(&self) -> Result<Vec<Domain>> {
        Ok(self.data.read().domains.clone())
    }

    async fn get_domain(&self, id: &str) -> Result<Option<Domain>> {
        Ok(self.data.read().domains.iter().find(|d| d.id == id).cloned())
    }

    async fn create_domain(&self, new: NewDomain) -> Result<Domain> {
        let mut data = self.data.write();
        let id = unique_id(&new.name, "domain", |c| {
            data.domains.iter().any(|d| d.id == c)
        });
        let domain = new.into_domain(id);
        data.domains.push(domain.clone());
        self.mark_dirty();
        Ok(domain)
    }

    async fn update_domain(&self, id: &str, patch: DomainPatch) -> Result<Option<Domain>> {
        let mut data = self.data.write();
        let Some(domain) = data.domains.iter_mut().find(|d| d.id == id) else {
            return Ok(None);
        };
        patch.apply(domain);
        let updated = domain.clone();
        self.mark_dirty();
        Ok(Some(updated))
    }

    async fn delete_domain(&self, id: &str) -> Result<bool> {
        let mut data = self.data.write();
        let before = data.domains.len();
        data.domains.retain(|d| d.id != id);
        let removed = data.domains.len() != before;
        if removed {
            self.mark_dirty();
        }
        Ok(removed)
    }

    // ── sites ───────────────────────────────────────────────────────

    async fn list_sites(&self) -> Result<Vec<Site>> {
        Ok(self.data.read().sites.clone())
    }

    async fn get_site(&self, id: &str) -> Result<Option<Site>> {
        Ok(self.data.read().sites.iter().find(|s| s.id == id).cloned())
    }

    // ── endpoints ───────────────────────────────────────────────────

    async fn list_endpoints(&self, domain: Option<&str>) -> Result<Vec<Endpoint>> {
        Ok(self
            .data
            .read()
            .endpoints
            .iter()
            .filter(|e| is_visible(e, domain))
            .cloned()
            .collect())
    }

    async fn list_all_endpoints(&self) -> Result<Vec<Endpoint>> {
        Ok(self.data.read().endpoints.clone())
    }

    async fn get_endpoint(&self, id: &str) -> Result<Option<Endpoint>> {
        Ok(self.data.read().endpoints.iter().find(|e| e.id == id).cloned())
    }

    async fn create_endpoint(&self, new: NewEndpoint) -> Result<Endpoint> {
        let mut data = self.data.write();
        let id = unique_id(&new.name, "endpoint", |c| {
            data.endpoints.iter().any(|e| e.id == c)
        });
        let endpoint = new.into_endpoint(id);
        data.endpoints.push(endpoint.clone());
        self.mark_dirty();
        Ok(endpoint)
    }

    async fn update_endpoint(&self, id: &str, patch: EndpointPatch) -> Result<Option<Endpoint>> {
        let mut data = self.data.write();
        let Some(endpoint) = data.endpoints.iter_mut().find(|e| e.id == id) else {
            return Ok(None);
        };
        patch.apply(endpoint);
        let updated = endpoint.clone();
        self.mark_dirty();
        Ok(Some(updated))
    }

    async fn delete_endpoint(&self, id: &str) -> Result<bool> {
        let mut data = self.data.write();
        let before = data.endpoints.len();
        data.endpoints.retain(|e| e.id != id);
        let removed = data.endpoints.len() != before;
        if removed {
            self.mark_dirty();
        }
        Ok(removed)
    }

    async fn replace_endpoints(&self, endpoints: Vec<Endpoint>) -> Result<()> {
        self.data.write().endpoints = endpoints;
        self.mark_dirty();
        Ok(())
    }

    // ── settings ────────────────────────────────────────────────────

    async fn get_settings(&self) -> Result<Settings> {
        Ok(self.data.read().settings.clone())
    }

    async fn set_settings(&self, patch: Settings) -> Result<Settings> {
        let mut data = self.data.write();
        data.settings.merge(patch);
        self.mark_dirty();
        Ok(data.settings.clone())
    }

    async fn flush(&self) -> Result<()> {
        let Some(snapshot) = &self.snapshot else {
            return Ok(());
        };
        if !self.dirty.swap(false, Ordering::AcqRel) {
            return Ok(());
        }
        let data = self.data.read().clone();
        if let Err(e) = snapshot.write(&data) {
            self.mark_dirty();
            return Err(e);
        }
        TraceEvent::SnapshotFlushed {
            file: SNAPSHOT_FILE.into(),
            entries: data.domains.len() + data.sites.len() + data.endpoints.len(),
        }
        .emit();
        Ok(())
    }
}
