use std::sync::Arc;

use st_contextpack::ContextAssembler;
use st_domain::config::Config;
use st_providers::{EndpointDiscovery, ModelInvoker};
use st_store::{CatalogStore, ConversationStore, EndpointResolver};

use crate::runtime::conversation_lock::ConversationLockMap;

/// Shared application state passed to all API handlers.
///
/// Fields are grouped by concern:
/// - **Core services**: config, stores, resolver, context assembler
/// - **Model serving**: invoker and discovery (both optional)
/// - **Concurrency**: per-conversation locks
#[derive(Clone)]
pub struct AppState {
    // ── Core services ─────────────────────────────────────────────────
    pub config: Arc<Config>,
    pub catalog: Arc<dyn CatalogStore>,
    pub conversations: Arc<dyn ConversationStore>,
    pub resolver: EndpointResolver,
    pub assembler: Arc<ContextAssembler>,

    // ── Model serving ─────────────────────────────────────────────────
    /// `None` when no workspace is configured; every turn then gets a
    /// local fallback reply.
    pub invoker: Option<Arc<dyn ModelInvoker>>,
    pub discovery: Option<Arc<dyn EndpointDiscovery>>,

    // ── Concurrency ───────────────────────────────────────────────────
    pub conversation_locks: Arc<ConversationLockMap>,
}

impl AppState {
    /// State with no model collaborator wired in.
    pub fn new(
        config: Arc<Config>,
        catalog: Arc<dyn CatalogStore>,
        conversations: Arc<dyn ConversationStore>,
    ) -> Self {
        let assembler = Arc::new(ContextAssembler::new(config.chat.fallback_prompt.clone()));
        Self {
            resolver: EndpointResolver::new(catalog.clone()),
            config,
            catalog,
            conversations,
            assembler,
            invoker: None,
            discovery: None,
            conversation_locks: Arc::new(ConversationLockMap::new()),
        }
    }

    pub fn with_invoker(mut self, invoker: Arc<dyn ModelInvoker>) -> Self {
        self.invoker = Some(invoker);
        self
    }

    pub fn with_discovery(mut self, discovery: Arc<dyn EndpointDiscovery>) -> Self {
        self.discovery = Some(discovery);
        self
    }
}
