//! Application bootstrap: builds [`AppState`] and spawns background tasks.
//!
//! Extracted from `main.rs` so the CLI one-shot command can reuse the
//! same initialization without starting the HTTP server.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;

use st_domain::config::{Config, ConfigSeverity};
use st_providers::ServingClient;
use st_store::{CatalogStore, ConversationStore, MemoryCatalog, MemoryConversations};

use crate::runtime::refresh_catalog;
use crate::state::AppState;

/// Build the fully-initialized [`AppState`] from configuration.
///
/// Does not spawn background tasks; call [`spawn_background_tasks`] for
/// a long-running server.
pub async fn build_app_state(config: Arc<Config>) -> anyhow::Result<AppState> {
    // ── Config validation ────────────────────────────────────────────
    let issues = config.validate();
    let mut has_errors = false;
    for issue in &issues {
        match issue.severity {
            ConfigSeverity::Error => {
                tracing::error!(field = %issue.field, "{}", issue.message);
                has_errors = true;
            }
            ConfigSeverity::Warning => {
                tracing::warn!(field = %issue.field, "{}", issue.message);
            }
        }
    }
    if has_errors {
        anyhow::bail!("config validation failed, fix the errors above and restart");
    }

    // ── Stores ───────────────────────────────────────────────────────
    let (catalog, conversations): (Arc<dyn CatalogStore>, Arc<dyn ConversationStore>) =
        match config.storage.state_path.as_deref() {
            Some(dir) => {
                std::fs::create_dir_all(dir)
                    .with_context(|| format!("creating state dir {}", dir.display()))?;
                let catalog = MemoryCatalog::open(dir)
                    .with_context(|| format!("opening catalog in {}", dir.display()))?;
                let conversations = MemoryConversations::open(dir)
                    .with_context(|| format!("opening conversations in {}", dir.display()))?;
                tracing::info!(state_path = %dir.display(), "persistent stores opened");
                (Arc::new(catalog), Arc::new(conversations))
            }
            None => {
                tracing::info!("no storage.state_path set, state is in-memory only");
                (Arc::new(MemoryCatalog::seeded()), Arc::new(MemoryConversations::new()))
            }
        };

    let mut state = AppState::new(config.clone(), catalog, conversations);

    // ── Model serving ────────────────────────────────────────────────
    match ServingClient::from_config(&config.serving).context("building serving client")? {
        Some(client) => {
            tracing::info!(host = %client.host(), "model serving configured");
            let client = Arc::new(client);
            state = state.with_invoker(client.clone()).with_discovery(client);
        }
        None => {
            tracing::warn!("model serving not configured, chat will use local fallback replies");
        }
    }

    if config.serving.refresh_on_startup && state.discovery.is_some() {
        let outcome = refresh_catalog(&state).await.context("startup endpoint refresh")?;
        tracing::info!(
            endpoints = outcome.endpoints.len(),
            replaced = outcome.replaced,
            "startup endpoint refresh done"
        );
    }

    Ok(state)
}

/// Spawn the periodic maintenance loops.
pub fn spawn_background_tasks(state: &AppState) {
    // ── Periodic store flush ─────────────────────────────────────────
    if state.config.storage.state_path.is_some() {
        let state = state.clone();
        let every = Duration::from_secs(state.config.storage.flush_interval_secs);
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            loop {
                interval.tick().await;
                flush_stores(&state).await;
            }
        });
    }

    // ── Lock map pruning ─────────────────────────────────────────────
    {
        let locks = state.conversation_locks.clone();
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(60));
            loop {
                interval.tick().await;
                locks.prune_idle();
            }
        });
    }

    tracing::info!("background tasks spawned");
}

/// Write both stores to disk if they changed.  Failures are logged.
pub async fn flush_stores(state: &AppState) {
    if let Err(e) = state.catalog.flush().await {
        tracing::warn!(error = %e, "catalog flush failed");
    }
    if let Err(e) = state.conversations.flush().await {
        tracing::warn!(error = %e, "conversation store flush failed");
    }
}
