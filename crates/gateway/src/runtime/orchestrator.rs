//! One chat turn, end to end.
//!
//! validate → resolve conversation → persist user message → invoke model
//! → persist assistant message.  Validation and lookup failures abort
//! before anything is written.  Model failures never escape: they become a
//! local fallback reply.  Storage failures propagate as internal errors.

use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use st_contextpack::ContextInput;
use st_domain::catalog::{ALL_SITES_ID, GENERIC_DOMAIN_ID};
use st_domain::error::{Error, Result};
use st_domain::model::{ChatTurn, Message, NewMessage, Role};
use st_domain::trace::TraceEvent;
use st_store::{NewConversation, Selection, SelectionSource};

use crate::runtime::fallback::{fallback_reply, FallbackInput};
use crate::state::AppState;

/// Title a conversation carries until its first user message renames it.
pub const PLACEHOLDER_TITLE: &str = "New conversation";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default)]
    pub endpoint_id: String,
    #[serde(default)]
    pub domain_id: Option<String>,
    #[serde(default)]
    pub site_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatReply {
    pub message: Message,
    pub conversation_id: String,
}

fn validate(req: &ChatRequest) -> Result<()> {
    if req.message.is_empty() {
        return Err(Error::Validation("message must not be empty".into()));
    }
    if req.endpoint_id.trim().is_empty() {
        return Err(Error::Validation("endpointId is required".into()));
    }
    Ok(())
}

/// Run a chat turn against `state`.
pub async fn run_chat(state: &AppState, req: ChatRequest) -> Result<ChatReply> {
    validate(&req)?;

    // ── Resolve or create the conversation ───────────────────────────
    let (conversation_id, is_new) = match req.conversation_id.as_deref() {
        Some(id) => {
            if state.conversations.get(id).await?.is_none() {
                return Err(Error::not_found("conversation", id));
            }
            (id.to_owned(), false)
        }
        None => {
            let created = state
                .conversations
                .create(NewConversation {
                    endpoint_id: req.endpoint_id.clone(),
                    title: PLACEHOLDER_TITLE.into(),
                    domain_id: req.domain_id.clone(),
                    site_id: req.site_id.clone(),
                })
                .await?;
            (created.id, true)
        }
    };

    let _permit = state.conversation_locks.acquire(&conversation_id).await?;

    // Prior context is read under the lock so a concurrent turn's messages
    // are either fully in or fully out.
    let conversation = state
        .conversations
        .get(&conversation_id)
        .await?
        .ok_or_else(|| Error::not_found("conversation", &conversation_id))?;

    // ── Domain, site, endpoint ───────────────────────────────────────
    let domain_id = req.domain_id.as_deref().unwrap_or(GENERIC_DOMAIN_ID);
    let domain = match state.catalog.get_domain(domain_id).await? {
        Some(d) => Some(d),
        None => state.catalog.get_domain(GENERIC_DOMAIN_ID).await?,
    };
    let site_id = req.site_id.as_deref().unwrap_or(ALL_SITES_ID);
    let site = match state.catalog.get_site(site_id).await? {
        Some(s) => Some(s),
        None => state.catalog.get_site(ALL_SITES_ID).await?,
    };

    let selection = Selection {
        requested: Some(req.endpoint_id.clone()),
        active_domain: req.domain_id.clone(),
        domain_changed: !is_new && conversation.domain_id != req.domain_id,
    };
    let cataloged = state
        .resolver
        .resolve(&selection)
        .await?
        .filter(|r| r.source == SelectionSource::Explicit)
        .map(|r| r.endpoint);
    if cataloged.is_none() {
        tracing::debug!(endpoint = %req.endpoint_id, "endpoint not in catalog, invoking by id");
    }
    let endpoint_name = cataloged
        .as_ref()
        .map_or(req.endpoint_id.as_str(), |e| e.name.as_str());

    // ── Persist the user turn ────────────────────────────────────────
    state
        .conversations
        .append_message(
            &conversation_id,
            NewMessage::now(Role::User, req.message.clone()),
        )
        .await?;

    // ── Assemble and invoke ──────────────────────────────────────────
    let settings = state.catalog.get_settings().await?;
    let (turns, report) = state.assembler.assemble(ContextInput {
        conversation: Some(&conversation),
        domain: domain.as_ref(),
        site: site.as_ref(),
        message: &req.message,
        override_prompt: settings.system_prompt.as_deref(),
    });
    report.emit();

    let reply = match invoke_model(state, &req.endpoint_id, &turns).await {
        Ok(text) => text,
        Err(reason) => {
            TraceEvent::ModelFallback {
                endpoint: req.endpoint_id.clone(),
                reason,
            }
            .emit();
            fallback_reply(&FallbackInput {
                message: &req.message,
                endpoint_name,
                domain: domain.as_ref(),
                site: site.as_ref(),
                prior_messages: conversation.messages.len(),
            })
        }
    };

    // ── Persist the assistant turn ───────────────────────────────────
    let message = state
        .conversations
        .append_message(&conversation_id, NewMessage::now(Role::Assistant, reply))
        .await?;

    Ok(ChatReply {
        message,
        conversation_id,
    })
}

/// Call the model under the configured timeout.  `Err` carries the
/// reason a fallback is needed.
async fn invoke_model(
    state: &AppState,
    endpoint_id: &str,
    turns: &[ChatTurn],
) -> std::result::Result<String, String> {
    let Some(invoker) = state.invoker.as_ref() else {
        return Err("no model serving configured".into());
    };

    let timeout = Duration::from_millis(state.config.serving.timeout_ms);
    let started = Instant::now();
    let outcome = tokio::time::timeout(timeout, invoker.invoke(endpoint_id, turns)).await;

    match outcome {
        Ok(Ok(text)) => {
            TraceEvent::ModelInvoked {
                endpoint: endpoint_id.to_owned(),
                messages: turns.len(),
                duration_ms: started.elapsed().as_millis() as u64,
                reply_chars: text.chars().count(),
            }
            .emit();
            Ok(text)
        }
        Ok(Err(e)) => {
            tracing::warn!(
                endpoint = %endpoint_id,
                provider = %invoker.provider_id(),
                error = %e,
                "model invocation failed"
            );
            Err(e.to_string())
        }
        Err(_) => {
            tracing::warn!(endpoint = %endpoint_id, timeout_ms = state.config.serving.timeout_ms, "model invocation timed out");
            Err(format!("timed out after {}ms", state.config.serving.timeout_ms))
        }
    }
}
