use serde::Serialize;

/// Structured trace events emitted across all Strata crates.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event")]
pub enum TraceEvent {
    ConversationCreated {
        conversation_id: String,
        endpoint_id: String,
        domain_id: Option<String>,
        site_id: Option<String>,
    },
    MessageAppended {
        conversation_id: String,
        role: String,
        message_count: usize,
    },
    ConversationDeleted {
        conversation_id: String,
        messages: usize,
    },
    EndpointResolved {
        requested: Option<String>,
        resolved: Option<String>,
        source: String,
    },
    ContextAssembled {
        prior_messages: usize,
        system_prompt_chars: usize,
        prompt_source: String,
        site_scoped: bool,
    },
    ModelInvoked {
        endpoint: String,
        messages: usize,
        duration_ms: u64,
        reply_chars: usize,
    },
    ModelFallback {
        endpoint: String,
        reason: String,
    },
    CatalogRefreshed {
        endpoints: usize,
        replaced: bool,
    },
    SnapshotFlushed {
        file: String,
        entries: usize,
    },
}

impl TraceEvent {
    pub fn emit(&self) {
        let json = serde_json::to_string(self).unwrap_or_default();
        tracing::info!(trace_event = %json, "st_event");
    }
}
