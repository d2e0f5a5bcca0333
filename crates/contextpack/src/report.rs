use serde::{Deserialize, Serialize};

use st_domain::trace::TraceEvent;

/// Where the effective system prompt came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptSource {
    /// Global settings override.
    Override,
    /// The active domain's own prompt.
    Domain,
    /// Built-in fallback (no domain resolved).
    Fallback,
}

impl PromptSource {
    pub fn as_str(self) -> &'static str {
        match self {
            PromptSource::Override => "override",
            PromptSource::Domain => "domain",
            PromptSource::Fallback => "fallback",
        }
    }
}

/// Machine-readable summary of one context assembly.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContextReport {
    pub prompt_source: PromptSource,
    pub system_prompt_chars: usize,
    pub prior_messages: usize,
    pub site_scoped: bool,
    /// System + prior + incoming.
    pub total_turns: usize,
}

impl ContextReport {
    pub fn emit(&self) {
        TraceEvent::ContextAssembled {
            prior_messages: self.prior_messages,
            system_prompt_chars: self.system_prompt_chars,
            prompt_source: self.prompt_source.as_str().to_owned(),
            site_scoped: self.site_scoped,
        }
        .emit();
    }
}
