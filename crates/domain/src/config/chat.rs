use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Chat
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatConfig {
    /// System prompt used when neither the settings override nor a
    /// domain supplies one.
    #[serde(default = "d_fallback_prompt")]
    pub fallback_prompt: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            fallback_prompt: d_fallback_prompt(),
        }
    }
}

fn d_fallback_prompt() -> String {
    "You are a helpful AI assistant.".into()
}
