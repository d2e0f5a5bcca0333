//! Chat runtime: the per-request orchestrator and what it leans on.

pub mod conversation_lock;
pub mod fallback;
pub mod orchestrator;
pub mod refresh;

pub use orchestrator::{run_chat, ChatReply, ChatRequest, PLACEHOLDER_TITLE};
pub use refresh::{refresh_catalog, RefreshOutcome};
