//! Model context assembly.
//!
//! Turns a conversation, the active domain and site, and the incoming
//! message into the exact ordered turn list sent to a model.

pub mod builder;
pub mod prompt;
pub mod report;

pub use builder::{ContextAssembler, ContextInput};
pub use report::{ContextReport, PromptSource};
