//! Storage for Strata.
//!
//! Two store contracts live here: the [`CatalogStore`] (domains, sites,
//! endpoints, global settings) and the [`ConversationStore`] (append-only
//! message threads).  Both ship with in-memory implementations that can
//! optionally snapshot to JSON files.  The [`EndpointResolver`] sits on top
//! of the catalog and is the only place that interprets endpoint kinds.

pub mod catalog;
pub mod conversations;
pub mod resolver;
pub mod seed;
pub mod slug;
pub(crate) mod snapshot;

pub use catalog::{CatalogData, CatalogStore, MemoryCatalog};
pub use conversations::{ConversationStore, MemoryConversations, NewConversation};
pub use resolver::{EndpointResolver, Resolved, Selection, SelectionSource};
