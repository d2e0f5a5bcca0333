//! Model-serving collaborators.
//!
//! [`ModelInvoker`] is the seam the chat orchestrator calls through;
//! [`EndpointDiscovery`] lists what a serving workspace offers.  The
//! [`ServingClient`] implements both against a Databricks-style
//! workspace over HTTP.

pub mod auth;
pub mod discovery;
pub mod serving;
pub mod traits;
pub(crate) mod util;

pub use auth::Credentials;
pub use serving::ServingClient;
pub use traits::{EndpointDiscovery, ModelInvoker};
pub use util::{extract_reply, EMPTY_REPLY};
