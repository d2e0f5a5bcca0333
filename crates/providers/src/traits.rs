use st_domain::catalog::Endpoint;
use st_domain::error::Result;
use st_domain::model::ChatTurn;

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Model invocation
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Sends an assembled turn list to a model and returns the reply text.
///
/// Callers treat every error as "upstream unavailable"; the orchestrator
/// never surfaces these to the chat client.
#[async_trait::async_trait]
pub trait ModelInvoker: Send + Sync {
    async fn invoke(&self, endpoint_id: &str, messages: &[ChatTurn]) -> Result<String>;

    /// Short identifier for logs.
    fn provider_id(&self) -> &str;
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Endpoint discovery
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Lists the endpoints a serving workspace exposes, already classified.
#[async_trait::async_trait]
pub trait EndpointDiscovery: Send + Sync {
    async fn discover(&self) -> Result<Vec<Endpoint>>;
}
