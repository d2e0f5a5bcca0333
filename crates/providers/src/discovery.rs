//! Classification of a workspace's serving-endpoint listing.
//!
//! The listing (`GET /api/2.0/serving-endpoints`) carries no explicit
//! foundation/custom/agent marker, so the kind is inferred from the task,
//! the served entities, and finally the endpoint name.

use serde::Deserialize;
use serde_json::Value;

use st_domain::catalog::{Endpoint, EndpointKind};

/// Name fragments that identify well-known foundation model families.
const FOUNDATION_FAMILIES: &[&str] = &["llama", "mixtral", "dbrx", "claude", "gpt", "gemini"];

#[derive(Debug, Default, Deserialize)]
pub struct EndpointListing {
    #[serde(default)]
    pub endpoints: Vec<ServingEndpoint>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServingEndpoint {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub task: Option<String>,
    #[serde(default)]
    pub route_optimized: bool,
    #[serde(default)]
    pub state: Option<EndpointState>,
    #[serde(default)]
    pub config: Option<EndpointConfig>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EndpointState {
    #[serde(default)]
    pub ready: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EndpointConfig {
    #[serde(default)]
    pub served_entities: Vec<ServedEntity>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ServedEntity {
    #[serde(default)]
    pub entity_name: Option<String>,
    /// String or number depending on the workspace version.
    #[serde(default)]
    pub entity_version: Option<Value>,
    #[serde(default)]
    pub external_model: Option<Value>,
}

impl ServingEndpoint {
    pub fn is_ready(&self) -> bool {
        self.state
            .as_ref()
            .and_then(|s| s.ready.as_deref())
            .is_some_and(|r| r == "READY")
    }

    pub fn kind(&self) -> EndpointKind {
        let name = self.name.to_lowercase();

        if self
            .task
            .as_deref()
            .is_some_and(|t| t.to_lowercase().contains("agent"))
        {
            return EndpointKind::Agent;
        }

        let entities = self
            .config
            .as_ref()
            .map(|c| c.served_entities.as_slice())
            .unwrap_or(&[]);
        for entity in entities {
            if entity.external_model.as_ref().is_some_and(|m| !m.is_null()) {
                return EndpointKind::Foundation;
            }
            if entity
                .entity_name
                .as_deref()
                .is_some_and(|n| n.to_lowercase().contains("agent"))
            {
                return EndpointKind::Agent;
            }
            let version = match &entity.entity_version {
                Some(Value::String(s)) => s.to_lowercase(),
                Some(Value::Null) | None => String::new(),
                Some(other) => other.to_string(),
            };
            if version.contains("agent") {
                return EndpointKind::Agent;
            }
        }

        if name.contains("agent") {
            return EndpointKind::Agent;
        }
        if FOUNDATION_FAMILIES.iter().any(|f| name.contains(f)) {
            return EndpointKind::Foundation;
        }
        if self.route_optimized {
            return EndpointKind::Foundation;
        }
        EndpointKind::Custom
    }

    fn description(&self, kind: EndpointKind) -> String {
        let label = match kind {
            EndpointKind::Agent => "AI Agent",
            EndpointKind::Foundation => "Foundation model",
            EndpointKind::Custom => "Custom model",
        };
        let mut text = format!("{label}: {}", self.name);
        if !self.is_ready() {
            text.push_str(" (not ready)");
        }
        text
    }
}

/// Map a listing onto catalog endpoints.  The first entry is flagged as
/// the default; ids and names are the serving endpoint names verbatim.
pub fn classify(listing: EndpointListing) -> Vec<Endpoint> {
    listing
        .endpoints
        .into_iter()
        .filter(|ep| !ep.name.is_empty())
        .enumerate()
        .map(|(i, ep)| {
            let kind = ep.kind();
            Endpoint {
                id: ep.name.clone(),
                name: ep.name.clone(),
                description: ep.description(kind),
                kind,
                is_default: i == 0,
                domain_id: None,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(v: Value) -> ServingEndpoint {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn task_marks_agent() {
        let ep = parse(json!({"name": "ops-bot", "task": "Agent (Responses)"}));
        assert_eq!(ep.kind(), EndpointKind::Agent);
    }

    #[test]
    fn external_model_is_foundation_even_if_named_agent() {
        let ep = parse(json!({
            "name": "agent-proxy",
            "config": {"served_entities": [{"external_model": {"provider": "openai"}}]}
        }));
        assert_eq!(ep.kind(), EndpointKind::Foundation);
    }

    #[test]
    fn numeric_entity_version_does_not_break_parsing() {
        let ep = parse(json!({
            "name": "churn-model",
            "config": {"served_entities": [{"entity_name": "ml.churn", "entity_version": 3}]}
        }));
        assert_eq!(ep.kind(), EndpointKind::Custom);
    }

    #[test]
    fn name_families_and_route_optimized() {
        assert_eq!(
            parse(json!({"name": "databricks-meta-llama-3-1-70b"})).kind(),
            EndpointKind::Foundation
        );
        assert_eq!(
            parse(json!({"name": "reranker", "route_optimized": true})).kind(),
            EndpointKind::Foundation
        );
        assert_eq!(parse(json!({"name": "my-ops-agent"})).kind(), EndpointKind::Agent);
    }

    #[test]
    fn classify_flags_first_and_marks_not_ready() {
        let listing: EndpointListing = serde_json::from_value(json!({
            "endpoints": [
                {"name": "gpt-4o", "state": {"ready": "READY"}},
                {"name": "forecast", "state": {"ready": "NOT_READY"}}
            ]
        }))
        .unwrap();
        let eps = classify(listing);
        assert_eq!(eps.len(), 2);
        assert!(eps[0].is_default);
        assert!(!eps[1].is_default);
        assert_eq!(eps[0].description, "Foundation model: gpt-4o");
        assert_eq!(eps[1].description, "Custom model: forecast (not ready)");
    }

    #[test]
    fn empty_body_is_empty_listing() {
        let listing: EndpointListing = serde_json::from_value(json!({})).unwrap();
        assert!(classify(listing).is_empty());
    }
}
