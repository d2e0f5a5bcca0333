//! Reference data: domains, sites, endpoints, and the global chat settings.

use serde::{Deserialize, Serialize};

/// The reserved fallback domain.
pub const GENERIC_DOMAIN_ID: &str = "generic";

/// The reserved "no specific site" value.
pub const ALL_SITES_ID: &str = "all-sites";

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Domains
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A business-area specialization with its own default system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Domain {
    pub id: String,
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDomain {
    pub name: String,
    pub description: String,
    pub system_prompt: String,
    #[serde(default)]
    pub icon: Option<String>,
}

impl NewDomain {
    pub fn into_domain(self, id: String) -> Domain {
        Domain {
            id,
            name: self.name,
            description: self.description,
            system_prompt: self.system_prompt,
            icon: self.icon,
        }
    }
}

/// Partial update for a [`Domain`].  Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DomainPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub system_prompt: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl DomainPatch {
    pub fn apply(self, domain: &mut Domain) {
        if let Some(name) = self.name {
            domain.name = name;
        }
        if let Some(description) = self.description {
            domain.description = description;
        }
        if let Some(prompt) = self.system_prompt {
            domain.system_prompt = prompt;
        }
        if self.icon.is_some() {
            domain.icon = self.icon;
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Sites
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// A physical operating location.  Only used to scope the system prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Site {
    pub id: String,
    pub name: String,
    pub location: String,
    #[serde(rename = "type")]
    pub kind: String,
}

impl Site {
    /// Whether this is the "all sites" sentinel rather than a real site.
    pub fn is_all_sites(&self) -> bool {
        self.id == ALL_SITES_ID
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Endpoints
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EndpointKind {
    /// Domain-agnostic foundation model; always visible.
    Foundation,
    /// Fine-tuned or otherwise custom model.
    Custom,
    /// Agent endpoint, usually tied to one domain.
    Agent,
}

/// An invocable model or agent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EndpointKind,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewEndpoint {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: EndpointKind,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub domain_id: Option<String>,
}

impl NewEndpoint {
    pub fn into_endpoint(self, id: String) -> Endpoint {
        Endpoint {
            id,
            name: self.name,
            description: self.description,
            kind: self.kind,
            is_default: self.is_default,
            domain_id: self.domain_id,
        }
    }
}

/// Partial update for an [`Endpoint`].  Absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EndpointPatch {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default, rename = "type")]
    pub kind: Option<EndpointKind>,
    #[serde(default)]
    pub is_default: Option<bool>,
    #[serde(default)]
    pub domain_id: Option<String>,
}

impl EndpointPatch {
    pub fn apply(self, endpoint: &mut Endpoint) {
        if let Some(name) = self.name {
            endpoint.name = name;
        }
        if let Some(description) = self.description {
            endpoint.description = description;
        }
        if let Some(kind) = self.kind {
            endpoint.kind = kind;
        }
        if let Some(is_default) = self.is_default {
            endpoint.is_default = is_default;
        }
        if self.domain_id.is_some() {
            endpoint.domain_id = self.domain_id;
        }
    }
}

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Global chat settings
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Process-wide chat settings (served at `/api/config`).
///
/// The same shape doubles as a partial update: [`Settings::merge`] only
/// overwrites the fields present in the incoming value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_endpoint_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_domain_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_site_id: Option<String>,
    /// Overrides every domain's own prompt when non-empty.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
}

impl Settings {
    pub fn merge(&mut self, patch: Settings) {
        if patch.default_endpoint_id.is_some() {
            self.default_endpoint_id = patch.default_endpoint_id;
        }
        if patch.default_domain_id.is_some() {
            self.default_domain_id = patch.default_domain_id;
        }
        if patch.default_site_id.is_some() {
            self.default_site_id = patch.default_site_id;
        }
        if patch.system_prompt.is_some() {
            self.system_prompt = patch.system_prompt;
        }
    }
}
