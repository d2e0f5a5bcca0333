use serde::{Deserialize, Serialize};

// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━
// Model serving workspace
// ━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━

/// Where chat turns are sent and how to authenticate.
///
/// Secrets are never stored in the file; only the names of the
/// environment variables that hold them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServingConfig {
    /// Workspace host.  Takes precedence over `host_env`.
    #[serde(default)]
    pub host: Option<String>,
    #[serde(default = "d_host_env")]
    pub host_env: String,
    /// Personal access token (preferred over service-principal credentials).
    #[serde(default = "d_token_env")]
    pub token_env: String,
    #[serde(default = "d_client_id_env")]
    pub client_id_env: String,
    #[serde(default = "d_client_secret_env")]
    pub client_secret_env: String,
    /// Per-invocation timeout.  On expiry the chat turn falls back to a
    /// locally generated reply.
    #[serde(default = "d_10000")]
    pub timeout_ms: u64,
    /// Catalog ids carrying this prefix have it stripped to form the
    /// serving endpoint name.
    #[serde(default = "d_prefix")]
    pub endpoint_prefix: String,
    /// Replace the catalog's endpoints with the workspace's list at startup.
    #[serde(default = "d_true")]
    pub refresh_on_startup: bool,
}

impl Default for ServingConfig {
    fn default() -> Self {
        Self {
            host: None,
            host_env: d_host_env(),
            token_env: d_token_env(),
            client_id_env: d_client_id_env(),
            client_secret_env: d_client_secret_env(),
            timeout_ms: 10_000,
            endpoint_prefix: d_prefix(),
            refresh_on_startup: true,
        }
    }
}

impl ServingConfig {
    /// The normalized workspace host, from config or the environment.
    pub fn resolve_host(&self) -> Option<String> {
        let raw = self
            .host
            .clone()
            .or_else(|| std::env::var(&self.host_env).ok())?;
        normalize_host(&raw)
    }

    /// Map a catalog endpoint id onto the serving endpoint name.
    pub fn serving_name<'a>(&self, endpoint_id: &'a str) -> &'a str {
        strip_endpoint_prefix(&self.endpoint_prefix, endpoint_id)
    }
}

/// Remove `prefix` from `endpoint_id` when present.  An empty prefix is a
/// no-op.
pub fn strip_endpoint_prefix<'a>(prefix: &str, endpoint_id: &'a str) -> &'a str {
    if prefix.is_empty() {
        return endpoint_id;
    }
    endpoint_id.strip_prefix(prefix).unwrap_or(endpoint_id)
}

/// Trim trailing slashes and default the scheme to `https://`.
pub fn normalize_host(raw: &str) -> Option<String> {
    let trimmed = raw.trim().trim_end_matches('/');
    if trimmed.is_empty() {
        return None;
    }
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        Some(trimmed.to_owned())
    } else {
        Some(format!("https://{trimmed}"))
    }
}

// ── serde default helpers ───────────────────────────────────────────

fn d_host_env() -> String {
    "DATABRICKS_HOST".into()
}
fn d_token_env() -> String {
    "DATABRICKS_TOKEN".into()
}
fn d_client_id_env() -> String {
    "DATABRICKS_CLIENT_ID".into()
}
fn d_client_secret_env() -> String {
    "DATABRICKS_CLIENT_SECRET".into()
}
fn d_10000() -> u64 {
    10_000
}
fn d_prefix() -> String {
    "databricks-".into()
}
fn d_true() -> bool {
    true
}
