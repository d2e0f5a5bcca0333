//! HTTP client for a model-serving workspace.

use std::time::Duration;

use serde_json::{json, Value};

use st_domain::catalog::Endpoint;
use st_domain::config::{strip_endpoint_prefix, ServingConfig};
use st_domain::error::{Error, Result};
use st_domain::model::ChatTurn;

use crate::auth::Credentials;
use crate::discovery::{classify, EndpointListing};
use crate::traits::{EndpointDiscovery, ModelInvoker};
use crate::util::{extract_reply, from_reqwest};

/// Talks to `{host}/serving-endpoints/{name}/invocations` and
/// `{host}/api/2.0/serving-endpoints`.
pub struct ServingClient {
    host: String,
    endpoint_prefix: String,
    credentials: Credentials,
    client: reqwest::Client,
}

impl ServingClient {
    pub fn new(
        host: impl Into<String>,
        endpoint_prefix: impl Into<String>,
        credentials: Credentials,
        timeout: Duration,
    ) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(from_reqwest)?;
        Ok(Self {
            host: host.into().trim_end_matches('/').to_owned(),
            endpoint_prefix: endpoint_prefix.into(),
            credentials,
            client,
        })
    }

    /// Build from config and the environment.
    ///
    /// `Ok(None)` when no host or no credentials are available; the
    /// gateway then answers every chat turn with a local fallback.
    pub fn from_config(cfg: &ServingConfig) -> Result<Option<Self>> {
        let Some(host) = cfg.resolve_host() else {
            return Ok(None);
        };
        let Some(credentials) = Credentials::from_env(cfg) else {
            tracing::warn!(host = %host, "serving host set but no credentials found");
            return Ok(None);
        };
        let client = Self::new(
            host,
            cfg.endpoint_prefix.clone(),
            credentials,
            Duration::from_millis(cfg.timeout_ms),
        )?;
        Ok(Some(client))
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    fn invocation_url(&self, endpoint_id: &str) -> String {
        format!(
            "{}/serving-endpoints/{}/invocations",
            self.host,
            strip_endpoint_prefix(&self.endpoint_prefix, endpoint_id)
        )
    }
}

fn build_body(messages: &[ChatTurn]) -> Value {
    json!({ "messages": messages })
}

#[async_trait::async_trait]
impl ModelInvoker for ServingClient {
    async fn invoke(&self, endpoint_id: &str, messages: &[ChatTurn]) -> Result<String> {
        let url = self.invocation_url(endpoint_id);
        let token = self.credentials.bearer(&self.client, &self.host).await?;

        tracing::debug!(endpoint = %endpoint_id, url = %url, turns = messages.len(), "serving invocation");

        let resp = self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(&build_body(messages))
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        let resp_text = resp.text().await.map_err(from_reqwest)?;

        if !status.is_success() {
            return Err(Error::Upstream {
                endpoint: endpoint_id.to_owned(),
                message: format!("HTTP {} - {}", status.as_u16(), resp_text),
            });
        }

        let resp_json: Value = serde_json::from_str(&resp_text)?;
        Ok(extract_reply(&resp_json))
    }

    fn provider_id(&self) -> &str {
        &self.host
    }
}

#[async_trait::async_trait]
impl EndpointDiscovery for ServingClient {
    async fn discover(&self) -> Result<Vec<Endpoint>> {
        let url = format!("{}/api/2.0/serving-endpoints", self.host);
        let token = self.credentials.bearer(&self.client, &self.host).await?;

        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Upstream {
                endpoint: "serving-endpoints".into(),
                message: format!("HTTP {} - {}", status.as_u16(), text),
            });
        }

        let listing: EndpointListing = resp.json().await.map_err(from_reqwest)?;
        let endpoints = classify(listing);
        tracing::info!(count = endpoints.len(), host = %self.host, "serving endpoints discovered");
        Ok(endpoints)
    }
}
