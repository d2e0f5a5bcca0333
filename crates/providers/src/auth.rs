//! Workspace credentials.
//!
//! A personal access token is used as-is.  Otherwise a service principal
//! exchanges its client id and secret for an access token at
//! `{host}/oidc/v1/token` (OAuth `client_credentials`, scope `all-apis`).
//! The exchanged token is cached for the life of the process.

use serde::Deserialize;
use tokio::sync::Mutex;

use st_domain::config::ServingConfig;
use st_domain::error::{Error, Result};

use crate::util::from_reqwest;

pub enum Credentials {
    Token(String),
    ServicePrincipal {
        client_id: String,
        client_secret: String,
        cached: Mutex<Option<String>>,
    },
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Credentials::Token(_) => f.write_str("Credentials::Token([REDACTED])"),
            Credentials::ServicePrincipal { client_id, .. } => f
                .debug_struct("Credentials::ServicePrincipal")
                .field("client_id", client_id)
                .field("client_secret", &"[REDACTED]")
                .finish(),
        }
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
}

impl Credentials {
    pub fn service_principal(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Credentials::ServicePrincipal {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            cached: Mutex::new(None),
        }
    }

    /// Read credentials from the environment variables named in `cfg`.
    /// `None` when neither a token nor a full client id/secret pair is set.
    pub fn from_env(cfg: &ServingConfig) -> Option<Self> {
        let var = |name: &str| std::env::var(name).ok().filter(|v| !v.trim().is_empty());

        if let Some(token) = var(&cfg.token_env) {
            return Some(Credentials::Token(token));
        }
        match (var(&cfg.client_id_env), var(&cfg.client_secret_env)) {
            (Some(id), Some(secret)) => Some(Self::service_principal(id, secret)),
            _ => None,
        }
    }

    /// A bearer token for `host`, exchanging client credentials on first use.
    pub async fn bearer(&self, http: &reqwest::Client, host: &str) -> Result<String> {
        let (client_id, client_secret, cached) = match self {
            Credentials::Token(token) => return Ok(token.clone()),
            Credentials::ServicePrincipal {
                client_id,
                client_secret,
                cached,
            } => (client_id, client_secret, cached),
        };

        // Held across the exchange so concurrent callers wait for one fetch.
        let mut slot = cached.lock().await;
        if let Some(token) = slot.as_ref() {
            return Ok(token.clone());
        }

        let url = format!("{host}/oidc/v1/token");
        tracing::debug!(url = %url, "exchanging service principal credentials");

        let resp = http
            .post(&url)
            .basic_auth(client_id, Some(client_secret))
            .form(&[("grant_type", "client_credentials"), ("scope", "all-apis")])
            .send()
            .await
            .map_err(from_reqwest)?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "token exchange failed: HTTP {} - {}",
                status.as_u16(),
                text
            )));
        }

        let token: TokenResponse = resp.json().await.map_err(from_reqwest)?;
        *slot = Some(token.access_token.clone());
        Ok(token.access_token)
    }
}
