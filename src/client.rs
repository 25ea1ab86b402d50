//! The Supabase client handle.
//!
//! A [`SupabaseClient`] owns a validated [`SupabaseConfig`] and a
//! `reqwest::Client` preloaded with the anon-key headers. It is immutable
//! once built and cheap to share by reference.

use reqwest::{StatusCode, Url};
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;

use crate::config::{ConfigError, SupabaseConfig};
use crate::http::{self, TransportError};

#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{endpoint} returned status {status}: {body}")]
    Status {
        endpoint: String,
        status: StatusCode,
        body: String,
    },
    #[error("invalid table name: '{0}'")]
    InvalidTable(String),
}

/// Service URLs derived from the project URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub rest: String,
    pub auth: String,
    pub storage: String,
    pub functions: String,
    pub realtime: String,
}

impl Endpoints {
    pub fn for_url(base: &str) -> Self {
        let realtime_base = websocket_base(base);
        Self {
            rest: format!("{}/rest/v1", base),
            auth: format!("{}/auth/v1", base),
            storage: format!("{}/storage/v1", base),
            functions: format!("{}/functions/v1", base),
            realtime: format!("{}/realtime/v1", realtime_base),
        }
    }
}

fn websocket_base(base: &str) -> String {
    let Ok(mut url) = Url::parse(base) else {
        return base.to_string();
    };
    let scheme = if url.scheme() == "https" { "wss" } else { "ws" };
    if url.set_scheme(scheme).is_err() {
        return base.to_string();
    }
    url.as_str().trim_end_matches('/').to_string()
}

/// PostgREST relation names: ASCII letters, digits, `_`, `-` and `.`,
/// never `.` or `..` alone.
fn is_valid_table(table: &str) -> bool {
    !table.is_empty()
        && table != "."
        && table != ".."
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct HealthStatus {
    pub name: Option<String>,
    pub version: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct SupabaseClient {
    config: SupabaseConfig,
    endpoints: Endpoints,
    http: reqwest::Client,
}

impl SupabaseClient {
    pub fn new(config: SupabaseConfig) -> Result<Self, ClientError> {
        let http = http::build_client(&config)?;
        let endpoints = Endpoints::for_url(config.url());
        debug!(url = config.url(), project_ref = config.project_ref(), "supabase client built");
        Ok(Self {
            config,
            endpoints,
            http,
        })
    }

    pub fn from_env() -> Result<Self, ClientError> {
        Self::new(SupabaseConfig::from_env()?)
    }

    pub fn config(&self) -> &SupabaseConfig {
        &self.config
    }

    pub fn url(&self) -> &str {
        self.config.url()
    }

    pub fn anon_key(&self) -> &str {
        self.config.anon_key()
    }

    /// Underlying HTTP client. Requests sent through it already carry the
    /// `apikey` and `Authorization` headers.
    pub fn http(&self) -> &reqwest::Client {
        &self.http
    }

    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    pub fn rest_url(&self) -> &str {
        &self.endpoints.rest
    }

    pub fn auth_url(&self) -> &str {
        &self.endpoints.auth
    }

    pub fn storage_url(&self) -> &str {
        &self.endpoints.storage
    }

    pub fn functions_url(&self) -> &str {
        &self.endpoints.functions
    }

    pub fn realtime_url(&self) -> &str {
        &self.endpoints.realtime
    }

    /// Default key under which auth sessions are persisted.
    pub fn storage_key(&self) -> String {
        format!("sb-{}-auth-token", self.config.project_ref())
    }

    pub async fn health(&self) -> Result<HealthStatus, ClientError> {
        let endpoint = format!("{}/health", self.endpoints.auth);
        let resp = self.http.get(&endpoint).send().await?;
        let resp = ensure_success(&endpoint, resp).await?;
        Ok(resp.json().await?)
    }

    /// `GET /rest/v1/<table>?select=<columns>`, rows returned as raw JSON.
    pub async fn select(
        &self,
        table: &str,
        columns: &str,
        limit: Option<u32>,
    ) -> Result<Vec<serde_json::Value>, ClientError> {
        let table = table.trim();
        if !is_valid_table(table) {
            return Err(ClientError::InvalidTable(table.to_string()));
        }

        let endpoint = format!("{}/{}", self.endpoints.rest, table);
        let mut query = vec![("select", columns.to_string())];
        if let Some(limit) = limit {
            query.push(("limit", limit.to_string()));
        }

        let resp = self.http.get(&endpoint).query(&query).send().await?;
        let resp = ensure_success(&endpoint, resp).await?;
        Ok(resp.json().await?)
    }
}

async fn ensure_success(
    endpoint: &str,
    resp: reqwest::Response,
) -> Result<reqwest::Response, ClientError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    Err(ClientError::Status {
        endpoint: endpoint.to_string(),
        status,
        body: resp.text().await.unwrap_or_default(),
    })
}
