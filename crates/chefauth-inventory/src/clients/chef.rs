//! Chef server client
//!
//! Talks to a Chef server over HTTPS, signing every request with the
//! authenticating node's own key.

use async_trait::async_trait;
use chefauth_core::NodeRecord;
use chrono::Utc;
use reqwest::{StatusCode, Url};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

use crate::client::InventoryClient;
use crate::error::{InventoryError, Result};
use crate::signing::RequestSigner;
use crate::types::{NodeCredentials, SearchResponse};

/// Rows requested per search page
const SEARCH_PAGE_SIZE: u64 = 1000;

/// Chef client version advertised to the server
const CHEF_VERSION: &str = "18.0.0";

/// HTTP settings for [`ChefClient`]
#[derive(Debug, Clone)]
pub struct ChefClientConfig {
    /// Timeout applied to every request
    pub timeout: Duration,

    /// Skip TLS certificate verification (self-signed Chef servers)
    pub insecure_skip_verify: bool,
}

impl Default for ChefClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10),
            insecure_skip_verify: false,
        }
    }
}

impl ChefClientConfig {
    /// Set the request timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disable TLS certificate verification
    pub fn with_insecure_skip_verify(mut self, skip: bool) -> Self {
        self.insecure_skip_verify = skip;
        self
    }
}

/// Chef server inventory client
pub struct ChefClient {
    http: reqwest::Client,
}

impl ChefClient {
    /// Create a client; the underlying HTTP client is shared by all requests
    pub fn new(config: ChefClientConfig) -> Result<Self> {
        if config.insecure_skip_verify {
            warn!("TLS certificate verification disabled for Chef server requests");
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .danger_accept_invalid_certs(config.insecure_skip_verify)
            .build()?;

        Ok(Self { http })
    }

    /// Signed GET returning the response status and JSON body
    async fn get(&self, signer: &RequestSigner, url: Url) -> Result<(StatusCode, Value)> {
        let headers = signer.sign("GET", url.path(), b"", Utc::now())?;

        let mut request = self
            .http
            .get(url.clone())
            .header("Accept", "application/json")
            .header("X-Chef-Version", CHEF_VERSION);
        for (name, value) in headers {
            request = request.header(name, value);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Ok((status, Value::Null));
        }

        let body = response.json::<Value>().await?;
        Ok((status, body))
    }
}

/// Append path segments to a base URL, keeping any organization prefix
fn endpoint(base_url: &str, segments: &[&str]) -> Result<Url> {
    let mut url = Url::parse(base_url)
        .map_err(|e| InventoryError::Http(format!("invalid Chef URL {}: {}", base_url, e)))?;

    url.path_segments_mut()
        .map_err(|_| InventoryError::Http(format!("Chef URL {} cannot be a base", base_url)))?
        .pop_if_empty()
        .extend(segments);

    Ok(url)
}

fn status_error(status: StatusCode, url: &Url) -> InventoryError {
    InventoryError::Status {
        status: status.as_u16(),
        path: url.path().to_string(),
    }
}

#[async_trait]
impl InventoryClient for ChefClient {
    fn description(&self) -> &str {
        "chef server client"
    }

    async fn authenticate_node(&self, credentials: &NodeCredentials) -> Result<NodeRecord> {
        let signer = RequestSigner::from_pem(&credentials.node_name, &credentials.private_key)?;
        let url = endpoint(&credentials.base_url, &["nodes", credentials.node_name.as_str()])?;

        debug!(node_name = %credentials.node_name, url = %url, "Fetching node");
        let (status, body) = self.get(&signer, url.clone()).await?;

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => {
                return Err(InventoryError::Denied(format!(
                    "Chef server returned {} for node {}",
                    status.as_u16(),
                    credentials.node_name
                )))
            }
            s if !s.is_success() => return Err(status_error(s, &url)),
            _ => {}
        }

        let node = NodeRecord::from_chef_node(&body, &credentials.base_url)
            .map_err(|e| InventoryError::InvalidResponse(e.to_string()))?;

        if node.name != credentials.node_name {
            return Err(InventoryError::InvalidResponse(format!(
                "requested node {} but Chef returned {}",
                credentials.node_name, node.name
            )));
        }

        Ok(node)
    }

    async fn execute_search(&self, credentials: &NodeCredentials, query: &str) -> Result<Vec<Value>> {
        let signer = RequestSigner::from_pem(&credentials.node_name, &credentials.private_key)?;
        let base = endpoint(&credentials.base_url, &["search", "node"])?;

        let mut rows = Vec::new();
        let mut start = 0u64;
        loop {
            let mut url = base.clone();
            url.query_pairs_mut()
                .append_pair("q", query)
                .append_pair("start", &start.to_string())
                .append_pair("rows", &SEARCH_PAGE_SIZE.to_string());

            let (status, body) = self.get(&signer, url.clone()).await?;
            if !status.is_success() {
                return Err(status_error(status, &url));
            }

            let page: SearchResponse = serde_json::from_value(body)?;
            let received = page.rows.len() as u64;
            rows.extend(page.rows);

            debug!(query = %query, start, received, total = page.total, "Fetched search page");

            if received == 0 || rows.len() as u64 >= page.total {
                break;
            }
            start += received;
        }

        Ok(rows)
    }
}
