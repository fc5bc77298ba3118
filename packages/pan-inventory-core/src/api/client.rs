use super::{ApiFactory, DeviceApi};
use crate::config::InventoryConfig;
use crate::error::{InventoryError, Result};
use crate::facts::{parse_api_key, response_error};
use async_trait::async_trait;
use std::time::Duration;

/// XML API client for one firewall or Panorama.
#[derive(Debug, Clone)]
pub struct PanClient {
    host: String,
    api_key: String,
    http: reqwest::Client,
}

fn api_url(host: &str) -> String {
    let host = host.trim().trim_end_matches('/');
    if host.starts_with("https://") || host.starts_with("http://") {
        format!("{}/api/", host)
    } else {
        format!("https://{}/api/", host)
    }
}

fn build_http_client(host: &str, verify_tls: bool, timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .danger_accept_invalid_certs(!verify_tls)
        .build()
        .map_err(|e| InventoryError::remote(host, format!("failed to build HTTP client: {}", e)))
}

/// Turn an HTTP response into its body, mapping HTTP and API errors.
async fn read_body(host: &str, resp: reqwest::Response) -> Result<String> {
    let status = resp.status();
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        let message = response_error(&body).unwrap_or(body);
        tracing::error!("{} returned {}: {}", host, status, message);
        return Err(InventoryError::remote(
            host,
            format!("server returned {}: {}", status, message),
        ));
    }

    let body = resp
        .text()
        .await
        .map_err(|e| InventoryError::remote(host, format!("failed to read response: {}", e)))?;

    if let Some(message) = response_error(&body) {
        return Err(InventoryError::remote(host, message));
    }

    Ok(body)
}

impl PanClient {
    pub fn new(host: &str, api_key: &str, verify_tls: bool, timeout: Duration) -> Result<Self> {
        Ok(Self {
            host: host.to_string(),
            api_key: api_key.to_string(),
            http: build_http_client(host, verify_tls, timeout)?,
        })
    }

    /// Exchange a username and password for an API key (`type=keygen`).
    pub async fn generate_api_key(
        host: &str,
        username: &str,
        password: &str,
        config: &InventoryConfig,
    ) -> Result<String> {
        let http = build_http_client(host, config.verify_tls, config.timeout)?;

        tracing::info!("Requesting API key from {} for user {}", host, username);

        let resp = http
            .post(api_url(host))
            .form(&[("type", "keygen"), ("user", username), ("password", password)])
            .send()
            .await
            .map_err(|e| InventoryError::remote(host, e))?;

        let body = read_body(host, resp).await?;
        parse_api_key(&body)
    }
}

#[async_trait]
impl DeviceApi for PanClient {
    fn host(&self) -> &str {
        &self.host
    }

    async fn op(&self, cmd: &str) -> Result<String> {
        tracing::trace!("{} <- {}", self.host, cmd);

        let resp = self
            .http
            .get(api_url(&self.host))
            .query(&[("type", "op"), ("cmd", cmd), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| InventoryError::remote(&self.host, e))?;

        let body = read_body(&self.host, resp).await?;
        tracing::trace!("{} -> {} bytes", self.host, body.len());
        Ok(body)
    }
}

/// Opens [`PanClient`]s sharing one key and transport settings.
#[derive(Debug, Clone)]
pub struct PanClientFactory {
    api_key: String,
    verify_tls: bool,
    timeout: Duration,
}

impl PanClientFactory {
    pub fn new(config: &InventoryConfig, api_key: String) -> Self {
        Self {
            api_key,
            verify_tls: config.verify_tls,
            timeout: config.timeout,
        }
    }
}

impl ApiFactory for PanClientFactory {
    fn connect(&self, host: &str) -> Result<Box<dyn DeviceApi>> {
        Ok(Box::new(PanClient::new(
            host,
            &self.api_key,
            self.verify_tls,
            self.timeout,
        )?))
    }
}
