//! Async HTTP client wrapping the Leaseweb Bare Metals v2 API.

use std::time::Duration;

use anyhow::Context;
use lsw_core::{
  api::{IpQuery, ServerApi, ServerQuery},
  server::{CredentialType, OperatingSystemPage, Server, ServerPage},
};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "https://api.leaseweb.com";

/// Connection settings for the Leaseweb API.
#[derive(Debug, Clone)]
pub struct ApiConfig {
  pub base_url: String,
  pub api_key:  String,
}

/// An error from a single API request.
#[derive(Debug, Error)]
pub enum ClientError {
  #[error("{method} {path} failed: {source}")]
  Transport {
    method: Method,
    path:   String,
    #[source]
    source: reqwest::Error,
  },

  #[error("{method} {path} → {status}{}", detail(.message))]
  Status {
    method:  Method,
    path:    String,
    status:  StatusCode,
    /// `errorMessage` from the API's error body, when present.
    message: Option<String>,
  },

  #[error("deserialising {path}: {source}")]
  Decode {
    path:   String,
    #[source]
    source: reqwest::Error,
  },
}

fn detail(message: &Option<String>) -> String {
  message
    .as_deref()
    .map(|m| format!(": {m}"))
    .unwrap_or_default()
}

/// Async HTTP client for the dedicated-server API.
///
/// Cheap to clone; the inner [`reqwest::Client`] is `Arc`-based.
#[derive(Debug, Clone)]
pub struct ApiClient {
  client: Client,
  config: ApiConfig,
}

impl ApiClient {
  pub fn new(config: ApiConfig) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self { client, config })
  }

  fn url(&self, path: &str) -> String {
    format!(
      "{}/bareMetals/v2{}",
      self.config.base_url.trim_end_matches('/'),
      path
    )
  }

  fn request(&self, method: Method, path: &str) -> RequestBuilder {
    self
      .client
      .request(method, self.url(path))
      .header("X-LSW-Auth", &self.config.api_key)
  }

  /// Send `req` and fail on any non-success status.
  async fn send(
    &self,
    method: Method,
    path: &str,
    req: RequestBuilder,
  ) -> Result<reqwest::Response, ClientError> {
    tracing::debug!(%method, path, "api request");
    let resp = req.send().await.map_err(|source| ClientError::Transport {
      method: method.clone(),
      path: path.to_string(),
      source,
    })?;

    let status = resp.status();
    if status.is_success() {
      return Ok(resp);
    }

    let message = resp
      .json::<Value>()
      .await
      .ok()
      .and_then(|body| body.get("errorMessage")?.as_str().map(str::to_string));
    Err(ClientError::Status {
      method,
      path: path.to_string(),
      status,
      message,
    })
  }

  async fn get_json<T: DeserializeOwned>(
    &self,
    path: &str,
    query: &[(&str, String)],
  ) -> Result<T, ClientError> {
    let req = self.request(Method::GET, path).query(query);
    let resp = self.send(Method::GET, path, req).await?;
    resp.json().await.map_err(|source| ClientError::Decode {
      path: path.to_string(),
      source,
    })
  }

  async fn post(&self, path: &str) -> Result<(), ClientError> {
    let req = self.request(Method::POST, path);
    self.send(Method::POST, path, req).await?;
    Ok(())
  }
}

impl ServerApi for ApiClient {
  type Error = ClientError;

  // ── Servers ───────────────────────────────────────────────────────────────

  /// `GET /bareMetals/v2/servers`
  async fn list_servers(&self, query: &ServerQuery) -> Result<ServerPage, ClientError> {
    self.get_json("/servers", &query.to_pairs()).await
  }

  /// `GET /bareMetals/v2/servers/{id}`
  async fn get_server(&self, id: &str) -> Result<Server, ClientError> {
    self.get_json(&format!("/servers/{id}"), &[]).await
  }

  /// `GET /bareMetals/v2/servers/{id}/hardwareInfo`
  async fn get_hardware(&self, id: &str) -> Result<Value, ClientError> {
    self.get_json(&format!("/servers/{id}/hardwareInfo"), &[]).await
  }

  /// `GET /bareMetals/v2/operatingSystems`
  async fn list_operating_systems(
    &self,
    limit: u32,
    offset: u32,
  ) -> Result<OperatingSystemPage, ClientError> {
    self
      .get_json(
        "/operatingSystems",
        &[("limit", limit.to_string()), ("offset", offset.to_string())],
      )
      .await
  }

  // ── Power ─────────────────────────────────────────────────────────────────

  /// `POST /bareMetals/v2/servers/{id}/powerOn`
  async fn power_on(&self, id: &str) -> Result<(), ClientError> {
    self.post(&format!("/servers/{id}/powerOn")).await
  }

  /// `POST /bareMetals/v2/servers/{id}/powerOff`
  async fn power_off(&self, id: &str) -> Result<(), ClientError> {
    self.post(&format!("/servers/{id}/powerOff")).await
  }

  /// `POST /bareMetals/v2/servers/{id}/powerCycle`
  async fn power_cycle(&self, id: &str) -> Result<(), ClientError> {
    self.post(&format!("/servers/{id}/powerCycle")).await
  }

  // ── Credentials and IPs ───────────────────────────────────────────────────

  /// `GET /bareMetals/v2/servers/{id}/credentials/{type}/{username}`
  async fn get_credential(
    &self,
    id: &str,
    credential_type: CredentialType,
    username: &str,
  ) -> Result<Value, ClientError> {
    self
      .get_json(&format!("/servers/{id}/credentials/{credential_type}/{username}"), &[])
      .await
  }

  /// `GET /bareMetals/v2/servers/{id}/ips`
  async fn list_ips(&self, id: &str, query: &IpQuery) -> Result<Value, ClientError> {
    self.get_json(&format!("/servers/{id}/ips"), &query.to_pairs()).await
  }

  /// `GET /bareMetals/v2/servers/{id}/ips/{ip}`
  async fn get_ip(&self, id: &str, ip: &str) -> Result<Value, ClientError> {
    self.get_json(&format!("/servers/{id}/ips/{ip}"), &[]).await
  }
}
