//! In-memory fakes for the `ServerApi` and `Notifier` traits.

use std::{
  collections::{HashMap, HashSet},
  sync::Mutex,
};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::{Value, json};

use crate::{
  Error, Result,
  api::{IpQuery, ServerApi, ServerQuery},
  notify::Notifier,
  server::{Contract, CredentialType, OperatingSystemPage, Server, ServerPage},
};

// ─── FakeApi ─────────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
#[error("fake api: {0}")]
pub struct FakeApiError(pub String);

/// Serves a fixed server list; `get_server` returns the detailed record if
/// one was registered, otherwise the listed record.
#[derive(Default)]
pub struct FakeApi {
  servers:      Vec<Server>,
  details:      HashMap<String, Server>,
  failing:      HashSet<String>,
  list_queries: Mutex<Vec<ServerQuery>>,
}

impl FakeApi {
  pub fn with_servers(servers: impl IntoIterator<Item = Server>) -> Self {
    Self {
      servers: servers.into_iter().collect(),
      ..Default::default()
    }
  }

  pub fn server(id: &str) -> Server {
    Server {
      id: id.to_string(),
      ..Default::default()
    }
  }

  pub fn server_with_contract(
    id: &str,
    reference: &str,
    starts_at: DateTime<Utc>,
    term: u32,
  ) -> Server {
    Server {
      id: id.to_string(),
      contract: Some(Contract {
        reference: Some(reference.to_string()),
        starts_at: Some(starts_at),
        contract_term: Some(term),
        ..Default::default()
      }),
      ..Default::default()
    }
  }

  pub fn detail(mut self, server: Server) -> Self {
    self.details.insert(server.id.clone(), server);
    self
  }

  pub fn failing(mut self, id: &str) -> Self {
    self.failing.insert(id.to_string());
    self
  }

  pub fn list_queries(&self) -> Vec<ServerQuery> {
    self.list_queries.lock().unwrap().clone()
  }
}

impl ServerApi for FakeApi {
  type Error = FakeApiError;

  async fn list_servers(&self, query: &ServerQuery) -> Result<ServerPage, FakeApiError> {
    self.list_queries.lock().unwrap().push(query.clone());
    let offset = query.offset.unwrap_or(0) as usize;
    let limit = query.limit.unwrap_or(50) as usize;
    let servers = self.servers.iter().skip(offset).take(limit).cloned().collect();
    Ok(ServerPage {
      metadata: None,
      servers,
    })
  }

  async fn get_server(&self, id: &str) -> Result<Server, FakeApiError> {
    if self.failing.contains(id) {
      return Err(FakeApiError(format!("server {id} unavailable")));
    }
    self
      .details
      .get(id)
      .or_else(|| self.servers.iter().find(|s| s.id == id))
      .cloned()
      .ok_or_else(|| FakeApiError(format!("server {id} not found")))
  }

  async fn get_hardware(&self, id: &str) -> Result<Value, FakeApiError> {
    Ok(json!({ "serverId": id }))
  }

  async fn list_operating_systems(
    &self,
    _limit: u32,
    _offset: u32,
  ) -> Result<OperatingSystemPage, FakeApiError> {
    Ok(OperatingSystemPage::default())
  }

  async fn power_on(&self, _id: &str) -> Result<(), FakeApiError> { Ok(()) }

  async fn power_off(&self, _id: &str) -> Result<(), FakeApiError> { Ok(()) }

  async fn power_cycle(&self, _id: &str) -> Result<(), FakeApiError> { Ok(()) }

  async fn get_credential(
    &self,
    _id: &str,
    credential_type: CredentialType,
    username: &str,
  ) -> Result<Value, FakeApiError> {
    Ok(json!({ "type": credential_type, "username": username }))
  }

  async fn list_ips(&self, _id: &str, _query: &IpQuery) -> Result<Value, FakeApiError> {
    Ok(json!({ "ips": [] }))
  }

  async fn get_ip(&self, _id: &str, ip: &str) -> Result<Value, FakeApiError> {
    Ok(json!({ "ip": ip }))
  }
}

// ─── RecordingNotifier ───────────────────────────────────────────────────────

/// Records every notification; fails every call when built with
/// [`RecordingNotifier::failing`].
#[derive(Default)]
pub struct RecordingNotifier {
  fail_with: Option<String>,
  sent:      Mutex<Vec<(String, String)>>,
}

impl RecordingNotifier {
  pub fn failing(message: &str) -> Self {
    Self {
      fail_with: Some(message.to_string()),
      ..Default::default()
    }
  }

  pub fn sent(&self) -> Vec<(String, String)> { self.sent.lock().unwrap().clone() }
}

#[async_trait]
impl Notifier for RecordingNotifier {
  async fn notify(&self, title: &str, body: &str) -> Result<()> {
    self
      .sent
      .lock()
      .unwrap()
      .push((title.to_string(), body.to_string()));
    match &self.fail_with {
      Some(message) => Err(Error::Notify(message.clone().into())),
      None => Ok(()),
    }
  }
}

/// Lets tests keep a handle on a notifier after boxing it into a
/// [`crate::notify::MultiNotifier`].
#[async_trait]
impl Notifier for std::sync::Arc<RecordingNotifier> {
  async fn notify(&self, title: &str, body: &str) -> Result<()> {
    self.as_ref().notify(title, body).await
  }
}
