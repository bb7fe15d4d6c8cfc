//! The `ServerApi` trait and supporting query types.
//!
//! The trait is implemented by the HTTP client in `lsw-cli`. The contract
//! checks in [`crate::check`] depend on this abstraction, not on any concrete
//! client.

use std::future::Future;

use serde_json::Value;

use crate::server::{CredentialType, OperatingSystemPage, Server, ServerPage};

// ─── Query types ─────────────────────────────────────────────────────────────

/// Filters for [`ServerApi::list_servers`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerQuery {
  pub limit:                   Option<u32>,
  pub offset:                  Option<u32>,
  pub reference:               Option<String>,
  pub ip:                      Option<String>,
  pub mac_address:             Option<String>,
  pub site:                    Option<String>,
  pub private_rack_id:         Option<String>,
  pub private_network_capable: Option<String>,
  pub private_network_enabled: Option<String>,
}

impl ServerQuery {
  /// Query-string pairs for the set filters, using the API's parameter names.
  pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    push_num(&mut pairs, "limit", self.limit);
    push_num(&mut pairs, "offset", self.offset);
    push_str(&mut pairs, "reference", &self.reference);
    push_str(&mut pairs, "ip", &self.ip);
    push_str(&mut pairs, "macAddress", &self.mac_address);
    push_str(&mut pairs, "site", &self.site);
    push_str(&mut pairs, "privateRackId", &self.private_rack_id);
    push_str(&mut pairs, "privateNetworkCapable", &self.private_network_capable);
    push_str(&mut pairs, "privateNetworkEnabled", &self.private_network_enabled);
    pairs
  }
}

/// Filters for [`ServerApi::list_ips`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IpQuery {
  pub network_type: Option<String>,
  pub version:      Option<String>,
  pub null_routed:  Option<String>,
  pub ips:          Option<String>,
  pub limit:        Option<u32>,
  pub offset:       Option<u32>,
}

impl IpQuery {
  pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
    let mut pairs = Vec::new();
    push_str(&mut pairs, "networkType", &self.network_type);
    push_str(&mut pairs, "version", &self.version);
    push_str(&mut pairs, "nullRouted", &self.null_routed);
    push_str(&mut pairs, "ips", &self.ips);
    push_num(&mut pairs, "limit", self.limit);
    push_num(&mut pairs, "offset", self.offset);
    pairs
  }
}

fn push_str(
  pairs: &mut Vec<(&'static str, String)>,
  name: &'static str,
  value: &Option<String>,
) {
  if let Some(v) = value.as_deref().filter(|v| !v.is_empty()) {
    pairs.push((name, v.to_string()));
  }
}

fn push_num(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: Option<u32>) {
  if let Some(v) = value {
    pairs.push((name, v.to_string()));
  }
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the dedicated-server API.
///
/// Responses the CLI only prints (hardware, credentials, IPs) are returned as
/// raw JSON. All methods return `Send` futures.
pub trait ServerApi: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Servers ───────────────────────────────────────────────────────────

  /// Fetch one page of servers matching `query`.
  fn list_servers<'a>(
    &'a self,
    query: &'a ServerQuery,
  ) -> impl Future<Output = Result<ServerPage, Self::Error>> + Send + 'a;

  /// Fetch the full record for one server, including its contract.
  fn get_server<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Server, Self::Error>> + Send + 'a;

  fn get_hardware<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'a;

  /// Fetch one page of installable operating systems.
  fn list_operating_systems(
    &self,
    limit: u32,
    offset: u32,
  ) -> impl Future<Output = Result<OperatingSystemPage, Self::Error>> + Send + '_;

  // ── Power ─────────────────────────────────────────────────────────────

  fn power_on<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn power_off<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  fn power_cycle<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;

  // ── Credentials and IPs ───────────────────────────────────────────────

  fn get_credential<'a>(
    &'a self,
    id: &'a str,
    credential_type: CredentialType,
    username: &'a str,
  ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'a;

  fn list_ips<'a>(
    &'a self,
    id: &'a str,
    query: &'a IpQuery,
  ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'a;

  fn get_ip<'a>(
    &'a self,
    id: &'a str,
    ip: &'a str,
  ) -> impl Future<Output = Result<Value, Self::Error>> + Send + 'a;
}
