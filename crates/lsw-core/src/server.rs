//! Dedicated-server records as returned by the Bare Metals v2 API.
//!
//! Only the fields the CLI reasons about are typed. Everything else is kept
//! in a flattened `extra` map so that printing a fetched record reproduces
//! the API response.

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ─── Server ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Server {
  pub id:            String,
  pub asset_id:      Option<String>,
  pub serial_number: Option<String>,
  pub contract:      Option<Contract>,
  pub location:      Option<Location>,
  #[serde(flatten)]
  pub extra:         Map<String, Value>,
}

impl Server {
  /// The customer-facing name of the server: its contract reference, or an
  /// empty string when none is set.
  pub fn display_name(&self) -> &str {
    self
      .contract
      .as_ref()
      .and_then(|c| c.reference.as_deref())
      .unwrap_or_default()
  }
}

/// The commercial contract attached to a server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contract {
  pub id:                Option<String>,
  pub customer_id:       Option<String>,
  /// Free-text reference set by the customer; used as the server's name.
  pub reference:         Option<String>,
  pub starts_at:         Option<DateTime<Utc>>,
  pub ends_at:           Option<DateTime<Utc>>,
  /// Contract term in months.
  pub contract_term:     Option<u32>,
  pub billing_cycle:     Option<u32>,
  pub billing_frequency: Option<String>,
  pub status:            Option<String>,
  pub delivery_status:   Option<String>,
  #[serde(flatten)]
  pub extra:             Map<String, Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Location {
  pub site:  Option<String>,
  pub suite: Option<String>,
  pub rack:  Option<String>,
  pub unit:  Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

// ─── Listings ────────────────────────────────────────────────────────────────

/// The `_metadata` block of paginated list responses.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageMetadata {
  pub total_count: u64,
  pub limit:       u32,
  pub offset:      u32,
}

/// `GET /bareMetals/v2/servers`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServerPage {
  #[serde(rename = "_metadata", default)]
  pub metadata: Option<PageMetadata>,
  #[serde(default)]
  pub servers:  Vec<Server>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperatingSystem {
  pub id:    String,
  pub name:  Option<String>,
  #[serde(flatten)]
  pub extra: Map<String, Value>,
}

/// `GET /bareMetals/v2/operatingSystems`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatingSystemPage {
  #[serde(rename = "_metadata", default)]
  pub metadata:          Option<PageMetadata>,
  #[serde(default)]
  pub operating_systems: Vec<OperatingSystem>,
}

// ─── Credentials ─────────────────────────────────────────────────────────────

/// The kind of credential stored for a server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CredentialType {
  OperatingSystem,
  ControlPanel,
  RemoteManagement,
  RescueMode,
  Switch,
  Pdu,
  Firewall,
  LoadBalancer,
}

impl CredentialType {
  pub const ALL: [Self; 8] = [
    Self::OperatingSystem,
    Self::ControlPanel,
    Self::RemoteManagement,
    Self::RescueMode,
    Self::Switch,
    Self::Pdu,
    Self::Firewall,
    Self::LoadBalancer,
  ];

  /// The wire name, as used in URL paths.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::OperatingSystem => "OPERATING_SYSTEM",
      Self::ControlPanel => "CONTROL_PANEL",
      Self::RemoteManagement => "REMOTE_MANAGEMENT",
      Self::RescueMode => "RESCUE_MODE",
      Self::Switch => "SWITCH",
      Self::Pdu => "PDU",
      Self::Firewall => "FIREWALL",
      Self::LoadBalancer => "LOAD_BALANCER",
    }
  }
}

impl fmt::Display for CredentialType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown credential type {0:?}")]
pub struct UnknownCredentialType(pub String);

impl FromStr for CredentialType {
  type Err = UnknownCredentialType;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|t| t.as_str() == s)
      .ok_or_else(|| UnknownCredentialType(s.to_string()))
  }
}
