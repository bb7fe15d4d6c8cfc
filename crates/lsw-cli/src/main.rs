//! `lsw`: command-line client for Leaseweb dedicated servers.
//!
//! # Usage
//!
//! ```text
//! lsw login
//! lsw dedicated-server list --site AMS-01
//! lsw dedicated-server check-contracts --alert-config alert-rules.yaml
//! ```

mod alert_config;
mod client;
mod commands;
mod credentials;
mod mattermost;
mod output;

use std::{ffi::OsString, path::PathBuf};

use anyhow::{Result, bail};
use clap::{ArgAction, Args, Parser, Subcommand, ValueEnum};
use client::{ApiClient, ApiConfig, DEFAULT_BASE_URL};
use lsw_core::server::CredentialType;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

// ─── CLI args ─────────────────────────────────────────────────────────────────

#[derive(Parser, Debug)]
#[command(name = "lsw", version, about = "Manage Leaseweb dedicated servers")]
struct Cli {
  /// Leaseweb API key (overrides stored credentials).
  #[arg(long, global = true, env = "LEASEWEB_API_KEY", hide_env_values = true)]
  api_key: Option<String>,

  /// Base URL of the Leaseweb API.
  #[arg(long, global = true, env = "LEASEWEB_API_URL", default_value = DEFAULT_BASE_URL)]
  api_url: String,

  /// Credentials file (default: $XDG_CONFIG_HOME/lsw/credentials.toml).
  #[arg(long, global = true, value_name = "FILE")]
  credentials: Option<PathBuf>,

  /// Increase log verbosity (-v info, -vv debug).
  #[arg(short, long, global = true, action = ArgAction::Count)]
  verbose: u8,

  #[command(subcommand)]
  command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
  /// Store an API key for later invocations.
  Login,
  /// Remove the stored API key.
  Logout,
  /// Show version information.
  Version,
  /// Manage dedicated servers.
  #[command(subcommand)]
  DedicatedServer(ServerCommand),
}

#[derive(Subcommand, Debug)]
enum ServerCommand {
  /// Retrieve the list of servers.
  List(ListArgs),
  /// Retrieve the list of available operating systems.
  ListOs(PageArgs),
  /// Retrieve details of the server by ID.
  Get { server_id: String },
  /// Retrieve hardware details of the server by ID.
  GetHardware { server_id: String },
  /// Print the next contract renewal date in milliseconds since the epoch.
  GetContractRenewal { server_id: String },
  /// Check one server's contract and send an alarm according to the rules.
  CheckContract {
    server_id: String,
    #[command(flatten)]
    alert:     AlertArgs,
  },
  /// Check contracts for all (or filtered) servers and send alarms.
  CheckContracts {
    #[command(flatten)]
    filters: ListArgs,
    #[command(flatten)]
    alert:   AlertArgs,
  },
  /// Power on the server.
  PowerOn { server_id: String },
  /// Power off the server.
  PowerOff { server_id: String },
  /// Power cycle the server.
  #[command(name = "reboot")]
  PowerCycle { server_id: String },
  /// Retrieve the server credentials.
  #[command(
    name = "get-creds",
    after_help = "Examples:\n  lsw dedicated-server get-creds 12345 OPERATING_SYSTEM root\n  \
                  lsw dedicated-server get-creds 12345 REMOTE_MANAGEMENT admin"
  )]
  GetCreds {
    server_id:       String,
    /// OPERATING_SYSTEM, CONTROL_PANEL, REMOTE_MANAGEMENT, RESCUE_MODE,
    /// SWITCH, PDU, FIREWALL or LOAD_BALANCER.
    credential_type: CredentialType,
    username:        String,
  },
  /// List the server's IPs.
  GetIps(IpArgs),
  /// Describe one of the server's IPs.
  GetIp { server_id: String, ip: String },
}

#[derive(Args, Debug, Clone)]
struct PageArgs {
  /// Maximum number of items to retrieve (0 = unlimited).
  #[arg(long, default_value_t = 0)]
  limit:  u32,
  /// Start from the given offset.
  #[arg(long, default_value_t = 0)]
  offset: u32,
}

#[derive(Args, Debug, Clone)]
struct ListArgs {
  #[command(flatten)]
  page:                    PageArgs,
  /// Filter by reference.
  #[arg(long)]
  reference:               Option<String>,
  /// Filter by IP address.
  #[arg(long)]
  ip:                      Option<String>,
  /// Filter by MAC address.
  #[arg(long = "mac")]
  mac_address:             Option<String>,
  /// Filter by site.
  #[arg(long)]
  site:                    Option<String>,
  /// Filter by private rack ID.
  #[arg(long)]
  private_rack_id:         Option<String>,
  /// Filter for private network capable servers.
  #[arg(long)]
  private_network_capable: Option<String>,
  /// Filter for private network enabled servers.
  #[arg(long)]
  private_network_enabled: Option<String>,
}

#[derive(Args, Debug, Clone)]
struct IpArgs {
  server_id:    String,
  /// Filter by network type.
  #[arg(long)]
  network_type: Option<String>,
  /// Filter by IP version.
  #[arg(long = "version")]
  ip_version:   Option<String>,
  /// Filter by null-routed status.
  #[arg(long)]
  null_routed:  Option<String>,
  /// Filter by specific IPs.
  #[arg(long)]
  ips:          Option<String>,
  #[arg(long, default_value_t = 20)]
  limit:        u32,
  #[arg(long, default_value_t = 0)]
  offset:       u32,
}

#[derive(Args, Debug, Clone)]
struct AlertArgs {
  /// Alert rules file (YAML, TOML or JSON).
  #[arg(long, env = "LSW_ALERT_CONFIG", default_value = "alert-rules.yaml")]
  alert_config: PathBuf,
  /// Notification channel; repeat to notify several channels.
  #[arg(long = "notifier", value_enum, default_value = "mattermost")]
  notifiers:    Vec<NotifierKind>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum NotifierKind {
  /// Mattermost incoming webhook (MATTERMOST_WEBHOOK_URL, MATTERMOST_CHANNEL).
  Mattermost,
}

// ─── Entry point ──────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
  let cli = Cli::parse();
  init_tracing(cli.verbose);
  run(cli, |name| std::env::var_os(name)).await
}

/// Dispatch `cli`. The credentials path is only resolved by commands that
/// use it.
async fn run(cli: Cli, var: impl Fn(&str) -> Option<OsString>) -> Result<()> {
  let Cli {
    api_key,
    api_url,
    credentials: credentials_file,
    command,
    ..
  } = cli;
  let credentials_path = || match &credentials_file {
    Some(path) => Ok(path.clone()),
    None => credentials::default_path(&var),
  };

  match command {
    Command::Login => commands::auth::login(&credentials_path()?, api_key),
    Command::Logout => commands::auth::logout(&credentials_path()?),
    Command::Version => {
      println!("{} version {}", env!("CARGO_BIN_NAME"), env!("CARGO_PKG_VERSION"));
      Ok(())
    }
    Command::DedicatedServer(cmd) => {
      let api_key = resolve_api_key(api_key, &credentials_path()?)?;
      let client = ApiClient::new(ApiConfig { base_url: api_url, api_key })?;
      commands::server::run(&client, cmd).await
    }
  }
}

fn init_tracing(verbose: u8) {
  let default = match verbose {
    0 => LevelFilter::WARN,
    1 => LevelFilter::INFO,
    _ => LevelFilter::DEBUG,
  };
  tracing_subscriber::fmt()
    .with_writer(std::io::stderr)
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(default.into())
        .from_env_lossy(),
    )
    .init();
}

/// `--api-key` / `LEASEWEB_API_KEY` first, then the stored credentials.
fn resolve_api_key(flag: Option<String>, credentials_path: &std::path::Path) -> Result<String> {
  if let Some(key) = flag.filter(|k| !k.is_empty()) {
    return Ok(key);
  }
  match credentials::load(credentials_path)? {
    Some(creds) => Ok(creds.api_key),
    None => bail!(
      "API key is required. Set LEASEWEB_API_KEY, use --api-key, or run `lsw login`."
    ),
  }
}

#[cfg(test)]
mod tests {
  use clap::CommandFactory;

  use tempfile::TempDir;

  use super::*;

  #[test]
  fn cli_definition_is_valid() { Cli::command().debug_assert(); }

  #[test]
  fn parses_check_contracts_with_several_notifiers() {
    let cli = Cli::try_parse_from([
      "lsw",
      "dedicated-server",
      "check-contracts",
      "--site",
      "AMS-01",
      "--limit",
      "10",
      "--alert-config",
      "rules.yaml",
      "--notifier",
      "mattermost",
      "--notifier",
      "mattermost",
    ])
    .unwrap();

    let Command::DedicatedServer(ServerCommand::CheckContracts { filters, alert }) = cli.command
    else {
      panic!("wrong command");
    };
    assert_eq!(filters.site.as_deref(), Some("AMS-01"));
    assert_eq!(filters.page.limit, 10);
    assert_eq!(alert.alert_config, PathBuf::from("rules.yaml"));
    assert_eq!(alert.notifiers, vec![NotifierKind::Mattermost; 2]);
  }

  #[test]
  fn rejects_unknown_notifier() {
    let result = Cli::try_parse_from([
      "lsw",
      "dedicated-server",
      "check-contract",
      "1",
      "--notifier",
      "pager",
    ]);
    assert!(result.is_err());
  }

  #[test]
  fn parses_credential_type() {
    let cli = Cli::try_parse_from([
      "lsw",
      "dedicated-server",
      "get-creds",
      "12345",
      "REMOTE_MANAGEMENT",
      "admin",
    ])
    .unwrap();
    assert!(matches!(
      cli.command,
      Command::DedicatedServer(ServerCommand::GetCreds {
        credential_type: CredentialType::RemoteManagement,
        ..
      })
    ));

    assert!(
      Cli::try_parse_from(["lsw", "dedicated-server", "get-creds", "1", "ROOT", "x"]).is_err()
    );
  }

  #[test]
  fn reboot_maps_to_power_cycle() {
    let cli = Cli::try_parse_from(["lsw", "dedicated-server", "reboot", "42"]).unwrap();
    assert!(matches!(
      cli.command,
      Command::DedicatedServer(ServerCommand::PowerCycle { ref server_id }) if server_id == "42"
    ));
  }

  #[tokio::test]
  async fn version_needs_no_config_directory() {
    let cli = Cli::try_parse_from(["lsw", "version"]).unwrap();
    run(cli, |_| None).await.unwrap();

    let cli = Cli::try_parse_from(["lsw", "logout"]).unwrap();
    let err = run(cli, |_| None).await.unwrap_err();
    assert!(err.to_string().contains("HOME"), "{err}");
  }

  #[test]
  fn api_key_precedence() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("credentials.toml");

    assert!(resolve_api_key(None, &path).is_err());

    credentials::save(&path, &credentials::Credentials {
      api_key: "stored".into(),
    })
    .unwrap();
    assert_eq!(resolve_api_key(None, &path).unwrap(), "stored");
    assert_eq!(resolve_api_key(Some("flag".into()), &path).unwrap(), "flag");
    assert_eq!(resolve_api_key(Some(String::new()), &path).unwrap(), "stored");
  }
}
