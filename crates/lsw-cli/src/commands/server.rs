//! `lsw dedicated-server …`

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use lsw_core::{
  Error,
  alert::AlertConfig,
  api::{IpQuery, ServerApi, ServerQuery},
  check::{ContractCheck, check_contract, check_contracts},
  notify::{MultiNotifier, Notifier},
  page::{fetch_all_operating_systems, fetch_all_servers},
  period::next_renewal,
  server::Server,
};

use crate::{
  AlertArgs, IpArgs, ListArgs, NotifierKind, ServerCommand,
  alert_config::load_alert_config,
  mattermost::{self, MattermostNotifier},
  output::{describe_check, print_batch, print_json, rewrite_smartctl},
};

impl ListArgs {
  fn query(&self) -> ServerQuery {
    ServerQuery {
      limit: None,
      offset: None,
      reference: self.reference.clone(),
      ip: self.ip.clone(),
      mac_address: self.mac_address.clone(),
      site: self.site.clone(),
      private_rack_id: self.private_rack_id.clone(),
      private_network_capable: self.private_network_capable.clone(),
      private_network_enabled: self.private_network_enabled.clone(),
    }
  }
}

impl IpArgs {
  fn query(&self) -> IpQuery {
    IpQuery {
      network_type: self.network_type.clone(),
      version:      self.ip_version.clone(),
      null_routed:  self.null_routed.clone(),
      ips:          self.ips.clone(),
      limit:        Some(self.limit).filter(|l| *l > 0),
      offset:       Some(self.offset).filter(|o| *o > 0),
    }
  }
}

pub async fn run<A: ServerApi>(api: &A, cmd: ServerCommand) -> Result<()> {
  match cmd {
    ServerCommand::List(args) => {
      let servers = fetch_all_servers(api, &args.query(), args.page.limit, args.page.offset)
        .await
        .context("listing servers")?;
      print_json(&servers)
    }
    ServerCommand::ListOs(page) => {
      let systems = fetch_all_operating_systems(api, page.limit, page.offset)
        .await
        .context("listing operating systems")?;
      print_json(&systems)
    }
    ServerCommand::Get { server_id } => {
      let server = api.get_server(&server_id).await.context("retrieving server")?;
      print_json(&server)
    }
    ServerCommand::GetHardware { server_id } => {
      let mut hardware = api
        .get_hardware(&server_id)
        .await
        .context("retrieving hardware")?;
      rewrite_smartctl(&mut hardware);
      print_json(&hardware)
    }
    ServerCommand::GetContractRenewal { server_id } => {
      let server = api.get_server(&server_id).await.context("retrieving server")?;
      let renewal = contract_renewal(&server, Utc::now())?;
      println!("{}", renewal.timestamp_millis());
      Ok(())
    }
    ServerCommand::CheckContract { server_id, alert } => {
      let (config, notifier) = prepare_alerting(&alert)?;
      let now = Utc::now();
      let check = check_one(api, &server_id, &config, notifier.as_ref(), now).await?;
      describe_check(&check, now)
        .iter()
        .for_each(|line| println!("{line}"));
      Ok(())
    }
    ServerCommand::CheckContracts { filters, alert } => {
      let (config, notifier) = prepare_alerting(&alert)?;
      let servers = fetch_all_servers(api, &filters.query(), filters.page.limit, filters.page.offset)
        .await
        .context("listing servers")?;
      println!("Found {} servers, checking contracts...", servers.len());

      let now = Utc::now();
      let report = check_contracts(api, &servers, &config, notifier.as_ref(), now).await;
      print_batch(&report, now);
      Ok(())
    }
    ServerCommand::PowerOn { server_id } => {
      api.power_on(&server_id).await.context("powering on server")?;
      println!("Power-on requested for server {server_id}.");
      Ok(())
    }
    ServerCommand::PowerOff { server_id } => {
      api.power_off(&server_id).await.context("powering off server")?;
      println!("Power-off requested for server {server_id}.");
      Ok(())
    }
    ServerCommand::PowerCycle { server_id } => {
      api
        .power_cycle(&server_id)
        .await
        .context("power cycling server")?;
      println!("Reboot requested for server {server_id}.");
      Ok(())
    }
    ServerCommand::GetCreds {
      server_id,
      credential_type,
      username,
    } => {
      let creds = api
        .get_credential(&server_id, credential_type, &username)
        .await
        .context("retrieving credentials")?;
      print_json(&creds)
    }
    ServerCommand::GetIps(args) => {
      let ips = api
        .list_ips(&args.server_id, &args.query())
        .await
        .context("listing IPs")?;
      print_json(&ips)
    }
    ServerCommand::GetIp { server_id, ip } => {
      let details = api.get_ip(&server_id, &ip).await.context("retrieving IP")?;
      print_json(&details)
    }
  }
}

// ─── Alerting ─────────────────────────────────────────────────────────────────

fn prepare_alerting(args: &AlertArgs) -> Result<(AlertConfig, Box<dyn Notifier>)> {
  let config = load_alert_config(&args.alert_config).context("load alert config")?;
  let notifier =
    build_notifier(&args.notifiers, |name| std::env::var(name).ok()).context("configure notifier")?;
  Ok((config, notifier))
}

/// One channel per requested kind; several kinds are fanned out through a
/// [`MultiNotifier`]. Channel settings are read through `var`.
fn build_notifier(
  kinds: &[NotifierKind],
  var: impl Fn(&str) -> Option<String>,
) -> Result<Box<dyn Notifier>> {
  let mut channels: Vec<Box<dyn Notifier>> = Vec::with_capacity(kinds.len());
  for kind in kinds {
    let channel: Box<dyn Notifier> = match kind {
      NotifierKind::Mattermost => Box::new(MattermostNotifier::from_vars(
        var(mattermost::WEBHOOK_URL_ENV),
        var(mattermost::CHANNEL_ENV),
      )?),
    };
    channels.push(channel);
  }
  match channels.len() {
    0 => anyhow::bail!("no notifier configured"),
    1 => Ok(channels.remove(0)),
    _ => Ok(Box::new(MultiNotifier::new(channels))),
  }
}

async fn check_one<A, N>(
  api: &A,
  server_id: &str,
  config: &AlertConfig,
  notifier: &N,
  now: DateTime<Utc>,
) -> Result<ContractCheck>
where
  A: ServerApi,
  N: Notifier + ?Sized,
{
  let server = api.get_server(server_id).await.context("retrieving server")?;
  println!("Checking contract for server {server_id} ({})", server.display_name());
  Ok(check_contract(&server, config, notifier, now).await?)
}

/// The next renewal boundary of `server`'s contract after `now`.
fn contract_renewal(server: &Server, now: DateTime<Utc>) -> lsw_core::Result<DateTime<Utc>> {
  let contract = server.contract.as_ref();
  let start = contract
    .and_then(|c| c.starts_at)
    .ok_or(Error::ContractIncomplete("start date"))?;
  let term = contract
    .and_then(|c| c.contract_term)
    .filter(|t| *t > 0)
    .ok_or(Error::ContractIncomplete("term"))?;
  Ok(next_renewal(now, start, term))
}
