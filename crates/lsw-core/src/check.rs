//! Contract-renewal checks: evaluate a server's contract against the alert
//! rules and notify when the current period is about to end.

use chrono::{DateTime, SecondsFormat, Utc};
use tracing::{error, info, warn};

use crate::{
  Error, Result,
  alert::{AlertConfig, should_alert},
  api::ServerApi,
  notify::{Notification, Notifier},
  period::{ContractPeriod, compute_period, format_time_left},
  server::Server,
};

pub const ALARM_TITLE: &str = "⚠️ Dedicated server contract alarm";

/// What happened when a single server's contract was checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractCheck {
  /// The record lacks the data needed to evaluate the contract.
  ///
  /// `zero_term` is set when a term is present but is 0 months, which has no
  /// renewal periods.
  Incomplete {
    has_contract:  bool,
    has_starts_at: bool,
    has_term:      bool,
    zero_term:     bool,
  },
  /// The period was computed and no rule fired.
  NoAlarm {
    term_months: u32,
    period:      ContractPeriod,
  },
  /// A rule fired and the notification was delivered.
  Alerted {
    term_months:  u32,
    period:       ContractPeriod,
    notification: Notification,
  },
}

/// Evaluate `server`'s contract at `now` and notify through `notifier` when
/// the rule for its term fires.
///
/// Incomplete contract data is not an error: it is logged and reported as
/// [`ContractCheck::Incomplete`]. Only a failed delivery is an error.
pub async fn check_contract<N>(
  server: &Server,
  config: &AlertConfig,
  notifier: &N,
  now: DateTime<Utc>,
) -> Result<ContractCheck>
where
  N: Notifier + ?Sized,
{
  let contract = server.contract.as_ref();
  let starts_at = contract.and_then(|c| c.starts_at);
  let raw_term = contract.and_then(|c| c.contract_term);
  let term = raw_term.filter(|t| *t > 0);

  let (Some(start), Some(term_months)) = (starts_at, term) else {
    let check = ContractCheck::Incomplete {
      has_contract:  contract.is_some(),
      has_starts_at: starts_at.is_some(),
      has_term:      raw_term.is_some(),
      zero_term:     raw_term == Some(0),
    };
    warn!(
      server_id = %server.id,
      has_contract = contract.is_some(),
      has_starts_at = starts_at.is_some(),
      has_term = raw_term.is_some(),
      zero_term = raw_term == Some(0),
      "contract information is incomplete, cannot evaluate alarm"
    );
    return Ok(check);
  };

  let period = compute_period(now, start, term_months);
  info!(
    server_id = %server.id,
    term_months,
    period_end = %rfc3339(period.period_end),
    time_left_hours = period.time_left.num_hours(),
    "computed contract period"
  );

  if !should_alert(term_months, &period, config) {
    info!(server_id = %server.id, "no alarm according to alert rules");
    return Ok(ContractCheck::NoAlarm {
      term_months,
      period,
    });
  }

  let notification = alarm_notification(server, term_months, &period, now);
  info!(server_id = %server.id, "alarm: sending notification");
  notifier
    .notify(&notification.title, &notification.body)
    .await
    .map_err(|e| Error::SendNotification(Box::new(e)))?;

  Ok(ContractCheck::Alerted {
    term_months,
    period,
    notification,
  })
}

/// Compose the alarm message for a contract whose period ends soon.
pub fn alarm_notification(
  server: &Server,
  term_months: u32,
  period: &ContractPeriod,
  now: DateTime<Utc>,
) -> Notification {
  let body = format!(
    "Server Name: {}\nServer ID: {}\nContract term: {} months\nEnds at: {}\nTime left: {}",
    server.display_name(),
    server.id,
    term_months,
    rfc3339(period.period_end),
    format_time_left(period.period_end, now),
  );
  Notification {
    title: ALARM_TITLE.to_string(),
    body,
  }
}

/// RFC 3339 with whole seconds and a `Z` suffix.
pub fn rfc3339(t: DateTime<Utc>) -> String {
  t.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// ─── Batch ───────────────────────────────────────────────────────────────────

/// Outcome of checking one server in a batch.
#[derive(Debug)]
pub struct BatchEntry {
  pub server_id: String,
  pub name:      String,
  pub result:    Result<ContractCheck>,
}

/// Per-server outcomes of [`check_contracts`], in input order.
#[derive(Debug, Default)]
pub struct BatchReport {
  pub entries: Vec<BatchEntry>,
}

impl BatchReport {
  pub fn alerted(&self) -> usize {
    self
      .entries
      .iter()
      .filter(|e| matches!(e.result, Ok(ContractCheck::Alerted { .. })))
      .count()
  }

  pub fn failed(&self) -> usize { self.entries.iter().filter(|e| e.result.is_err()).count() }
}

/// Check every server in `servers`.
///
/// The listing endpoint omits contract details, so each server's full record
/// is fetched through `api` first. A failure for one server (fetching or
/// notifying) is logged and recorded, and the batch moves on.
pub async fn check_contracts<A, N>(
  api: &A,
  servers: &[Server],
  config: &AlertConfig,
  notifier: &N,
  now: DateTime<Utc>,
) -> BatchReport
where
  A: ServerApi,
  N: Notifier + ?Sized,
{
  let total = servers.len();
  info!(total, "checking contracts");

  let mut report = BatchReport::default();
  for (index, listed) in servers.iter().enumerate() {
    let server_id = listed.id.clone();
    let name = listed.display_name().to_string();
    info!(position = index + 1, total, server_id = %server_id, name = %name, "checking server");

    let result = match api.get_server(&server_id).await {
      Ok(detailed) => check_contract(&detailed, config, notifier, now).await,
      Err(e) => Err(Error::api(e)),
    };
    if let Err(e) = &result {
      error!(server_id = %server_id, error = %e, "error processing server");
    }

    report.entries.push(BatchEntry {
      server_id,
      name,
      result,
    });
  }
  report
}
