//! Terminal output: pretty JSON and human-readable check results.

use anyhow::Context;
use chrono::{DateTime, Utc};
use lsw_core::{
  check::{BatchReport, ContractCheck, rfc3339},
  period::format_time_left,
};
use serde::Serialize;
use serde_json::{Value, ser::PrettyFormatter};

/// Serialise `value` as JSON indented with four spaces.
pub fn to_pretty_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
  let mut buf = Vec::new();
  let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"    "));
  value.serialize(&mut ser).context("formatting JSON")?;
  String::from_utf8(buf).context("formatting JSON")
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<()> {
  println!("{}", to_pretty_json(value)?);
  Ok(())
}

/// Replace every boolean `smartctl` field with `"enabled"` / `"disabled"`.
pub fn rewrite_smartctl(value: &mut Value) {
  match value {
    Value::Object(map) => {
      for (key, v) in map.iter_mut() {
        if key == "smartctl"
          && let Value::Bool(enabled) = *v
        {
          *v = Value::from(if enabled { "enabled" } else { "disabled" });
        } else {
          rewrite_smartctl(v);
        }
      }
    }
    Value::Array(items) => items.iter_mut().for_each(rewrite_smartctl),
    _ => {}
  }
}

/// Lines describing the outcome of one contract check.
pub fn describe_check(check: &ContractCheck, now: DateTime<Utc>) -> Vec<String> {
  match check {
    ContractCheck::Incomplete {
      zero_term: true, ..
    } => vec!["Contract term is 0 months, cannot evaluate alarm.".to_string()],
    ContractCheck::Incomplete {
      has_contract,
      has_starts_at,
      has_term,
      ..
    } => vec![format!(
      "Contract information is incomplete, cannot evaluate alarm. Details: \
       hasContract={has_contract}, hasStartsAt={has_starts_at}, hasTerm={has_term}"
    )],
    ContractCheck::NoAlarm { period, .. } => vec![
      format!("Contract period ends at: {}", rfc3339(period.period_end)),
      format!("Time left: {}", format_time_left(period.period_end, now)),
      "No alarm according to alert rules.".to_string(),
    ],
    ContractCheck::Alerted { period, .. } => vec![
      format!("Contract period ends at: {}", rfc3339(period.period_end)),
      format!("Time left: {}", format_time_left(period.period_end, now)),
      "ALARM: notification sent.".to_string(),
    ],
  }
}

/// Print a batch report: one block per server, errors to stderr.
pub fn print_batch(report: &BatchReport, now: DateTime<Utc>) {
  let total = report.entries.len();
  for (index, entry) in report.entries.iter().enumerate() {
    println!("=== {}/{}: {} ({})", index + 1, total, entry.server_id, entry.name);
    match &entry.result {
      Ok(check) => describe_check(check, now).iter().for_each(|line| println!("{line}")),
      Err(e) => eprintln!("Error processing server {}: {e}", entry.server_id),
    }
  }
  println!(
    "Checked {total} servers: {} alarms sent, {} errors.",
    report.alerted(),
    report.failed()
  );
}
