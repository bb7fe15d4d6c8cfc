//! Alert rules keyed by contract term length.
//!
//! Rules are read from a configuration document as [`RawAlertConfig`] and
//! converted once into an immutable [`AlertConfig`], parsing every
//! `alert_before` duration on the way.

use chrono::TimeDelta;
use serde::Deserialize;

use crate::{Error, Result, duration::parse_duration, period::ContractPeriod};

// ─── Raw (deserialised) form ─────────────────────────────────────────────────

/// One rule as written in the configuration file.
#[derive(Debug, Clone, Deserialize)]
pub struct RawAlertRule {
  pub term_months:  u32,
  /// Duration string, e.g. `"2160h"`.
  pub alert_before: String,
}

/// The configuration document: `rules: [{ term_months, alert_before }]`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawAlertConfig {
  #[serde(default)]
  pub rules: Vec<RawAlertRule>,
}

// ─── Parsed form ─────────────────────────────────────────────────────────────

/// For contracts with a `term_months` term, alert once less than
/// `alert_before` is left in the current period.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AlertRule {
  pub term_months:  u32,
  pub alert_before: TimeDelta,
}

/// Ordered set of alert rules. On duplicate terms the first rule wins.
#[derive(Debug, Clone, Default)]
pub struct AlertConfig {
  rules: Vec<AlertRule>,
}

impl AlertConfig {
  pub fn new(rules: Vec<AlertRule>) -> Self { Self { rules } }

  pub fn rules(&self) -> &[AlertRule] { &self.rules }

  /// The first rule whose term matches `term_months` exactly.
  pub fn find_rule(&self, term_months: u32) -> Option<&AlertRule> {
    self.rules.iter().find(|r| r.term_months == term_months)
  }
}

impl TryFrom<RawAlertConfig> for AlertConfig {
  type Error = Error;

  fn try_from(raw: RawAlertConfig) -> Result<Self> {
    let rules = raw
      .rules
      .into_iter()
      .map(|r| {
        let alert_before = parse_duration(r.alert_before.trim()).map_err(
          |source| Error::InvalidRule {
            term_months: r.term_months,
            source,
          },
        )?;
        Ok(AlertRule {
          term_months: r.term_months,
          alert_before,
        })
      })
      .collect::<Result<Vec<_>>>()?;
    Ok(Self { rules })
  }
}

/// Whether `period` is close enough to its end to alert, according to the
/// rule configured for `term_months`.
///
/// A missing rule means "do not alert". The threshold is inclusive.
pub fn should_alert(
  term_months: u32,
  period: &ContractPeriod,
  config: &AlertConfig,
) -> bool {
  config
    .find_rule(term_months)
    .is_some_and(|rule| period.time_left <= rule.alert_before)
}

#[cfg(test)]
mod tests {
  use chrono::{TimeZone, Utc};

  use super::*;
  use crate::duration::ParseDurationError;

  fn raw(rules: &[(u32, &str)]) -> RawAlertConfig {
    RawAlertConfig {
      rules: rules
        .iter()
        .map(|(term, before)| RawAlertRule {
          term_months:  *term,
          alert_before: (*before).to_string(),
        })
        .collect(),
    }
  }

  fn period_with(time_left: TimeDelta) -> ContractPeriod {
    let epoch = Utc.timestamp_opt(0, 0).unwrap();
    ContractPeriod {
      period_start: epoch,
      period_end: epoch,
      time_left,
    }
  }

  #[test]
  fn parses_rules_in_order() {
    let cfg = AlertConfig::try_from(raw(&[(12, "2160h"), (1, "168h")])).unwrap();
    assert_eq!(cfg.rules().len(), 2);
    assert_eq!(cfg.rules()[0].alert_before, TimeDelta::days(90));
    assert_eq!(cfg.rules()[1].term_months, 1);
  }

  #[test]
  fn bad_duration_names_the_term() {
    let err = AlertConfig::try_from(raw(&[(12, "2160h"), (24, "90 days")]))
      .unwrap_err();
    match &err {
      Error::InvalidRule {
        term_months,
        source,
      } => {
        assert_eq!(*term_months, 24);
        assert!(matches!(source, ParseDurationError::UnknownUnit { .. }));
      }
      other => panic!("unexpected error: {other}"),
    }
    assert!(err.to_string().starts_with("rule for term 24:"));
  }

  #[test]
  fn find_rule_first_match_wins() {
    let cfg = AlertConfig::try_from(raw(&[(12, "24h"), (12, "48h")])).unwrap();
    assert_eq!(cfg.find_rule(12).unwrap().alert_before, TimeDelta::hours(24));
    assert!(cfg.find_rule(6).is_none());
  }

  #[test]
  fn alert_with_matching_rule() {
    let cfg = AlertConfig::try_from(raw(&[(12, "2160h")])).unwrap();

    assert!(should_alert(12, &period_with(TimeDelta::days(80)), &cfg));
    assert!(!should_alert(12, &period_with(TimeDelta::days(120)), &cfg));
  }

  #[test]
  fn threshold_is_inclusive() {
    let cfg = AlertConfig::try_from(raw(&[(12, "2160h")])).unwrap();
    assert!(should_alert(12, &period_with(TimeDelta::days(90)), &cfg));
    assert!(!should_alert(
      12,
      &period_with(TimeDelta::days(90) + TimeDelta::nanoseconds(1)),
      &cfg
    ));
  }

  #[test]
  fn no_rule_never_alerts() {
    let cfg = AlertConfig::try_from(raw(&[(6, "2160h")])).unwrap();
    assert!(!should_alert(12, &period_with(TimeDelta::days(10)), &cfg));
    assert!(!should_alert(12, &period_with(TimeDelta::zero()), &cfg));
    assert!(!should_alert(1, &period_with(TimeDelta::zero()), &AlertConfig::default()));
  }
}
