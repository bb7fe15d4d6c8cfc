//! Contract renewal periods.
//!
//! A fixed-term contract renews every `term_months` calendar months counted
//! from its start date. Terms are always advanced with calendar-month
//! arithmetic, never a fixed number of seconds: one month after 31 January is
//! the last day of February.

use chrono::{DateTime, Months, TimeDelta, Utc};

/// The renewal period a contract is currently in.
///
/// Never stored; computed fresh from `(now, contract_start, term_months)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContractPeriod {
  pub period_start: DateTime<Utc>,
  pub period_end:   DateTime<Utc>,
  /// `period_end - now` at the time of computation.
  pub time_left:    TimeDelta,
}

/// Add `months` calendar months, clamping to the end of shorter months.
/// Saturates at the largest representable instant.
fn add_months(t: DateTime<Utc>, months: u32) -> DateTime<Utc> {
  t.checked_add_months(Months::new(months))
    .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Compute the contract period containing `now`.
///
/// Starting at `contract_start`, the period start is advanced by
/// `term_months` for as long as the following boundary is still strictly
/// before `now`. A boundary equal to `now` is not advanced past, so in that
/// case `period_end == now` and `time_left` is zero. A contract starting in
/// the future yields `period_start == contract_start`.
///
/// `term_months` must be positive; a zero term never advances.
pub fn compute_period(
  now: DateTime<Utc>,
  contract_start: DateTime<Utc>,
  term_months: u32,
) -> ContractPeriod {
  let mut period_start = contract_start;
  loop {
    let next = add_months(period_start, term_months);
    if next >= now || next == period_start {
      break;
    }
    period_start = next;
  }

  let period_end = add_months(period_start, term_months);
  ContractPeriod {
    period_start,
    period_end,
    time_left: period_end - now,
  }
}

/// The first renewal boundary strictly after `now`.
pub fn next_renewal(
  now: DateTime<Utc>,
  contract_start: DateTime<Utc>,
  term_months: u32,
) -> DateTime<Utc> {
  let mut renewal = contract_start;
  while renewal <= now {
    let next = add_months(renewal, term_months);
    if next == renewal {
      break;
    }
    renewal = next;
  }
  renewal
}

/// Render the time between `now` and `period_end` for humans, e.g.
/// `"2 months 10 days"`, `"5 days"` or `"less than a day"`.
///
/// Whole calendar months are counted first; the remainder is expressed in
/// whole 24-hour days.
pub fn format_time_left(period_end: DateTime<Utc>, now: DateTime<Utc>) -> String {
  let mut months = 0u32;
  let mut cursor = now;
  loop {
    let next = add_months(cursor, 1);
    if next > period_end || next == cursor {
      break;
    }
    cursor = next;
    months += 1;
  }

  let days = (period_end - cursor).num_hours() / 24;

  match (months > 0, days > 0) {
    (true, true) => format!("{months} months {days} days"),
    (true, false) => format!("{months} months"),
    (false, true) => format!("{days} days"),
    (false, false) => "less than a day".to_string(),
  }
}

#[cfg(test)]
mod tests {
  use chrono::{Days, TimeZone};

  use super::*;

  fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
  }

  // ─── compute_period ────────────────────────────────────────────────────────

  #[test]
  fn one_year_term_mid_period() {
    let period = compute_period(utc(2024, 6, 15, 12), utc(2022, 1, 1, 0), 12);

    assert_eq!(period.period_start, utc(2024, 1, 1, 0));
    assert_eq!(period.period_end, utc(2025, 1, 1, 0));
    assert!(period.time_left > TimeDelta::zero());
    assert_eq!(period.time_left, utc(2025, 1, 1, 0) - utc(2024, 6, 15, 12));
  }

  #[test]
  fn future_start_does_not_advance() {
    let start = utc(2030, 3, 1, 0);
    let period = compute_period(utc(2024, 6, 15, 0), start, 6);

    assert_eq!(period.period_start, start);
    assert_eq!(period.period_end, utc(2030, 9, 1, 0));
  }

  #[test]
  fn now_on_boundary_ends_current_period() {
    let period = compute_period(utc(2024, 1, 1, 0), utc(2022, 1, 1, 0), 12);

    assert_eq!(period.period_start, utc(2023, 1, 1, 0));
    assert_eq!(period.period_end, utc(2024, 1, 1, 0));
    assert_eq!(period.time_left, TimeDelta::zero());
  }

  #[test]
  fn month_end_start_clamps() {
    // 31 Jan + 1 month clamps to 29 Feb (leap year), then carries the 29th.
    let period = compute_period(utc(2024, 3, 10, 0), utc(2024, 1, 31, 0), 1);

    assert_eq!(period.period_start, utc(2024, 2, 29, 0));
    assert_eq!(period.period_end, utc(2024, 3, 29, 0));
  }

  #[test]
  fn period_contains_now_for_many_inputs() {
    let now = utc(2025, 10, 16, 9);
    for term in [1, 3, 6, 12, 24, 36] {
      for start in [
        utc(2015, 1, 31, 0),
        utc(2019, 2, 28, 23),
        utc(2020, 2, 29, 12),
        utc(2023, 11, 30, 6),
        utc(2025, 10, 15, 10),
      ] {
        let p = compute_period(now, start, term);
        assert!(p.period_start <= now, "start {start} term {term}");
        assert!(now < p.period_end, "start {start} term {term}");
        assert_eq!(p.period_end, add_months(p.period_start, term));
        assert_eq!(p.time_left, p.period_end - now);
      }
    }
  }

  #[test]
  fn compute_period_is_pure() {
    let now = utc(2024, 6, 15, 12);
    let start = utc(2021, 8, 31, 0);
    assert_eq!(compute_period(now, start, 3), compute_period(now, start, 3));
  }

  #[test]
  fn zero_term_terminates() {
    let start = utc(2020, 1, 1, 0);
    let period = compute_period(utc(2024, 1, 1, 0), start, 0);
    assert_eq!(period.period_start, start);
    assert_eq!(period.period_end, start);
  }

  // ─── next_renewal ──────────────────────────────────────────────────────────

  #[test]
  fn next_renewal_is_strictly_after_now() {
    let start = utc(2022, 1, 1, 0);
    assert_eq!(next_renewal(utc(2024, 6, 15, 0), start, 12), utc(2025, 1, 1, 0));
    // On a boundary the renewal moves to the following one.
    assert_eq!(next_renewal(utc(2024, 1, 1, 0), start, 12), utc(2025, 1, 1, 0));
  }

  #[test]
  fn next_renewal_future_start() {
    let start = utc(2030, 1, 1, 0);
    assert_eq!(next_renewal(utc(2024, 1, 1, 0), start, 12), start);
  }

  // ─── format_time_left ──────────────────────────────────────────────────────

  #[test]
  fn months_and_days() {
    let now = utc(2024, 3, 15, 12);
    let end = add_months(now, 2) + Days::new(10);
    assert_eq!(format_time_left(end, now), "2 months 10 days");
  }

  #[test]
  fn only_months() {
    let now = utc(2024, 3, 15, 12);
    assert_eq!(format_time_left(add_months(now, 3), now), "3 months");
  }

  #[test]
  fn only_days() {
    let now = utc(2024, 3, 15, 12);
    assert_eq!(format_time_left(now + TimeDelta::days(5), now), "5 days");
  }

  #[test]
  fn no_singular_forms() {
    let now = utc(2024, 3, 15, 12);
    let end = add_months(now, 1) + Days::new(1);
    assert_eq!(format_time_left(end, now), "1 months 1 days");
  }

  #[test]
  fn less_than_a_day() {
    let now = utc(2024, 3, 15, 12);
    assert_eq!(format_time_left(now, now), "less than a day");
    assert_eq!(
      format_time_left(now + TimeDelta::hours(23), now),
      "less than a day"
    );
    assert_eq!(
      format_time_left(now - TimeDelta::days(3), now),
      "less than a day"
    );
  }
}
