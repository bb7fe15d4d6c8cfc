//! Parsing of duration strings such as `"2160h"`, `"1h30m"` or `"1.5h"`.
//!
//! A duration is an optionally signed sequence of decimal numbers, each with
//! an optional fraction and a mandatory unit suffix. Valid units are `ns`,
//! `us` (or `µs`), `ms`, `s`, `m` and `h`. The bare string `"0"` is accepted
//! without a unit.

use chrono::TimeDelta;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDurationError {
  #[error("invalid duration {0:?}")]
  Invalid(String),

  #[error("missing unit in duration {0:?}")]
  MissingUnit(String),

  #[error("unknown unit {unit:?} in duration {input:?}")]
  UnknownUnit { unit: String, input: String },

  #[error("duration {0:?} is out of range")]
  OutOfRange(String),
}

const NANOS_PER_MICRO: u64 = 1_000;
const NANOS_PER_MILLI: u64 = 1_000_000;
const NANOS_PER_SECOND: u64 = 1_000_000_000;

/// Unit suffixes and their length in nanoseconds.
const UNITS: &[(&str, u64)] = &[
  ("ns", 1),
  ("us", NANOS_PER_MICRO),
  ("µs", NANOS_PER_MICRO), // U+00B5 micro sign
  ("μs", NANOS_PER_MICRO), // U+03BC greek mu
  ("ms", NANOS_PER_MILLI),
  ("s", NANOS_PER_SECOND),
  ("m", 60 * NANOS_PER_SECOND),
  ("h", 3_600 * NANOS_PER_SECOND),
];

/// Parse a duration string into a [`TimeDelta`] with nanosecond precision.
pub fn parse_duration(input: &str) -> Result<TimeDelta, ParseDurationError> {
  let invalid = || ParseDurationError::Invalid(input.to_string());
  let out_of_range = || ParseDurationError::OutOfRange(input.to_string());

  let (negative, mut rest) = if let Some(tail) = input.strip_prefix('-') {
    (true, tail)
  } else if let Some(tail) = input.strip_prefix('+') {
    (false, tail)
  } else {
    (false, input)
  };

  if rest == "0" {
    return Ok(TimeDelta::zero());
  }
  if rest.is_empty() {
    return Err(invalid());
  }

  let mut total: u64 = 0;
  while !rest.is_empty() {
    let (whole, after) = split_digits(rest);
    let (fraction, after) = match after.strip_prefix('.') {
      Some(tail) => split_digits(tail),
      None => ("", after),
    };
    if whole.is_empty() && fraction.is_empty() {
      return Err(invalid());
    }

    let unit_len = after
      .find(|c: char| c == '.' || c.is_ascii_digit())
      .unwrap_or(after.len());
    if unit_len == 0 {
      return Err(ParseDurationError::MissingUnit(input.to_string()));
    }
    let (unit, tail) = after.split_at(unit_len);
    let scale = UNITS
      .iter()
      .find(|(name, _)| *name == unit)
      .map(|(_, scale)| *scale)
      .ok_or_else(|| ParseDurationError::UnknownUnit {
        unit:  unit.to_string(),
        input: input.to_string(),
      })?;

    let whole: u64 = if whole.is_empty() {
      0
    } else {
      whole.parse().map_err(|_| out_of_range())?
    };
    let mut value = whole.checked_mul(scale).ok_or_else(out_of_range)?;
    if !fraction.is_empty() {
      value = value
        .checked_add(fraction_nanos(fraction, scale))
        .ok_or_else(out_of_range)?;
    }

    total = total.checked_add(value).ok_or_else(out_of_range)?;
    rest = tail;
  }

  let nanos = i64::try_from(total).map_err(|_| out_of_range())?;
  Ok(TimeDelta::nanoseconds(if negative { -nanos } else { nanos }))
}

fn split_digits(s: &str) -> (&str, &str) {
  let len = s.bytes().take_while(u8::is_ascii_digit).count();
  s.split_at(len)
}

/// Nanoseconds contributed by the fractional digits of a component.
/// Digits beyond nanosecond precision are truncated.
fn fraction_nanos(digits: &str, scale: u64) -> u64 {
  let mut nanos = 0u64;
  let mut place = scale;
  for d in digits.bytes() {
    place /= 10;
    if place == 0 {
      break;
    }
    nanos += u64::from(d - b'0') * place;
  }
  nanos
}
