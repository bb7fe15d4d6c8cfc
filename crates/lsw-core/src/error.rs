//! Error types for `lsw-core`.

use thiserror::Error;

use crate::duration::ParseDurationError;

#[derive(Debug, Error)]
pub enum Error {
  #[error("rule for term {term_months}: {source}")]
  InvalidRule {
    term_months: u32,
    #[source]
    source:      ParseDurationError,
  },

  /// A single notification channel failed to deliver.
  #[error("{0}")]
  Notify(#[source] Box<dyn std::error::Error + Send + Sync>),

  /// One or more channels of a [`crate::notify::MultiNotifier`] failed.
  #[error("some notifiers failed: [{}]", join(.0))]
  NotifiersFailed(Vec<Error>),

  #[error("sending notification: {0}")]
  SendNotification(#[source] Box<Error>),

  #[error("api error: {0}")]
  Api(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("contract {0} is missing in API response")]
  ContractIncomplete(&'static str),
}

impl Error {
  /// Wrap a backend error from a [`crate::api::ServerApi`] implementation.
  pub fn api<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Api(Box::new(err))
  }
}

fn join(errors: &[Error]) -> String {
  errors
    .iter()
    .map(ToString::to_string)
    .collect::<Vec<_>>()
    .join("; ")
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
