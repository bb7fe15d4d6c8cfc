//! Loading of the alert-rules file.
//!
//! ```yaml
//! rules:
//!   - term_months: 12
//!     alert_before: 2160h
//!   - term_months: 1
//!     alert_before: 168h
//! ```
//!
//! The format follows the file extension (YAML, TOML or JSON).

use std::path::Path;

use anyhow::Context;
use lsw_core::alert::{AlertConfig, RawAlertConfig};

pub fn load_alert_config(path: &Path) -> anyhow::Result<AlertConfig> {
  let settings = config::Config::builder()
    .add_source(config::File::from(path))
    .build()
    .with_context(|| format!("failed to read alert config {}", path.display()))?;

  let raw: RawAlertConfig = settings
    .try_deserialize()
    .context("failed to deserialise alert rules")?;

  let config = AlertConfig::try_from(raw)?;
  tracing::debug!(rules = config.rules().len(), "loaded alert rules");
  Ok(config)
}
