//! Mattermost incoming-webhook notification channel.

use std::time::Duration;

use anyhow::{Context, bail};
use async_trait::async_trait;
use lsw_core::{Error, notify::Notifier};
use reqwest::Client;
use serde_json::{Value, json};

pub const WEBHOOK_URL_ENV: &str = "MATTERMOST_WEBHOOK_URL";
pub const CHANNEL_ENV: &str = "MATTERMOST_CHANNEL";

/// Posts notifications to a Mattermost incoming webhook.
#[derive(Debug, Clone)]
pub struct MattermostNotifier {
  client:      Client,
  webhook_url: String,
  /// Overrides the webhook's default channel when set.
  channel:     Option<String>,
}

impl MattermostNotifier {
  pub fn new(webhook_url: impl Into<String>, channel: Option<String>) -> anyhow::Result<Self> {
    let client = Client::builder()
      .timeout(Duration::from_secs(30))
      .build()
      .context("failed to build HTTP client")?;
    Ok(Self {
      client,
      webhook_url: webhook_url.into(),
      channel: channel.filter(|c| !c.is_empty()),
    })
  }

  /// Build from the values of `MATTERMOST_WEBHOOK_URL` (required) and
  /// `MATTERMOST_CHANNEL`.
  pub fn from_vars(webhook_url: Option<String>, channel: Option<String>) -> anyhow::Result<Self> {
    let Some(webhook_url) = webhook_url.filter(|u| !u.is_empty()) else {
      bail!("{WEBHOOK_URL_ENV} is empty");
    };
    Self::new(webhook_url, channel)
  }

  fn payload(&self, title: &str, body: &str) -> Value {
    let mut payload = json!({ "text": format!("**{title}**\n{body}") });
    if let Some(channel) = &self.channel {
      payload["channel"] = Value::String(channel.clone());
    }
    payload
  }
}

#[async_trait]
impl Notifier for MattermostNotifier {
  async fn notify(&self, title: &str, body: &str) -> lsw_core::Result<()> {
    let resp = self
      .client
      .post(&self.webhook_url)
      .json(&self.payload(title, body))
      .send()
      .await
      .map_err(|e| Error::Notify(format!("posting to mattermost webhook: {e}").into()))?;

    let status = resp.status();
    if status.as_u16() >= 300 {
      return Err(Error::Notify(
        format!("mattermost webhook returned {status}").into(),
      ));
    }
    tracing::debug!(%status, "mattermost notification delivered");
    Ok(())
  }
}
