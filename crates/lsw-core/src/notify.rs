//! The `Notifier` trait and the fan-out [`MultiNotifier`].
//!
//! Concrete channels (e.g. the Mattermost webhook) live in `lsw-cli`; this
//! module only defines the capability and its composition.

use async_trait::async_trait;

use crate::{Error, Result};

/// A human-readable message delivered through a [`Notifier`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
  pub title: String,
  pub body:  String,
}

/// A channel that can deliver a titled message to an operator.
///
/// Implementations perform no retries; a failed delivery is reported once.
#[async_trait]
pub trait Notifier: Send + Sync {
  async fn notify(&self, title: &str, body: &str) -> Result<()>;
}

#[async_trait]
impl<N: Notifier + ?Sized> Notifier for Box<N> {
  async fn notify(&self, title: &str, body: &str) -> Result<()> {
    (**self).notify(title, body).await
  }
}

/// Sends every notification to all of its channels.
///
/// Channels are called in order and a failing channel never prevents the
/// remaining ones from being tried. All failures are returned together as
/// [`Error::NotifiersFailed`].
#[derive(Default)]
pub struct MultiNotifier {
  channels: Vec<Box<dyn Notifier>>,
}

impl MultiNotifier {
  pub fn new(channels: Vec<Box<dyn Notifier>>) -> Self { Self { channels } }

  pub fn push(&mut self, channel: impl Notifier + 'static) {
    self.channels.push(Box::new(channel));
  }

  pub fn len(&self) -> usize { self.channels.len() }

  pub fn is_empty(&self) -> bool { self.channels.is_empty() }
}

impl std::fmt::Debug for MultiNotifier {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("MultiNotifier")
      .field("channels", &self.channels.len())
      .finish()
  }
}

#[async_trait]
impl Notifier for MultiNotifier {
  async fn notify(&self, title: &str, body: &str) -> Result<()> {
    let mut errors = Vec::new();
    for (index, channel) in self.channels.iter().enumerate() {
      if let Err(e) = channel.notify(title, body).await {
        tracing::warn!(channel = index, error = %e, "notification channel failed");
        errors.push(e);
      }
    }

    if errors.is_empty() {
      Ok(())
    } else {
      Err(Error::NotifiersFailed(errors))
    }
  }
}
