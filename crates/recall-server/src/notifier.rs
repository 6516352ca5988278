//! The notifier chosen at start-up from configuration.

use recall_core::{LogNotifier, Notifier, question::ScheduledQuestion};
use recall_remote::{EmailJsConfig, EmailJsNotifier};

#[derive(Debug, Clone)]
pub enum ConfiguredNotifier {
  Log(LogNotifier),
  EmailJs(EmailJsNotifier),
}

impl ConfiguredNotifier {
  /// EmailJS when an `[email]` section is present, logging otherwise.
  pub fn from_config(email: Option<&EmailJsConfig>) -> recall_remote::Result<Self> {
    match email {
      Some(cfg) => Ok(Self::EmailJs(EmailJsNotifier::new(cfg.clone())?)),
      None => Ok(Self::Log(LogNotifier)),
    }
  }
}

impl Notifier for ConfiguredNotifier {
  type Error = recall_remote::Error;

  async fn deliver<'a>(&'a self, batch: &'a [ScheduledQuestion]) -> recall_remote::Result<()> {
    match self {
      Self::Log(n) => match n.deliver(batch).await {
        Ok(()) => Ok(()),
        Err(never) => match never {},
      },
      Self::EmailJs(n) => n.deliver(batch).await,
    }
  }
}
