//! Outbound delivery of a selected batch.
//!
//! Delivery is best-effort: a failed notification never rolls back or alters
//! what the selector already returned.

use std::{convert::Infallible, future::Future};

use tracing::{info, warn};

use crate::question::ScheduledQuestion;

/// A channel that tells the user which questions to review.
pub trait Notifier: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn deliver<'a>(
    &'a self,
    batch: &'a [ScheduledQuestion],
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}

/// Deliver `batch`, logging instead of propagating a failure.
///
/// Returns whether delivery succeeded, for observability only.
pub async fn deliver_best_effort<N: Notifier>(notifier: &N, batch: &[ScheduledQuestion]) -> bool {
  match notifier.deliver(batch).await {
    Ok(()) => true,
    Err(e) => {
      warn!(error = %e, size = batch.len(), "notification failed; batch still returned");
      false
    }
  }
}

/// Notifier that only writes the batch to the log. Used when no outbound
/// channel is configured.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
  type Error = Infallible;

  async fn deliver<'a>(&'a self, batch: &'a [ScheduledQuestion]) -> Result<(), Infallible> {
    for q in batch {
      info!(id = %q.id, url = %q.url, "scheduled for review");
    }
    Ok(())
  }
}
