//! Minimum-first selection with a random tie-break.
//!
//! Only questions at the backlog-wide minimum revision count are eligible;
//! among those a uniform sample is drawn without replacement. Nothing here
//! writes to the store.

use std::sync::Arc;

use rand::{Rng, seq::SliceRandom};
use tracing::debug;

use crate::{
  Error, Result,
  backlog::Backlog,
  question::{Question, ScheduledQuestion},
};

/// Picks the next questions to review.
pub struct Selector<B> {
  backlog: Arc<B>,
}

impl<B> Clone for Selector<B> {
  fn clone(&self) -> Self { Self { backlog: Arc::clone(&self.backlog) } }
}

impl<B: Backlog> Selector<B> {
  pub fn new(backlog: Arc<B>) -> Self { Self { backlog } }

  /// Draw up to `batch_size` questions from the least-revised tier.
  ///
  /// Fails with [`Error::EmptyBacklog`] when nothing is tracked yet, so an
  /// empty backlog is never confused with an empty sample.
  pub async fn select_next(&self, batch_size: usize) -> Result<Vec<ScheduledQuestion>> {
    if batch_size == 0 {
      return Err(Error::InvalidRequest("batch size must be at least 1".into()));
    }

    let tier = self.backlog.minimum_tier().await.map_err(Into::<Error>::into)?;
    if tier.is_empty() {
      return Err(Error::EmptyBacklog);
    }

    let tier_size = tier.len();
    let revision_count = tier[0].revision_count;
    let picked = sample(tier, batch_size, &mut rand::thread_rng());

    debug!(
      revision_count,
      tier_size,
      picked = picked.len(),
      "selected questions from minimum tier"
    );
    Ok(picked)
  }
}

/// Uniform sample of `amount` rows without replacement, in shuffled order.
fn sample<R: Rng + ?Sized>(
  mut tier: Vec<Question>,
  amount: usize,
  rng: &mut R,
) -> Vec<ScheduledQuestion> {
  let (picked, _) = tier.partial_shuffle(rng, amount);
  picked.iter().map(Question::scheduled).collect()
}
