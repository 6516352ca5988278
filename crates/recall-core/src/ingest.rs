//! Ingestion: keep the backlog populated from an external feed.
//!
//! Deduplication is by url. Re-ingesting an overlapping batch is a no-op for
//! every url already tracked, so the feed can be polled blindly.

use std::{future::Future, sync::Arc};

use tracing::{debug, info};

use crate::{Error, Result, backlog::Backlog, question::Candidate};

/// A remote feed of `(title, url)` candidates, e.g. recent accepted
/// submissions on a practice site.
pub trait CandidateSource: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  fn fetch(&self) -> impl Future<Output = Result<Vec<Candidate>, Self::Error>> + Send + '_;
}

pub struct Ingestor<B> {
  backlog: Arc<B>,
}

impl<B> Clone for Ingestor<B> {
  fn clone(&self) -> Self { Self { backlog: Arc::clone(&self.backlog) } }
}

impl<B: Backlog> Ingestor<B> {
  pub fn new(backlog: Arc<B>) -> Self { Self { backlog } }

  /// Track every candidate whose url is new; returns the inserted urls in
  /// input order.
  ///
  /// A malformed candidate rejects the whole batch before the store is
  /// touched.
  pub async fn ingest(&self, candidates: Vec<Candidate>) -> Result<Vec<String>> {
    if candidates.is_empty() {
      return Ok(vec![]);
    }
    for candidate in &candidates {
      candidate.validate()?;
    }

    let offered = candidates.len();
    let inserted = self
      .backlog
      .insert_new(candidates)
      .await
      .map_err(Into::<Error>::into)?;

    for candidate in &inserted {
      debug!(title = %candidate.title, url = %candidate.url, "tracking new question");
    }
    info!(offered, inserted = inserted.len(), "ingested candidate batch");

    Ok(inserted.into_iter().map(|c| c.url).collect())
  }

  /// Fetch a batch from `source` and ingest it.
  pub async fn pull<S: CandidateSource>(&self, source: &S) -> Result<Vec<String>> {
    let candidates = source
      .fetch()
      .await
      .map_err(|e| Error::Source(Box::new(e)))?;
    self.ingest(candidates).await
  }
}
