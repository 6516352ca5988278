//! Background ingestion on a fixed interval.

use std::{sync::Arc, time::Duration};

use recall_core::{Backlog, CandidateSource, Ingestor};
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tracing::{error, info};

/// Run one ingestion pass, logging the outcome. Failures never propagate.
pub async fn run_ingest_pass<B, S>(ingestor: &Ingestor<B>, source: &S) -> Option<Vec<String>>
where
  B: Backlog,
  S: CandidateSource,
{
  match ingestor.pull(source).await {
    Ok(inserted) => {
      info!(inserted = inserted.len(), "ingestion pass finished");
      Some(inserted)
    }
    Err(e) => {
      error!(error = %e, "ingestion pass failed");
      None
    }
  }
}

/// Spawn a task that ingests from `source` immediately and then every
/// `every`. Abort the returned handle to stop it.
pub fn spawn_periodic_ingest<B, S>(
  ingestor: Ingestor<B>,
  source: Arc<S>,
  every: Duration,
) -> JoinHandle<()>
where
  B: Backlog + 'static,
  S: CandidateSource + 'static,
{
  info!(interval_secs = every.as_secs(), "periodic ingestion enabled");
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    loop {
      ticker.tick().await;
      run_ingest_pass(&ingestor, source.as_ref()).await;
    }
  })
}
