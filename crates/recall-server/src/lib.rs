//! HTTP front door for the recall scheduler.
//!
//! Exposes an axum [`Router`] backed by any [`Backlog`], plus the pieces the
//! `recall` binary wires together: configuration, the configured notifier
//! and the background ingestion task.

pub mod config;
pub mod error;
pub mod handlers;
pub mod notifier;
pub mod scheduler;

use std::sync::Arc;

use axum::{Router, routing::get};
use recall_core::{
  AuthToken, Backlog, CandidateSource, Committer, Ingestor, Notifier, Selector,
};
use tower_http::trace::TraceLayer;

pub use config::ServerConfig;
pub use error::ApiError;

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all handlers.
pub struct AppState<B, N, S> {
  pub backlog:    Arc<B>,
  pub selector:   Selector<B>,
  pub committer:  Committer<B>,
  pub ingestor:   Ingestor<B>,
  pub notifier:   Arc<N>,
  /// `None` when no feed is configured; `/ingest` then answers 400.
  pub source:     Option<Arc<S>>,
  pub token:      AuthToken,
  pub batch_size: usize,
}

impl<B, N, S> Clone for AppState<B, N, S> {
  fn clone(&self) -> Self {
    Self {
      backlog:    Arc::clone(&self.backlog),
      selector:   self.selector.clone(),
      committer:  self.committer.clone(),
      ingestor:   self.ingestor.clone(),
      notifier:   Arc::clone(&self.notifier),
      source:     self.source.clone(),
      token:      self.token.clone(),
      batch_size: self.batch_size,
    }
  }
}

impl<B: Backlog, N, S> AppState<B, N, S> {
  pub fn new(
    backlog: Arc<B>,
    notifier: Arc<N>,
    source: Option<Arc<S>>,
    token: AuthToken,
    batch_size: usize,
  ) -> Self {
    Self {
      selector: Selector::new(Arc::clone(&backlog)),
      committer: Committer::new(Arc::clone(&backlog), token.clone()),
      ingestor: Ingestor::new(Arc::clone(&backlog)),
      backlog,
      notifier,
      source,
      token,
      batch_size,
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the router for `state`.
pub fn router<B, N, S>(state: AppState<B, N, S>) -> Router
where
  B: Backlog + 'static,
  N: Notifier + 'static,
  S: CandidateSource + 'static,
{
  Router::new()
    .route("/next-batch", get(handlers::next_batch::handler::<B, N, S>))
    .route("/commit", get(handlers::commit::handler::<B, N, S>))
    .route("/ingest", get(handlers::ingest::handler::<B, N, S>))
    .route("/dashboard", get(handlers::dashboard::handler::<B, N, S>))
    .route("/healthz", get(handlers::healthz))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}
