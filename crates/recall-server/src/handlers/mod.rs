//! Route handlers. Every handler is generic over the backlog, the notifier
//! and the ingestion source so tests can swap in fakes.

pub mod commit;
pub mod dashboard;
pub mod ingest;
pub mod next_batch;

use serde::Deserialize;

/// `?token=...` on its own.
#[derive(Debug, Default, Deserialize)]
pub struct TokenParams {
  pub token: Option<String>,
}

/// `GET /healthz`; touches nothing.
pub async fn healthz() -> &'static str { "ok" }
