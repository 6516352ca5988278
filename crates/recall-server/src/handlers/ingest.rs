//! Handler for `GET /ingest`: one ingestion pass on demand.

use axum::{
  Json,
  extract::{Query, State},
};
use recall_core::{Backlog, CandidateSource, Error, Notifier};
use serde::Serialize;

use super::TokenParams;
use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct IngestResponse {
  pub status:   &'static str,
  /// Urls that were new to the backlog.
  pub inserted: Vec<String>,
}

/// `GET /ingest?token=...`
pub async fn handler<B, N, S>(
  State(state): State<AppState<B, N, S>>,
  Query(params): Query<TokenParams>,
) -> Result<Json<IngestResponse>, ApiError>
where
  B: Backlog + 'static,
  N: Notifier + 'static,
  S: CandidateSource + 'static,
{
  state.token.check(params.token.as_deref())?;

  let source = state
    .source
    .as_deref()
    .ok_or_else(|| Error::InvalidRequest("no ingestion source configured".into()))?;
  let inserted = state.ingestor.pull(source).await?;

  Ok(Json(IngestResponse { status: "success", inserted }))
}
