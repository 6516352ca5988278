//! Handler for `GET /next-batch`.

use axum::{
  Json,
  extract::{Query, State},
};
use recall_core::{
  Backlog, CandidateSource, Notifier, notify::deliver_best_effort, question::ScheduledQuestion,
};
use serde::Serialize;

use super::TokenParams;
use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct BatchResponse {
  pub status:    &'static str,
  pub questions: Vec<ScheduledQuestion>,
}

/// `GET /next-batch?token=...`
///
/// Selects the next batch and hands it to the notifier. A failed delivery is
/// logged and the batch is still returned.
pub async fn handler<B, N, S>(
  State(state): State<AppState<B, N, S>>,
  Query(params): Query<TokenParams>,
) -> Result<Json<BatchResponse>, ApiError>
where
  B: Backlog + 'static,
  N: Notifier + 'static,
  S: CandidateSource + 'static,
{
  state.token.check(params.token.as_deref())?;

  let questions = state.selector.select_next(state.batch_size).await?;
  deliver_best_effort(state.notifier.as_ref(), &questions).await;

  Ok(Json(BatchResponse { status: "success", questions }))
}
