//! Handler for `GET /dashboard`.

use axum::{
  Json,
  extract::{Query, State},
};
use recall_core::{Backlog, CandidateSource, Error, Notifier, stats::Dashboard};
use serde::Serialize;

use super::TokenParams;
use crate::{AppState, error::ApiError};

#[derive(Debug, Serialize)]
pub struct DashboardResponse {
  pub status:    &'static str,
  #[serde(flatten)]
  pub dashboard: Dashboard,
}

/// `GET /dashboard?token=...`
pub async fn handler<B, N, S>(
  State(state): State<AppState<B, N, S>>,
  Query(params): Query<TokenParams>,
) -> Result<Json<DashboardResponse>, ApiError>
where
  B: Backlog + 'static,
  N: Notifier + 'static,
  S: CandidateSource + 'static,
{
  state.token.check(params.token.as_deref())?;

  let questions = state
    .backlog
    .list_questions()
    .await
    .map_err(Into::<Error>::into)?;

  Ok(Json(DashboardResponse { status: "success", dashboard: Dashboard::from_questions(questions) }))
}
