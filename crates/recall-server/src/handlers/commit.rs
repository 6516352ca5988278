//! Handler for `GET /commit`.

use std::collections::BTreeSet;

use axum::{
  Json,
  extract::{Query, State},
};
use recall_core::{Backlog, CandidateSource, CommitResult, Notifier, question::QuestionId};
use serde::{Deserialize, Serialize};

use crate::{AppState, error::ApiError};

#[derive(Debug, Default, Deserialize)]
pub struct CommitParams {
  pub token: Option<String>,
  pub id1:   Option<String>,
  pub id2:   Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CommitResponse {
  pub status: &'static str,
  #[serde(flatten)]
  pub result: CommitResult,
}

fn parse_id(name: &str, raw: Option<&str>) -> Result<QuestionId, ApiError> {
  let raw = raw.ok_or_else(|| ApiError::BadRequest(format!("missing {name}")))?;
  raw
    .parse()
    .map_err(|_| ApiError::BadRequest(format!("{name} is not an integer id: {raw:?}")))
}

/// `GET /commit?token=...&id1=...&id2=...`
///
/// Marks both questions as revised once more. The token is checked before
/// the ids are even looked at.
pub async fn handler<B, N, S>(
  State(state): State<AppState<B, N, S>>,
  Query(params): Query<CommitParams>,
) -> Result<Json<CommitResponse>, ApiError>
where
  B: Backlog + 'static,
  N: Notifier + 'static,
  S: CandidateSource + 'static,
{
  let token = params.token.as_deref();
  state.token.check(token)?;

  let ids = BTreeSet::from([
    parse_id("id1", params.id1.as_deref())?,
    parse_id("id2", params.id2.as_deref())?,
  ]);
  let result = state.committer.commit(ids, token).await?;

  Ok(Json(CommitResponse { status: "success", result }))
}
