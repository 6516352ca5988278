//! Committing reviews: one increment per referenced question, all or nothing.
//!
//! A commit is **not** idempotent across calls. Sending the same ids twice
//! increments them twice; the caller owns duplicate-submission protection.

use std::{collections::BTreeSet, sync::Arc};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{
  Error, Result,
  auth::AuthToken,
  backlog::Backlog,
  question::QuestionId,
};

/// Outcome of a successful [`Committer::commit`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitResult {
  /// The requested ids, ascending and deduplicated.
  pub updated_ids:   Vec<QuestionId>,
  /// Rows actually incremented. Lower than `updated_ids.len()` when some ids
  /// are unknown; those are deliberately not an error.
  pub rows_affected: u64,
}

pub struct Committer<B> {
  backlog: Arc<B>,
  token:   AuthToken,
}

impl<B> Clone for Committer<B> {
  fn clone(&self) -> Self {
    Self { backlog: Arc::clone(&self.backlog), token: self.token.clone() }
  }
}

impl<B: Backlog> Committer<B> {
  pub fn new(backlog: Arc<B>, token: AuthToken) -> Self { Self { backlog, token } }

  /// Increment the revision count of every id in `ids` by exactly one.
  ///
  /// The token is checked before anything else; an unauthorized call never
  /// reaches the store. Store failures inside the transaction are reported
  /// as [`Error::CommitFailed`]; failing to get a connection at all stays
  /// [`Error::StoreUnavailable`].
  pub async fn commit(
    &self,
    ids: BTreeSet<QuestionId>,
    auth_token: Option<&str>,
  ) -> Result<CommitResult> {
    self.token.check(auth_token)?;

    if ids.is_empty() {
      return Err(Error::InvalidRequest("no question ids to commit".into()));
    }

    let updated_ids: Vec<QuestionId> = ids.into_iter().collect();
    let rows_affected = self
      .backlog
      .increment_revisions(updated_ids.clone())
      .await
      .map_err(|e| match Into::<Error>::into(e) {
        Error::Store(source) => Error::CommitFailed(source),
        other => other,
      })?;

    info!(ids = ?updated_ids, rows_affected, "committed revisions");
    Ok(CommitResult { updated_ids, rows_affected })
  }
}
