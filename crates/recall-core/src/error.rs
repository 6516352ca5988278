//! Error taxonomy for `recall-core`.
//!
//! Storage backends convert their own errors into this type (see
//! [`Backlog::Error`](crate::backlog::Backlog::Error)) so that the HTTP
//! boundary only ever maps one enum onto status codes.

use thiserror::Error;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
  /// The pool could not hand out a live connection in time.
  #[error("store unavailable: {0}")]
  StoreUnavailable(#[source] BoxError),

  /// There are no tracked questions to select from.
  #[error("backlog is empty")]
  EmptyBacklog,

  #[error("unauthorized")]
  Unauthorized,

  #[error("invalid request: {0}")]
  InvalidRequest(String),

  /// The commit transaction was rolled back; no counter moved.
  #[error("commit failed: {0}")]
  CommitFailed(#[source] BoxError),

  #[error("store error: {0}")]
  Store(#[source] BoxError),

  #[error("ingestion source error: {0}")]
  Source(#[source] BoxError),
}

impl Error {
  /// Whether re-issuing the same call could succeed.
  ///
  /// Retrying a [`Error::CommitFailed`] is safe because the transaction rolled
  /// back, but a retry after a lost *response* may double-increment.
  pub fn is_retryable(&self) -> bool {
    matches!(self, Self::StoreUnavailable(_) | Self::CommitFailed(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
