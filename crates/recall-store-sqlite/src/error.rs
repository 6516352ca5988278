//! Error type for `recall-store-sqlite`.

use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// A row violated an invariant the schema should have enforced.
  #[error("corrupt row: {0}")]
  Corrupt(String),

  #[error("invalid pool configuration: {0}")]
  Config(String),

  #[error("timed out after {0:?} waiting for a pooled connection")]
  AcquireTimeout(Duration),

  #[error("connection pool is closed")]
  PoolClosed,

  #[error("could not connect after {attempts} attempt(s): {source}")]
  Connect {
    attempts: u32,
    #[source]
    source:   Box<Error>,
  },
}

impl Error {
  /// Connection-level failures: nothing was executed against the store.
  pub fn is_unavailable(&self) -> bool {
    matches!(
      self,
      Self::AcquireTimeout(_)
        | Self::PoolClosed
        | Self::Connect { .. }
        | Self::Database(tokio_rusqlite::Error::ConnectionClosed)
    )
  }
}

impl From<Error> for recall_core::Error {
  fn from(e: Error) -> Self {
    if e.is_unavailable() {
      Self::StoreUnavailable(Box::new(e))
    } else {
      Self::Store(Box::new(e))
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
