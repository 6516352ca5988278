//! [`SqliteConnector`]: opens `tokio_rusqlite` connections for the [`Pool`].
//!
//! [`Pool`]: crate::pool::Pool

use std::{
  path::{Path, PathBuf},
  time::Duration,
};

use tracing::debug;
use uuid::Uuid;

use crate::{Result, pool::Connector, schema::SCHEMA};

const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Opens connections to one SQLite database and runs schema initialisation
/// on each of them.
#[derive(Debug, Clone)]
pub struct SqliteConnector {
  target:       PathBuf,
  /// Upper bound on how long a statement waits for a lock held by another
  /// connection before failing with `SQLITE_BUSY`.
  busy_timeout: Duration,
}

impl SqliteConnector {
  /// Connect to the database file at `path`, creating it if needed.
  pub fn file(path: impl AsRef<Path>) -> Self {
    Self { target: path.as_ref().to_path_buf(), busy_timeout: DEFAULT_BUSY_TIMEOUT }
  }

  /// A private in-memory database shared by every connection from this
  /// connector, and only by them. It lives as long as at least one
  /// connection is open.
  pub fn memory() -> Self {
    let uri = format!("file:recall-{}?mode=memory&cache=shared", Uuid::new_v4().simple());
    Self { target: PathBuf::from(uri), busy_timeout: DEFAULT_BUSY_TIMEOUT }
  }

  pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
    self.busy_timeout = timeout;
    self
  }
}

impl Connector for SqliteConnector {
  type Connection = tokio_rusqlite::Connection;

  async fn connect(&self) -> Result<tokio_rusqlite::Connection> {
    // Default open flags include SQLITE_OPEN_URI, so `memory()` targets work.
    let conn = tokio_rusqlite::Connection::open(&self.target).await?;
    let busy_timeout = self.busy_timeout;
    conn
      .call(move |conn| {
        conn.busy_timeout(busy_timeout)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    debug!(target = %self.target.display(), "initialised sqlite connection");
    Ok(conn)
  }

  async fn is_healthy<'a>(&'a self, conn: &'a tokio_rusqlite::Connection) -> bool {
    conn
      .call(|conn| {
        conn.query_row("SELECT 1", [], |row| row.get::<_, i64>(0))?;
        Ok(())
      })
      .await
      .is_ok()
  }

  async fn close(&self, conn: tokio_rusqlite::Connection) {
    if let Err(e) = conn.close().await {
      debug!(error = %e, "error while closing sqlite connection");
    }
  }
}
