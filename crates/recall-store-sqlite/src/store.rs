//! [`SqliteBacklog`]: the SQLite implementation of [`Backlog`].

use std::{path::Path, sync::Arc};

use recall_core::{
  backlog::Backlog,
  question::{Candidate, Question, QuestionId},
};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tracing::debug;

use crate::{
  Error, Result,
  connector::SqliteConnector,
  encode::RawQuestion,
  pool::{Pool, PoolConfig, PoolStatus},
  schema::QUESTION_COLUMNS,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A question backlog backed by a single SQLite database.
///
/// Every operation checks out its own pooled connection and returns it before
/// resolving. Cloning is cheap; clones share the pool.
#[derive(Clone)]
pub struct SqliteBacklog {
  pub(crate) pool: Arc<Pool<SqliteConnector>>,
}

impl SqliteBacklog {
  /// Open (or create) a backlog at `path`.
  pub async fn open(path: impl AsRef<Path>, config: PoolConfig) -> Result<Self> {
    Self::with_connector(SqliteConnector::file(path), config).await
  }

  /// Open a private in-memory backlog, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    Self::with_connector(SqliteConnector::memory(), PoolConfig::default()).await
  }

  pub async fn with_connector(connector: SqliteConnector, config: PoolConfig) -> Result<Self> {
    let pool = Pool::new(connector, config).await?;
    Ok(Self { pool })
  }

  pub fn pool_status(&self) -> PoolStatus { self.pool.status() }

  /// Close the pool. Later operations fail with [`Error::PoolClosed`].
  pub async fn shutdown(&self) { self.pool.close().await }

  /// Run `f` on a pooled connection's thread, then give the connection back.
  async fn with_connection<F, R>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&mut rusqlite::Connection) -> tokio_rusqlite::Result<R> + Send + 'static,
    R: Send + 'static,
  {
    let conn = self.pool.acquire().await?;
    let out = conn.call(f).await?;
    conn.release();
    Ok(out)
  }
}

// ─── Row-level helpers ───────────────────────────────────────────────────────

/// Insert `url` unless it is already tracked. Returns whether a row was
/// created.
fn insert_if_absent(conn: &rusqlite::Connection, url: &str) -> rusqlite::Result<bool> {
  let exists = conn
    .query_row("SELECT 1 FROM questions WHERE url = ?1", [url], |_| Ok(()))
    .optional()?
    .is_some();
  if exists {
    return Ok(false);
  }
  try_insert(conn, url)
}

/// Insert a fresh row, treating a lost race on the `url` unique constraint
/// as "already present".
pub(crate) fn try_insert(conn: &rusqlite::Connection, url: &str) -> rusqlite::Result<bool> {
  match conn.execute(
    "INSERT INTO questions (url, revision_count, last_sent_date) VALUES (?1, 0, NULL)",
    [url],
  ) {
    Ok(_) => Ok(true),
    Err(e) if is_unique_violation(&e) => {
      debug!(url, "url inserted concurrently; treating as present");
      Ok(false)
    }
    Err(e) => Err(e),
  }
}

pub(crate) fn is_unique_violation(e: &rusqlite::Error) -> bool {
  matches!(
    e,
    rusqlite::Error::SqliteFailure(f, _)
      if f.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

fn select_questions(
  conn: &rusqlite::Connection,
  sql: &str,
  params: impl rusqlite::Params,
) -> rusqlite::Result<Vec<RawQuestion>> {
  let mut stmt = conn.prepare(sql)?;
  let rows = stmt
    .query_map(params, RawQuestion::from_row)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn decode_all(raws: Vec<RawQuestion>) -> Result<Vec<Question>> {
  raws.into_iter().map(RawQuestion::into_question).collect()
}

// ─── Backlog impl ────────────────────────────────────────────────────────────

impl Backlog for SqliteBacklog {
  type Error = Error;

  async fn minimum_tier(&self) -> Result<Vec<Question>> {
    // One statement, so the minimum and the tier come from the same snapshot.
    let sql = format!(
      "SELECT {QUESTION_COLUMNS} FROM questions
       WHERE revision_count = (SELECT MIN(revision_count) FROM questions)
       ORDER BY id"
    );
    let raws = self
      .with_connection(move |conn| Ok(select_questions(conn, &sql, [])?))
      .await?;
    decode_all(raws)
  }

  async fn increment_revisions(&self, ids: Vec<QuestionId>) -> Result<u64> {
    self
      .with_connection(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut affected = 0u64;
        {
          let mut stmt = tx.prepare_cached(
            "UPDATE questions SET revision_count = revision_count + 1 WHERE id = ?1",
          )?;
          for id in &ids {
            affected += stmt.execute([id.0])? as u64;
          }
        }
        tx.commit()?;
        Ok(affected)
      })
      .await
  }

  async fn insert_new(&self, candidates: Vec<Candidate>) -> Result<Vec<Candidate>> {
    self
      .with_connection(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let mut inserted = Vec::new();
        for candidate in candidates {
          if insert_if_absent(&tx, &candidate.url)? {
            inserted.push(candidate);
          }
        }
        tx.commit()?;
        Ok(inserted)
      })
      .await
  }

  async fn get_question(&self, id: QuestionId) -> Result<Option<Question>> {
    let sql = format!("SELECT {QUESTION_COLUMNS} FROM questions WHERE id = ?1");
    let raw = self
      .with_connection(move |conn| {
        Ok(conn.query_row(&sql, [id.0], RawQuestion::from_row).optional()?)
      })
      .await?;
    raw.map(RawQuestion::into_question).transpose()
  }

  async fn list_questions(&self) -> Result<Vec<Question>> {
    let sql = format!("SELECT {QUESTION_COLUMNS} FROM questions ORDER BY id");
    let raws = self
      .with_connection(move |conn| Ok(select_questions(conn, &sql, [])?))
      .await?;
    decode_all(raws)
  }
}
