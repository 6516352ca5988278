//! The `Backlog` trait: the storage seam of the scheduler.
//!
//! The trait is implemented by storage backends (e.g. `recall-store-sqlite`).
//! Each method is one unit of work against the store: an implementation
//! acquires its own connection, runs a single statement or transaction, and
//! gives the connection back before the future resolves.

use std::future::Future;

use crate::question::{Candidate, Question, QuestionId};

/// Abstraction over a question backlog backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait Backlog: Send + Sync {
  /// Backend errors must classify themselves into the core taxonomy;
  /// connection-level failures should become
  /// [`Error::StoreUnavailable`](crate::Error::StoreUnavailable).
  type Error: std::error::Error + Send + Sync + 'static + Into<crate::Error>;

  /// Every question whose revision count equals the backlog-wide minimum.
  ///
  /// Returns an empty vector only when the backlog itself is empty.
  fn minimum_tier(
    &self,
  ) -> impl Future<Output = Result<Vec<Question>, Self::Error>> + Send + '_;

  /// Increment the revision count of every id by one, all in one
  /// transaction. Returns the number of rows actually changed; unknown ids
  /// contribute nothing.
  fn increment_revisions(
    &self,
    ids: Vec<QuestionId>,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;

  /// Insert every candidate whose url is not yet tracked, in input order.
  /// Returns the candidates that were actually inserted.
  fn insert_new(
    &self,
    candidates: Vec<Candidate>,
  ) -> impl Future<Output = Result<Vec<Candidate>, Self::Error>> + Send + '_;

  /// Retrieve a question by id. Returns `None` if not found.
  fn get_question(
    &self,
    id: QuestionId,
  ) -> impl Future<Output = Result<Option<Question>, Self::Error>> + Send + '_;

  /// List every tracked question, ordered by id.
  fn list_questions(
    &self,
  ) -> impl Future<Output = Result<Vec<Question>, Self::Error>> + Send + '_;
}
