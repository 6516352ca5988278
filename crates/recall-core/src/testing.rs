//! In-memory [`Backlog`] used by the component tests in this crate.

use std::sync::{
  Mutex,
  atomic::{AtomicBool, AtomicUsize, Ordering},
};

use thiserror::Error;

use crate::{
  backlog::Backlog,
  question::{Candidate, Question, QuestionId},
};

#[derive(Debug, Error)]
pub enum MemoryError {
  #[error("no connection")]
  Unavailable,
  #[error("write rejected")]
  WriteRejected,
}

impl From<MemoryError> for crate::Error {
  fn from(e: MemoryError) -> Self {
    match e {
      MemoryError::Unavailable => Self::StoreUnavailable(Box::new(e)),
      MemoryError::WriteRejected => Self::Store(Box::new(e)),
    }
  }
}

#[derive(Default)]
pub struct MemoryBacklog {
  rows:         Mutex<Vec<Question>>,
  /// Number of calls that reached the store at all.
  pub calls:    AtomicUsize,
  pub offline:  AtomicBool,
  pub readonly: AtomicBool,
}

impl MemoryBacklog {
  /// Seed with rows of the given revision counts; ids start at 1.
  pub fn with_counts(counts: &[u32]) -> Self {
    let rows = counts
      .iter()
      .enumerate()
      .map(|(i, &revision_count)| Question {
        id: QuestionId(i as i64 + 1),
        url: format!("https://example.com/problems/q{}/", i + 1),
        revision_count,
        last_sent_date: None,
      })
      .collect();
    Self { rows: Mutex::new(rows), ..Default::default() }
  }

  pub fn count_of(&self, id: i64) -> u32 {
    self
      .rows
      .lock()
      .unwrap()
      .iter()
      .find(|q| q.id == QuestionId(id))
      .map(|q| q.revision_count)
      .unwrap()
  }

  pub fn counts(&self) -> Vec<u32> {
    self.rows.lock().unwrap().iter().map(|q| q.revision_count).collect()
  }

  fn enter(&self) -> Result<(), MemoryError> {
    self.calls.fetch_add(1, Ordering::SeqCst);
    if self.offline.load(Ordering::SeqCst) {
      return Err(MemoryError::Unavailable);
    }
    Ok(())
  }

  fn enter_write(&self) -> Result<(), MemoryError> {
    self.enter()?;
    if self.readonly.load(Ordering::SeqCst) {
      return Err(MemoryError::WriteRejected);
    }
    Ok(())
  }
}

impl Backlog for MemoryBacklog {
  type Error = MemoryError;

  async fn minimum_tier(&self) -> Result<Vec<Question>, MemoryError> {
    self.enter()?;
    let rows = self.rows.lock().unwrap();
    let Some(min) = rows.iter().map(|q| q.revision_count).min() else {
      return Ok(vec![]);
    };
    Ok(rows.iter().filter(|q| q.revision_count == min).cloned().collect())
  }

  async fn increment_revisions(&self, ids: Vec<QuestionId>) -> Result<u64, MemoryError> {
    self.enter_write()?;
    let mut rows = self.rows.lock().unwrap();
    let mut affected = 0;
    for id in ids {
      if let Some(q) = rows.iter_mut().find(|q| q.id == id) {
        q.revision_count += 1;
        affected += 1;
      }
    }
    Ok(affected)
  }

  async fn insert_new(&self, candidates: Vec<Candidate>) -> Result<Vec<Candidate>, MemoryError> {
    self.enter_write()?;
    let mut rows = self.rows.lock().unwrap();
    let mut inserted = vec![];
    for candidate in candidates {
      if rows.iter().any(|q| q.url == candidate.url) {
        continue;
      }
      let id = QuestionId(rows.len() as i64 + 1);
      rows.push(Question {
        id,
        url: candidate.url.clone(),
        revision_count: 0,
        last_sent_date: None,
      });
      inserted.push(candidate);
    }
    Ok(inserted)
  }

  async fn get_question(&self, id: QuestionId) -> Result<Option<Question>, MemoryError> {
    self.enter()?;
    Ok(self.rows.lock().unwrap().iter().find(|q| q.id == id).cloned())
  }

  async fn list_questions(&self) -> Result<Vec<Question>, MemoryError> {
    self.enter()?;
    Ok(self.rows.lock().unwrap().clone())
  }
}
