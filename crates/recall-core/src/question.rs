//! Question: the tracked unit of the backlog.
//!
//! A question is identified by its store-assigned id and deduplicated by its
//! url. Its revision count only ever moves up, one step per commit.

use std::{fmt, num::ParseIntError, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Store-assigned primary key of a [`Question`]. Immutable once assigned.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct QuestionId(pub i64);

impl fmt::Display for QuestionId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

impl FromStr for QuestionId {
  type Err = ParseIntError;

  fn from_str(s: &str) -> Result<Self, Self::Err> { s.trim().parse().map(Self) }
}

// ─── Rows ────────────────────────────────────────────────────────────────────

/// A tracked practice question, as persisted by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
  pub id:             QuestionId,
  /// Natural key; unique across the backlog.
  pub url:            String,
  pub revision_count: u32,
  pub last_sent_date: Option<DateTime<Utc>>,
}

impl Question {
  /// The `(id, url)` pair handed to the notifier and the HTTP caller.
  pub fn scheduled(&self) -> ScheduledQuestion {
    ScheduledQuestion { id: self.id, url: self.url.clone() }
  }

  /// Display title derived from the url slug.
  pub fn title(&self) -> String { title_from_url(&self.url) }
}

/// The output unit of the selector: which question to review next.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScheduledQuestion {
  pub id:  QuestionId,
  pub url: String,
}

// ─── Ingestion input ─────────────────────────────────────────────────────────

/// An externally supplied `(title, url)` pair awaiting deduplication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
  /// Only used for logging; the backlog stores the url alone.
  pub title: String,
  pub url:   String,
}

impl Candidate {
  pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
    Self { title: title.into(), url: url.into() }
  }

  /// Reject candidates whose url cannot act as a dedup key.
  pub fn validate(&self) -> Result<()> {
    let url = self.url.trim();
    if url.is_empty() {
      return Err(Error::InvalidRequest(format!(
        "candidate {:?} has an empty url",
        self.title
      )));
    }
    if url != self.url {
      return Err(Error::InvalidRequest(format!(
        "candidate url {:?} has surrounding whitespace",
        self.url
      )));
    }
    if !(url.starts_with("https://") || url.starts_with("http://")) {
      return Err(Error::InvalidRequest(format!(
        "candidate url {url:?} is not an http(s) url"
      )));
    }
    Ok(())
  }
}

/// Turn `https://leetcode.com/problems/two-sum/` into `two sum`.
///
/// Urls without a `/problems/` segment fall back to their last path segment.
pub fn title_from_url(url: &str) -> String {
  let slug = match url.split_once("/problems/") {
    Some((_, rest)) => rest.split('/').next().unwrap_or_default(),
    None => url
      .trim_end_matches('/')
      .rsplit('/')
      .next()
      .unwrap_or_default(),
  };
  slug.replace('-', " ")
}
