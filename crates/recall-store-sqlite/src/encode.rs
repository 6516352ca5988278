//! Decoding helpers between SQLite rows and `recall-core` types.
//!
//! Timestamps are stored as RFC 3339 strings. Revision counts are stored as
//! plain integers and narrowed to `u32` on the way out.

use chrono::{DateTime, Utc};
use recall_core::question::{Question, QuestionId};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

#[cfg(test)]
pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Question rows ───────────────────────────────────────────────────────────

/// A `questions` row exactly as SQLite hands it back.
pub struct RawQuestion {
  pub id:             i64,
  pub url:            String,
  pub revision_count: i64,
  pub last_sent_date: Option<String>,
}

impl RawQuestion {
  /// Read the columns listed in [`QUESTION_COLUMNS`](crate::schema::QUESTION_COLUMNS).
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:             row.get(0)?,
      url:            row.get(1)?,
      revision_count: row.get(2)?,
      last_sent_date: row.get(3)?,
    })
  }

  pub fn into_question(self) -> Result<Question> {
    let revision_count = u32::try_from(self.revision_count).map_err(|_| {
      Error::Corrupt(format!(
        "question {} has revision count {}",
        self.id, self.revision_count
      ))
    })?;
    Ok(Question {
      id: QuestionId(self.id),
      url: self.url,
      revision_count,
      last_sent_date: self.last_sent_date.as_deref().map(decode_dt).transpose()?,
    })
  }
}
