//! Dashboard read model: progress metrics derived from the whole backlog.
//!
//! Never stored, always computed from a [`Question`] listing.

use serde::{Deserialize, Serialize};

use crate::question::{Question, QuestionId};

/// Revision counts at or above this land in the open-ended `6+` bucket.
const OPEN_BUCKET: u32 = 6;
const TOP_N: usize = 5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metrics {
  pub total:             usize,
  pub average_revisions: f64,
  /// Revision count 0.
  pub never_revised:     usize,
  /// Revision count 1-2.
  pub needing_practice:  usize,
  /// Revision count 3 or more.
  pub well_practiced:    usize,
  /// Revision count 3-4.
  pub practiced:         usize,
  /// Revision count 5 or more.
  pub mastered:          usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedQuestion {
  pub id:             QuestionId,
  pub url:            String,
  pub revision_count: u32,
  pub title:          String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bucket {
  /// `"0"` through `"5"`, then `"6+"`.
  pub bucket: String,
  pub count:  usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dashboard {
  pub questions:             Vec<Question>,
  pub metrics:               Metrics,
  pub top5:                  Vec<RankedQuestion>,
  pub revision_distribution: Vec<Bucket>,
}

impl Dashboard {
  /// Build the dashboard from a full listing. Questions are reported in id
  /// order regardless of input order.
  pub fn from_questions(mut questions: Vec<Question>) -> Self {
    questions.sort_by_key(|q| q.id);
    let metrics = metrics(&questions);
    let top5 = top(&questions, TOP_N);
    let revision_distribution = distribution(&questions);
    Self { questions, metrics, top5, revision_distribution }
  }
}

fn metrics(questions: &[Question]) -> Metrics {
  let count = |f: fn(u32) -> bool| questions.iter().filter(|q| f(q.revision_count)).count();
  let total = questions.len();
  let sum: u64 = questions.iter().map(|q| u64::from(q.revision_count)).sum();

  Metrics {
    total,
    average_revisions: if total == 0 { 0.0 } else { sum as f64 / total as f64 },
    never_revised: count(|n| n == 0),
    needing_practice: count(|n| (1..=2).contains(&n)),
    well_practiced: count(|n| n >= 3),
    practiced: count(|n| (3..=4).contains(&n)),
    mastered: count(|n| n >= 5),
  }
}

/// Most-revised first; ties go to the older (lower id) question.
fn top(questions: &[Question], n: usize) -> Vec<RankedQuestion> {
  let mut ranked: Vec<&Question> = questions.iter().collect();
  ranked.sort_by(|a, b| b.revision_count.cmp(&a.revision_count).then(a.id.cmp(&b.id)));
  ranked
    .into_iter()
    .take(n)
    .map(|q| RankedQuestion {
      id:             q.id,
      url:            q.url.clone(),
      revision_count: q.revision_count,
      title:          q.title(),
    })
    .collect()
}

fn distribution(questions: &[Question]) -> Vec<Bucket> {
  let mut counts = [0usize; OPEN_BUCKET as usize + 1];
  for q in questions {
    counts[q.revision_count.min(OPEN_BUCKET) as usize] += 1;
  }
  counts
    .iter()
    .enumerate()
    .filter(|(_, count)| **count > 0)
    .map(|(i, &count)| Bucket {
      bucket: if i as u32 == OPEN_BUCKET { format!("{OPEN_BUCKET}+") } else { i.to_string() },
      count,
    })
    .collect()
}
