//! Recently accepted LeetCode submissions as an ingestion feed.

use recall_core::{CandidateSource, question::Candidate};
use reqwest::{Client, header};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use crate::{
  Result,
  error::{Error, ensure_success},
  http_client,
};

pub const DEFAULT_ENDPOINT: &str = "https://leetcode.com/graphql";
pub const DEFAULT_LIMIT: u32 = 10;

const REFERER: &str = "https://leetcode.com";

const RECENT_AC_QUERY: &str = "
query recentAcSubmissions($username: String!, $limit: Int!) {
  recentAcSubmissionList(username: $username, limit: $limit) {
    title
    titleSlug
    timestamp
  }
}";

// ─── Wire types ──────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GraphQlResponse {
  data:   Option<RecentAc>,
  errors: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RecentAc {
  recent_ac_submission_list: Option<Vec<Submission>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Submission {
  title:      String,
  title_slug: String,
}

/// Canonical problem url for a submission slug.
pub fn problem_url(slug: &str) -> String { format!("https://leetcode.com/problems/{slug}/") }

// ─── Client ──────────────────────────────────────────────────────────────────

/// Fetches one user's most recent accepted submissions.
///
/// Cheap to clone; the inner [`reqwest::Client`] is shared.
#[derive(Debug, Clone)]
pub struct LeetCodeSource {
  client:   Client,
  endpoint: String,
  username: String,
  limit:    u32,
}

impl LeetCodeSource {
  pub fn new(username: impl Into<String>) -> Result<Self> {
    Ok(Self {
      client:   http_client()?,
      endpoint: DEFAULT_ENDPOINT.to_string(),
      username: username.into(),
      limit:    DEFAULT_LIMIT,
    })
  }

  pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
    self.endpoint = endpoint.into();
    self
  }

  pub fn with_limit(mut self, limit: u32) -> Self {
    self.limit = limit;
    self
  }

  pub async fn recent_accepted(&self) -> Result<Vec<Candidate>> {
    let payload = json!({
      "query": RECENT_AC_QUERY,
      "variables": { "username": self.username, "limit": self.limit },
    });

    let resp = self
      .client
      .post(&self.endpoint)
      .header(header::REFERER, REFERER)
      .json(&payload)
      .send()
      .await?;
    let body: GraphQlResponse = ensure_success(&self.endpoint, resp).await?.json().await?;

    if let Some(errors) = body.errors {
      return Err(Error::GraphQl(errors.to_string()));
    }
    let submissions = body
      .data
      .and_then(|d| d.recent_ac_submission_list)
      .ok_or_else(|| Error::Malformed("missing recentAcSubmissionList".into()))?;

    debug!(
      username = %self.username,
      count = submissions.len(),
      "fetched recent accepted submissions"
    );
    Ok(
      submissions
        .into_iter()
        .map(|s| Candidate::new(s.title, problem_url(&s.title_slug)))
        .collect(),
    )
  }
}

impl CandidateSource for LeetCodeSource {
  type Error = Error;

  async fn fetch(&self) -> Result<Vec<Candidate>> { self.recent_accepted().await }
}
