//! Error type for `recall-remote`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("http error: {0}")]
  Http(#[from] reqwest::Error),

  /// The remote answered, but not with a 2xx.
  #[error("{endpoint} returned {status}: {body}")]
  Status {
    endpoint: String,
    status:   reqwest::StatusCode,
    body:     String,
  },

  #[error("graphql errors: {0}")]
  GraphQl(String),

  #[error("malformed response: {0}")]
  Malformed(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Turn a non-2xx response into [`Error::Status`], keeping the body for logs.
pub(crate) async fn ensure_success(
  endpoint: &str,
  resp: reqwest::Response,
) -> Result<reqwest::Response> {
  let status = resp.status();
  if status.is_success() {
    return Ok(resp);
  }
  let body = resp.text().await.unwrap_or_default();
  Err(Error::Status { endpoint: endpoint.to_string(), status, body })
}
