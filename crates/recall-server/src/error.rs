//! HTTP error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use recall_core::Error;
use serde_json::json;
use thiserror::Error as ThisError;
use tracing::{error, warn};

/// An error returned by a route handler.
#[derive(Debug, ThisError)]
pub enum ApiError {
  #[error(transparent)]
  Core(#[from] Error),

  #[error("bad request: {0}")]
  BadRequest(String),
}

impl ApiError {
  fn status(&self) -> StatusCode {
    match self {
      Self::BadRequest(_) => StatusCode::BAD_REQUEST,
      Self::Core(e) => match e {
        Error::EmptyBacklog => StatusCode::OK,
        Error::Unauthorized => StatusCode::UNAUTHORIZED,
        Error::InvalidRequest(_) => StatusCode::BAD_REQUEST,
        Error::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        Error::Source(_) => StatusCode::BAD_GATEWAY,
        Error::CommitFailed(_) | Error::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
      },
    }
  }

  /// Whether the client may repeat the request unchanged.
  pub fn is_retryable(&self) -> bool {
    match self {
      Self::Core(e) => e.is_retryable(),
      Self::BadRequest(_) => false,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    let body = match &self {
      // Nothing to schedule is an answer, not a failure.
      Self::Core(Error::EmptyBacklog) => json!({ "status": "empty", "questions": [] }),
      Self::Core(Error::Unauthorized) => json!({
        "status": "unauthorized",
        "message": "Invalid or missing token",
      }),
      other => json!({ "status": "error", "message": other.to_string() }),
    };

    if status.is_server_error() {
      error!(%status, retryable = self.is_retryable(), error = %self, "request failed");
    } else if status != StatusCode::OK {
      warn!(%status, error = %self, "request rejected");
    }
    (status, Json(body)).into_response()
  }
}
