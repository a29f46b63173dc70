//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use crimefiles_dialogue::DialogueError;
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  /// Admin credentials missing or wrong.
  #[error("unauthorized")]
  Unauthorized,

  #[error("bad request: {0}")]
  BadRequest(String),

  #[error(transparent)]
  Dialogue(#[from] DialogueError),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::Dialogue(e) => match e {
        DialogueError::EmptyInput => StatusCode::BAD_REQUEST,
        DialogueError::Unauthenticated => StatusCode::UNAUTHORIZED,
        DialogueError::CaseNotFound(_)
        | DialogueError::SuspectNotFound { .. }
        | DialogueError::ThreadNotFound(_) => StatusCode::NOT_FOUND,
        DialogueError::UpstreamGeneration(_) => StatusCode::BAD_GATEWAY,
        DialogueError::Configuration(_) | DialogueError::Store(_) => {
          StatusCode::INTERNAL_SERVER_ERROR
        }
      },
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    if status.is_server_error() {
      tracing::error!(status = status.as_u16(), error = %self, "request failed");
    }

    let mut res = (status, Json(json!({ "error": self.to_string() }))).into_response();
    if matches!(self, ApiError::Unauthorized) {
      res.headers_mut().insert(
        header::WWW_AUTHENTICATE,
        HeaderValue::from_static("Basic realm=\"crimefiles\""),
      );
    }
    res
  }
}
