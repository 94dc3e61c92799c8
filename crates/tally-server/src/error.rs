//! Server error type and axum `IntoResponse` implementation.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServerError {
  /// The badge and hit endpoints require a `tag` query parameter.
  #[error("tag parameter is required")]
  MissingTag,

  #[error("not found: {0}")]
  NotFound(String),

  #[error("service error: {0}")]
  Service(#[from] tally_core::Error),
}

impl IntoResponse for ServerError {
  fn into_response(self) -> Response {
    match self {
      ServerError::MissingTag
      | ServerError::Service(tally_core::Error::EmptyTag) => {
        (StatusCode::BAD_REQUEST, "Tag parameter is required").into_response()
      }
      ServerError::NotFound(msg) => {
        (StatusCode::NOT_FOUND, msg).into_response()
      }
      ServerError::Service(e) => {
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
      }
    }
  }
}
