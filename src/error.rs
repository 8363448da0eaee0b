//! HTTP-facing errors. Rendered as `{"error": "..."}` with a matching status.

use axum::{
  http::StatusCode,
  response::{IntoResponse, Response},
  Json,
};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("{0} not found")]
  NotFound(String),
  #[error("{0}")]
  BadRequest(String),
}

impl ApiError {
  pub fn status(&self) -> StatusCode {
    match self {
      ApiError::NotFound(_) => StatusCode::NOT_FOUND,
      ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let status = self.status();
    warn!(target: "curriculum_backend", %status, error = %self, "Request rejected");
    (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
  }
}
