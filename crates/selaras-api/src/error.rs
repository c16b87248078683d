//! API error type and [`axum::response::IntoResponse`] implementation.

use axum::{
  Json,
  http::StatusCode,
  response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

/// An error returned by an API handler.
#[derive(Debug, Error)]
pub enum ApiError {
  #[error("not found: {0}")]
  NotFound(String),

  #[error("bad request: {0}")]
  BadRequest(String),

  /// The concentrator did not answer; the message names the failed call.
  #[error("remote unreachable: {0}")]
  RemoteUnreachable(String),

  #[error("internal error: {0}")]
  Internal(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<selaras_engine::Error> for ApiError {
  fn from(e: selaras_engine::Error) -> Self {
    match e {
      selaras_engine::Error::RemoteUnreachable(call) => {
        Self::RemoteUnreachable(format!("concentrator failed its {call}"))
      }
      selaras_engine::Error::CustomerNotFound(id) => {
        Self::NotFound(format!("customer {id} not found"))
      }
      other => Self::Internal(Box::new(other)),
    }
  }
}

impl IntoResponse for ApiError {
  fn into_response(self) -> Response {
    let (status, message) = match &self {
      ApiError::NotFound(m) => (StatusCode::NOT_FOUND, m.clone()),
      ApiError::BadRequest(m) => (StatusCode::BAD_REQUEST, m.clone()),
      ApiError::RemoteUnreachable(m) => (StatusCode::BAD_GATEWAY, m.clone()),
      ApiError::Internal(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    };
    (status, Json(json!({ "error": message }))).into_response()
  }
}
