use std::collections::BTreeMap;
use std::fmt;

use actix_web::http::StatusCode;
use actix_web::{error, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

/// Field name -> messages, serialized as a plain JSON object.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
  pub fn add(&mut self, field: &str, message: impl Into<String>) {
    self
      .0
      .entry(field.to_string())
      .or_default()
      .push(message.into());
  }

  pub fn get(&self, field: &str) -> Option<&[String]> {
    self.0.get(field).map(Vec::as_slice)
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }
}

impl fmt::Display for FieldErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let fields: Vec<&str> = self.0.keys().map(String::as_str).collect();
    write!(f, "{}", fields.join(", "))
  }
}

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Not found.")]
  NotFound,

  #[error("invalid fields: {0}")]
  Validation(FieldErrors),

  #[error("{0}")]
  BadRequest(String),

  #[error("Method \"{0}\" not allowed.")]
  MethodNotAllowed(String),

  #[error("Internal error: {0}")]
  Internal(String),
}

impl ResponseError for ApiError {
  fn status_code(&self) -> StatusCode {
    match self {
      ApiError::NotFound => StatusCode::NOT_FOUND,
      ApiError::Validation(_) | ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
      ApiError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
      ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let mut res = HttpResponse::build(self.status_code());
    match self {
      ApiError::Validation(errors) => res.json(errors),
      ApiError::Internal(_) => {
        tracing::error!(error = %self, "request failed");
        res.json(serde_json::json!({ "detail": "A server error occurred." }))
      }
      _ => res.json(serde_json::json!({ "detail": self.to_string() })),
    }
  }
}

impl From<rusqlite::Error> for ApiError {
  fn from(e: rusqlite::Error) -> Self {
    tracing::error!("sqlite error: {:?}", e);
    ApiError::Internal(e.to_string())
  }
}

impl From<r2d2::Error> for ApiError {
  fn from(e: r2d2::Error) -> Self {
    tracing::error!("connection pool error: {:?}", e);
    ApiError::Internal(e.to_string())
  }
}

impl From<error::BlockingError> for ApiError {
  fn from(e: error::BlockingError) -> Self {
    ApiError::Internal(e.to_string())
  }
}
