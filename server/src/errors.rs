// foodgram_server/src/errors.rs

use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use foodgram::{DomainError, PipelineError, StoreError, ValidationErrors};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
  #[error("Validation Error: {0}")]
  Validation(ValidationErrors),

  /// A toggle attempted from the wrong state.
  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Storage Error: {0}")]
  Storage(#[from] StoreError),

  #[error("Pipeline Error: {source}")]
  Pipeline {
    #[from]
    source: PipelineError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

impl AppError {
  /// Single-field validation failure.
  pub fn validation(field: &str, message: impl Into<String>) -> Self {
    AppError::Validation(ValidationErrors::single(field, message))
  }
}

impl From<DomainError> for AppError {
  fn from(err: DomainError) -> Self {
    match err {
      DomainError::Conflict(m) => AppError::Conflict(m),
      DomainError::NotFound(m) => AppError::NotFound(m),
      DomainError::Validation(errors) => AppError::Validation(errors),
      DomainError::Storage(e) => AppError::Storage(e),
    }
  }
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::Validation(_) | AppError::Conflict(_) => StatusCode::BAD_REQUEST,
      AppError::Auth(_) => StatusCode::UNAUTHORIZED,
      AppError::Forbidden(_) => StatusCode::FORBIDDEN,
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Config(_)
      | AppError::Sqlx(_)
      | AppError::Storage(_)
      | AppError::Pipeline { .. }
      | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(application_error = %self, "Responding with error");
    let status = self.status_code();
    match self {
      AppError::Validation(errors) => HttpResponse::build(status).json(json!({
          "error": errors.to_string(),
          "fields": errors,
      })),
      AppError::Conflict(m) | AppError::Auth(m) | AppError::Forbidden(m) | AppError::NotFound(m) => {
        HttpResponse::build(status).json(json!({"error": m}))
      }
      AppError::Config(_) => HttpResponse::build(status).json(json!({"error": "Configuration issue"})),
      AppError::Sqlx(_) | AppError::Storage(_) => {
        HttpResponse::build(status).json(json!({"error": "Database operation failed"}))
      }
      AppError::Pipeline { source } => {
        tracing::error!(pipeline_error_source = ?source, "Pipeline error details");
        HttpResponse::build(status).json(json!({"error": "Request processing error"}))
      }
      AppError::Internal(_) => HttpResponse::build(status).json(json!({"error": "An internal error occurred"})),
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = AppError> = std::result::Result<T, E>;
