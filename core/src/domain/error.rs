// foodgram-core/src/domain/error.rs
use crate::store::StoreError;
use serde::Serialize;
use std::fmt;
use thiserror::Error;

/// One rejected input field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field: String,
  pub message: String,
}

/// Every violation found in one submission, in the order they were checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors(Vec<FieldError>);

impl ValidationErrors {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn single(field: &str, message: impl Into<String>) -> Self {
    let mut errors = Self::new();
    errors.add(field, message);
    errors
  }

  pub fn add(&mut self, field: &str, message: impl Into<String>) {
    self.0.push(FieldError {
      field: field.to_string(),
      message: message.into(),
    });
  }

  pub fn is_empty(&self) -> bool {
    self.0.is_empty()
  }

  pub fn fields(&self) -> &[FieldError] {
    &self.0
  }

  /// `Ok(value)` when nothing was recorded, otherwise the collected errors.
  pub fn into_result<T>(self, value: T) -> Result<T, DomainError> {
    if self.is_empty() {
      Ok(value)
    } else {
      Err(DomainError::Validation(self))
    }
  }
}

impl fmt::Display for ValidationErrors {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let joined = self
      .0
      .iter()
      .map(|e| format!("{}: {}", e.field, e.message))
      .collect::<Vec<_>>()
      .join("; ");
    f.write_str(&joined)
  }
}

#[derive(Debug, Error)]
pub enum DomainError {
  /// A toggle attempted from the wrong state, or a forbidden self reference.
  #[error("{0}")]
  Conflict(String),

  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Validation(ValidationErrors),

  #[error("storage error: {0}")]
  Storage(#[from] StoreError),
}

pub type DomainResult<T> = std::result::Result<T, DomainError>;
