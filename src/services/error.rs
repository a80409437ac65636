use thiserror::Error;

use crate::db::StoreError;

/// Domain-level failures. Each variant carries the status code the
/// transport glue should answer with.
#[derive(Debug, Error)]
pub enum ServiceError {
  #[error("{0} not found")]
  NotFound(&'static str),

  #[error("deadline for this opportunity has passed")]
  DeadlinePassed,

  #[error("already applied to this opportunity")]
  AlreadyApplied,

  #[error("cannot revert to Applied status after the deadline")]
  RevertAfterDeadline,

  #[error("user already exists")]
  UserExists,

  #[error("invalid credentials")]
  InvalidCredentials,

  #[error("{0}")]
  Validation(String),

  #[error("password hashing failed: {0}")]
  PasswordHash(String),

  #[error(transparent)]
  Store(#[from] StoreError),
}

impl ServiceError {
  pub fn status(&self) -> u16 {
    match self {
      ServiceError::NotFound(_) => 404,
      ServiceError::DeadlinePassed
      | ServiceError::RevertAfterDeadline
      | ServiceError::UserExists
      | ServiceError::Validation(_) => 400,
      ServiceError::AlreadyApplied => 409,
      ServiceError::InvalidCredentials => 401,
      ServiceError::PasswordHash(_) | ServiceError::Store(_) => 500,
    }
  }
}
