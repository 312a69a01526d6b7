//! Error types for `roster-core`.

use thiserror::Error;

use crate::{
  access::Denied,
  material::MaterialId,
  store::StoreError,
  student::StudentId,
  validate::FieldError,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("student not found: {0}")]
  StudentNotFound(StudentId),

  #[error("material not found: {0}")]
  MaterialNotFound(MaterialId),

  #[error("validation failed on {} field(s)", .0.len())]
  Validation(Vec<FieldError>),

  /// A store-level uniqueness or shape violation.
  #[error("constraint violated: {0}")]
  Constraint(String),

  #[error("access denied: {0}")]
  Denied(#[from] Denied),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Classify a backend error: constraint violations keep their own variant,
  /// everything else is carried opaquely.
  pub fn store<E: StoreError>(err: E) -> Self {
    if err.is_constraint() {
      Self::Constraint(err.to_string())
    } else {
      Self::Store(Box::new(err))
    }
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
