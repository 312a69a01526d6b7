//! Error types and axum `IntoResponse` implementation.
//!
//! Every error renders as a JSON body so clients never have to sniff the
//! content type.

use axum::{
  Json,
  http::{HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use roster_core::{access::Denied, validate::FieldError};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// Credentials were supplied but did not match any account.
  #[error("unauthorized")]
  Unauthorized,
  /// The request body, path or query string could not be parsed.
  #[error("bad request: {0}")]
  BadRequest(String),
  #[error("access denied: {0}")]
  Denied(Denied),
  #[error("not found: {0}")]
  NotFound(String),
  #[error("validation failed")]
  Validation(Vec<FieldError>),
  #[error("conflict: {0}")]
  Conflict(String),
  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<roster_core::Error> for Error {
  fn from(err: roster_core::Error) -> Self {
    use roster_core::Error as Core;
    match err {
      e @ (Core::StudentNotFound(_) | Core::MaterialNotFound(_)) => {
        Error::NotFound(e.to_string())
      }
      Core::Validation(errors) => Error::Validation(errors),
      Core::Constraint(msg) => Error::Conflict(msg),
      Core::Denied(reason) => Error::Denied(reason),
      Core::Store(e) => Error::Store(e),
    }
  }
}

fn challenge(mut res: Response) -> Response {
  res.headers_mut().insert(
    header::WWW_AUTHENTICATE,
    HeaderValue::from_static("Basic realm=\"roster\""),
  );
  res
}

impl IntoResponse for Error {
  fn into_response(self) -> Response {
    match self {
      Error::Unauthorized => challenge(
        (StatusCode::UNAUTHORIZED, Json(json!({ "error": "invalid credentials" })))
          .into_response(),
      ),
      Error::BadRequest(m) => {
        (StatusCode::BAD_REQUEST, Json(json!({ "error": m }))).into_response()
      }
      Error::Denied(reason @ Denied::Unauthenticated) => challenge(
        (
          StatusCode::UNAUTHORIZED,
          Json(json!({ "error": reason.to_string(), "denied": reason })),
        )
          .into_response(),
      ),
      Error::Denied(reason) => (
        StatusCode::FORBIDDEN,
        Json(json!({ "error": reason.to_string(), "denied": reason })),
      )
        .into_response(),
      Error::NotFound(m) => {
        (StatusCode::NOT_FOUND, Json(json!({ "error": m }))).into_response()
      }
      Error::Validation(errors) => (
        StatusCode::UNPROCESSABLE_ENTITY,
        Json(json!({ "error": "validation failed", "errors": errors })),
      )
        .into_response(),
      Error::Conflict(m) => {
        (StatusCode::CONFLICT, Json(json!({ "error": m }))).into_response()
      }
      Error::Store(e) => {
        tracing::error!(error = %e, "store failure");
        (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": e.to_string() })))
          .into_response()
      }
    }
  }
}
