//! Handlers for `/students` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/students` | Ordered by last name; also served at `/` |
//! | `POST`   | `/students` | Body: [`StudentInput`]; 201 or 422 |
//! | `GET`    | `/students/{id}` | Student with subjects; public |
//! | `POST`   | `/students/{id}/edit` | Body: [`EditBody`]; 200 if fully committed, else 422 |
//! | `DELETE` | `/students/{id}` | Superuser only |
//! | `POST`   | `/students/{id}/toggle` | Flips `is_active`, redirects to the listing |

use axum::{
  extract::State,
  http::StatusCode,
  response::{IntoResponse, Redirect, Response},
};
use roster_core::{
  ops,
  store::RecordStore,
  student::{Student, StudentId, StudentInput, StudentRecord, SubjectInput},
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::Caller,
  error::Error,
  extract::{Json, Path},
};

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /students`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
) -> Result<Json<Vec<Student>>, Error>
where
  S: RecordStore + Clone + 'static,
{
  let students = ops::list_students(state.store.as_ref(), &principal).await?;
  Ok(Json(students))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /students/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  Path(id): Path<StudentId>,
) -> Result<Json<StudentRecord>, Error>
where
  S: RecordStore + Clone + 'static,
{
  let record = ops::get_student(state.store.as_ref(), &principal, id).await?;
  Ok(Json(record))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /students`, returning 201 and the stored [`Student`].
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  Json(body): Json<StudentInput>,
) -> Result<impl IntoResponse, Error>
where
  S: RecordStore + Clone + 'static,
{
  let student = ops::create_student(state.store.as_ref(), &principal, &body).await?;
  Ok((StatusCode::CREATED, Json(student)))
}

// ─── Edit ────────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /students/{id}/edit`.
///
/// `subjects` is the complete child collection: existing subjects left out of
/// it are removed.
#[derive(Debug, Deserialize)]
pub struct EditBody {
  pub student:  StudentInput,
  #[serde(default)]
  pub subjects: Vec<SubjectInput>,
}

/// `POST /students/{id}/edit`
///
/// The body is always the [`EditOutcome`](roster_core::edit::EditOutcome);
/// the status tells whether both halves were committed.
pub async fn edit<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  Path(id): Path<StudentId>,
  Json(body): Json<EditBody>,
) -> Result<Response, Error>
where
  S: RecordStore + Clone + 'static,
{
  let outcome = ops::edit_student(
    state.store.as_ref(),
    &principal,
    state.config.edit_policy,
    id,
    &body.student,
    &body.subjects,
  )
  .await?;

  let status = if outcome.is_committed() {
    StatusCode::OK
  } else {
    StatusCode::UNPROCESSABLE_ENTITY
  };
  Ok((status, Json(outcome)).into_response())
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /students/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  Path(id): Path<StudentId>,
) -> Result<StatusCode, Error>
where
  S: RecordStore + Clone + 'static,
{
  ops::delete_student(state.store.as_ref(), &principal, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

// ─── Toggle ──────────────────────────────────────────────────────────────────

/// `POST /students/{id}/toggle`, then 303 back to the listing.
pub async fn toggle<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  Path(id): Path<StudentId>,
) -> Result<Redirect, Error>
where
  S: RecordStore + Clone + 'static,
{
  ops::toggle_active(state.store.as_ref(), &principal, id).await?;
  Ok(Redirect::to("/students"))
}
