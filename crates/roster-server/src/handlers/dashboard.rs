//! Handler for `GET /dashboard`.

use axum::extract::State;
use roster_core::{ops, store::{RecordStore, Stats}};

use crate::{AppState, auth::Caller, error::Error, extract::Json};

/// `GET /dashboard`: row counts for the landing page.
pub async fn handler<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
) -> Result<Json<Stats>, Error>
where
  S: RecordStore + Clone + 'static,
{
  let stats = ops::dashboard(state.store.as_ref(), &principal).await?;
  Ok(Json(stats))
}
