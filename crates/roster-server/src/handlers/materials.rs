//! Handlers for `/materials` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/materials` | Optional `?published_only=true` |
//! | `POST`   | `/materials` | Body: [`MaterialInput`]; 201 or 422 |
//! | `GET`    | `/materials/{id}` | Counts as a view |
//! | `PUT`    | `/materials/{id}` | Body: [`MaterialInput`] |
//! | `DELETE` | `/materials/{id}` | |

use axum::{
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use roster_core::{
  material::{Material, MaterialId, MaterialInput},
  ops,
  store::{MaterialQuery, RecordStore},
};
use serde::Deserialize;

use crate::{
  AppState,
  auth::Caller,
  error::Error,
  extract::{Json, Path, Query},
};

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub published_only: bool,
}

/// `GET /materials[?published_only=true]`
pub async fn list<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Material>>, Error>
where
  S: RecordStore + Clone + 'static,
{
  let query = MaterialQuery { published_only: params.published_only };
  let materials = ops::list_materials(state.store.as_ref(), &principal, query).await?;
  Ok(Json(materials))
}

/// `GET /materials/{id}`
pub async fn get_one<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  Path(id): Path<MaterialId>,
) -> Result<Json<Material>, Error>
where
  S: RecordStore + Clone + 'static,
{
  let material = ops::view_material(state.store.as_ref(), &principal, id).await?;
  Ok(Json(material))
}

/// `POST /materials`
pub async fn create<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  Json(body): Json<MaterialInput>,
) -> Result<impl IntoResponse, Error>
where
  S: RecordStore + Clone + 'static,
{
  let material = ops::create_material(state.store.as_ref(), &principal, &body).await?;
  Ok((StatusCode::CREATED, Json(material)))
}

/// `PUT /materials/{id}`
pub async fn update<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  Path(id): Path<MaterialId>,
  Json(body): Json<MaterialInput>,
) -> Result<Json<Material>, Error>
where
  S: RecordStore + Clone + 'static,
{
  let material = ops::update_material(state.store.as_ref(), &principal, id, &body).await?;
  Ok(Json(material))
}

/// `DELETE /materials/{id}`
pub async fn delete_one<S>(
  State(state): State<AppState<S>>,
  Caller(principal): Caller,
  Path(id): Path<MaterialId>,
) -> Result<StatusCode, Error>
where
  S: RecordStore + Clone + 'static,
{
  ops::delete_material(state.store.as_ref(), &principal, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
