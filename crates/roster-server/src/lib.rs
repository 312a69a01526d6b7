//! JSON HTTP layer for Roster.
//!
//! Exposes an axum [`Router`] backed by any [`RecordStore`]. Every handler
//! resolves the caller from HTTP Basic credentials and hands it to
//! [`roster_core::ops`], which performs the access check.

pub mod auth;
pub mod error;
pub mod extract;
pub mod handlers;

pub use error::Error;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use roster_core::{edit::EditPolicy, store::RecordStore};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use auth::AccountConfig;
use handlers::{contact, dashboard, materials, students};

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `ROSTER_*` environment variables.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:        String,
  #[serde(default = "default_port")]
  pub port:        u16,
  #[serde(default = "default_store_path")]
  pub store_path:  PathBuf,
  /// What a student edit does when the parent is valid but subjects are not.
  #[serde(default)]
  pub edit_policy: EditPolicy,
  #[serde(default)]
  pub accounts:    Vec<AccountConfig>,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8000 }

fn default_store_path() -> PathBuf { PathBuf::from("roster.db") }

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
#[derive(Clone)]
pub struct AppState<S: RecordStore> {
  pub store:  Arc<S>,
  pub config: Arc<ServerConfig>,
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build the application [`Router`].
pub fn router<S>(state: AppState<S>) -> Router
where
  S: RecordStore + Clone + 'static,
{
  Router::new()
    .route("/",                       get(students::list::<S>))
    .route("/students",               get(students::list::<S>).post(students::create::<S>))
    .route(
      "/students/{id}",
      get(students::get_one::<S>).delete(students::delete_one::<S>),
    )
    .route("/students/{id}/edit",     post(students::edit::<S>))
    .route("/students/{id}/toggle",   post(students::toggle::<S>))
    .route("/materials",              get(materials::list::<S>).post(materials::create::<S>))
    .route(
      "/materials/{id}",
      get(materials::get_one::<S>)
        .put(materials::update::<S>)
        .delete(materials::delete_one::<S>),
    )
    .route("/dashboard",              get(dashboard::handler::<S>))
    .route("/contact",                post(contact::handler))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use argon2::{Argon2, PasswordHasher, password_hash::SaltString};
  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use rand_core::OsRng;
  use roster_core::access::Permission;
  use roster_store_sqlite::SqliteStore;
  use serde_json::{Value, json};
  use tower::ServiceExt as _;

  async fn make_state(policy: EditPolicy) -> AppState<SqliteStore> {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let salt  = SaltString::generate(&mut OsRng);
    let hash  = Argon2::default()
      .hash_password(b"secret", &salt)
      .unwrap()
      .to_string();

    let account = |username: &str, is_superuser, permissions: &[Permission]| AccountConfig {
      username:      username.to_string(),
      password_hash: hash.clone(),
      is_superuser,
      permissions:   permissions.to_vec(),
    };

    AppState {
      store:  Arc::new(store),
      config: Arc::new(ServerConfig {
        host:        "127.0.0.1".to_string(),
        port:        8000,
        store_path:  PathBuf::from(":memory:"),
        edit_policy: policy,
        accounts:    vec![
          account("admin", true, &[]),
          account("staff", false, &[
            Permission::ViewStudent,
            Permission::AddStudent,
            Permission::ChangeStudent,
          ]),
          account("viewer", false, &[]),
        ],
      }),
    }
  }

  fn auth_header(user: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:secret")))
  }

  async fn send(
    state:  &AppState<SqliteStore>,
    method: &str,
    uri:    &str,
    user:   Option<&str>,
    body:   Option<Value>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
      builder = builder.header(header::AUTHORIZATION, auth_header(user));
    }
    let body = match body {
      Some(json) => {
        builder = builder.header(header::CONTENT_TYPE, "application/json");
        Body::from(json.to_string())
      }
      None => Body::empty(),
    };
    router(state.clone()).oneshot(builder.body(body).unwrap()).await.unwrap()
  }

  async fn json_body(resp: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
  }

  async fn create_student(state: &AppState<SqliteStore>, first: &str, last: &str) -> i64 {
    let resp = send(
      state,
      "POST",
      "/students",
      Some("staff"),
      Some(json!({ "first_name": first, "last_name": last })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    json_body(resp).await["id"].as_i64().unwrap()
  }

  // ── Auth ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn listing_requires_login() {
    let state = make_state(EditPolicy::default()).await;
    let resp  = send(&state, "GET", "/students", None, None).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn wrong_password_is_rejected() {
    let state = make_state(EditPolicy::default()).await;
    let req = Request::builder()
      .uri("/students")
      .header(header::AUTHORIZATION, format!("Basic {}", B64.encode("staff:nope")))
      .body(Body::empty())
      .unwrap();
    let resp = router(state).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
  }

  #[tokio::test]
  async fn create_without_permission_is_forbidden() {
    let state = make_state(EditPolicy::default()).await;
    let resp  = send(
      &state,
      "POST",
      "/students",
      Some("viewer"),
      Some(json!({ "first_name": "Anna", "last_name": "Ivanova" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body = json_body(resp).await;
    assert_eq!(body["denied"]["reason"], "missing_permission");
    assert_eq!(body["denied"]["permission"], "add_student");
  }

  // ── Students ─────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn students_are_listed_by_last_name() {
    let state = make_state(EditPolicy::default()).await;
    create_student(&state, "B", "Petrov").await;
    create_student(&state, "A", "Ivanova").await;

    for uri in ["/", "/students"] {
      let resp = send(&state, "GET", uri, Some("viewer"), None).await;
      assert_eq!(resp.status(), StatusCode::OK);
      let body  = json_body(resp).await;
      let names: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["last_name"].as_str().unwrap().to_string())
        .collect();
      assert_eq!(names, ["Ivanova", "Petrov"]);
    }
  }

  #[tokio::test]
  async fn create_with_blank_name_returns_422() {
    let state = make_state(EditPolicy::default()).await;
    let resp  = send(
      &state,
      "POST",
      "/students",
      Some("staff"),
      Some(json!({ "first_name": "Anna", "last_name": "" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(resp).await;
    assert_eq!(body["errors"][0]["field"], "last_name");
    assert_eq!(body["errors"][0]["reason"]["kind"], "required");
  }

  #[tokio::test]
  async fn student_detail_is_public() {
    let state = make_state(EditPolicy::default()).await;
    let id    = create_student(&state, "Anna", "Ivanova").await;

    let resp = send(&state, "GET", &format!("/students/{id}"), None, None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["first_name"], "Anna");
    assert_eq!(body["subjects"], json!([]));

    let missing = send(&state, "GET", "/students/999", None, None).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn edit_commits_parent_and_subjects() {
    let state = make_state(EditPolicy::default()).await;
    let id    = create_student(&state, "Anna", "Ivanova").await;

    let resp = send(
      &state,
      "POST",
      &format!("/students/{id}/edit"),
      Some("staff"),
      Some(json!({
        "student":  { "first_name": "Anna", "last_name": "Sidorova" },
        "subjects": [
          { "title": "Math", "description": "Algebra and geometry" },
          { "title": "", "description": "" }
        ]
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["parent"]["status"], "committed");
    assert_eq!(body["parent"]["data"]["last_name"], "Sidorova");
    assert_eq!(body["children"]["status"], "committed");
    assert_eq!(body["children"]["data"].as_array().unwrap().len(), 1);

    // Resubmitting without the subject removes it.
    let resp = send(
      &state,
      "POST",
      &format!("/students/{id}/edit"),
      Some("staff"),
      Some(json!({ "student": { "first_name": "Anna", "last_name": "Sidorova" } })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let detail = json_body(send(&state, "GET", &format!("/students/{id}"), None, None).await).await;
    assert_eq!(detail["subjects"], json!([]));
  }

  #[tokio::test]
  async fn edit_with_invalid_parent_writes_nothing() {
    let state = make_state(EditPolicy::default()).await;
    let id    = create_student(&state, "Anna", "Ivanova").await;

    let resp = send(
      &state,
      "POST",
      &format!("/students/{id}/edit"),
      Some("staff"),
      Some(json!({
        "student":  { "first_name": "Anna", "last_name": "" },
        "subjects": [{ "title": "Math", "description": "Algebra" }]
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(resp).await;
    assert_eq!(body["parent"]["status"], "invalid");
    assert_eq!(body["parent"]["data"][0]["field"], "last_name");
    assert_eq!(body["children"]["status"], "discarded");

    let detail = json_body(send(&state, "GET", &format!("/students/{id}"), None, None).await).await;
    assert_eq!(detail["last_name"], "Ivanova");
    assert_eq!(detail["subjects"], json!([]));
  }

  #[tokio::test]
  async fn atomic_policy_discards_parent_on_child_errors() {
    let state = make_state(EditPolicy::Atomic).await;
    let id    = create_student(&state, "Anna", "Ivanova").await;

    let resp = send(
      &state,
      "POST",
      &format!("/students/{id}/edit"),
      Some("staff"),
      Some(json!({
        "student":  { "first_name": "Anna", "last_name": "Sidorova" },
        "subjects": [{ "title": "Math", "description": "" }]
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(resp).await;
    assert_eq!(body["parent"]["status"], "discarded");
    assert_eq!(body["children"]["data"][0]["field"], "subjects[0].description");

    let detail = json_body(send(&state, "GET", &format!("/students/{id}"), None, None).await).await;
    assert_eq!(detail["last_name"], "Ivanova");
  }

  #[tokio::test]
  async fn edit_missing_student_returns_404() {
    let state = make_state(EditPolicy::default()).await;
    let resp  = send(
      &state,
      "POST",
      "/students/77/edit",
      Some("staff"),
      Some(json!({ "student": { "first_name": "A", "last_name": "B" } })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn only_superuser_may_delete() {
    let state = make_state(EditPolicy::default()).await;
    let id    = create_student(&state, "Anna", "Ivanova").await;
    let uri   = format!("/students/{id}");

    let resp = send(&state, "DELETE", &uri, Some("staff"), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(json_body(resp).await["denied"]["reason"], "not_owner");
    assert_eq!(send(&state, "GET", &uri, None, None).await.status(), StatusCode::OK);

    let resp = send(&state, "DELETE", &uri, Some("admin"), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert_eq!(send(&state, "GET", &uri, None, None).await.status(), StatusCode::NOT_FOUND);

    let resp = send(&state, "DELETE", &uri, Some("admin"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn toggle_redirects_to_listing() {
    let state = make_state(EditPolicy::default()).await;
    let id    = create_student(&state, "Anna", "Ivanova").await;

    let resp = send(&state, "POST", &format!("/students/{id}/toggle"), Some("viewer"), None).await;
    assert_eq!(resp.status(), StatusCode::SEE_OTHER);
    assert_eq!(resp.headers().get(header::LOCATION).unwrap(), "/students");

    let detail = json_body(send(&state, "GET", &format!("/students/{id}"), None, None).await).await;
    assert_eq!(detail["is_active"], false);

    let missing = send(&state, "POST", "/students/999/toggle", Some("viewer"), None).await;
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
  }

  // ── Materials ────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn material_lifecycle() {
    let state = make_state(EditPolicy::default()).await;

    let resp = send(
      &state,
      "POST",
      "/materials",
      Some("admin"),
      Some(json!({ "title": "Intro", "body": "Welcome", "slug": "" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let created = json_body(resp).await;
    assert_eq!(created["is_published"], true);
    assert_eq!(created["slug"], Value::Null);
    let uri = format!("/materials/{}", created["id"]);

    let viewed = json_body(send(&state, "GET", &uri, Some("viewer"), None).await).await;
    assert_eq!(viewed["views_count"], 1);

    let resp = send(
      &state,
      "PUT",
      &uri,
      Some("admin"),
      Some(json!({ "title": "Introduction", "body": "Welcome", "is_published": false })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(json_body(resp).await["views_count"], 1);

    let published =
      json_body(send(&state, "GET", "/materials?published_only=true", Some("viewer"), None).await)
        .await;
    assert_eq!(published, json!([]));

    let resp = send(&state, "DELETE", &uri, Some("staff"), None).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let resp = send(&state, "DELETE", &uri, Some("admin"), None).await;
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
  }

  #[tokio::test]
  async fn material_without_body_returns_422() {
    let state = make_state(EditPolicy::default()).await;
    let resp  = send(
      &state,
      "POST",
      "/materials",
      Some("admin"),
      Some(json!({ "title": "Intro" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(resp).await["errors"][0]["field"], "body");
  }

  // ── Dashboard & contact ──────────────────────────────────────────────────

  #[tokio::test]
  async fn dashboard_counts_rows() {
    let state = make_state(EditPolicy::default()).await;
    create_student(&state, "Anna", "Ivanova").await;

    let resp = send(&state, "GET", "/dashboard", Some("viewer"), None).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    assert_eq!(body["students"], 1);
    assert_eq!(body["active_students"], 1);
    assert_eq!(body["materials"], 0);
  }

  #[tokio::test]
  async fn contact_requires_view_permission() {
    let state = make_state(EditPolicy::default()).await;
    let msg   = json!({ "name": "Ivan", "email": "ivan@example.com", "message": "Hello" });

    let resp = send(&state, "POST", "/contact", Some("staff"), Some(msg.clone())).await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(json_body(resp).await["received_at"].is_string());

    let resp = send(&state, "POST", "/contact", Some("viewer"), Some(msg)).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
  }

  // ── Malformed input ──────────────────────────────────────────────────────

  async fn assert_json_400(resp: axum::response::Response) {
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
      resp.headers().get(header::CONTENT_TYPE).unwrap(),
      "application/json"
    );
    assert!(json_body(resp).await["error"].is_string());
  }

  #[tokio::test]
  async fn unparseable_body_gets_json_400() {
    let state = make_state(EditPolicy::default()).await;
    let req = Request::builder()
      .method("POST")
      .uri("/students")
      .header(header::AUTHORIZATION, auth_header("staff"))
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from("{not json"))
      .unwrap();
    let resp = router(state.clone()).oneshot(req).await.unwrap();
    assert_json_400(resp).await;

    let students = json_body(send(&state, "GET", "/students", Some("staff"), None).await).await;
    assert_eq!(students, json!([]));
  }

  #[tokio::test]
  async fn unparseable_id_or_query_gets_json_400() {
    let state = make_state(EditPolicy::default()).await;
    assert_json_400(send(&state, "GET", "/students/abc", None, None).await).await;
    assert_json_400(
      send(&state, "GET", "/materials?published_only=maybe", Some("viewer"), None).await,
    )
    .await;
  }

  // ── Missing rows and subject removal ─────────────────────────────────────

  #[tokio::test]
  async fn material_missing_returns_404() {
    let state = make_state(EditPolicy::default()).await;

    let resp = send(&state, "GET", "/materials/999", Some("viewer"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(json_body(resp).await["error"].is_string());

    let resp = send(
      &state,
      "PUT",
      "/materials/999",
      Some("admin"),
      Some(json!({ "title": "Intro", "body": "Welcome" })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = send(&state, "DELETE", "/materials/999", Some("admin"), None).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }

  #[tokio::test]
  async fn subject_flagged_for_deletion_is_removed() {
    let state = make_state(EditPolicy::default()).await;
    let id    = create_student(&state, "Anna", "Ivanova").await;
    let uri   = format!("/students/{id}/edit");

    let resp = send(
      &state,
      "POST",
      &uri,
      Some("staff"),
      Some(json!({
        "student":  { "first_name": "Anna", "last_name": "Ivanova" },
        "subjects": [{ "title": "Math", "description": "Algebra" }]
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let math_id = json_body(resp).await["children"]["data"][0]["id"].as_i64().unwrap();

    let resp = send(
      &state,
      "POST",
      &uri,
      Some("staff"),
      Some(json!({
        "student":  { "first_name": "Anna", "last_name": "Ivanova" },
        "subjects": [
          { "id": math_id, "title": "", "description": "", "delete": true },
          { "title": "Physics", "description": "Mechanics" }
        ]
      })),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body = json_body(resp).await;
    let titles: Vec<_> = body["children"]["data"]
      .as_array()
      .unwrap()
      .iter()
      .map(|s| s["title"].as_str().unwrap().to_string())
      .collect();
    assert_eq!(titles, ["Physics"]);

    let detail = json_body(send(&state, "GET", &format!("/students/{id}"), None, None).await).await;
    assert_eq!(detail["subjects"].as_array().unwrap().len(), 1);
    assert_eq!(detail["subjects"][0]["title"], "Physics");
  }
}
