//! Publishable content materials.

use serde::{Deserialize, Serialize};

pub type MaterialId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Material {
  pub id:           MaterialId,
  pub title:        String,
  pub body:         String,
  /// Incremented each time the material is opened through the detail view.
  pub views_count:  u64,
  pub is_published: bool,
  pub slug:         Option<String>,
}

/// Raw material fields as submitted by a client. `views_count` is never
/// accepted from input.
#[derive(Debug, Clone, Deserialize)]
pub struct MaterialInput {
  #[serde(default)]
  pub title:        String,
  #[serde(default)]
  pub body:         String,
  #[serde(default = "published_by_default")]
  pub is_published: bool,
  #[serde(default)]
  pub slug:         Option<String>,
}

impl Default for MaterialInput {
  fn default() -> Self {
    Self {
      title:        String::new(),
      body:         String::new(),
      is_published: published_by_default(),
      slug:         None,
    }
  }
}

fn published_by_default() -> bool { true }

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialDraft {
  pub title:        String,
  pub body:         String,
  pub is_published: bool,
  pub slug:         Option<String>,
}
