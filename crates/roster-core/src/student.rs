//! Students and their nested subjects.
//!
//! A subject always belongs to exactly one student and has no lifecycle of
//! its own: subjects change only as part of a student edit (see
//! [`crate::edit`]).

use serde::{Deserialize, Serialize};

pub type StudentId = i64;
pub type SubjectId = i64;

// ─── Students ────────────────────────────────────────────────────────────────

/// A persisted student row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
  pub id:         StudentId,
  pub first_name: String,
  pub last_name:  String,
  /// Reference to an uploaded image, e.g. `students/anna.png`.
  pub avatar:     Option<String>,
  pub is_active:  bool,
}

/// Raw, unvalidated student fields as submitted by a client.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StudentInput {
  #[serde(default)]
  pub first_name: String,
  #[serde(default)]
  pub last_name:  String,
  #[serde(default)]
  pub avatar:     Option<String>,
}

/// Validated student fields, ready to be written.
///
/// `is_active` is absent on purpose: only the activity toggle changes it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDraft {
  pub first_name: String,
  pub last_name:  String,
  pub avatar:     Option<String>,
}

// ─── Subjects ────────────────────────────────────────────────────────────────

/// A persisted subject row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
  pub id:          SubjectId,
  pub student_id:  StudentId,
  pub title:       String,
  pub description: String,
}

/// One entry of the child collection submitted with a student edit.
///
/// - `id` set: refers to an existing subject of the same student.
/// - `id` absent: a new subject.
/// - `delete` set: the referenced subject is removed.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubjectInput {
  #[serde(default)]
  pub id:          Option<SubjectId>,
  #[serde(default)]
  pub title:       String,
  #[serde(default)]
  pub description: String,
  #[serde(default)]
  pub delete:      bool,
}

impl SubjectInput {
  /// An unused row: nothing was typed into any field.
  pub fn is_blank(&self) -> bool {
    self.title.trim().is_empty() && self.description.trim().is_empty()
  }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubjectDraft {
  pub title:       String,
  pub description: String,
}

impl SubjectDraft {
  /// Whether writing this draft over `subject` would change anything.
  pub fn differs_from(&self, subject: &Subject) -> bool {
    self.title != subject.title || self.description != subject.description
  }
}

// ─── Read model ──────────────────────────────────────────────────────────────

/// A student together with its current subjects.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StudentRecord {
  #[serde(flatten)]
  pub student:  Student,
  pub subjects: Vec<Subject>,
}
