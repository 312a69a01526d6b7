//! Per-entity form validation.
//!
//! Each `validate_*` function turns raw input into a draft, or reports every
//! failing field. There is no partial success: a draft is returned only when
//! all fields pass.
//!
//! Text is trimmed before checking; a value that is empty after trimming
//! counts as missing. Lengths are measured in characters, not bytes.

use std::fmt;

use serde::Serialize;

use crate::{
  material::{MaterialDraft, MaterialInput},
  student::{StudentDraft, StudentInput, SubjectDraft, SubjectInput},
};

pub const NAME_MAX_LEN: usize = 100;
pub const AVATAR_MAX_LEN: usize = 100;
pub const SUBJECT_TITLE_MAX_LEN: usize = 150;
pub const MATERIAL_TITLE_MAX_LEN: usize = 150;
pub const SLUG_MAX_LEN: usize = 150;

// ─── Errors ──────────────────────────────────────────────────────────────────

/// Why a field was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reason {
  Required,
  TooLong { max: usize },
  /// A child entry refers to a record that does not belong to the parent.
  UnknownEntry,
  /// The same child record was submitted more than once.
  Duplicate,
}

impl fmt::Display for Reason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Self::Required => f.write_str("this field is required"),
      Self::TooLong { max } => write!(f, "at most {max} characters allowed"),
      Self::UnknownEntry => f.write_str("no such entry for this record"),
      Self::Duplicate => f.write_str("entry submitted more than once"),
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
  pub field:  String,
  pub reason: Reason,
}

impl FieldError {
  pub fn new(field: impl Into<String>, reason: Reason) -> Self {
    Self { field: field.into(), reason }
  }

  /// Re-home this error under a collection entry, e.g. `title` becomes
  /// `subjects[2].title`.
  pub fn nested(self, prefix: &str) -> Self {
    Self { field: format!("{prefix}.{}", self.field), reason: self.reason }
  }
}

impl fmt::Display for FieldError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}: {}", self.field, self.reason)
  }
}

// ─── Field checks ────────────────────────────────────────────────────────────

#[derive(Default)]
struct Checker {
  errors: Vec<FieldError>,
}

impl Checker {
  fn required(&mut self, field: &str, value: &str, max: Option<usize>) -> String {
    let value = value.trim();
    if value.is_empty() {
      self.errors.push(FieldError::new(field, Reason::Required));
    } else {
      self.max_len(field, value, max);
    }
    value.to_owned()
  }

  fn optional(
    &mut self,
    field: &str,
    value: Option<&str>,
    max: usize,
  ) -> Option<String> {
    let value = value.map(str::trim).filter(|v| !v.is_empty())?;
    self.max_len(field, value, Some(max));
    Some(value.to_owned())
  }

  fn max_len(&mut self, field: &str, value: &str, max: Option<usize>) {
    if let Some(max) = max
      && value.chars().count() > max
    {
      self.errors.push(FieldError::new(field, Reason::TooLong { max }));
    }
  }

  fn finish<T>(self, draft: T) -> Result<T, Vec<FieldError>> {
    if self.errors.is_empty() { Ok(draft) } else { Err(self.errors) }
  }
}

// ─── Entities ────────────────────────────────────────────────────────────────

pub fn validate_student(input: &StudentInput) -> Result<StudentDraft, Vec<FieldError>> {
  let mut c = Checker::default();
  let draft = StudentDraft {
    first_name: c.required("first_name", &input.first_name, Some(NAME_MAX_LEN)),
    last_name:  c.required("last_name", &input.last_name, Some(NAME_MAX_LEN)),
    avatar:     c.optional("avatar", input.avatar.as_deref(), AVATAR_MAX_LEN),
  };
  c.finish(draft)
}

pub fn validate_subject(input: &SubjectInput) -> Result<SubjectDraft, Vec<FieldError>> {
  let mut c = Checker::default();
  let draft = SubjectDraft {
    title:       c.required("title", &input.title, Some(SUBJECT_TITLE_MAX_LEN)),
    description: c.required("description", &input.description, None),
  };
  c.finish(draft)
}

pub fn validate_material(input: &MaterialInput) -> Result<MaterialDraft, Vec<FieldError>> {
  let mut c = Checker::default();
  let draft = MaterialDraft {
    title:        c.required("title", &input.title, Some(MATERIAL_TITLE_MAX_LEN)),
    body:         c.required("body", &input.body, None),
    is_published: input.is_published,
    slug:         c.optional("slug", input.slug.as_deref(), SLUG_MAX_LEN),
  };
  c.finish(draft)
}
