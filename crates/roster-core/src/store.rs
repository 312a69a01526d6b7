//! The `RecordStore` trait and supporting types.
//!
//! The trait is implemented by storage backends (e.g. `roster-store-sqlite`).
//! Higher layers depend on this abstraction, not on any concrete backend.
//!
//! Lookups of absent rows are not errors at this level: they come back as
//! `None` (or `false` for deletes) and [`crate::ops`] turns them into the
//! appropriate not-found error.

use std::future::Future;

use serde::Serialize;

use crate::{
  material::{Material, MaterialDraft, MaterialId},
  student::{Student, StudentDraft, StudentId, Subject, SubjectDraft, SubjectId},
};

// ─── Supporting types ────────────────────────────────────────────────────────

/// A backend error that can tell a constraint violation apart from any other
/// failure.
pub trait StoreError: std::error::Error + Send + Sync + 'static {
  fn is_constraint(&self) -> bool;
}

/// One batch of changes to a student's subjects, applied in a single write.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubjectChanges {
  pub create: Vec<SubjectDraft>,
  pub update: Vec<(SubjectId, SubjectDraft)>,
  pub delete: Vec<SubjectId>,
}

impl SubjectChanges {
  pub fn is_empty(&self) -> bool {
    self.create.is_empty() && self.update.is_empty() && self.delete.is_empty()
  }
}

/// Parameters for [`RecordStore::list_materials`].
#[derive(Debug, Clone, Copy, Default)]
pub struct MaterialQuery {
  /// Only return materials with `is_published` set.
  pub published_only: bool,
}

/// Row counts shown on the dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
  pub students:            u64,
  pub active_students:     u64,
  pub materials:           u64,
  pub published_materials: u64,
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over a Roster storage backend.
///
/// Every method is a single write or read; multi-row writes
/// ([`replace_subjects`](Self::replace_subjects),
/// [`update_student_with_subjects`](Self::update_student_with_subjects)) are
/// transactional within the call.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: StoreError;

  // ── Students ─────────────────────────────────────────────────────────────

  fn create_student(
    &self,
    draft: StudentDraft,
  ) -> impl Future<Output = Result<Student, Self::Error>> + Send + '_;

  fn get_student(
    &self,
    id: StudentId,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// All students ordered by last name ascending, ties broken by id.
  fn list_students(
    &self,
  ) -> impl Future<Output = Result<Vec<Student>, Self::Error>> + Send + '_;

  /// Overwrite the editable fields; `is_active` is left untouched.
  fn update_student(
    &self,
    id: StudentId,
    draft: StudentDraft,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// Flip `is_active` in a single statement and return the updated row.
  fn toggle_student_active(
    &self,
    id: StudentId,
  ) -> impl Future<Output = Result<Option<Student>, Self::Error>> + Send + '_;

  /// Delete a student and, by cascade, its subjects. Returns `false` if the
  /// student did not exist.
  fn delete_student(
    &self,
    id: StudentId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Subjects ─────────────────────────────────────────────────────────────

  /// Subjects of a student ordered by id.
  fn list_subjects(
    &self,
    student_id: StudentId,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Apply `changes` to the student's subjects in one transaction and return
  /// the resulting subject set.
  fn replace_subjects(
    &self,
    student_id: StudentId,
    changes: SubjectChanges,
  ) -> impl Future<Output = Result<Vec<Subject>, Self::Error>> + Send + '_;

  /// Update the student and apply `changes` in one transaction. Returns
  /// `None`, with nothing written, if the student does not exist.
  fn update_student_with_subjects(
    &self,
    id: StudentId,
    draft: StudentDraft,
    changes: SubjectChanges,
  ) -> impl Future<Output = Result<Option<(Student, Vec<Subject>)>, Self::Error>>
  + Send
  + '_;

  // ── Materials ────────────────────────────────────────────────────────────

  fn create_material(
    &self,
    draft: MaterialDraft,
  ) -> impl Future<Output = Result<Material, Self::Error>> + Send + '_;

  fn get_material(
    &self,
    id: MaterialId,
  ) -> impl Future<Output = Result<Option<Material>, Self::Error>> + Send + '_;

  /// Materials ordered by id.
  fn list_materials(
    &self,
    query: MaterialQuery,
  ) -> impl Future<Output = Result<Vec<Material>, Self::Error>> + Send + '_;

  /// Overwrite the editable fields; `views_count` is left untouched.
  fn update_material(
    &self,
    id: MaterialId,
    draft: MaterialDraft,
  ) -> impl Future<Output = Result<Option<Material>, Self::Error>> + Send + '_;

  fn delete_material(
    &self,
    id: MaterialId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Increment `views_count` and return the updated row.
  fn record_material_view(
    &self,
    id: MaterialId,
  ) -> impl Future<Output = Result<Option<Material>, Self::Error>> + Send + '_;

  // ── Reads ────────────────────────────────────────────────────────────────

  fn stats(&self) -> impl Future<Output = Result<Stats, Self::Error>> + Send + '_;
}
