//! Nested student edit: one parent form plus a variable-length collection of
//! subject entries, submitted together.
//!
//! The submitted collection fully replaces the student's previous subjects:
//! new entries are created, existing ones updated, and anything marked for
//! deletion or simply left out is removed.
//!
//! Parent validity gates child persistence. If the parent input is invalid
//! nothing is written at all. What happens when the parent is valid but the
//! children are not is decided by [`EditPolicy`].

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::{
  Error, Result,
  store::{RecordStore, SubjectChanges},
  student::{Student, StudentId, StudentInput, Subject, SubjectId, SubjectInput},
  validate::{FieldError, Reason, validate_student, validate_subject},
};

// ─── Policy ──────────────────────────────────────────────────────────────────

/// How a valid parent is treated when its child collection fails validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EditPolicy {
  /// The parent update commits on its own; child changes are discarded and
  /// the previous subjects stay as they were.
  #[default]
  PartialCommit,
  /// Nothing commits unless parent and children are all valid, and both are
  /// written in one transaction.
  Atomic,
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// What happened to one half (parent or children) of an edit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "data", rename_all = "snake_case")]
pub enum Outcome<T> {
  Committed(T),
  Invalid(Vec<FieldError>),
  /// Valid, but not written because the other half failed.
  Discarded,
}

impl<T> Outcome<T> {
  pub fn is_committed(&self) -> bool { matches!(self, Self::Committed(_)) }

  pub fn errors(&self) -> &[FieldError] {
    match self {
      Self::Invalid(errors) => errors,
      _ => &[],
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditOutcome {
  pub parent:   Outcome<Student>,
  pub children: Outcome<Vec<Subject>>,
}

impl EditOutcome {
  pub fn is_committed(&self) -> bool {
    self.parent.is_committed() && self.children.is_committed()
  }
}

// ─── Child planning ──────────────────────────────────────────────────────────

/// The submitted child collection resolved against the current subjects.
#[derive(Debug, Default)]
struct ChildPlan {
  changes: SubjectChanges,
  errors:  Vec<FieldError>,
}

/// Validate every entry and work out the batch that turns `existing` into the
/// submitted collection.
fn plan_children(existing: &[Subject], entries: &[SubjectInput]) -> ChildPlan {
  let mut plan = ChildPlan::default();
  let mut seen: HashSet<SubjectId> = HashSet::new();
  let mut kept: HashSet<SubjectId> = HashSet::new();

  for (index, entry) in entries.iter().enumerate() {
    let prefix = format!("subjects[{index}]");

    let current = match entry.id {
      Some(id) => {
        let Some(current) = existing.iter().find(|s| s.id == id) else {
          plan.errors.push(FieldError::new(format!("{prefix}.id"), Reason::UnknownEntry));
          continue;
        };
        if !seen.insert(id) {
          plan.errors.push(FieldError::new(format!("{prefix}.id"), Reason::Duplicate));
          continue;
        }
        Some(current)
      }
      None => None,
    };

    // Deleted entries are not validated; an existing one is removed by
    // leaving it out of `kept`.
    if entry.delete {
      continue;
    }
    if current.is_none() && entry.is_blank() {
      continue;
    }

    match (validate_subject(entry), current) {
      (Ok(draft), Some(current)) => {
        kept.insert(current.id);
        if draft.differs_from(current) {
          plan.changes.update.push((current.id, draft));
        }
      }
      (Ok(draft), None) => plan.changes.create.push(draft),
      (Err(errors), _) => {
        plan.errors.extend(errors.into_iter().map(|e| e.nested(&prefix)));
      }
    }
  }

  plan.changes.delete = existing
    .iter()
    .map(|s| s.id)
    .filter(|id| !kept.contains(id))
    .collect();

  plan
}

// ─── Orchestrator ────────────────────────────────────────────────────────────

/// Validate and apply a nested student edit.
///
/// Returns `Err` only for a missing student or a store failure; validation
/// problems are reported inside the [`EditOutcome`].
pub async fn submit_edit<S: RecordStore>(
  store: &S,
  policy: EditPolicy,
  student_id: StudentId,
  parent: &StudentInput,
  children: &[SubjectInput],
) -> Result<EditOutcome> {
  store
    .get_student(student_id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::StudentNotFound(student_id))?;

  let existing = store.list_subjects(student_id).await.map_err(Error::store)?;

  let parent = validate_student(parent);
  let plan = plan_children(&existing, children);
  let children_valid = plan.errors.is_empty();

  let draft = match parent {
    Ok(draft) => draft,
    Err(errors) => {
      debug!(student_id, fields = errors.len(), "student edit rejected");
      let children = if children_valid {
        Outcome::Discarded
      } else {
        Outcome::Invalid(plan.errors)
      };
      return Ok(EditOutcome { parent: Outcome::Invalid(errors), children });
    }
  };

  match policy {
    EditPolicy::PartialCommit => {
      let student = store
        .update_student(student_id, draft)
        .await
        .map_err(Error::store)?
        .ok_or(Error::StudentNotFound(student_id))?;

      let children = if !children_valid {
        debug!(student_id, fields = plan.errors.len(), "subject changes discarded");
        Outcome::Invalid(plan.errors)
      } else if plan.changes.is_empty() {
        Outcome::Committed(existing)
      } else {
        let subjects = store
          .replace_subjects(student_id, plan.changes)
          .await
          .map_err(Error::store)?;
        Outcome::Committed(subjects)
      };

      info!(student_id, children_committed = children.is_committed(), "student edited");
      Ok(EditOutcome { parent: Outcome::Committed(student), children })
    }
    EditPolicy::Atomic => {
      if !children_valid {
        debug!(student_id, fields = plan.errors.len(), "student edit rejected");
        return Ok(EditOutcome {
          parent:   Outcome::Discarded,
          children: Outcome::Invalid(plan.errors),
        });
      }

      let (student, subjects) = store
        .update_student_with_subjects(student_id, draft, plan.changes)
        .await
        .map_err(Error::store)?
        .ok_or(Error::StudentNotFound(student_id))?;

      info!(student_id, "student edited");
      Ok(EditOutcome {
        parent:   Outcome::Committed(student),
        children: Outcome::Committed(subjects),
      })
    }
  }
}
