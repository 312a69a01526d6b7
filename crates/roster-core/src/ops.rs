//! One function per externally visible operation.
//!
//! Each function authorises the principal first; a denial returns before the
//! store is touched.

use tracing::{info, warn};

use crate::{
  Error, Result,
  access::{Denied, Operation, Principal, authorize},
  edit::{self, EditOutcome, EditPolicy},
  material::{Material, MaterialId, MaterialInput},
  store::{MaterialQuery, RecordStore, Stats},
  student::{Student, StudentId, StudentInput, StudentRecord, SubjectInput},
  validate::{validate_material, validate_student},
};

/// Authorise `operation`, logging the denial when there is one.
pub(crate) fn gate(principal: &Principal, operation: Operation) -> Result<(), Denied> {
  authorize(principal, operation).inspect_err(|reason| {
    warn!(
      user = principal.username().unwrap_or("anonymous"),
      ?operation,
      %reason,
      "access denied"
    );
  })
}

// ─── Students ────────────────────────────────────────────────────────────────

pub async fn list_students<S: RecordStore>(
  store: &S,
  principal: &Principal,
) -> Result<Vec<Student>> {
  gate(principal, Operation::ListStudents)?;
  store.list_students().await.map_err(Error::store)
}

pub async fn get_student<S: RecordStore>(
  store: &S,
  principal: &Principal,
  id: StudentId,
) -> Result<StudentRecord> {
  gate(principal, Operation::ViewStudent)?;
  let student = store
    .get_student(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::StudentNotFound(id))?;
  let subjects = store.list_subjects(id).await.map_err(Error::store)?;
  Ok(StudentRecord { student, subjects })
}

pub async fn create_student<S: RecordStore>(
  store: &S,
  principal: &Principal,
  input: &StudentInput,
) -> Result<Student> {
  gate(principal, Operation::CreateStudent)?;
  let draft = validate_student(input).map_err(Error::Validation)?;
  let student = store.create_student(draft).await.map_err(Error::store)?;
  info!(student_id = student.id, "student created");
  Ok(student)
}

pub async fn edit_student<S: RecordStore>(
  store: &S,
  principal: &Principal,
  policy: EditPolicy,
  id: StudentId,
  parent: &StudentInput,
  children: &[SubjectInput],
) -> Result<EditOutcome> {
  gate(principal, Operation::EditStudent)?;
  edit::submit_edit(store, policy, id, parent, children).await
}

pub async fn delete_student<S: RecordStore>(
  store: &S,
  principal: &Principal,
  id: StudentId,
) -> Result<()> {
  gate(principal, Operation::DeleteStudent)?;
  if !store.delete_student(id).await.map_err(Error::store)? {
    return Err(Error::StudentNotFound(id));
  }
  info!(student_id = id, "student deleted");
  Ok(())
}

/// Flip `is_active`. Not idempotent: two toggles restore the original value.
pub async fn toggle_active<S: RecordStore>(
  store: &S,
  principal: &Principal,
  id: StudentId,
) -> Result<Student> {
  gate(principal, Operation::ToggleActive)?;
  let student = store
    .toggle_student_active(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::StudentNotFound(id))?;
  info!(student_id = id, is_active = student.is_active, "student activity toggled");
  Ok(student)
}

// ─── Materials ───────────────────────────────────────────────────────────────

pub async fn list_materials<S: RecordStore>(
  store: &S,
  principal: &Principal,
  query: MaterialQuery,
) -> Result<Vec<Material>> {
  gate(principal, Operation::ListMaterials)?;
  store.list_materials(query).await.map_err(Error::store)
}

/// Open a material; counts as one view.
pub async fn view_material<S: RecordStore>(
  store: &S,
  principal: &Principal,
  id: MaterialId,
) -> Result<Material> {
  gate(principal, Operation::ViewMaterial)?;
  store
    .record_material_view(id)
    .await
    .map_err(Error::store)?
    .ok_or(Error::MaterialNotFound(id))
}

pub async fn create_material<S: RecordStore>(
  store: &S,
  principal: &Principal,
  input: &MaterialInput,
) -> Result<Material> {
  gate(principal, Operation::CreateMaterial)?;
  let draft = validate_material(input).map_err(Error::Validation)?;
  let material = store.create_material(draft).await.map_err(Error::store)?;
  info!(material_id = material.id, "material created");
  Ok(material)
}

pub async fn update_material<S: RecordStore>(
  store: &S,
  principal: &Principal,
  id: MaterialId,
  input: &MaterialInput,
) -> Result<Material> {
  gate(principal, Operation::UpdateMaterial)?;
  let draft = validate_material(input).map_err(Error::Validation)?;
  let material = store
    .update_material(id, draft)
    .await
    .map_err(Error::store)?
    .ok_or(Error::MaterialNotFound(id))?;
  info!(material_id = id, "material updated");
  Ok(material)
}

pub async fn delete_material<S: RecordStore>(
  store: &S,
  principal: &Principal,
  id: MaterialId,
) -> Result<()> {
  gate(principal, Operation::DeleteMaterial)?;
  if !store.delete_material(id).await.map_err(Error::store)? {
    return Err(Error::MaterialNotFound(id));
  }
  info!(material_id = id, "material deleted");
  Ok(())
}

// ─── Dashboard ───────────────────────────────────────────────────────────────

pub async fn dashboard<S: RecordStore>(store: &S, principal: &Principal) -> Result<Stats> {
  gate(principal, Operation::ViewDashboard)?;
  store.stats().await.map_err(Error::store)
}
