//! Access gate: who may perform which operation.
//!
//! Every operation in [`crate::ops`] calls [`authorize`] with an explicit
//! [`Principal`] before touching the store. A denial has no side effects.

use std::{collections::BTreeSet, fmt};

use serde::{Deserialize, Serialize};
use thiserror::Error;

// ─── Principals ──────────────────────────────────────────────────────────────

/// A named permission that can be granted to an account.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
  ViewStudent,
  AddStudent,
  ChangeStudent,
  AddMaterial,
  ChangeMaterial,
  DeleteMaterial,
}

impl Permission {
  pub fn codename(self) -> &'static str {
    match self {
      Self::ViewStudent => "view_student",
      Self::AddStudent => "add_student",
      Self::ChangeStudent => "change_student",
      Self::AddMaterial => "add_material",
      Self::ChangeMaterial => "change_material",
      Self::DeleteMaterial => "delete_material",
    }
  }
}

impl fmt::Display for Permission {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.codename())
  }
}

/// An authenticated user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
  pub username:     String,
  /// Superusers implicitly hold every permission.
  pub is_superuser: bool,
  pub permissions:  BTreeSet<Permission>,
}

impl Account {
  pub fn has_permission(&self, permission: Permission) -> bool {
    self.is_superuser || self.permissions.contains(&permission)
  }
}

/// The actor making a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
  Anonymous,
  Account(Account),
}

impl Principal {
  pub fn username(&self) -> Option<&str> {
    match self {
      Self::Anonymous => None,
      Self::Account(a) => Some(&a.username),
    }
  }
}

// ─── Operations ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
  ListStudents,
  ViewStudent,
  CreateStudent,
  EditStudent,
  DeleteStudent,
  ToggleActive,
  ListMaterials,
  ViewMaterial,
  CreateMaterial,
  UpdateMaterial,
  DeleteMaterial,
  ViewDashboard,
  SubmitContact,
}

/// What a principal must satisfy to perform an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Requirement {
  Public,
  Authenticated,
  Permission(Permission),
  Superuser,
}

impl Operation {
  pub fn requirement(self) -> Requirement {
    match self {
      Self::ViewStudent => Requirement::Public,
      Self::ListStudents
      | Self::ToggleActive
      | Self::ListMaterials
      | Self::ViewMaterial
      | Self::ViewDashboard => Requirement::Authenticated,
      Self::CreateStudent => Requirement::Permission(Permission::AddStudent),
      Self::EditStudent => Requirement::Permission(Permission::ChangeStudent),
      Self::SubmitContact => Requirement::Permission(Permission::ViewStudent),
      Self::CreateMaterial => Requirement::Permission(Permission::AddMaterial),
      Self::UpdateMaterial => Requirement::Permission(Permission::ChangeMaterial),
      Self::DeleteMaterial => Requirement::Permission(Permission::DeleteMaterial),
      Self::DeleteStudent => Requirement::Superuser,
    }
  }
}

// ─── Gate ────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", content = "permission", rename_all = "snake_case")]
pub enum Denied {
  #[error("authentication required")]
  Unauthenticated,
  #[error("missing permission {0}")]
  MissingPermission(Permission),
  #[error("operation not permitted for this account")]
  NotOwner,
}

pub fn authorize(principal: &Principal, operation: Operation) -> Result<(), Denied> {
  let requirement = operation.requirement();
  if requirement == Requirement::Public {
    return Ok(());
  }

  let Principal::Account(account) = principal else {
    return Err(Denied::Unauthenticated);
  };

  match requirement {
    Requirement::Public | Requirement::Authenticated => Ok(()),
    Requirement::Permission(p) if account.has_permission(p) => Ok(()),
    Requirement::Permission(p) => Err(Denied::MissingPermission(p)),
    Requirement::Superuser if account.is_superuser => Ok(()),
    Requirement::Superuser => Err(Denied::NotOwner),
  }
}
