//! Row mapping between SQLite result rows and domain types.
//!
//! Booleans are stored as `0`/`1` integers and counts as signed 64-bit
//! integers; both are converted here.

use roster_core::{
  material::Material,
  store::Stats,
  student::{Student, Subject},
};
use rusqlite::Row;

use crate::{Error, Result};

// ─── Counts ──────────────────────────────────────────────────────────────────

pub fn decode_count(n: i64) -> Result<u64> {
  u64::try_from(n).map_err(|_| Error::Decode(format!("negative count: {n}")))
}

// ─── Students & subjects ─────────────────────────────────────────────────────

/// Maps `id, first_name, last_name, avatar, is_active`.
pub fn read_student(row: &Row<'_>) -> rusqlite::Result<Student> {
  Ok(Student {
    id:         row.get(0)?,
    first_name: row.get(1)?,
    last_name:  row.get(2)?,
    avatar:     row.get(3)?,
    is_active:  row.get(4)?,
  })
}

/// Maps `id, student_id, title, description`.
pub fn read_subject(row: &Row<'_>) -> rusqlite::Result<Subject> {
  Ok(Subject {
    id:          row.get(0)?,
    student_id:  row.get(1)?,
    title:       row.get(2)?,
    description: row.get(3)?,
  })
}

// ─── Materials ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `materials` row.
pub struct RawMaterial {
  pub id:           i64,
  pub title:        String,
  pub body:         String,
  pub views_count:  i64,
  pub is_published: bool,
  pub slug:         Option<String>,
}

impl RawMaterial {
  /// Maps `id, title, body, views_count, is_published, slug`.
  pub fn read(row: &Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:           row.get(0)?,
      title:        row.get(1)?,
      body:         row.get(2)?,
      views_count:  row.get(3)?,
      is_published: row.get(4)?,
      slug:         row.get(5)?,
    })
  }

  pub fn into_material(self) -> Result<Material> {
    Ok(Material {
      id:           self.id,
      title:        self.title,
      body:         self.body,
      views_count:  decode_count(self.views_count)?,
      is_published: self.is_published,
      slug:         self.slug,
    })
  }
}

// ─── Stats ───────────────────────────────────────────────────────────────────

/// Raw counts in [`Stats`] field order.
pub struct RawStats(pub [i64; 4]);

impl RawStats {
  pub fn into_stats(self) -> Result<Stats> {
    let [students, active_students, materials, published_materials] = self.0;
    Ok(Stats {
      students:            decode_count(students)?,
      active_students:     decode_count(active_students)?,
      materials:           decode_count(materials)?,
      published_materials: decode_count(published_materials)?,
    })
  }
}
