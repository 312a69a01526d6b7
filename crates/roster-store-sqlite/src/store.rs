//! [`SqliteStore`], the SQLite implementation of [`RecordStore`].

use std::path::Path;

use rusqlite::OptionalExtension as _;

use roster_core::{
  material::{Material, MaterialDraft, MaterialId},
  store::{MaterialQuery, RecordStore, Stats, SubjectChanges},
  student::{Student, StudentDraft, StudentId, Subject},
};

use crate::{
  Result,
  encode::{RawMaterial, RawStats, read_student, read_subject},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Roster record store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, mostly for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    tracing::debug!("sqlite schema ready");
    Ok(())
  }
}

// ─── Statement helpers ───────────────────────────────────────────────────────
//
// These run inside `Connection::call` closures and take a plain connection so
// they work the same on a connection or inside a transaction.

fn select_subjects(
  conn: &rusqlite::Connection,
  student_id: StudentId,
) -> rusqlite::Result<Vec<Subject>> {
  let mut stmt = conn.prepare(
    "SELECT id, student_id, title, description
     FROM subjects WHERE student_id = ?1 ORDER BY id",
  )?;
  let rows = stmt
    .query_map(rusqlite::params![student_id], read_subject)?
    .collect::<rusqlite::Result<Vec<_>>>()?;
  Ok(rows)
}

fn update_student_row(
  conn: &rusqlite::Connection,
  id: StudentId,
  draft: &StudentDraft,
) -> rusqlite::Result<Option<Student>> {
  conn
    .query_row(
      "UPDATE students SET first_name = ?1, last_name = ?2, avatar = ?3
       WHERE id = ?4
       RETURNING id, first_name, last_name, avatar, is_active",
      rusqlite::params![draft.first_name, draft.last_name, draft.avatar, id],
      read_student,
    )
    .optional()
}

/// Apply deletes first, then updates, then inserts.
fn apply_subject_changes(
  conn: &rusqlite::Connection,
  student_id: StudentId,
  changes: &SubjectChanges,
) -> rusqlite::Result<()> {
  for id in &changes.delete {
    conn.execute(
      "DELETE FROM subjects WHERE id = ?1 AND student_id = ?2",
      rusqlite::params![id, student_id],
    )?;
  }
  for (id, draft) in &changes.update {
    conn.execute(
      "UPDATE subjects SET title = ?1, description = ?2
       WHERE id = ?3 AND student_id = ?4",
      rusqlite::params![draft.title, draft.description, id, student_id],
    )?;
  }
  for draft in &changes.create {
    conn.execute(
      "INSERT INTO subjects (student_id, title, description) VALUES (?1, ?2, ?3)",
      rusqlite::params![student_id, draft.title, draft.description],
    )?;
  }
  Ok(())
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = crate::Error;

  // ── Students ─────────────────────────────────────────────────────────────

  async fn create_student(&self, draft: StudentDraft) -> Result<Student> {
    let student = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO students (first_name, last_name, avatar) VALUES (?1, ?2, ?3)
           RETURNING id, first_name, last_name, avatar, is_active",
          rusqlite::params![draft.first_name, draft.last_name, draft.avatar],
          read_student,
        )?)
      })
      .await?;
    Ok(student)
  }

  async fn get_student(&self, id: StudentId) -> Result<Option<Student>> {
    let student = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, first_name, last_name, avatar, is_active
             FROM students WHERE id = ?1",
            rusqlite::params![id],
            read_student,
          )
          .optional()?)
      })
      .await?;
    Ok(student)
  }

  async fn list_students(&self) -> Result<Vec<Student>> {
    let students = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT id, first_name, last_name, avatar, is_active
           FROM students ORDER BY last_name ASC, id ASC",
        )?;
        let rows = stmt
          .query_map([], read_student)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;
    Ok(students)
  }

  async fn update_student(
    &self,
    id: StudentId,
    draft: StudentDraft,
  ) -> Result<Option<Student>> {
    let student = self
      .conn
      .call(move |conn| Ok(update_student_row(conn, id, &draft)?))
      .await?;
    Ok(student)
  }

  async fn toggle_student_active(&self, id: StudentId) -> Result<Option<Student>> {
    let student = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "UPDATE students SET is_active = NOT is_active WHERE id = ?1
             RETURNING id, first_name, last_name, avatar, is_active",
            rusqlite::params![id],
            read_student,
          )
          .optional()?)
      })
      .await?;
    Ok(student)
  }

  async fn delete_student(&self, id: StudentId) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute("DELETE FROM students WHERE id = ?1", rusqlite::params![id])?;
        Ok(n > 0)
      })
      .await?;
    Ok(deleted)
  }

  // ── Subjects ─────────────────────────────────────────────────────────────

  async fn list_subjects(&self, student_id: StudentId) -> Result<Vec<Subject>> {
    let subjects = self
      .conn
      .call(move |conn| Ok(select_subjects(conn, student_id)?))
      .await?;
    Ok(subjects)
  }

  async fn replace_subjects(
    &self,
    student_id: StudentId,
    changes: SubjectChanges,
  ) -> Result<Vec<Subject>> {
    let subjects = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        apply_subject_changes(&tx, student_id, &changes)?;
        let subjects = select_subjects(&tx, student_id)?;
        tx.commit()?;
        Ok(subjects)
      })
      .await?;
    Ok(subjects)
  }

  async fn update_student_with_subjects(
    &self,
    id: StudentId,
    draft: StudentDraft,
    changes: SubjectChanges,
  ) -> Result<Option<(Student, Vec<Subject>)>> {
    let result = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        // Dropping `tx` without commit rolls back.
        let Some(student) = update_student_row(&tx, id, &draft)? else {
          return Ok(None);
        };
        apply_subject_changes(&tx, id, &changes)?;
        let subjects = select_subjects(&tx, id)?;
        tx.commit()?;
        Ok(Some((student, subjects)))
      })
      .await?;
    Ok(result)
  }

  // ── Materials ────────────────────────────────────────────────────────────

  async fn create_material(&self, draft: MaterialDraft) -> Result<Material> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "INSERT INTO materials (title, body, is_published, slug) VALUES (?1, ?2, ?3, ?4)
           RETURNING id, title, body, views_count, is_published, slug",
          rusqlite::params![draft.title, draft.body, draft.is_published, draft.slug],
          RawMaterial::read,
        )?)
      })
      .await?;
    raw.into_material()
  }

  async fn get_material(&self, id: MaterialId) -> Result<Option<Material>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, title, body, views_count, is_published, slug
             FROM materials WHERE id = ?1",
            rusqlite::params![id],
            RawMaterial::read,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawMaterial::into_material).transpose()
  }

  async fn list_materials(&self, query: MaterialQuery) -> Result<Vec<Material>> {
    let published_only = query.published_only;

    let raws = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, title, body, views_count, is_published, slug
           FROM materials
           WHERE (?1 = 0 OR is_published = 1)
           ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![published_only], RawMaterial::read)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMaterial::into_material).collect()
  }

  async fn update_material(
    &self,
    id: MaterialId,
    draft: MaterialDraft,
  ) -> Result<Option<Material>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "UPDATE materials SET title = ?1, body = ?2, is_published = ?3, slug = ?4
             WHERE id = ?5
             RETURNING id, title, body, views_count, is_published, slug",
            rusqlite::params![draft.title, draft.body, draft.is_published, draft.slug, id],
            RawMaterial::read,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawMaterial::into_material).transpose()
  }

  async fn delete_material(&self, id: MaterialId) -> Result<bool> {
    let deleted = self
      .conn
      .call(move |conn| {
        let n = conn.execute("DELETE FROM materials WHERE id = ?1", rusqlite::params![id])?;
        Ok(n > 0)
      })
      .await?;
    Ok(deleted)
  }

  async fn record_material_view(&self, id: MaterialId) -> Result<Option<Material>> {
    let raw = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "UPDATE materials SET views_count = views_count + 1 WHERE id = ?1
             RETURNING id, title, body, views_count, is_published, slug",
            rusqlite::params![id],
            RawMaterial::read,
          )
          .optional()?)
      })
      .await?;
    raw.map(RawMaterial::into_material).transpose()
  }

  // ── Reads ────────────────────────────────────────────────────────────────

  async fn stats(&self) -> Result<Stats> {
    let raw = self
      .conn
      .call(|conn| {
        Ok(conn.query_row(
          "SELECT
             (SELECT COUNT(*) FROM students),
             (SELECT COUNT(*) FROM students  WHERE is_active = 1),
             (SELECT COUNT(*) FROM materials),
             (SELECT COUNT(*) FROM materials WHERE is_published = 1)",
          [],
          |row| Ok(RawStats([row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?])),
        )?)
      })
      .await?;
    raw.into_stats()
  }
}
