//! SQL schema for the Roster SQLite store.
//!
//! Executed once at connection startup. Future migrations will be gated on
//! `PRAGMA user_version`.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS students (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    first_name  TEXT    NOT NULL CHECK (length(first_name) BETWEEN 1 AND 100),
    last_name   TEXT    NOT NULL CHECK (length(last_name)  BETWEEN 1 AND 100),
    avatar      TEXT             CHECK (avatar IS NULL OR length(avatar) <= 100),
    is_active   INTEGER NOT NULL DEFAULT 1
);

-- Subjects have no lifecycle of their own; they go with their student.
CREATE TABLE IF NOT EXISTS subjects (
    id          INTEGER PRIMARY KEY AUTOINCREMENT,
    student_id  INTEGER NOT NULL REFERENCES students(id) ON DELETE CASCADE,
    title       TEXT    NOT NULL CHECK (length(title) BETWEEN 1 AND 150),
    description TEXT    NOT NULL
);

CREATE TABLE IF NOT EXISTS materials (
    id           INTEGER PRIMARY KEY AUTOINCREMENT,
    title        TEXT    NOT NULL CHECK (length(title) BETWEEN 1 AND 150),
    body         TEXT    NOT NULL,
    views_count  INTEGER NOT NULL DEFAULT 0 CHECK (views_count >= 0),
    is_published INTEGER NOT NULL DEFAULT 1,
    slug         TEXT             CHECK (slug IS NULL OR length(slug) <= 150)
);

CREATE INDEX IF NOT EXISTS students_last_name_idx ON students(last_name);
CREATE INDEX IF NOT EXISTS subjects_student_idx   ON subjects(student_id);

PRAGMA user_version = 1;
";
