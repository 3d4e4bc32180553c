//! SQLite-based subject and study-record storage.
//!
//! Provides persistent storage for:
//! - Subjects (named categories study time is attributed to)
//! - Study records (seconds of work credited to a subject)
//! - Aggregated statistics (totals, per-subject, per-day)

use chrono::{DateTime, Duration, NaiveDate, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use std::sync::Mutex;

use crate::error::{CoreError, DatabaseError};
use crate::timer::ProgressStore;

use super::data_dir;

/// A named category study time is attributed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Subject {
    pub id: i64,
    pub name: String,
}

/// One committed slice of work time.
#[derive(Debug, Clone, Serialize)]
pub struct StudyRecord {
    pub id: i64,
    pub subject_id: i64,
    pub seconds: u64,
    pub recorded_at: DateTime<Utc>,
}

/// All-time study seconds for one subject.
#[derive(Debug, Clone, Serialize)]
pub struct SubjectTotal {
    pub name: String,
    pub seconds: u64,
}

/// Study seconds accumulated on one calendar day (UTC).
#[derive(Debug, Clone, Serialize)]
pub struct DailyTotal {
    pub date: NaiveDate,
    pub seconds: u64,
}

/// SQLite database for subjects and study records.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at `~/.config/pomostudy/pomostudy.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, CoreError> {
        let path = data_dir()?.join("pomostudy.db");
        let conn = Connection::open(&path).map_err(|source| DatabaseError::OpenFailed {
            path,
            source,
        })?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    /// Open an in-memory database (tests and throwaway runs).
    ///
    /// # Errors
    /// Returns an error if the schema cannot be created.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        let conn = Connection::open_in_memory()?;
        let db = Self { conn };
        db.migrate()?;
        Ok(db)
    }

    fn migrate(&self) -> Result<(), DatabaseError> {
        self.conn.execute_batch(
            "PRAGMA foreign_keys = ON;

            CREATE TABLE IF NOT EXISTS subjects (
                id   INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL UNIQUE
            );

            CREATE TABLE IF NOT EXISTS study_sessions (
                id          INTEGER PRIMARY KEY AUTOINCREMENT,
                subject_id  INTEGER NOT NULL REFERENCES subjects(id) ON DELETE CASCADE,
                seconds     INTEGER NOT NULL,
                recorded_at TEXT NOT NULL
            );

            CREATE INDEX IF NOT EXISTS idx_study_sessions_recorded_at
                ON study_sessions(recorded_at);
            CREATE INDEX IF NOT EXISTS idx_study_sessions_subject_id
                ON study_sessions(subject_id);",
        )?;
        Ok(())
    }

    // ── Subjects ─────────────────────────────────────────────────────

    /// Create a new subject.
    ///
    /// # Errors
    /// Returns an error if the name already exists.
    pub fn add_subject(&self, name: &str) -> Result<Subject, DatabaseError> {
        self.conn
            .execute("INSERT INTO subjects (name) VALUES (?1)", params![name])?;
        Ok(Subject {
            id: self.conn.last_insert_rowid(),
            name: name.to_string(),
        })
    }

    /// Look up a subject by name without creating it.
    pub fn get_subject(&self, name: &str) -> Result<Option<Subject>, DatabaseError> {
        let subject = self
            .conn
            .query_row(
                "SELECT id, name FROM subjects WHERE name = ?1",
                params![name],
                |row| {
                    Ok(Subject {
                        id: row.get(0)?,
                        name: row.get(1)?,
                    })
                },
            )
            .optional()?;
        Ok(subject)
    }

    /// Fetch a subject by name, creating it if it doesn't exist yet.
    pub fn fetch_subject(&self, name: &str) -> Result<Subject, DatabaseError> {
        if let Some(subject) = self.get_subject(name)? {
            return Ok(subject);
        }
        self.add_subject(name)
    }

    pub fn list_subjects(&self) -> Result<Vec<Subject>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, name FROM subjects ORDER BY name")?;
        let rows = stmt.query_map([], |row| {
            Ok(Subject {
                id: row.get(0)?,
                name: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Rename a subject; its records follow it.
    ///
    /// # Errors
    /// Returns `UnknownSubject` if no subject has the old name.
    pub fn rename_subject(&self, old: &str, new: &str) -> Result<(), DatabaseError> {
        let changed = self.conn.execute(
            "UPDATE subjects SET name = ?1 WHERE name = ?2",
            params![new, old],
        )?;
        if changed == 0 {
            return Err(DatabaseError::UnknownSubject(old.to_string()));
        }
        Ok(())
    }

    /// Delete a subject and, via cascade, all of its records.
    ///
    /// # Errors
    /// Returns `UnknownSubject` if no subject has the name.
    pub fn delete_subject(&self, name: &str) -> Result<(), DatabaseError> {
        let changed = self
            .conn
            .execute("DELETE FROM subjects WHERE name = ?1", params![name])?;
        if changed == 0 {
            return Err(DatabaseError::UnknownSubject(name.to_string()));
        }
        Ok(())
    }

    // ── Study records ────────────────────────────────────────────────

    /// Commit one slice of work time against a subject, resolving the
    /// subject get-or-create by name.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub fn record_progress(
        &self,
        subject_name: &str,
        seconds: u64,
        recorded_at: DateTime<Utc>,
    ) -> Result<i64, DatabaseError> {
        let subject = self.fetch_subject(subject_name)?;
        self.conn.execute(
            "INSERT INTO study_sessions (subject_id, seconds, recorded_at)
             VALUES (?1, ?2, ?3)",
            params![subject.id, seconds, recorded_at.to_rfc3339()],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    pub fn records_for_subject(&self, name: &str) -> Result<Vec<StudyRecord>, DatabaseError> {
        let subject = self
            .get_subject(name)?
            .ok_or_else(|| DatabaseError::UnknownSubject(name.to_string()))?;
        let mut stmt = self.conn.prepare(
            "SELECT id, subject_id, seconds, recorded_at
             FROM study_sessions WHERE subject_id = ?1
             ORDER BY recorded_at DESC",
        )?;
        let rows = stmt.query_map(params![subject.id], |row| {
            let recorded_at: String = row.get(3)?;
            Ok((row.get(0)?, row.get(1)?, row.get::<_, u64>(2)?, recorded_at))
        })?;
        let mut records = Vec::new();
        for row in rows {
            let (id, subject_id, seconds, recorded_at) = row?;
            let recorded_at = DateTime::parse_from_rfc3339(&recorded_at)
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?
                .with_timezone(&Utc);
            records.push(StudyRecord {
                id,
                subject_id,
                seconds,
                recorded_at,
            });
        }
        Ok(records)
    }

    // ── Statistics ───────────────────────────────────────────────────

    /// All-time sum of recorded study seconds.
    pub fn total_study_secs(&self) -> Result<u64, DatabaseError> {
        let total = self.conn.query_row(
            "SELECT COALESCE(SUM(seconds), 0) FROM study_sessions",
            [],
            |row| row.get(0),
        )?;
        Ok(total)
    }

    /// Per-subject totals, most-studied first; subjects without records
    /// appear with zero seconds, ties broken alphabetically.
    pub fn subject_totals(&self) -> Result<Vec<SubjectTotal>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT s.name, COALESCE(SUM(ss.seconds), 0) AS total
             FROM subjects s
             LEFT JOIN study_sessions ss ON ss.subject_id = s.id
             GROUP BY s.id, s.name
             ORDER BY total DESC, s.name ASC",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok(SubjectTotal {
                name: row.get(0)?,
                seconds: row.get(1)?,
            })
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }

    /// Per-day totals for the trailing `days` days including today (UTC),
    /// zero-filled for days without records.
    pub fn daily_totals(&self, days: u32) -> Result<Vec<DailyTotal>, DatabaseError> {
        let today = Utc::now().date_naive();
        let first = today - Duration::days(i64::from(days.saturating_sub(1)));

        let mut stmt = self.conn.prepare(
            "SELECT date(recorded_at), COALESCE(SUM(seconds), 0)
             FROM study_sessions
             WHERE date(recorded_at) >= ?1
             GROUP BY date(recorded_at)",
        )?;
        let rows = stmt.query_map(params![first.to_string()], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, u64>(1)?))
        })?;

        let mut by_day = std::collections::HashMap::new();
        for row in rows {
            let (day, seconds) = row?;
            let day = day
                .parse::<NaiveDate>()
                .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;
            by_day.insert(day, seconds);
        }

        let mut totals = Vec::with_capacity(days as usize);
        let mut day = first;
        while day <= today {
            totals.push(DailyTotal {
                date: day,
                seconds: by_day.get(&day).copied().unwrap_or(0),
            });
            day = day + Duration::days(1);
        }
        Ok(totals)
    }
}

/// The engine-facing persistence seam. The mutex makes the store shareable
/// with the tick task; each commit is short and holds the lock only for
/// the insert.
impl ProgressStore for Mutex<Database> {
    fn record_progress(
        &self,
        subject: &str,
        seconds: u64,
        recorded_at: DateTime<Utc>,
    ) -> Result<(), CoreError> {
        let db = self.lock().map_err(|_| DatabaseError::Locked)?;
        db.record_progress(subject, seconds, recorded_at)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fetch_subject_is_get_or_create() {
        let db = Database::open_memory().unwrap();
        let first = db.fetch_subject("maths").unwrap();
        let second = db.fetch_subject("maths").unwrap();
        assert_eq!(first.id, second.id);
        assert_eq!(db.list_subjects().unwrap().len(), 1);
    }

    #[test]
    fn add_subject_rejects_duplicates() {
        let db = Database::open_memory().unwrap();
        db.add_subject("maths").unwrap();
        assert!(db.add_subject("maths").is_err());
    }

    #[test]
    fn rename_subject_keeps_records() {
        let db = Database::open_memory().unwrap();
        db.record_progress("maths", 120, Utc::now()).unwrap();
        db.rename_subject("maths", "applied maths").unwrap();
        let records = db.records_for_subject("applied maths").unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].seconds, 120);
        assert!(db.get_subject("maths").unwrap().is_none());
    }

    #[test]
    fn rename_unknown_subject_errors() {
        let db = Database::open_memory().unwrap();
        assert!(matches!(
            db.rename_subject("ghost", "other"),
            Err(DatabaseError::UnknownSubject(_))
        ));
    }

    #[test]
    fn delete_subject_cascades_to_records() {
        let db = Database::open_memory().unwrap();
        db.record_progress("maths", 60, Utc::now()).unwrap();
        db.record_progress("physics", 30, Utc::now()).unwrap();
        db.delete_subject("maths").unwrap();

        assert!(db.get_subject("maths").unwrap().is_none());
        assert_eq!(db.total_study_secs().unwrap(), 30);
    }

    #[test]
    fn record_progress_resolves_subject_by_name() {
        let db = Database::open_memory().unwrap();
        db.record_progress("history", 300, Utc::now()).unwrap();
        let subject = db.get_subject("history").unwrap().unwrap();
        let records = db.records_for_subject("history").unwrap();
        assert_eq!(records[0].subject_id, subject.id);
    }

    #[test]
    fn subject_totals_sorted_by_time_then_name() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.add_subject("biology").unwrap();
        db.record_progress("maths", 100, now).unwrap();
        db.record_progress("physics", 400, now).unwrap();
        db.record_progress("maths", 50, now).unwrap();

        let totals = db.subject_totals().unwrap();
        let names: Vec<&str> = totals.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["physics", "maths", "biology"]);
        assert_eq!(totals[0].seconds, 400);
        assert_eq!(totals[1].seconds, 150);
        assert_eq!(totals[2].seconds, 0);
    }

    #[test]
    fn daily_totals_zero_fill_trailing_week() {
        let db = Database::open_memory().unwrap();
        let now = Utc::now();
        db.record_progress("maths", 100, now).unwrap();
        db.record_progress("maths", 20, now - Duration::days(2)).unwrap();
        // Outside the window.
        db.record_progress("maths", 999, now - Duration::days(10)).unwrap();

        let totals = db.daily_totals(7).unwrap();
        assert_eq!(totals.len(), 7);
        assert_eq!(totals[6].date, now.date_naive());
        assert_eq!(totals[6].seconds, 100);
        assert_eq!(totals[4].seconds, 20);
        assert_eq!(totals.iter().map(|t| t.seconds).sum::<u64>(), 120);
    }

    #[test]
    fn progress_store_commits_through_mutex() {
        let db = Mutex::new(Database::open_memory().unwrap());
        ProgressStore::record_progress(&db, "maths", 42, Utc::now()).unwrap();
        assert_eq!(db.lock().unwrap().total_study_secs().unwrap(), 42);
    }
}
