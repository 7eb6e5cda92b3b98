//! Mood journal
//!
//! Saved interventions are appended to a SQLite file for later display.
//! The journal is a record of what happened; nothing in the engine reads it
//! back to make decisions.

use crate::error::{CoachError, Result};
use crate::intent::Mood;
use crate::intervention::{Reaction, SavedIntervention};
use anyhow::Context;
use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

pub mod types;
pub use types::JournalEntry;

/// File name of the journal database inside the data directory
pub const JOURNAL_FILE: &str = "journal.db";

/// SQLite-backed store of saved interventions
#[derive(Debug, Clone)]
pub struct MoodJournal {
    db_path: PathBuf,
}

impl MoodJournal {
    /// Opens the journal in the user's data directory
    ///
    /// `COACHKIT_JOURNAL_DB` overrides the file location.
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Storage` if the data directory cannot be
    /// determined or created, or the schema cannot be applied
    pub fn new() -> Result<Self> {
        if let Ok(override_path) = std::env::var("COACHKIT_JOURNAL_DB") {
            return Self::new_with_path(override_path);
        }

        let proj_dirs = ProjectDirs::from("com", "coachkit", "coachkit")
            .ok_or_else(|| CoachError::Storage("Could not determine data directory".into()))?;
        Self::in_dir(proj_dirs.data_dir())
    }

    /// Opens the journal inside `data_dir`, creating the directory if needed
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Storage` if the directory or schema cannot be
    /// created
    pub fn in_dir(data_dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(data_dir)
            .context("Failed to create data directory")
            .map_err(|e| CoachError::Storage(e.to_string()))?;
        Self::new_with_path(data_dir.join(JOURNAL_FILE))
    }

    /// Opens the journal at an explicit database path
    ///
    /// # Examples
    ///
    /// ```
    /// use coachkit::storage::MoodJournal;
    ///
    /// let dir = tempfile::tempdir().unwrap();
    /// let journal = MoodJournal::new_with_path(dir.path().join("journal.db")).unwrap();
    /// assert_eq!(journal.count().unwrap(), 0);
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Storage` if the schema cannot be applied
    pub fn new_with_path<P: Into<PathBuf>>(db_path: P) -> Result<Self> {
        let journal = Self {
            db_path: db_path.into(),
        };
        journal.init()?;
        Ok(journal)
    }

    /// Path of the backing database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    fn open(&self) -> Result<Connection> {
        Connection::open(&self.db_path)
            .context("Failed to open database")
            .map_err(|e| CoachError::Storage(e.to_string()).into())
    }

    fn init(&self) -> Result<()> {
        let conn = self.open()?;
        conn.execute(
            "CREATE TABLE IF NOT EXISTS saved_interventions (
                id TEXT PRIMARY KEY,
                reported_at TEXT NOT NULL,
                saved_at TEXT NOT NULL,
                rating INTEGER NOT NULL,
                mood TEXT NOT NULL,
                note TEXT NOT NULL,
                shown_count INTEGER NOT NULL,
                helped_count INTEGER NOT NULL,
                payload TEXT NOT NULL
            )",
            [],
        )
        .context("Failed to create saved_interventions table")
        .map_err(|e| CoachError::Storage(e.to_string()))?;
        Ok(())
    }

    /// Stores a saved intervention, replacing any earlier save of the same
    /// mood entry
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Storage` if the write fails
    pub fn save(&self, saved: &SavedIntervention) -> Result<()> {
        let conn = self.open()?;
        let payload = serde_json::to_string(saved)
            .context("Failed to serialize intervention")
            .map_err(|e| CoachError::Storage(e.to_string()))?;
        let helped = saved
            .records
            .iter()
            .filter(|r| r.reaction == Some(Reaction::Helped))
            .count();

        conn.execute(
            "INSERT OR REPLACE INTO saved_interventions
                (id, reported_at, saved_at, rating, mood, note, shown_count, helped_count, payload)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                saved.entry.id,
                saved.entry.timestamp.to_rfc3339(),
                saved.saved_at.to_rfc3339(),
                saved.entry.rating,
                saved.mood.as_str(),
                saved.entry.note,
                saved.shown.len() as i64,
                helped as i64,
                payload,
            ],
        )
        .context("Failed to insert intervention")
        .map_err(|e| CoachError::Storage(e.to_string()))?;

        tracing::debug!(id = %saved.entry.id, mood = %saved.mood, "Journaled intervention");
        Ok(())
    }

    /// Lists the most recent saves, newest first
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Storage` if the query fails
    pub fn list(&self, limit: usize) -> Result<Vec<JournalEntry>> {
        let conn = self.open()?;
        let mut stmt = conn
            .prepare(
                "SELECT id, reported_at, saved_at, rating, mood, note, shown_count, helped_count
                FROM saved_interventions
                ORDER BY saved_at DESC
                LIMIT ?",
            )
            .context("Failed to prepare statement")
            .map_err(|e| CoachError::Storage(e.to_string()))?;

        let rows = stmt
            .query_map(params![limit as i64], |row| {
                let id: String = row.get(0)?;
                let reported_at: String = row.get(1)?;
                let saved_at: String = row.get(2)?;
                let rating: u8 = row.get(3)?;
                let mood: String = row.get(4)?;
                let note: String = row.get(5)?;
                let shown_count: i64 = row.get(6)?;
                let helped_count: i64 = row.get(7)?;
                Ok(JournalEntry {
                    id,
                    reported_at: parse_timestamp(&reported_at),
                    saved_at: parse_timestamp(&saved_at),
                    rating,
                    mood: Mood::parse_str(&mood).unwrap_or(Mood::Neutral),
                    note,
                    shown_count: shown_count.max(0) as usize,
                    helped_count: helped_count.max(0) as usize,
                })
            })
            .context("Failed to query journal")
            .map_err(|e| CoachError::Storage(e.to_string()))?;

        Ok(rows.flatten().collect())
    }

    /// Loads a full saved intervention by id (full ULID or prefix)
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Storage` if the query fails or the stored payload
    /// is unreadable
    pub fn load(&self, id: &str) -> Result<Option<SavedIntervention>> {
        let conn = self.open()?;
        let payload: Option<String> = conn
            .query_row(
                "SELECT payload FROM saved_interventions WHERE id LIKE ? ORDER BY saved_at DESC",
                params![format!("{}%", id)],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to query intervention")
            .map_err(|e| CoachError::Storage(e.to_string()))?;

        payload
            .map(|json| {
                serde_json::from_str(&json)
                    .context("Failed to deserialize intervention")
                    .map_err(|e| CoachError::Storage(e.to_string()).into())
            })
            .transpose()
    }

    /// Deletes saves whose id starts with `id`; returns how many were removed
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Storage` if the delete fails
    pub fn delete(&self, id: &str) -> Result<usize> {
        let conn = self.open()?;
        let removed = conn
            .execute(
                "DELETE FROM saved_interventions WHERE id LIKE ?",
                params![format!("{}%", id)],
            )
            .context("Failed to delete intervention")
            .map_err(|e| CoachError::Storage(e.to_string()))?;
        Ok(removed)
    }

    /// Number of stored saves
    ///
    /// # Errors
    ///
    /// Returns `CoachError::Storage` if the query fails
    pub fn count(&self) -> Result<usize> {
        let conn = self.open()?;
        let count: i64 = conn
            .query_row("SELECT count(*) FROM saved_interventions", [], |row| {
                row.get(0)
            })
            .context("Failed to count interventions")
            .map_err(|e| CoachError::Storage(e.to_string()))?;
        Ok(count.max(0) as usize)
    }
}

fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
