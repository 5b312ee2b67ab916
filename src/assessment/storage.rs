//! Assessment history storage and retrieval using SQLite.
//!
//! Manages persistent storage of completed assessments with timestamps,
//! and provides querying capabilities for the history viewer.

use anyhow::Result;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection};
use std::path::{Path, PathBuf};

use crate::exercise::ExerciseId;

/// A single completed assessment in the history.
#[derive(Debug, Clone)]
pub struct AssessmentEntry {
    /// Unique identifier for this assessment
    pub id: i64,
    /// The exercise that was assessed
    pub exercise: ExerciseId,
    /// Repetitions counted during the session
    pub reps: u32,
    /// Path to the captured video, if still available
    pub video_path: Option<String>,
    /// When this assessment was completed
    pub created_at: DateTime<Local>,
}

/// Manages the assessment history database.
pub struct AssessmentStore {
    /// Path to the SQLite database file
    database_path: PathBuf,
    /// Connection to the database (lazy-loaded)
    connection: Option<Connection>,
}

impl AssessmentStore {
    /// Creates a new store for the given data directory.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let database_path = data_dir.join("assessments.db");

        Ok(Self {
            database_path,
            connection: None,
        })
    }

    /// Initializes database connection and creates tables if necessary.
    fn get_connection(&mut self) -> Result<&Connection> {
        if self.connection.is_none() {
            if let Some(parent) = self.database_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            let connection = Connection::open(&self.database_path)?;

            connection.execute(
                "CREATE TABLE IF NOT EXISTS assessments (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    exercise TEXT NOT NULL,
                    reps INTEGER NOT NULL,
                    video_path TEXT,
                    created_at TEXT NOT NULL
                )",
                [],
            )?;

            self.connection = Some(connection);
        }

        Ok(self.connection.as_ref().unwrap())
    }

    /// Saves a completed assessment.
    pub fn save_assessment(
        &mut self,
        exercise: ExerciseId,
        reps: u32,
        video_path: Option<&str>,
    ) -> Result<()> {
        let connection = self.get_connection()?;
        let timestamp = Local::now().to_rfc3339();

        connection.execute(
            "INSERT INTO assessments (exercise, reps, video_path, created_at)
             VALUES (?1, ?2, ?3, ?4)",
            params![exercise.id(), reps as i64, video_path, timestamp],
        )?;

        tracing::debug!("Assessment saved: {} x{reps}", exercise.id());
        Ok(())
    }

    /// Retrieves all assessments ordered by most recent first.
    pub fn all_assessments(&mut self) -> Result<Vec<AssessmentEntry>> {
        let connection = self.get_connection()?;

        let mut statement = connection.prepare(
            "SELECT id, exercise, reps, video_path, created_at
             FROM assessments ORDER BY created_at DESC, id DESC",
        )?;

        let entries = statement
            .query_map([], |row| {
                let id = row.get::<_, i64>(0)?;
                let exercise_id = row.get::<_, String>(1)?;
                let reps = row.get::<_, i64>(2)? as u32;
                let video_path = row.get::<_, Option<String>>(3)?;
                let timestamp_str = row.get::<_, String>(4)?;

                let exercise = ExerciseId::from_id(&exercise_id).ok_or_else(|| {
                    rusqlite::Error::InvalidParameterName(format!(
                        "Unknown exercise id '{exercise_id}'"
                    ))
                })?;

                let created_at = DateTime::parse_from_rfc3339(&timestamp_str)
                    .map(|dt| dt.with_timezone(&Local))
                    .map_err(|_| {
                        rusqlite::Error::InvalidParameterName(
                            "Invalid timestamp format".to_string(),
                        )
                    })?;

                Ok(AssessmentEntry {
                    id,
                    exercise,
                    reps,
                    video_path,
                    created_at,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Best (highest) rep count recorded for an exercise, if any.
    pub fn best_for(&mut self, exercise: ExerciseId) -> Result<Option<u32>> {
        let connection = self.get_connection()?;

        let best: Option<i64> = connection.query_row(
            "SELECT MAX(reps) FROM assessments WHERE exercise = ?1",
            params![exercise.id()],
            |row| row.get(0),
        )?;

        Ok(best.map(|b| b as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_list_ordering() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AssessmentStore::new(dir.path()).unwrap();

        store
            .save_assessment(ExerciseId::Pushups, 18, Some("/tmp/a.mp4"))
            .unwrap();
        store.save_assessment(ExerciseId::Situps, 25, None).unwrap();

        let entries = store.all_assessments().unwrap();
        assert_eq!(entries.len(), 2);
        // Most recent first
        assert_eq!(entries[0].exercise, ExerciseId::Situps);
        assert_eq!(entries[0].reps, 25);
        assert!(entries[0].video_path.is_none());
        assert_eq!(entries[1].video_path.as_deref(), Some("/tmp/a.mp4"));
    }

    #[test]
    fn test_best_for_exercise() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AssessmentStore::new(dir.path()).unwrap();

        assert_eq!(store.best_for(ExerciseId::Pullups).unwrap(), None);

        store.save_assessment(ExerciseId::Pullups, 8, None).unwrap();
        store.save_assessment(ExerciseId::Pullups, 11, None).unwrap();
        store.save_assessment(ExerciseId::Pushups, 30, None).unwrap();

        assert_eq!(store.best_for(ExerciseId::Pullups).unwrap(), Some(11));
    }
}
