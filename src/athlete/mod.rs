//! Athlete profile persistence.
//!
//! Stores the single local athlete profile in SQLite so edits on the
//! profile screen survive restarts. The table holds exactly one row;
//! loading when no profile exists seeds the defaults.

use anyhow::Result;
use chrono::Local;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// The locally persisted athlete profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Athlete {
    pub name: String,
    pub age: u32,
    pub location: String,
    pub sport: String,
    pub join_date: String,
    pub avatar: Option<String>,
}

impl Default for Athlete {
    fn default() -> Self {
        Self {
            name: "Shivam Yadav".to_string(),
            age: 20,
            location: "Jaipur, Rajasthan".to_string(),
            sport: "Athletics".to_string(),
            join_date: Local::now().format("%B %Y").to_string(),
            avatar: None,
        }
    }
}

/// Manages the athlete profile database.
pub struct AthleteStore {
    /// Path to the SQLite database file
    database_path: PathBuf,
    /// Connection to the database (lazy-loaded)
    connection: Option<Connection>,
}

impl AthleteStore {
    /// Creates a new store for the given data directory.
    pub fn new(data_dir: &Path) -> Result<Self> {
        let database_path = data_dir.join("athlete.db");

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
                "CREATE TABLE IF NOT EXISTS athlete (
                    id INTEGER PRIMARY KEY CHECK (id = 1),
                    name TEXT NOT NULL,
                    age INTEGER NOT NULL,
                    location TEXT NOT NULL,
                    sport TEXT NOT NULL,
                    join_date TEXT NOT NULL,
                    avatar TEXT
                )",
                [],
            )?;

            self.connection = Some(connection);
        }

        Ok(self.connection.as_ref().unwrap())
    }

    /// Loads the profile, seeding the defaults on first use.
    pub fn load(&mut self) -> Result<Athlete> {
        let connection = self.get_connection()?;

        let existing = connection
            .query_row(
                "SELECT name, age, location, sport, join_date, avatar FROM athlete WHERE id = 1",
                [],
                |row| {
                    Ok(Athlete {
                        name: row.get(0)?,
                        age: row.get::<_, i64>(1)? as u32,
                        location: row.get(2)?,
                        sport: row.get(3)?,
                        join_date: row.get(4)?,
                        avatar: row.get(5)?,
                    })
                },
            )
            .optional()?;

        match existing {
            Some(athlete) => Ok(athlete),
            None => {
                let athlete = Athlete::default();
                self.save(&athlete)?;
                tracing::info!("Seeded default athlete profile");
                Ok(athlete)
            }
        }
    }

    /// Saves the profile, replacing any existing row.
    pub fn save(&mut self, athlete: &Athlete) -> Result<()> {
        let connection = self.get_connection()?;

        connection.execute(
            "INSERT OR REPLACE INTO athlete (id, name, age, location, sport, join_date, avatar)
             VALUES (1, ?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                athlete.name,
                athlete.age as i64,
                athlete.location,
                athlete.sport,
                athlete.join_date,
                athlete.avatar,
            ],
        )?;

        tracing::debug!("Athlete profile saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_seeds_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AthleteStore::new(dir.path()).unwrap();

        let athlete = store.load().unwrap();
        assert_eq!(athlete.name, "Shivam Yadav");
        assert_eq!(athlete.sport, "Athletics");
        assert!(athlete.avatar.is_none());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = AthleteStore::new(dir.path()).unwrap();

        let mut athlete = store.load().unwrap();
        athlete.name = "Arjun Sharma".to_string();
        athlete.age = 22;
        athlete.location = "Mumbai".to_string();
        store.save(&athlete).unwrap();

        let mut reopened = AthleteStore::new(dir.path()).unwrap();
        let loaded = reopened.load().unwrap();
        assert_eq!(loaded, athlete);
    }
}
