//! SQLite-backed profile storage.
//!
//! Each profile is one row holding its JSON encoding, so the stored value
//! round-trips exactly through serde.

use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use super::ProfileStore;
use crate::error::StoreError;
use crate::profile::{FocusSettings, UserId, UserProfile};

/// SQLite database for profile storage.
pub struct SqliteProfileStore {
    conn: Mutex<Connection>,
    defaults: FocusSettings,
}

impl SqliteProfileStore {
    /// Open (or create) the database file at `path`.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(path: &Path, defaults: FocusSettings) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::OpenFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::with_connection(conn, defaults)
    }

    /// Open an in-memory database.
    pub fn open_memory(defaults: FocusSettings) -> Result<Self, StoreError> {
        Self::with_connection(Connection::open_in_memory()?, defaults)
    }

    fn with_connection(conn: Connection, defaults: FocusSettings) -> Result<Self, StoreError> {
        migrate(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            defaults,
        })
    }
}

fn migrate(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS profiles (
            user_id    INTEGER PRIMARY KEY,
            data       TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );",
    )
}

fn upsert(conn: &Connection, user: UserId, profile: &UserProfile) -> Result<(), StoreError> {
    let json = serde_json::to_string(profile)?;
    conn.execute(
        "INSERT OR REPLACE INTO profiles (user_id, data, updated_at) VALUES (?1, ?2, ?3)",
        params![user, json, Utc::now().to_rfc3339()],
    )?;
    Ok(())
}

impl ProfileStore for SqliteProfileStore {
    fn get(&self, user: UserId) -> Result<UserProfile, StoreError> {
        let conn = self.conn.lock()?;
        let stored: Option<String> = conn
            .query_row(
                "SELECT data FROM profiles WHERE user_id = ?1",
                params![user],
                |row| row.get(0),
            )
            .optional()?;
        match stored {
            Some(json) => Ok(serde_json::from_str(&json)?),
            None => {
                let profile = UserProfile::new(user, self.defaults);
                upsert(&conn, user, &profile)?;
                Ok(profile)
            }
        }
    }

    fn save(&self, user: UserId, profile: &UserProfile) -> Result<(), StoreError> {
        let conn = self.conn.lock()?;
        upsert(&conn, user, profile)
    }

    fn users(&self) -> Result<Vec<UserId>, StoreError> {
        let conn = self.conn.lock()?;
        let mut stmt = conn.prepare("SELECT user_id FROM profiles ORDER BY user_id")?;
        let users = stmt
            .query_map([], |row| row.get::<_, UserId>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(users)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::{Goal, Habit, Language};
    use chrono::NaiveDate;

    #[test]
    fn first_get_persists_default_profile() {
        let store = SqliteProfileStore::open_memory(FocusSettings::default()).unwrap();
        assert!(store.users().unwrap().is_empty());
        let profile = store.get(11).unwrap();
        assert_eq!(profile.user_id, 11);
        assert_eq!(store.users().unwrap(), vec![11]);
    }

    #[test]
    fn save_then_get_roundtrips() {
        let store = SqliteProfileStore::open_memory(FocusSettings::default()).unwrap();
        let mut profile = store.get(2).unwrap();
        profile.set_language(Language::Ar);
        profile.goals.push(Goal::new("هدف", Utc::now()));
        let mut habit = Habit::new("Walk");
        habit.tracking.insert(NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
        habit.streak = 1;
        habit.best_streak = 1;
        profile.habits.push(habit);
        profile.points = 17;

        store.save(2, &profile).unwrap();
        assert_eq!(store.get(2).unwrap(), profile);
    }

    #[test]
    fn reopening_a_file_keeps_profiles() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("profiles.db");
        {
            let store = SqliteProfileStore::open(&path, FocusSettings::default()).unwrap();
            let mut profile = store.get(9).unwrap();
            profile.focus_sessions = 4;
            store.save(9, &profile).unwrap();
        }
        let store = SqliteProfileStore::open(&path, FocusSettings::default()).unwrap();
        assert_eq!(store.get(9).unwrap().focus_sessions, 4);
    }
}
