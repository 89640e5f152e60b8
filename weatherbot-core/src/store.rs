//! SQLite-backed favorites storage.
//!
//! Each operation opens its own connection and drops it before returning, so
//! no handle outlives a call and no application lock is held. Duplicate
//! inserts are resolved by the table's primary key.

use rusqlite::{Connection, params};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::{
    error::StoreResult,
    model::{UserId, normalize_city},
};

/// How long a writer waits for another connection's lock before giving up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Durable per-user set of favorite cities.
#[derive(Debug, Clone)]
pub struct FavoritesStore {
    path: PathBuf,
}

impl FavoritesStore {
    /// Create a store handle for the given database file. Nothing is opened yet.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self { path: path.as_ref().to_path_buf() }
    }

    /// Open the store and make sure the schema exists.
    pub fn open<P: AsRef<Path>>(path: P) -> StoreResult<Self> {
        let store = Self::new(path);
        store.init()?;
        Ok(store)
    }

    /// Create the `favorites` table if it is missing. Safe to call at every startup.
    pub fn init(&self) -> StoreResult<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS favorites (
                user_id INTEGER NOT NULL,
                city    TEXT    NOT NULL,
                PRIMARY KEY (user_id, city)
            );
            "#,
        )?;

        tracing::info!(path = %self.path.display(), "favorites store ready");
        Ok(())
    }

    /// Add a city to the user's favorites.
    ///
    /// Returns `true` if a new row was written, `false` if the city is blank or
    /// already saved.
    pub fn add(&self, user_id: UserId, city: &str) -> StoreResult<bool> {
        let Some(city) = normalize_city(city) else {
            return Ok(false);
        };

        let conn = self.connect()?;
        let inserted = conn.execute(
            "INSERT OR IGNORE INTO favorites (user_id, city) VALUES (?1, ?2)",
            params![user_id, city],
        )?;

        tracing::debug!(user_id, city, inserted, "add favorite");
        Ok(inserted > 0)
    }

    /// Remove a city from the user's favorites. Returns `true` if a row was deleted.
    pub fn remove(&self, user_id: UserId, city: &str) -> StoreResult<bool> {
        let Some(city) = normalize_city(city) else {
            return Ok(false);
        };

        let conn = self.connect()?;
        let deleted = conn.execute(
            "DELETE FROM favorites WHERE user_id = ?1 AND city = ?2",
            params![user_id, city],
        )?;

        tracing::debug!(user_id, city, deleted, "remove favorite");
        Ok(deleted > 0)
    }

    /// All of the user's cities, ordered case-insensitively.
    pub fn list(&self, user_id: UserId) -> StoreResult<Vec<String>> {
        let conn = self.connect()?;
        let mut stmt =
            conn.prepare("SELECT city FROM favorites WHERE user_id = ?1 ORDER BY city")?;

        let mut cities = stmt
            .query_map(params![user_id], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;

        // SQLite's NOCASE only folds ASCII; sort on the Unicode lowercase form.
        // The sort is stable, so exact-case ties keep the binary order above.
        cities.sort_by_cached_key(|city| city.to_lowercase());
        Ok(cities)
    }

    fn connect(&self) -> StoreResult<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }
}
