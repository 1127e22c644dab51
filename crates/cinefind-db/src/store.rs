//! `SearchStore` trait and its `SQLite` implementation.
#![allow(clippy::future_not_send)]

use std::path::PathBuf;
use std::sync::{Mutex, MutexGuard};

use anyhow::{Result, anyhow};
use rusqlite::Connection;
use tracing::instrument;

use super::connection::{open_db, open_in_memory};
use super::searches::{SearchHit, TrendingEntry, list_top_trending, record_search};

/// Search analytics store.
///
/// Abstracts persistence for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(SearchStore: Send)]
pub trait LocalSearchStore {
    /// Counts one more search for `term`, remembering `hit` on first use.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails.
    async fn record_search(&self, term: &str, hit: &SearchHit) -> Result<()>;

    /// Lists at most `limit` terms, most searched first.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails.
    async fn list_top_trending(&self, limit: u32) -> Result<Vec<TrendingEntry>>;
}

/// `SearchStore` backed by a single `SQLite` connection.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct SqliteSearchStore {
    conn: Mutex<Connection>,
}

impl SqliteSearchStore {
    /// Opens the store under `dir` (or the default data directory).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open(dir: Option<&PathBuf>) -> Result<Self> {
        Ok(Self::from_connection(open_db(dir)?))
    }

    /// Opens a throwaway in-memory store.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be created.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::from_connection(open_in_memory()?))
    }

    /// Wraps an already migrated connection.
    #[must_use]
    pub const fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| anyhow!("search store connection lock poisoned"))
    }
}

impl SearchStore for SqliteSearchStore {
    #[instrument(skip_all, fields(term = %term))]
    async fn record_search(&self, term: &str, hit: &SearchHit) -> Result<()> {
        let conn = self.lock()?;
        record_search(&conn, term, hit)?;
        Ok(())
    }

    #[instrument(skip_all)]
    async fn list_top_trending(&self, limit: u32) -> Result<Vec<TrendingEntry>> {
        let conn = self.lock()?;
        list_top_trending(&conn, limit)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::sync::Arc;

    use super::{SearchStore, SqliteSearchStore};
    use crate::searches::{SearchHit, load_search_count};

    fn hit() -> SearchHit {
        SearchHit {
            movie_id: 268,
            poster_url: String::from("https://image.tmdb.org/t/p/w500/batman.jpg"),
        }
    }

    #[tokio::test]
    async fn test_record_then_list() {
        // Arrange
        let store = SqliteSearchStore::in_memory().unwrap();

        // Act
        store.record_search("batman", &hit()).await.unwrap();
        store.record_search("batman", &hit()).await.unwrap();
        let top = store.list_top_trending(5).await.unwrap();

        // Assert
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].search_term, "batman");
        assert_eq!(top[0].count, 2);
        assert_eq!(top[0].poster_url, hit().poster_url);
    }

    #[tokio::test]
    async fn test_concurrent_records_are_not_lost() {
        // Arrange
        let store = Arc::new(SqliteSearchStore::in_memory().unwrap());

        // Act
        let mut tasks = Vec::new();
        for _ in 0..20 {
            let store = Arc::clone(&store);
            tasks.push(tokio::spawn(async move {
                store.record_search("batman", &hit()).await
            }));
        }
        for task in tasks {
            task.await.unwrap().unwrap();
        }

        // Assert
        let conn = store.lock().unwrap();
        assert_eq!(load_search_count(&conn, "batman").unwrap(), Some(20));
    }

    #[tokio::test]
    async fn test_open_persists_across_instances() {
        // Arrange
        let dir = tempfile::tempdir().unwrap();
        let dir_path = dir.path().to_path_buf();
        {
            let store = SqliteSearchStore::open(Some(&dir_path)).unwrap();
            store.record_search("dune", &hit()).await.unwrap();
        }

        // Act
        let store = SqliteSearchStore::open(Some(&dir_path)).unwrap();
        let top = store.list_top_trending(5).await.unwrap();

        // Assert
        assert_eq!(top.len(), 1);
        assert_eq!(top[0].search_term, "dune");
    }
}
