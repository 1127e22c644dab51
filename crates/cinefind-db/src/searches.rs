//! Search counter CRUD operations.

use anyhow::{Context, Result};
use rusqlite::{Connection, OptionalExtension};

/// The movie recorded alongside a search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    /// TMDB movie ID of the top result.
    pub movie_id: u64,
    /// Poster URL of the top result (empty when the movie has none).
    pub poster_url: String,
}

/// A ranked search term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrendingEntry {
    /// Row ID.
    pub id: i64,
    /// The search term as typed.
    pub search_term: String,
    /// Number of recorded searches.
    pub count: u64,
    /// TMDB movie ID of the top result when first recorded.
    pub movie_id: u64,
    /// Poster URL of that movie.
    pub poster_url: String,
}

/// Current search count for a term, as returned by [`load_search_count`].
pub type SearchCount = u64;

/// Increments the counter for `term`, creating it at 1 if absent.
///
/// The upsert is a single statement, so concurrent writers never lose an
/// increment. The movie stored with a term is the one seen on its first
/// search. Returns the counter value after the update.
///
/// # Errors
///
/// Returns an error if the database operation fails.
pub fn record_search(conn: &Connection, term: &str, hit: &SearchHit) -> Result<SearchCount> {
    let count: SearchCount = conn
        .query_row(
            "INSERT INTO search_counts (
                search_term, count, movie_id, poster_url, created_at, updated_at
            ) VALUES (
                ?1, 1, ?2, ?3,
                strftime('%Y-%m-%dT%H:%M:%fZ', 'now'),
                strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
            )
            ON CONFLICT(search_term) DO UPDATE SET
                count = search_counts.count + 1,
                updated_at = excluded.updated_at
            RETURNING count",
            rusqlite::params![term, hit.movie_id, hit.poster_url],
            |row| row.get(0),
        )
        .with_context(|| format!("failed to record search for {term:?}"))?;

    tracing::debug!(term, count, "Recorded search");
    Ok(count)
}

/// Loads the counter for `term`, or `None` if it was never recorded.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn load_search_count(conn: &Connection, term: &str) -> Result<Option<SearchCount>> {
    conn.query_row(
        "SELECT count FROM search_counts WHERE search_term = ?1",
        [term],
        |row| row.get(0),
    )
    .optional()
    .with_context(|| format!("failed to load search count for {term:?}"))
}

/// Loads up to `limit` terms ordered by count, most searched first.
///
/// Ties go to the most recently searched term.
///
/// # Errors
///
/// Returns an error if the database query fails.
pub fn list_top_trending(conn: &Connection, limit: u32) -> Result<Vec<TrendingEntry>> {
    let mut stmt = conn
        .prepare(
            "SELECT id, search_term, count, movie_id, poster_url
             FROM search_counts
             ORDER BY count DESC, updated_at DESC, id ASC
             LIMIT ?1",
        )
        .context("failed to prepare trending query")?;

    let rows = stmt
        .query_map([limit], |row| {
            Ok(TrendingEntry {
                id: row.get(0)?,
                search_term: row.get(1)?,
                count: row.get(2)?,
                movie_id: row.get(3)?,
                poster_url: row.get(4)?,
            })
        })
        .context("failed to query trending terms")?;

    rows.collect::<std::result::Result<Vec<_>, _>>()
        .context("failed to read trending rows")
}
