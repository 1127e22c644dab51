//! Search analytics store for cinefind.
//!
//! Uses `rusqlite` (bundled `SQLite`) to keep a per-term search counter
//! and to rank terms for the trending list.

mod connection;
mod migrations;
/// Search counter CRUD operations.
pub mod searches;
mod store;

pub use connection::open_db;
#[allow(clippy::module_name_repetitions)]
pub use searches::{
    SearchCount, SearchHit, TrendingEntry, list_top_trending, load_search_count, record_search,
};
#[allow(clippy::module_name_repetitions)]
pub use store::{LocalSearchStore, SearchStore, SqliteSearchStore};
