//! Browser view state and its transitions.
//!
//! Every field is private; the controller and tests drive the state only
//! through the named transitions below, which keeps the stale-result rule
//! in one place.

use cinefind_api::tmdb::{CatalogError, TmdbMovie};
use cinefind_db::{SearchHit, TrendingEntry};

/// Identifies one fetch cycle.
///
/// Only the most recently issued ticket may update the result list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    seq: u64,
    query: String,
}

impl FetchTicket {
    /// Position of this cycle in issue order (starts at 1).
    #[must_use]
    pub const fn seq(&self) -> u64 {
        self.seq
    }

    /// The debounced query this cycle fetches.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }
}

/// A search worth counting: the term and its top result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRecord {
    /// Query text as typed.
    pub term: String,
    /// Top movie returned for it.
    pub hit: SearchHit,
}

/// What the results area should show, in display precedence order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ResultsView<'a> {
    /// A fetch is in flight.
    Loading,
    /// The last fetch failed with this message.
    Error(&'a str),
    /// The last fetch succeeded (possibly with no movies).
    Movies(&'a [TmdbMovie]),
}

/// Everything the browser displays.
#[derive(Debug, Default)]
#[allow(clippy::module_name_repetitions)]
pub struct BrowseState {
    query: String,
    debounced_query: String,
    movies: Vec<TmdbMovie>,
    trending: Vec<TrendingEntry>,
    loading: bool,
    error: String,
    latest_seq: u64,
}

impl BrowseState {
    /// Current input text.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Query the current results belong to (lags [`Self::query`]).
    #[must_use]
    pub fn debounced_query(&self) -> &str {
        &self.debounced_query
    }

    /// Result list of the latest applied fetch.
    #[must_use]
    pub fn movies(&self) -> &[TmdbMovie] {
        &self.movies
    }

    /// Trending terms, most searched first.
    #[must_use]
    pub fn trending(&self) -> &[TrendingEntry] {
        &self.trending
    }

    /// Whether a fetch is in flight.
    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    /// Error of the latest fetch; empty when it succeeded.
    #[cfg(test)]
    #[must_use]
    pub fn error(&self) -> &str {
        &self.error
    }

    /// Replaces the input text. Nothing is fetched until it settles.
    pub fn edit_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    /// Records a query that has been quiet for the debounce window.
    ///
    /// Returns a ticket for a new fetch only when the settled value differs
    /// from the one the current results belong to.
    pub fn settle_query(&mut self, query: String) -> Option<FetchTicket> {
        if query == self.debounced_query {
            return None;
        }
        self.debounced_query = query;
        Some(self.begin_fetch())
    }

    /// Starts a fetch for the debounced query.
    ///
    /// Clears the previous error, raises the loading flag and supersedes
    /// every earlier ticket.
    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.latest_seq = self.latest_seq.saturating_add(1);
        self.loading = true;
        self.error.clear();
        FetchTicket {
            seq: self.latest_seq,
            query: self.debounced_query.clone(),
        }
    }

    /// Whether `ticket` is the latest issued one.
    #[must_use]
    pub const fn is_current(&self, ticket: &FetchTicket) -> bool {
        ticket.seq == self.latest_seq
    }

    /// Applies the outcome of the fetch identified by `ticket`.
    ///
    /// Outcomes for superseded tickets are dropped. A successful non-empty
    /// search with at least one movie yields the record to persist.
    pub fn apply_fetch(
        &mut self,
        ticket: &FetchTicket,
        outcome: Result<Vec<TmdbMovie>, CatalogError>,
    ) -> Option<SearchRecord> {
        if !self.is_current(ticket) {
            tracing::debug!(
                seq = ticket.seq,
                latest = self.latest_seq,
                query = %ticket.query,
                "Discarding stale fetch result"
            );
            return None;
        }

        self.loading = false;
        match outcome {
            Ok(movies) => {
                let record = if ticket.query.is_empty() {
                    None
                } else {
                    movies.first().map(|top| SearchRecord {
                        term: ticket.query.clone(),
                        hit: SearchHit {
                            movie_id: top.id,
                            poster_url: top.poster_url().unwrap_or_default(),
                        },
                    })
                };
                self.movies = movies;
                record
            }
            Err(err) => {
                self.error = String::from(err.user_message());
                self.movies.clear();
                None
            }
        }
    }

    /// Applies the trending load. A failure leaves the list empty.
    pub fn apply_trending(&mut self, outcome: anyhow::Result<Vec<TrendingEntry>>) {
        match outcome {
            Ok(entries) => self.trending = entries,
            Err(err) => {
                tracing::warn!(error = %format!("{err:#}"), "Error fetching trending movies");
                self.trending.clear();
            }
        }
    }

    /// Selects what the results area shows: loading, then error, then list.
    #[must_use]
    pub fn results_view(&self) -> ResultsView<'_> {
        if self.loading {
            ResultsView::Loading
        } else if !self.error.is_empty() {
            ResultsView::Error(&self.error)
        } else {
            ResultsView::Movies(&self.movies)
        }
    }
}
