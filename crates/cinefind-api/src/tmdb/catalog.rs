//! Movie list lookup on top of the raw endpoints.
//!
//! Chooses between search and discovery, and folds every way a request
//! can fail into [`CatalogError`].

use tracing::instrument;

use super::api::TmdbApi;
use super::types::{DiscoverMovieParams, SearchMovieParams, TmdbMovie};

/// Message shown when the catalog reports a failure without detail.
pub const LOGICAL_FAILURE_FALLBACK: &str = "Something went wrong, Please try again later";

/// Message shown for any transport failure.
pub const TRANSPORT_FAILURE_MESSAGE: &str = "Error fetching movies, Please try again later";

/// Failure of a movie list lookup.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub enum CatalogError {
    /// The catalog answered but reported a failure in the body.
    Logical(String),
    /// Non-2xx status, network error, or undecodable body.
    Transport(anyhow::Error),
}

impl CatalogError {
    /// Text suitable for display to the user.
    ///
    /// Transport detail is never included.
    #[must_use]
    pub fn user_message(&self) -> &str {
        match self {
            Self::Logical(message) => message,
            Self::Transport(_) => TRANSPORT_FAILURE_MESSAGE,
        }
    }
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Logical(message) => write!(f, "catalog reported failure: {message}"),
            Self::Transport(err) => write!(f, "catalog request failed: {err:#}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Logical(_) => None,
            Self::Transport(err) => Some(&**err),
        }
    }
}

/// Fetches the movie list for a query.
///
/// An empty query lists movies by popularity; anything else goes through
/// the search endpoint. A successful body without `results` yields an
/// empty list.
///
/// # Errors
///
/// - [`CatalogError::Logical`] when the body carries `response: "False"`.
/// - [`CatalogError::Transport`] for any request failure; the underlying
///   error is logged here.
#[instrument(skip_all, fields(query = %query))]
pub async fn fetch_movie_list<A: TmdbApi + Sync>(
    api: &A,
    query: &str,
    language: Option<&str>,
) -> Result<Vec<TmdbMovie>, CatalogError> {
    let result = if query.is_empty() {
        let mut params = DiscoverMovieParams::popular();
        if let Some(language) = language {
            params = params.language(language);
        }
        api.discover_movie(&params).await
    } else {
        let mut params = SearchMovieParams::new(query);
        if let Some(language) = language {
            params = params.language(language);
        }
        api.search_movie(&params).await
    };

    let body = match result {
        Ok(body) => body,
        Err(err) => {
            tracing::warn!(error = ?err, "Error fetching movies");
            return Err(CatalogError::Transport(err));
        }
    };

    if body.is_logical_failure() {
        let message = body
            .error
            .filter(|message| !message.is_empty())
            .unwrap_or_else(|| String::from(LOGICAL_FAILURE_FALLBACK));
        tracing::warn!(%message, "Catalog reported failure");
        return Err(CatalogError::Logical(message));
    }

    let movies = body.results.unwrap_or_default();
    tracing::debug!(count = movies.len(), "Fetched movie list");
    Ok(movies)
}
