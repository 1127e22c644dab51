//! `TmdbApi` trait definition.
#![allow(clippy::future_not_send)]

use anyhow::Result;

use super::types::{DiscoverMovieParams, SearchMovieParams, TmdbMovieListResponse};

/// TMDB API trait.
///
/// Abstracts API operations for mock substitution in tests.
/// Uses `trait_variant::make` to generate a `Send`-bound async trait.
#[allow(clippy::module_name_repetitions)]
#[trait_variant::make(TmdbApi: Send)]
pub trait LocalTmdbApi {
    /// Searches for movies by title.
    ///
    /// # Errors
    ///
    /// Returns an error on a non-2xx status, a transport failure, or an
    /// undecodable body.
    async fn search_movie(&self, params: &SearchMovieParams) -> Result<TmdbMovieListResponse>;

    /// Lists movies without a text filter (e.g. by popularity).
    ///
    /// # Errors
    ///
    /// Returns an error on a non-2xx status, a transport failure, or an
    /// undecodable body.
    async fn discover_movie(&self, params: &DiscoverMovieParams) -> Result<TmdbMovieListResponse>;
}
