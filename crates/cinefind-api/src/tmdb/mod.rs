//! TMDB API client module.
//!
//! Handles HTTP requests to the TMDB API v3 movie endpoints and turns
//! their responses into movie lists.

mod api;
mod catalog;
mod client;
mod types;

#[allow(clippy::module_name_repetitions)]
pub use api::{LocalTmdbApi, TmdbApi};
pub use catalog::{
    CatalogError, LOGICAL_FAILURE_FALLBACK, TRANSPORT_FAILURE_MESSAGE, fetch_movie_list,
};
#[allow(clippy::module_name_repetitions)]
pub use client::{TmdbClient, TmdbClientBuilder};
#[allow(clippy::module_name_repetitions)]
pub use types::{
    DiscoverMovieParams, MOVIE_PAGE_BASE_URL, POSTER_BASE_URL, SearchMovieParams, TmdbMovie,
    TmdbMovieListResponse,
};
