//! API client library for cinefind.
//!
//! Provides the TMDB movie catalog client.

/// TMDB API client.
pub mod tmdb;
