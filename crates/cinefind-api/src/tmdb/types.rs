//! TMDB API response types and request parameters.

use serde::{Deserialize, Deserializer};

/// Base URL for poster images (w500 rendition).
pub const POSTER_BASE_URL: &str = "https://image.tmdb.org/t/p/w500";

/// Base URL for movie pages on the TMDB website.
pub const MOVIE_PAGE_BASE_URL: &str = "https://www.themoviedb.org/movie";

// --- Movie lists ---

/// Response body shared by `search/movie` and `discover/movie`.
///
/// Every field is optional: the catalog client treats the body as
/// loosely shaped and only looks for `results` and the in-band
/// failure markers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TmdbMovieListResponse {
    /// Current page number.
    pub page: Option<u32>,
    /// Movies on this page. Entries that do not decode are skipped.
    #[serde(default, deserialize_with = "lenient_movies")]
    pub results: Option<Vec<TmdbMovie>>,
    /// Total number of pages.
    pub total_pages: Option<u32>,
    /// Total number of results.
    pub total_results: Option<u32>,
    /// In-band response flag (`"False"` signals a logical failure).
    pub response: Option<serde_json::Value>,
    /// In-band error message accompanying `response`.
    #[serde(rename = "Error")]
    pub error: Option<String>,
}

impl TmdbMovieListResponse {
    /// Returns `true` when the body reports a failure in-band.
    ///
    /// Accepts both the string `"False"` and a JSON `false`.
    #[must_use]
    pub fn is_logical_failure(&self) -> bool {
        match &self.response {
            Some(serde_json::Value::String(flag)) => flag == "False",
            Some(serde_json::Value::Bool(flag)) => !flag,
            _ => false,
        }
    }
}

/// A single movie record from the catalog.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct TmdbMovie {
    /// TMDB movie ID.
    pub id: u64,
    /// Localized title (empty when absent or null).
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    /// Original title.
    pub original_title: Option<String>,
    /// Original language (ISO 639-1).
    pub original_language: Option<String>,
    /// Release date (YYYY-MM-DD, may be empty).
    pub release_date: Option<String>,
    /// Overview text.
    pub overview: Option<String>,
    /// Popularity score.
    pub popularity: Option<f64>,
    /// Vote average.
    pub vote_average: Option<f64>,
    /// Vote count.
    pub vote_count: Option<u32>,
    /// Poster image path.
    pub poster_path: Option<String>,
    /// Backdrop image path.
    pub backdrop_path: Option<String>,
}

impl TmdbMovie {
    /// Full poster URL, or `None` when the movie has no poster.
    #[must_use]
    pub fn poster_url(&self) -> Option<String> {
        self.poster_path
            .as_deref()
            .filter(|path| !path.is_empty())
            .map(|path| format!("{POSTER_BASE_URL}{path}"))
    }

    /// Release year taken from `release_date`.
    #[must_use]
    pub fn release_year(&self) -> Option<&str> {
        self.release_date
            .as_deref()
            .and_then(|date| date.get(..4))
            .filter(|year| year.chars().all(|c| c.is_ascii_digit()))
    }

    /// TMDB website URL for this movie.
    #[must_use]
    pub fn page_url(&self) -> String {
        format!("{MOVIE_PAGE_BASE_URL}/{}", self.id)
    }
}

// --- Error Response ---

/// TMDB API error response body.
#[derive(Debug, Clone, Deserialize)]
pub struct TmdbErrorResponse {
    /// TMDB error code.
    pub status_code: u32,
    /// Error message.
    pub status_message: String,
}

/// Decodes `results` one entry at a time, dropping entries that fail.
fn lenient_movies<'de, D>(deserializer: D) -> Result<Option<Vec<TmdbMovie>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Vec<serde_json::Value>>::deserialize(deserializer)?;
    Ok(raw.map(|entries| {
        entries
            .into_iter()
            .filter_map(|entry| match serde_json::from_value::<TmdbMovie>(entry) {
                Ok(movie) => Some(movie),
                Err(err) => {
                    tracing::debug!(error = %err, "Skipping malformed movie entry");
                    None
                }
            })
            .collect()
    }))
}

/// Treats an explicit `null` string as empty.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

// --- Request Parameters ---

/// Parameters for the `search/movie` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchMovieParams {
    /// Search query (required).
    pub query: String,
    /// Response language; server default when unset.
    pub language: Option<String>,
    /// Result page (1-500); server default when unset.
    pub page: Option<u32>,
}

impl SearchMovieParams {
    /// Creates new search params with the given query.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            language: None,
            page: None,
        }
    }

    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the result page.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

/// Parameters for the `discover/movie` endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoverMovieParams {
    /// Sort order (e.g. `popularity.desc`).
    pub sort_by: String,
    /// Response language; server default when unset.
    pub language: Option<String>,
    /// Result page (1-500); server default when unset.
    pub page: Option<u32>,
}

impl DiscoverMovieParams {
    /// Most popular movies first.
    #[must_use]
    pub fn popular() -> Self {
        Self {
            sort_by: String::from("popularity.desc"),
            language: None,
            page: None,
        }
    }

    /// Sets the response language.
    #[must_use]
    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Sets the result page.
    #[must_use]
    pub const fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}
