//! Async orchestration of the browser state.
//!
//! Owns the [`BrowseState`], the query debouncer and every background task
//! (catalog fetches, the trending load, search recording). Completions come
//! back over a channel and are applied on the caller's task, so the state
//! is never shared.

use std::sync::Arc;
use std::time::Duration;

use cinefind_api::tmdb::{CatalogError, TmdbApi, TmdbMovie, fetch_movie_list};
use cinefind_db::{SearchStore, TrendingEntry};
use tokio::sync::mpsc::{UnboundedReceiver, UnboundedSender, unbounded_channel};
use tokio::task::JoinSet;

use super::debounce::Debouncer;
use super::state::{BrowseState, FetchTicket, SearchRecord};

/// Tuning for a [`BrowseController`].
#[derive(Debug, Clone)]
pub struct BrowseOptions {
    /// Quiet period before a typed query is fetched.
    pub debounce: Duration,
    /// Number of trending terms loaded at startup.
    pub trending_limit: u32,
    /// Response language passed to the catalog.
    pub language: Option<String>,
}

/// What a call to [`BrowseController::next_update`] changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Update {
    /// A settled query started a new fetch.
    FetchStarted,
    /// The query settled on the value already shown; nothing fetched.
    Unchanged,
    /// The latest fetch finished and its outcome is now displayed.
    ResultsApplied,
    /// A superseded fetch finished and was dropped.
    StaleDiscarded,
    /// The trending list finished loading.
    TrendingApplied,
}

/// Result of a background task.
#[derive(Debug)]
enum Completion {
    Fetched(FetchTicket, Result<Vec<TmdbMovie>, CatalogError>),
    Trending(anyhow::Result<Vec<TrendingEntry>>),
}

/// Drives a [`BrowseState`] from user edits and background completions.
#[derive(Debug)]
#[allow(clippy::module_name_repetitions)]
pub struct BrowseController<C, S> {
    catalog: Arc<C>,
    store: Arc<S>,
    options: BrowseOptions,
    state: BrowseState,
    debouncer: Debouncer<String>,
    settled_rx: UnboundedReceiver<String>,
    events_tx: UnboundedSender<Completion>,
    events_rx: UnboundedReceiver<Completion>,
    fetches: JoinSet<()>,
    records: JoinSet<()>,
}

impl<C, S> BrowseController<C, S>
where
    C: TmdbApi + Send + Sync + 'static,
    S: SearchStore + Send + Sync + 'static,
{
    /// Creates an idle controller. Call [`Self::start`] to load data.
    #[must_use]
    pub fn new(catalog: Arc<C>, store: Arc<S>, options: BrowseOptions) -> Self {
        let (debouncer, settled_rx) = Debouncer::new(options.debounce);
        let (events_tx, events_rx) = unbounded_channel();
        Self {
            catalog,
            store,
            options,
            state: BrowseState::default(),
            debouncer,
            settled_rx,
            events_tx,
            events_rx,
            fetches: JoinSet::new(),
            records: JoinSet::new(),
        }
    }

    /// Read access for rendering.
    #[must_use]
    pub const fn state(&self) -> &BrowseState {
        &self.state
    }

    /// Loads the trending list and fetches the unfiltered movie list.
    pub fn start(&mut self) {
        let store = Arc::clone(&self.store);
        let limit = self.options.trending_limit;
        let tx = self.events_tx.clone();
        self.fetches.spawn(async move {
            let outcome = store.list_top_trending(limit).await;
            // Receiver gone means the controller was dropped.
            let _ = tx.send(Completion::Trending(outcome));
        });

        let ticket = self.state.begin_fetch();
        self.spawn_fetch(ticket);
    }

    /// Replaces the query text and restarts the debounce window.
    pub fn edit_query(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.state.edit_query(query.clone());
        self.debouncer.push(query);
    }

    /// Waits for the next settled query or background completion and
    /// applies it to the state.
    ///
    /// Cancel safe: dropping the future loses nothing.
    pub async fn next_update(&mut self) -> Update {
        while self.fetches.try_join_next().is_some() {}
        while self.records.try_join_next().is_some() {}

        tokio::select! {
            Some(query) = self.settled_rx.recv() => self.on_settled(query),
            Some(completion) = self.events_rx.recv() => self.on_completion(completion),
            else => Update::Unchanged,
        }
    }

    /// Waits for outstanding search recordings, then drops every other
    /// background task.
    pub async fn shutdown(mut self) {
        self.debouncer.cancel();
        while let Some(joined) = self.records.join_next().await {
            if let Err(err) = joined {
                tracing::warn!(error = %err, "Search recording task failed");
            }
        }
    }

    fn on_settled(&mut self, query: String) -> Update {
        match self.state.settle_query(query) {
            Some(ticket) => {
                self.spawn_fetch(ticket);
                Update::FetchStarted
            }
            None => Update::Unchanged,
        }
    }

    fn on_completion(&mut self, completion: Completion) -> Update {
        match completion {
            Completion::Fetched(ticket, outcome) => {
                if !self.state.is_current(&ticket) {
                    self.state.apply_fetch(&ticket, outcome);
                    return Update::StaleDiscarded;
                }
                if let Some(record) = self.state.apply_fetch(&ticket, outcome) {
                    self.spawn_record(record);
                }
                Update::ResultsApplied
            }
            Completion::Trending(outcome) => {
                self.state.apply_trending(outcome);
                Update::TrendingApplied
            }
        }
    }

    fn spawn_fetch(&mut self, ticket: FetchTicket) {
        let catalog = Arc::clone(&self.catalog);
        let language = self.options.language.clone();
        let tx = self.events_tx.clone();
        tracing::debug!(seq = ticket.seq(), query = %ticket.query(), "Fetching movies");
        self.fetches.spawn(async move {
            let outcome =
                fetch_movie_list(catalog.as_ref(), ticket.query(), language.as_deref()).await;
            let _ = tx.send(Completion::Fetched(ticket, outcome));
        });
    }

    fn spawn_record(&mut self, record: SearchRecord) {
        let store = Arc::clone(&self.store);
        self.records.spawn(async move {
            if let Err(err) = store.record_search(&record.term, &record.hit).await {
                tracing::warn!(
                    term = %record.term,
                    error = %format!("{err:#}"),
                    "Error updating search count"
                );
            }
        });
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use std::sync::Mutex;

    use anyhow::{Result, anyhow};
    use cinefind_api::tmdb::{
        DiscoverMovieParams, SearchMovieParams, TRANSPORT_FAILURE_MESSAGE, TmdbMovieListResponse,
    };
    use cinefind_db::{SearchHit, SqliteSearchStore};
    use tokio::time::Instant;

    use super::*;
    use crate::browse::state::ResultsView;

    const WINDOW: Duration = Duration::from_millis(500);

    /// Catalog answering each query after a per-query delay.
    ///
    /// `"fail"` is a transport failure, `"oops"` a logical failure, and any
    /// other query returns one movie titled after it.
    struct MockCatalog {
        delays: Vec<(&'static str, Duration)>,
        calls: Mutex<Vec<String>>,
    }

    impl MockCatalog {
        fn new() -> Self {
            Self {
                delays: Vec::new(),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn with_delay(mut self, query: &'static str, delay: Duration) -> Self {
            self.delays.push((query, delay));
            self
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        async fn answer(&self, query: &str) -> Result<TmdbMovieListResponse> {
            self.calls.lock().unwrap().push(String::from(query));
            let delay = self
                .delays
                .iter()
                .find(|(q, _)| *q == query)
                .map_or(Duration::ZERO, |(_, d)| *d);
            tokio::time::sleep(delay).await;

            let body = match query {
                "fail" => return Err(anyhow!("connection reset by peer")),
                "oops" => serde_json::json!({ "response": "False", "Error": "X" }),
                "" => serde_json::from_str(include_str!(
                    "../../../../fixtures/tmdb/discover_movie_popular.json"
                ))?,
                q => serde_json::json!({
                    "page": 1,
                    "results": [{
                        "id": q.len(),
                        "title": q,
                        "poster_path": format!("/{q}.jpg"),
                    }],
                }),
            };
            Ok(serde_json::from_value(body)?)
        }
    }

    impl TmdbApi for MockCatalog {
        async fn search_movie(&self, params: &SearchMovieParams) -> Result<TmdbMovieListResponse> {
            self.answer(&params.query).await
        }

        async fn discover_movie(
            &self,
            _params: &DiscoverMovieParams,
        ) -> Result<TmdbMovieListResponse> {
            self.answer("").await
        }
    }

    /// Store whose every operation fails.
    struct BrokenStore;

    impl SearchStore for BrokenStore {
        async fn record_search(&self, _term: &str, _hit: &SearchHit) -> Result<()> {
            Err(anyhow!("disk I/O error"))
        }

        async fn list_top_trending(&self, _limit: u32) -> Result<Vec<TrendingEntry>> {
            Err(anyhow!("disk I/O error"))
        }
    }

    fn options() -> BrowseOptions {
        BrowseOptions {
            debounce: WINDOW,
            trending_limit: 5,
            language: None,
        }
    }

    fn controller<S>(
        catalog: MockCatalog,
        store: &Arc<S>,
    ) -> (BrowseController<MockCatalog, S>, Arc<MockCatalog>)
    where
        S: SearchStore + Send + Sync + 'static,
    {
        let catalog = Arc::new(catalog);
        let controller = BrowseController::new(Arc::clone(&catalog), Arc::clone(store), options());
        (controller, catalog)
    }

    /// Pumps updates until `wanted` has been seen `times` times.
    async fn pump_until<C, S>(controller: &mut BrowseController<C, S>, wanted: Update, times: usize)
    where
        C: TmdbApi + Send + Sync + 'static,
        S: SearchStore + Send + Sync + 'static,
    {
        let mut seen = 0;
        while seen < times {
            if controller.next_update().await == wanted {
                seen += 1;
            }
        }
    }

    async fn trending_terms(store: &SqliteSearchStore) -> Vec<(String, u64, u64)> {
        store
            .list_top_trending(10)
            .await
            .unwrap()
            .into_iter()
            .map(|e| (e.search_term, e.count, e.movie_id))
            .collect()
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_loads_popular_movies_and_trending() {
        // Arrange
        let store = Arc::new(SqliteSearchStore::in_memory().unwrap());
        store
            .record_search(
                "dune",
                &SearchHit {
                    movie_id: 438_631,
                    poster_url: String::new(),
                },
            )
            .await
            .unwrap();
        let (mut controller, catalog) = controller(MockCatalog::new(), &store);

        // Act
        controller.start();
        assert!(controller.state().is_loading());
        let mut updates = vec![
            controller.next_update().await,
            controller.next_update().await,
        ];
        updates.sort_by_key(|u| *u == Update::TrendingApplied);

        // Assert
        assert_eq!(
            updates,
            vec![Update::ResultsApplied, Update::TrendingApplied]
        );
        let state = controller.state();
        assert_eq!(state.movies().len(), 2);
        assert_eq!(state.movies()[0].id, 76_600);
        assert_eq!(state.trending().len(), 1);
        assert_eq!(state.trending()[0].search_term, "dune");
        assert_eq!(catalog.calls(), vec![String::new()]);

        // The unfiltered list is never counted as a search
        controller.shutdown().await;
        assert_eq!(trending_terms(&store).await.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_burst_fetches_once_after_window() {
        // Arrange
        let store = Arc::new(SqliteSearchStore::in_memory().unwrap());
        let (mut controller, catalog) = controller(MockCatalog::new(), &store);

        // Act
        for query in ["b", "ba", "bat", "batm", "batma", "batman"] {
            controller.edit_query(query);
        }
        let typed_at = Instant::now();
        let update = controller.next_update().await;

        // Assert
        assert_eq!(update, Update::FetchStarted);
        assert_eq!(typed_at.elapsed(), WINDOW);
        assert_eq!(controller.state().query(), "batman");
        assert_eq!(controller.state().debounced_query(), "batman");
        assert!(controller.state().is_loading());

        pump_until(&mut controller, Update::ResultsApplied, 1).await;
        assert_eq!(catalog.calls(), vec![String::from("batman")]);
        assert_eq!(controller.state().movies()[0].title, "batman");
    }

    #[tokio::test(start_paused = true)]
    async fn test_successful_search_is_recorded_once() {
        // Arrange
        let store = Arc::new(SqliteSearchStore::in_memory().unwrap());
        let (mut controller, _catalog) = controller(MockCatalog::new(), &store);

        // Act
        controller.edit_query("batman");
        pump_until(&mut controller, Update::ResultsApplied, 1).await;
        controller.shutdown().await;

        // Assert
        assert_eq!(
            trending_terms(&store).await,
            vec![(String::from("batman"), 1, 6)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_stale_response_is_discarded() {
        // Arrange: the first query answers long after the second one
        let store = Arc::new(SqliteSearchStore::in_memory().unwrap());
        let catalog = MockCatalog::new()
            .with_delay("bat", Duration::from_secs(3))
            .with_delay("batman", Duration::from_millis(100));
        let (mut controller, _catalog) = controller(catalog, &store);

        // Act
        controller.edit_query("bat");
        pump_until(&mut controller, Update::FetchStarted, 1).await;
        controller.edit_query("batman");
        pump_until(&mut controller, Update::FetchStarted, 1).await;
        pump_until(&mut controller, Update::ResultsApplied, 1).await;
        pump_until(&mut controller, Update::StaleDiscarded, 1).await;
        controller.shutdown().await;

        // Assert
        assert_eq!(
            trending_terms(&store).await,
            vec![(String::from("batman"), 1, 6)]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_response_leaves_newer_results_visible() {
        // Arrange
        let store = Arc::new(SqliteSearchStore::in_memory().unwrap());
        let catalog = MockCatalog::new().with_delay("bat", Duration::from_secs(3));
        let (mut controller, _catalog) = controller(catalog, &store);

        // Act
        controller.edit_query("bat");
        pump_until(&mut controller, Update::FetchStarted, 1).await;
        controller.edit_query("batman");
        pump_until(&mut controller, Update::ResultsApplied, 1).await;
        pump_until(&mut controller, Update::StaleDiscarded, 1).await;

        // Assert
        let state = controller.state();
        assert!(!state.is_loading());
        assert_eq!(state.movies().len(), 1);
        assert_eq!(state.movies()[0].title, "batman");
    }

    #[tokio::test(start_paused = true)]
    async fn test_transport_failure_shows_generic_error() {
        // Arrange
        let store = Arc::new(SqliteSearchStore::in_memory().unwrap());
        let (mut controller, _catalog) = controller(MockCatalog::new(), &store);
        controller.edit_query("batman");
        pump_until(&mut controller, Update::ResultsApplied, 1).await;

        // Act
        controller.edit_query("fail");
        pump_until(&mut controller, Update::ResultsApplied, 1).await;

        // Assert
        let state = controller.state();
        assert!(!state.is_loading());
        assert!(state.movies().is_empty());
        assert_eq!(
            state.results_view(),
            ResultsView::Error(TRANSPORT_FAILURE_MESSAGE)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_logical_failure_is_not_recorded() {
        // Arrange
        let store = Arc::new(SqliteSearchStore::in_memory().unwrap());
        let (mut controller, _catalog) = controller(MockCatalog::new(), &store);

        // Act
        controller.edit_query("oops");
        pump_until(&mut controller, Update::ResultsApplied, 1).await;
        controller.shutdown().await;

        // Assert
        assert!(trending_terms(&store).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_logical_failure_shows_payload_message() {
        // Arrange
        let store = Arc::new(SqliteSearchStore::in_memory().unwrap());
        let (mut controller, _catalog) = controller(MockCatalog::new(), &store);

        // Act
        controller.edit_query("oops");
        pump_until(&mut controller, Update::ResultsApplied, 1).await;

        // Assert
        assert_eq!(controller.state().results_view(), ResultsView::Error("X"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_returning_to_settled_query_does_not_refetch() {
        // Arrange
        let store = Arc::new(SqliteSearchStore::in_memory().unwrap());
        let (mut controller, catalog) = controller(MockCatalog::new(), &store);
        controller.edit_query("dune");
        pump_until(&mut controller, Update::ResultsApplied, 1).await;

        // Act: edit and undo within one window
        controller.edit_query("dun");
        controller.edit_query("dune");
        let update = controller.next_update().await;

        // Assert
        assert_eq!(update, Update::Unchanged);
        assert_eq!(catalog.calls(), vec![String::from("dune")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_failure_keeps_results_and_empty_trending() {
        // Arrange
        let store = Arc::new(BrokenStore);
        let (mut controller, _catalog) = controller(MockCatalog::new(), &store);
        controller.start();
        pump_until(&mut controller, Update::TrendingApplied, 1).await;

        // Act
        controller.edit_query("batman");
        pump_until(&mut controller, Update::FetchStarted, 1).await;
        pump_until(&mut controller, Update::ResultsApplied, 1).await;

        // Assert
        let state = controller.state();
        assert!(state.trending().is_empty());
        assert_eq!(state.error(), "");
        assert_eq!(state.movies()[0].title, "batman");
    }
}
