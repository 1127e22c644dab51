//! cinefind - terminal movie browser backed by TMDB.

/// Interactive browse flow (debounce, view state, orchestration).
mod browse;
/// Application configuration (TOML).
mod config;
/// Tracing subscriber setup.
mod logging;
/// Terminal UI components.
mod tui;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use tracing::instrument;
use url::Url;

use crate::browse::{BrowseController, BrowseOptions, BrowseState, ResultsView};
use crate::config::{AppConfig, TmdbConfig, resolve_config_path, resolve_log_path};
use crate::tui::run_browser;
use cinefind_api::tmdb::{TmdbClient, fetch_movie_list};
use cinefind_db::{SearchStore, SqliteSearchStore};

/// CLI argument parser.
#[derive(Parser)]
#[command(about, version)]
struct Cli {
    /// Override config/data directory.
    #[arg(long, global = true)]
    dir: Option<PathBuf>,

    /// Subcommand to run.
    #[command(subcommand)]
    command: Commands,
}

/// Available subcommands.
#[derive(Subcommand)]
enum Commands {
    /// Browse movies interactively.
    Browse,
    /// Fetch one movie list and print it.
    Search(SearchArgs),
    /// List the most searched terms.
    Trending(TrendingArgs),
    /// Manage the configuration file.
    Config(ConfigCommand),
}

/// Arguments for the `search` subcommand.
#[derive(clap::Args)]
struct SearchArgs {
    /// Search text. Empty lists popular movies.
    #[arg(long, default_value = "")]
    query: String,
}

/// Arguments for the `trending` subcommand.
#[derive(clap::Args)]
struct TrendingArgs {
    /// Number of terms to list (default: `browse.trending_limit` from config).
    #[arg(long)]
    limit: Option<u32>,
}

/// Arguments for the `config` subcommand.
#[derive(clap::Args)]
struct ConfigCommand {
    /// Config subcommand to run.
    #[command(subcommand)]
    command: ConfigSubcommands,
}

/// Available config subcommands.
#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Write a config file with default values.
    Init(ConfigInitArgs),
    /// Print the effective configuration.
    Show,
}

/// Arguments for the `config init` subcommand.
#[derive(clap::Args)]
struct ConfigInitArgs {
    /// Overwrite an existing config file.
    #[arg(long)]
    force: bool,
}

/// Loads the config file under `dir` (or the default location).
fn load_config(dir: Option<&PathBuf>) -> Result<AppConfig> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    AppConfig::load(&config_path).context("failed to load config")
}

/// Builds a `TmdbClient` from the `TMDB_API_TOKEN` environment variable.
///
/// A missing token is not fatal: requests are still sent and the catalog
/// rejects them, which the browser shows as a fetch error.
///
/// # Errors
///
/// Returns an error if the configured base URL is invalid or the client
/// fails to build.
#[instrument(skip_all)]
fn build_tmdb_client(config: &TmdbConfig) -> Result<TmdbClient> {
    let api_token = std::env::var("TMDB_API_TOKEN").unwrap_or_else(|_| {
        tracing::warn!("TMDB_API_TOKEN is not set; catalog requests will be rejected");
        String::new()
    });

    let mut builder = TmdbClient::builder().api_token(api_token).user_agent(concat!(
        env!("CARGO_PKG_NAME"),
        "/",
        env!("CARGO_PKG_VERSION")
    ));
    if let Some(base_url) = &config.base_url {
        let url = Url::parse(base_url)
            .with_context(|| format!("invalid tmdb.base_url {base_url:?}"))?;
        builder = builder.base_url(url);
    }

    builder.build().context("failed to build TMDB client")
}

/// Opens the search store, falling back to a throwaway in-memory one.
///
/// Store trouble never stops browsing or searching.
fn open_store(dir: Option<&PathBuf>) -> Result<SqliteSearchStore> {
    match SqliteSearchStore::open(dir) {
        Ok(store) => Ok(store),
        Err(err) => {
            tracing::warn!(
                error = %format!("{err:#}"),
                "Search store unavailable, trending and counts will not persist"
            );
            SqliteSearchStore::in_memory()
        }
    }
}

/// Runs the `browse` subcommand.
///
/// # Errors
///
/// Returns an error if the client fails to build or the TUI fails.
#[instrument(skip_all)]
async fn run_browse(config: AppConfig, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(&config.tmdb)?;
    let store = open_store(dir)?;

    let options = BrowseOptions {
        debounce: config.browse.debounce(),
        trending_limit: config.browse.trending_limit,
        language: config.tmdb.language,
    };
    let controller = BrowseController::new(Arc::new(client), Arc::new(store), options);

    run_browser(controller).await.context("browser TUI failed")
}

/// Runs the `search` subcommand: one fetch cycle without the TUI.
///
/// # Errors
///
/// Returns an error if the client fails to build or the fetch fails.
#[instrument(skip_all)]
async fn run_search(args: &SearchArgs, config: &AppConfig, dir: Option<&PathBuf>) -> Result<()> {
    let client = build_tmdb_client(&config.tmdb)?;

    let mut state = BrowseState::default();
    state.edit_query(args.query.as_str());
    let ticket = state
        .settle_query(args.query.clone())
        .unwrap_or_else(|| state.begin_fetch());

    let outcome = fetch_movie_list(&client, ticket.query(), config.tmdb.language.as_deref()).await;
    if let Some(record) = state.apply_fetch(&ticket, outcome) {
        let store = open_store(dir)?;
        if let Err(err) = store.record_search(&record.term, &record.hit).await {
            tracing::warn!(error = %format!("{err:#}"), "Error updating search count");
        }
    }

    match state.results_view() {
        ResultsView::Error(message) => bail!("{message}"),
        ResultsView::Movies([]) => tracing::info!("No movies found"),
        ResultsView::Movies(movies) => {
            tracing::info!("Total results: {}", movies.len());
            tracing::info!("ID\tYear\tRating\tLang\tTitle");
            for movie in movies {
                tracing::info!(
                    "{}\t{}\t{}\t{}\t{}",
                    movie.id,
                    movie.release_year().unwrap_or("N/A"),
                    movie
                        .vote_average
                        .map_or_else(|| String::from("N/A"), |v| format!("{v:.1}")),
                    movie.original_language.as_deref().unwrap_or("--"),
                    movie.title,
                );
            }
        }
        ResultsView::Loading => {}
    }

    Ok(())
}

/// Runs the `trending` subcommand.
///
/// # Errors
///
/// Returns an error if the database cannot be opened or read.
#[instrument(skip_all)]
async fn run_trending(args: &TrendingArgs, config: &AppConfig, dir: Option<&PathBuf>) -> Result<()> {
    let store = SqliteSearchStore::open(dir).context("failed to open search database")?;
    let limit = args.limit.unwrap_or(config.browse.trending_limit);

    let entries = store
        .list_top_trending(limit)
        .await
        .context("failed to load trending terms")?;

    if entries.is_empty() {
        tracing::info!("No searches recorded yet. Run `browse` or `search --query <Q>` first.");
        return Ok(());
    }

    tracing::info!("Rank\tCount\tMovie\tTerm");
    for (rank, entry) in (1_usize..).zip(&entries) {
        tracing::info!(
            "{}\t{}\t{}\t{}",
            rank,
            entry.count,
            entry.movie_id,
            entry.search_term
        );
    }

    Ok(())
}

/// Runs the `config init` subcommand.
///
/// # Errors
///
/// Returns an error if the file exists (without `--force`) or cannot be written.
#[instrument(skip_all)]
fn run_config_init(args: &ConfigInitArgs, dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    if config_path.exists() && !args.force {
        bail!(
            "config file already exists at {} (use --force to overwrite)",
            config_path.display()
        );
    }

    AppConfig::default()
        .save(&config_path)
        .context("failed to save config")?;
    tracing::info!("Wrote default config to {}", config_path.display());

    Ok(())
}

/// Runs the `config show` subcommand.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or serialized.
#[instrument(skip_all)]
fn run_config_show(config: &AppConfig, dir: Option<&PathBuf>) -> Result<()> {
    let config_path = resolve_config_path(dir).context("failed to resolve config path")?;
    tracing::info!("# {}", config_path.display());
    for line in config.to_toml()?.lines() {
        tracing::info!("{}", line);
    }

    Ok(())
}

/// Entry point.
///
/// # Errors
///
/// Returns an error if subcommand execution fails.
#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let dir = cli.dir.as_ref();

    // The TUI owns the terminal, so browse logs go to a file.
    let log_file = match cli.command {
        Commands::Browse => Some(resolve_log_path(dir).context("failed to resolve log path")?),
        _ => None,
    };
    logging::init_tracing(log_file.as_deref())?;

    let config = load_config(dir)?;
    match cli.command {
        Commands::Browse => run_browse(config, dir).await,
        Commands::Search(args) => run_search(&args, &config, dir).await,
        Commands::Trending(args) => run_trending(&args, &config, dir).await,
        Commands::Config(cmd) => match cmd.command {
            ConfigSubcommands::Init(args) => run_config_init(&args, dir),
            ConfigSubcommands::Show => run_config_show(&config, dir),
        },
    }
}
