//! Browser TUI main loop.

use std::io;
use std::time::Duration;

use anyhow::{Context, Result};
use cinefind_api::tmdb::TmdbApi;
use cinefind_db::SearchStore;
use crossterm::event::{Event, EventStream, KeyEventKind};
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use tokio::time::MissedTickBehavior;

use super::state::{KeyAction, ViewState, map_key};
use super::ui;
use crate::browse::{BrowseController, BrowseState, ResultsView};

/// Spinner frame interval while a fetch is in flight.
const SPINNER_INTERVAL: Duration = Duration::from_millis(100);

/// One wake-up of the event loop.
enum Step {
    Terminal(Event),
    Redraw,
}

/// Runs the browser until the user quits.
///
/// Pending search recordings are flushed after the terminal is restored.
///
/// # Errors
///
/// Returns an error if terminal setup, drawing or event reading fails.
pub async fn run_browser<C, S>(mut controller: BrowseController<C, S>) -> Result<()>
where
    C: TmdbApi + Send + Sync + 'static,
    S: SearchStore + Send + Sync + 'static,
{
    enable_raw_mode().context("failed to enable raw mode")?;
    let mut stdout = io::stdout();
    crossterm::execute!(stdout, EnterAlternateScreen)
        .context("failed to enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("failed to create terminal")?;

    controller.start();
    let result = run_event_loop(&mut terminal, &mut controller).await;

    // Cleanup (always attempt even if event loop failed)
    disable_raw_mode().context("failed to disable raw mode")?;
    crossterm::execute!(io::stdout(), LeaveAlternateScreen)
        .context("failed to leave alternate screen")?;
    terminal.show_cursor().context("failed to show cursor")?;

    controller.shutdown().await;
    result
}

/// Main event loop.
async fn run_event_loop<C, S>(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    controller: &mut BrowseController<C, S>,
) -> Result<()>
where
    C: TmdbApi + Send + Sync + 'static,
    S: SearchStore + Send + Sync + 'static,
{
    let mut events = EventStream::new();
    let mut view = ViewState::default();
    let mut spinner = tokio::time::interval(SPINNER_INTERVAL);
    spinner.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        terminal
            .draw(|frame| ui::draw(frame, controller.state(), &mut view))
            .context("failed to draw TUI")?;

        let step = tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(event) => Step::Terminal(event.context("failed to read event")?),
                None => return Ok(()),
            },
            _ = controller.next_update() => Step::Redraw,
            _ = spinner.tick(), if controller.state().is_loading() => {
                view.tick();
                Step::Redraw
            }
        };

        let Step::Terminal(Event::Key(key)) = step else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        match map_key(controller.state().query(), key) {
            KeyAction::Edit(query) => {
                controller.edit_query(query);
                view.reset();
            }
            KeyAction::MoveUp => view.move_up(),
            KeyAction::MoveDown => view.move_down(controller.state().movies().len()),
            KeyAction::Open => open_selected(controller.state(), &view),
            KeyAction::Quit => return Ok(()),
            KeyAction::Ignore => {}
        }
    }
}

/// Opens the selected movie's TMDB page in the default browser.
fn open_selected(state: &BrowseState, view: &ViewState) {
    let ResultsView::Movies(movies) = state.results_view() else {
        return;
    };
    let Some(movie) = movies.get(view.cursor()) else {
        return;
    };

    let url = movie.page_url();
    match open::that_detached(&url) {
        Ok(()) => tracing::info!(%url, "Opened movie page"),
        Err(err) => tracing::warn!(%url, error = %err, "Failed to open movie page"),
    }
}
