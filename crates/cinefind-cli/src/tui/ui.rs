//! TUI rendering logic for the movie browser.

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table, Wrap};

use super::state::ViewState;
use crate::browse::{BrowseState, ResultsView};

/// Draws the browser UI.
#[allow(clippy::indexing_slicing)]
pub fn draw(frame: &mut Frame, state: &BrowseState, view: &mut ViewState) {
    // The trending strip collapses until something has been searched.
    let trending_height = if state.trending().is_empty() { 0 } else { 3 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),               // search input
            Constraint::Length(trending_height), // trending strip
            Constraint::Min(5),    // results
            Constraint::Length(3), // footer
        ])
        .split(frame.area());

    draw_search(frame, chunks[0], state);
    draw_trending(frame, chunks[1], state);
    draw_results(frame, chunks[2], state, view);
    draw_footer(frame, chunks[3]);
}

/// Draws the query input with a cursor marker.
fn draw_search(frame: &mut Frame, area: Rect, state: &BrowseState) {
    let input = Paragraph::new(Line::from(vec![
        Span::raw(state.query()),
        Span::styled("\u{2588}", Style::default().fg(Color::DarkGray)),
    ]))
    .style(Style::default().fg(Color::Yellow))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .title(" Search through thousands of movies "),
    );
    frame.render_widget(input, area);
}

/// Draws the most searched terms as one ranked line.
fn draw_trending(frame: &mut Frame, area: Rect, state: &BrowseState) {
    let trending = state.trending();
    if trending.is_empty() {
        return;
    }

    let mut spans = Vec::with_capacity(trending.len().saturating_mul(3));
    for (rank, entry) in (1_usize..).zip(trending) {
        spans.push(Span::styled(
            format!("{rank}. "),
            Style::default()
                .fg(Color::Magenta)
                .add_modifier(Modifier::BOLD),
        ));
        spans.push(Span::raw(entry.search_term.clone()));
        spans.push(Span::styled(
            format!(" ({})   ", entry.count),
            Style::default().fg(Color::DarkGray),
        ));
    }

    let strip = Paragraph::new(Line::from(spans))
        .block(Block::default().borders(Borders::ALL).title(" Trending "));
    frame.render_widget(strip, area);
}

/// Draws the result area: spinner, error or movie table.
fn draw_results(frame: &mut Frame, area: Rect, state: &BrowseState, view: &mut ViewState) {
    let title = if state.debounced_query().is_empty() {
        String::from(" Popular ")
    } else {
        format!(" Results for \"{}\" ", state.debounced_query())
    };
    let block = Block::default().borders(Borders::ALL).title(title);

    match state.results_view() {
        ResultsView::Loading => {
            let spinner = Paragraph::new(format!("{} Loading movies...", view.spinner()))
                .style(Style::default().fg(Color::Cyan))
                .block(block);
            frame.render_widget(spinner, area);
        }
        ResultsView::Error(message) => {
            let error = Paragraph::new(message)
                .style(Style::default().fg(Color::Red))
                .wrap(Wrap { trim: true })
                .block(block);
            frame.render_widget(error, area);
        }
        ResultsView::Movies([]) => {
            let empty = Paragraph::new("No movies found")
                .style(Style::default().fg(Color::DarkGray))
                .block(block);
            frame.render_widget(empty, area);
        }
        ResultsView::Movies(movies) => {
            view.clamp(movies.len());

            let header = Row::new(vec!["Title", "Year", "Rating", "Lang"])
                .style(
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD),
                )
                .bottom_margin(1);

            let rows: Vec<Row> = movies
                .iter()
                .map(|m| {
                    Row::new(vec![
                        m.title.clone(),
                        String::from(m.release_year().unwrap_or("N/A")),
                        m.vote_average
                            .map_or_else(|| String::from("N/A"), |v| format!("{v:.1}")),
                        m.original_language
                            .as_deref()
                            .map_or_else(|| String::from("--"), str::to_uppercase),
                    ])
                })
                .collect();

            let widths = [
                Constraint::Min(20),
                Constraint::Length(6),
                Constraint::Length(7),
                Constraint::Length(5),
            ];

            let table = Table::new(rows, widths)
                .header(header)
                .block(block)
                .row_highlight_style(
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD),
                );

            frame.render_stateful_widget(table, area, &mut view.table_state);
        }
    }
}

/// Draws the footer with key hints.
fn draw_footer(frame: &mut Frame, area: Rect) {
    let help_text =
        "Type to search  Backspace: delete  Ctrl-U: clear  \u{2191}\u{2193}: move  Enter: open in browser  Esc: quit";
    let footer = Paragraph::new(help_text).block(Block::default().borders(Borders::ALL));
    frame.render_widget(footer, area);
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::indexing_slicing)]

    use cinefind_api::tmdb::{CatalogError, TRANSPORT_FAILURE_MESSAGE, TmdbMovie};
    use cinefind_db::TrendingEntry;
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;
    use ratatui::buffer::Cell;

    use super::*;

    fn render(state: &BrowseState) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 24)).unwrap();
        let mut view = ViewState::default();
        terminal.draw(|frame| draw(frame, state, &mut view)).unwrap();
        terminal
            .backend()
            .buffer()
            .content()
            .iter()
            .map(Cell::symbol)
            .collect()
    }

    fn popular() -> Vec<TmdbMovie> {
        let body: serde_json::Value = serde_json::from_str(include_str!(
            "../../../../fixtures/tmdb/discover_movie_popular.json"
        ))
        .unwrap();
        serde_json::from_value(body["results"].clone()).unwrap()
    }

    #[test]
    fn test_renders_spinner_while_loading() {
        // Arrange
        let mut state = BrowseState::default();
        state.begin_fetch();

        // Act
        let screen = render(&state);

        // Assert
        assert!(screen.contains("Loading movies..."));
        assert!(screen.contains("Popular"));
    }

    #[test]
    fn test_renders_error_message() {
        // Arrange
        let mut state = BrowseState::default();
        let ticket = state.begin_fetch();
        state.apply_fetch(&ticket, Err(CatalogError::Transport(anyhow::anyhow!("boom"))));

        // Act
        let screen = render(&state);

        // Assert
        assert!(screen.contains(TRANSPORT_FAILURE_MESSAGE));
        assert!(!screen.contains("boom"));
    }

    #[test]
    fn test_renders_movie_table() {
        // Arrange
        let mut state = BrowseState::default();
        let ticket = state.begin_fetch();
        state.apply_fetch(&ticket, Ok(popular()));

        // Act
        let screen = render(&state);

        // Assert
        assert!(screen.contains("Avatar: The Way of Water"));
        assert!(screen.contains("2022"));
        assert!(screen.contains("Oppenheimer"));
    }

    #[test]
    fn test_renders_empty_results() {
        // Arrange
        let mut state = BrowseState::default();
        state.edit_query("zzzzzz");
        let ticket = state.settle_query(String::from("zzzzzz")).unwrap();
        state.apply_fetch(&ticket, Ok(Vec::new()));

        // Act
        let screen = render(&state);

        // Assert
        assert!(screen.contains("No movies found"));
        assert!(screen.contains("Results for \"zzzzzz\""));
    }

    #[test]
    fn test_trending_strip_hidden_when_empty() {
        // Arrange
        let state = BrowseState::default();

        // Act
        let screen = render(&state);

        // Assert
        assert!(!screen.contains("Trending"));
        assert!(screen.contains("Search through thousands of movies"));
    }

    #[test]
    fn test_renders_trending_with_rank_and_count() {
        // Arrange
        let mut state = BrowseState::default();
        state.apply_trending(Ok(vec![TrendingEntry {
            id: 1,
            search_term: String::from("batman"),
            count: 4,
            movie_id: 268,
            poster_url: String::new(),
        }]));

        // Act
        let screen = render(&state);

        // Assert
        assert!(screen.contains("1. batman (4)"));
    }
}
