//! Terminal-side state: result selection, spinner and key mapping.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::widgets::TableState;

/// Spinner frames cycled while a fetch is in flight.
const SPINNER_FRAMES: [&str; 10] = [
    "\u{280b}", "\u{2819}", "\u{2839}", "\u{2838}", "\u{283c}", "\u{2834}", "\u{2826}", "\u{2827}",
    "\u{2807}", "\u{280f}",
];

/// What a key press asks the browser to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyAction {
    /// Replace the query with this text.
    Edit(String),
    /// Move the selection up one row.
    MoveUp,
    /// Move the selection down one row.
    MoveDown,
    /// Open the selected movie's page.
    Open,
    /// Leave the browser.
    Quit,
    /// Nothing to do.
    Ignore,
}

/// Maps a key press to an action given the current query text.
#[must_use]
pub fn map_key(query: &str, key: KeyEvent) -> KeyAction {
    let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => KeyAction::Quit,
        KeyCode::Char('c') if ctrl => KeyAction::Quit,
        KeyCode::Char('u') if ctrl => {
            if query.is_empty() {
                KeyAction::Ignore
            } else {
                KeyAction::Edit(String::new())
            }
        }
        KeyCode::Char(_) if ctrl => KeyAction::Ignore,
        KeyCode::Char(c) => {
            let mut next = String::from(query);
            next.push(c);
            KeyAction::Edit(next)
        }
        KeyCode::Backspace => {
            let mut next = String::from(query);
            if next.pop().is_some() {
                KeyAction::Edit(next)
            } else {
                KeyAction::Ignore
            }
        }
        KeyCode::Up => KeyAction::MoveUp,
        KeyCode::Down => KeyAction::MoveDown,
        KeyCode::Enter => KeyAction::Open,
        _ => KeyAction::Ignore,
    }
}

/// Selection and animation state owned by the terminal loop.
#[derive(Debug, Default)]
pub struct ViewState {
    /// Table state for the result list (handles selection and scroll).
    pub table_state: TableState,
    spinner_tick: usize,
}

impl ViewState {
    /// Returns the selected row.
    #[must_use]
    pub fn cursor(&self) -> usize {
        self.table_state.selected().unwrap_or(0)
    }

    /// Moves the selection up.
    pub fn move_up(&mut self) {
        let current = self.cursor();
        if let Some(prev) = current.checked_sub(1) {
            self.table_state.select(Some(prev));
        }
    }

    /// Moves the selection down, staying within `len` rows.
    pub fn move_down(&mut self, len: usize) {
        let next = self
            .table_state
            .selected()
            .map_or(0, |current| current.saturating_add(1));
        if next < len {
            self.table_state.select(Some(next));
        }
    }

    /// Keeps the selection inside a list of `len` rows.
    pub fn clamp(&mut self, len: usize) {
        if len == 0 {
            self.table_state.select(None);
        } else {
            let cursor = self.cursor().min(len.saturating_sub(1));
            self.table_state.select(Some(cursor));
        }
    }

    /// Resets the selection to the first row.
    pub fn reset(&mut self) {
        self.table_state = TableState::default();
    }

    /// Advances the spinner one frame.
    pub const fn tick(&mut self) {
        self.spinner_tick = self.spinner_tick.wrapping_add(1);
    }

    /// Current spinner frame.
    #[must_use]
    #[allow(clippy::arithmetic_side_effects)]
    pub fn spinner(&self) -> &'static str {
        SPINNER_FRAMES
            .get(self.spinner_tick % SPINNER_FRAMES.len())
            .copied()
            .unwrap_or_default()
    }
}
