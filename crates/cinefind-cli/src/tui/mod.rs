//! TUI module for the interactive movie browser.
//!
//! Uses `ratatui` + `crossterm` for rendering and `crossterm`'s async
//! event stream for input.

mod app;
mod state;
mod ui;

pub use app::run_browser;
