//! Interactive browse flow: debouncing, view state and its orchestration.

mod controller;
mod debounce;
mod state;

#[allow(clippy::module_name_repetitions)]
pub use controller::{BrowseController, BrowseOptions};
#[allow(clippy::module_name_repetitions)]
pub use state::{BrowseState, ResultsView};
