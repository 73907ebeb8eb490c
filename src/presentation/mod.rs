//! Presentation layer handling terminal UI and user input.
//!
//! Renders the result list and the map with ratatui and routes crossterm
//! keyboard and mouse events to the views.

pub mod ui;
pub mod input;

pub use ui::*;
pub use input::*;
