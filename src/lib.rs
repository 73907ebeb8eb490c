//! bizscope - terminal business-search explorer.
//!
//! A result list and a map kept in sync through one shared interaction
//! store that tracks the focused and the selected business.

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
pub use application::*;
