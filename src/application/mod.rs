//! Application layer: the interaction store and the reactive logic of the
//! two views that share it.

pub mod store;
pub mod list_view;
pub mod map_view;
pub mod state;

pub use store::*;
pub use list_view::*;
pub use map_view::*;
pub use state::*;
