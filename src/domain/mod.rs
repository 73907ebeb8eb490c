//! Domain layer: the business data model and the pure geometry the views
//! build on.

pub mod models;
pub mod geometry;
pub mod viewport;
pub mod errors;

pub use models::*;
pub use geometry::*;
pub use viewport::*;
pub use errors::*;
