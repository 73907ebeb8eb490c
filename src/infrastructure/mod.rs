//! Infrastructure layer: the collaborators around the interaction core.
//!
//! Business data loading, configuration files and log output.

pub mod config;
pub mod logging;
pub mod source;

pub use config::*;
pub use logging::*;
pub use source::*;
