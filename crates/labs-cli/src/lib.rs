//! Library components of the `labs-convert` command.

pub mod logging;
pub mod pipeline;
pub mod types;
