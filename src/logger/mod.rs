//! Installs the global `tracing` subscriber. Started with a fixed `info`
//! filter, then reloaded from the `[log]` settings section.

mod logger;
pub use logger::*;

pub use tracing::{debug, error, info, trace, warn};
