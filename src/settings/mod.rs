//! Settings come from a TOML file (`--settings`, or the build-profile default)
//! overlaid with `TOLLGATE__SECTION__KEY` environment variables.

mod cli;
pub use clap::Parser;
pub use cli::*;

mod settings;
pub use settings::*;
