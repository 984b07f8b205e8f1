mod revocation_sweeper;
mod server;

pub use revocation_sweeper::*;
pub use server::*;
