mod revocation_store_memory;
mod user_store_memory;

pub use revocation_store_memory::*;
pub use user_store_memory::*;
