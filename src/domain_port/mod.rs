mod clock;

pub use clock::*;

// store

mod revocation_store;

pub use revocation_store::*;

// repo

mod user_store;

pub use user_store::*;
