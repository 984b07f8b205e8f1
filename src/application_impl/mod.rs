mod auth_service_impl;
mod credential_hasher_argon2;
mod credential_validator;
mod refresh_coordinator;
mod token_codec_jwt;
mod token_issuer;
mod token_verifier;

pub use auth_service_impl::*;
pub use credential_hasher_argon2::*;
pub use credential_validator::*;
pub use refresh_coordinator::*;
pub use token_codec_jwt::*;
pub use token_issuer::*;
pub use token_verifier::*;
