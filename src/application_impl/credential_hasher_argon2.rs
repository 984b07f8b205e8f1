use crate::application_port::{AuthError, CredentialHasher};
use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{self, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};

/// PHC string with the same cost parameters as [`Argon2::default`]. No secret
/// matches it; it exists so that lookups of unknown identities cost a full verify.
const DECOY_PHC: &str = "$argon2id$v=19$m=19456,t=2,p=1$dG9sbGdhdGUtdW5rbm93bg$CO7XaTYsHXn6n1Gu5lGdZtYoTQDbFVJmoX0ciH3SEag";

/// Argon2id with the crate defaults. Hashing and verification run on the
/// blocking pool so a burst of logins cannot stall the async workers.
pub struct Argon2PasswordHasher;

fn hash_blocking(secret: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|phc| phc.to_string())
        .map_err(|e| AuthError::InternalError(format!("argon2 hash: {e}")))
}

fn verify_blocking(secret: &str, phc: &str) -> Result<bool, AuthError> {
    let parsed =
        PasswordHash::new(phc).map_err(|e| AuthError::InternalError(format!("stored hash: {e}")))?;
    match Argon2::default().verify_password(secret.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AuthError::InternalError(format!("argon2 verify: {e}"))),
    }
}

async fn off_runtime<T, F>(work: F) -> Result<T, AuthError>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, AuthError> + Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(|e| AuthError::InternalError(format!("hasher task: {e}")))?
}

#[async_trait::async_trait]
impl CredentialHasher for Argon2PasswordHasher {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError> {
        let secret = password.to_owned();
        off_runtime(move || hash_blocking(&secret)).await
    }

    async fn verify_password(&self, password: &str, password_hash: &str) -> Result<bool, AuthError> {
        let secret = password.to_owned();
        let phc = password_hash.to_owned();
        off_runtime(move || verify_blocking(&secret, &phc)).await
    }

    fn decoy_hash(&self) -> &str {
        DECOY_PHC
    }
}
