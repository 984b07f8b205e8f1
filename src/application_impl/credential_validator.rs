use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{UserRecord, UserStore};
use std::sync::Arc;

/// Resolves identity + secret to a subject. Every mismatch, whatever its
/// cause, is reported as [`AuthError::InvalidCredentials`].
pub struct CredentialValidator {
    user_store: Arc<dyn UserStore>,
    credential_hasher: Arc<dyn CredentialHasher>,
}

impl CredentialValidator {
    pub fn new(user_store: Arc<dyn UserStore>, credential_hasher: Arc<dyn CredentialHasher>) -> Self {
        Self {
            user_store,
            credential_hasher,
        }
    }

    pub async fn validate(&self, identity: &str, secret: &str) -> Result<UserId, AuthError> {
        let credential = self
            .user_store
            .find_by_identity(identity)
            .await?
            .filter(|credential| credential.is_active);

        // Every failure path runs exactly one verify, found or not.
        let Some(credential) = credential else {
            let _ = self
                .credential_hasher
                .verify_password(secret, self.credential_hasher.decoy_hash())
                .await;
            return Err(AuthError::InvalidCredentials);
        };

        let ok = self
            .credential_hasher
            .verify_password(secret, &credential.password_hash)
            .await?;
        if !ok {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(credential.user_id)
    }

    /// Record for a subject named by an already verified token. Missing and
    /// deactivated accounts read as [`AuthError::InvalidCredentials`].
    pub async fn require_active(&self, user_id: UserId) -> Result<UserRecord, AuthError> {
        self.user_store
            .find_by_id(user_id)
            .await?
            .filter(|record| record.is_active)
            .ok_or(AuthError::InvalidCredentials)
    }
}
