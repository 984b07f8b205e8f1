use super::{CredentialValidator, TokenIssuer, TokenVerifier};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{Clock, RevocationStore, RevokeOutcome};
use std::sync::Arc;

/// Single-use refresh tokens: each successful refresh revokes the presented
/// token and hands back a new pair. Deactivated accounts cannot refresh.
pub struct RefreshCoordinator {
    verifier: Arc<TokenVerifier>,
    issuer: Arc<TokenIssuer>,
    credentials: Arc<CredentialValidator>,
    revocations: Arc<dyn RevocationStore>,
    clock: Arc<dyn Clock>,
}

impl RefreshCoordinator {
    pub fn new(
        verifier: Arc<TokenVerifier>,
        issuer: Arc<TokenIssuer>,
        credentials: Arc<CredentialValidator>,
        revocations: Arc<dyn RevocationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            verifier,
            issuer,
            credentials,
            revocations,
            clock,
        }
    }

    pub async fn refresh(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        let claims = self.verifier.verify(refresh_token, TokenKind::Refresh).await?;
        self.credentials.require_active(claims.sub).await?;

        // Mint first: the pair is only released if this caller wins the
        // check-and-insert below, so revoke and issue land together or not at all.
        let successor = self.issuer.issue_pair(claims.sub)?;

        let ttl = claims.remaining_ttl(self.clock.now());
        match self.revocations.try_revoke(claims.jti, ttl).await? {
            RevokeOutcome::Revoked => Ok(successor.tokens),
            RevokeOutcome::AlreadyRevoked => Err(AuthError::TokenAlreadyRotated),
        }
    }
}
