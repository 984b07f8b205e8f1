use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{Clock, RevocationStore};
use std::sync::Arc;

pub struct TokenVerifier {
    codec: Arc<dyn TokenCodec>,
    revocations: Arc<dyn RevocationStore>,
    clock: Arc<dyn Clock>,
}

impl TokenVerifier {
    pub fn new(
        codec: Arc<dyn TokenCodec>,
        revocations: Arc<dyn RevocationStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            codec,
            revocations,
            clock,
        }
    }

    /// Checks signature, expiry, type and revocation, in that order.
    pub async fn verify(&self, token: &str, expected: TokenKind) -> Result<TokenClaims, AuthError> {
        let claims = self.codec.decode(token)?;

        if claims.is_expired_at(self.clock.now()) {
            return Err(AuthError::TokenExpired);
        }
        if claims.typ != expected {
            return Err(AuthError::WrongTokenType);
        }
        if self.revocations.is_revoked(claims.jti).await? {
            return Err(AuthError::TokenRevoked);
        }

        Ok(claims)
    }
}
