use crate::application_port::*;
use crate::domain_model::*;
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// This call created the live entry.
    Revoked,
    /// A live entry already existed; nothing was written.
    AlreadyRevoked,
}

/// Keyed, self-expiring set of revoked token ids.
///
/// An entry whose expiry has passed is absent for every operation, whether or
/// not a sweep has physically removed it yet.
#[async_trait::async_trait]
pub trait RevocationStore: Send + Sync {
    /// Revoke `jti` for `ttl`. An existing live entry is extended, never shortened.
    async fn revoke(&self, jti: TokenId, ttl: Duration) -> Result<(), AuthError>;

    /// Atomic check-and-insert. Exactly one of several concurrent callers for
    /// the same `jti` observes [`RevokeOutcome::Revoked`].
    async fn try_revoke(&self, jti: TokenId, ttl: Duration) -> Result<RevokeOutcome, AuthError>;

    async fn is_revoked(&self, jti: TokenId) -> Result<bool, AuthError>;

    /// Drop entries past their expiry. Returns how many were removed.
    async fn purge_expired(&self) -> Result<usize, AuthError>;
}
