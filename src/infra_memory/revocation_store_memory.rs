use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::sync::Arc;
use std::time::Duration;

/// Process-local revocation set. Entries do not survive a restart.
pub struct MemoryRevocationStore {
    entries: DashMap<TokenId, DateTime<Utc>>,
    clock: Arc<dyn Clock>,
}

impl MemoryRevocationStore {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: DashMap::new(),
            clock,
        }
    }

    fn expiry_from_now(&self, ttl: Duration) -> Result<(DateTime<Utc>, DateTime<Utc>), AuthError> {
        let now = self.clock.now();
        let ttl = chrono::Duration::from_std(ttl)
            .map_err(|e| AuthError::InvalidInput(format!("revocation ttl: {e}")))?;
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::InvalidInput("revocation ttl overflows".to_string()))?;
        Ok((now, expires_at))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait::async_trait]
impl RevocationStore for MemoryRevocationStore {
    async fn revoke(&self, jti: TokenId, ttl: Duration) -> Result<(), AuthError> {
        let (now, expires_at) = self.expiry_from_now(ttl)?;
        match self.entries.entry(jti) {
            Entry::Occupied(mut entry) => {
                let current = *entry.get();
                if current <= now || current < expires_at {
                    entry.insert(expires_at);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(expires_at);
            }
        }
        Ok(())
    }

    async fn try_revoke(&self, jti: TokenId, ttl: Duration) -> Result<RevokeOutcome, AuthError> {
        let (now, expires_at) = self.expiry_from_now(ttl)?;
        // The shard lock is held for the whole match.
        match self.entries.entry(jti) {
            Entry::Occupied(mut entry) => {
                if *entry.get() > now {
                    Ok(RevokeOutcome::AlreadyRevoked)
                } else {
                    entry.insert(expires_at);
                    Ok(RevokeOutcome::Revoked)
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(expires_at);
                Ok(RevokeOutcome::Revoked)
            }
        }
    }

    async fn is_revoked(&self, jti: TokenId) -> Result<bool, AuthError> {
        let now = self.clock.now();
        Ok(self
            .entries
            .get(&jti)
            .map(|expires_at| *expires_at > now)
            .unwrap_or(false))
    }

    async fn purge_expired(&self) -> Result<usize, AuthError> {
        let now = self.clock.now();
        let before = self.entries.len();
        self.entries.retain(|_, expires_at| *expires_at > now);
        Ok(before.saturating_sub(self.entries.len()))
    }
}
