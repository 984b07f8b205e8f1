use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use redis::aio::ConnectionManager;
use redis::{AsyncCommands, ExistenceCheck, Script, SetExpiry, SetOptions};
use std::time::Duration;

const REVOKE_EXTEND: &str = include_str!("revoke_extend.lua");

/// Revocation entries as plain Redis keys, expired by the server.
pub struct RedisRevocationStore {
    conn: ConnectionManager,
    prefix: String,
    revoke_script: Script,
}

impl RedisRevocationStore {
    pub fn new(conn: ConnectionManager, prefix: impl Into<String>) -> Self {
        RedisRevocationStore {
            conn,
            prefix: prefix.into(),
            revoke_script: Script::new(REVOKE_EXTEND),
        }
    }

    fn key(&self, jti: TokenId) -> String {
        format!("{}:{}", self.prefix, jti)
    }

    fn ttl_millis(ttl: Duration) -> u64 {
        (ttl.as_millis() as u64).max(1)
    }
}

#[async_trait::async_trait]
impl RevocationStore for RedisRevocationStore {
    async fn revoke(&self, jti: TokenId, ttl: Duration) -> Result<(), AuthError> {
        let key = self.key(jti);
        let mut conn = self.conn.clone();
        let _: i64 = self
            .revoke_script
            .key(&key)
            .arg(Self::ttl_millis(ttl))
            .invoke_async(&mut conn)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(())
    }

    async fn try_revoke(&self, jti: TokenId, ttl: Duration) -> Result<RevokeOutcome, AuthError> {
        let key = self.key(jti);
        let mut conn = self.conn.clone();
        let options = SetOptions::default()
            .conditional_set(ExistenceCheck::NX)
            .with_expiration(SetExpiry::PX(Self::ttl_millis(ttl)));
        let reply: Option<String> = conn
            .set_options(&key, 1, options)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;

        match reply {
            Some(_) => Ok(RevokeOutcome::Revoked),
            None => Ok(RevokeOutcome::AlreadyRevoked),
        }
    }

    async fn is_revoked(&self, jti: TokenId) -> Result<bool, AuthError> {
        let key = self.key(jti);
        let mut conn = self.conn.clone();
        let exists: bool = conn
            .exists(&key)
            .await
            .map_err(|e| AuthError::Store(e.to_string()))?;
        Ok(exists)
    }

    async fn purge_expired(&self) -> Result<usize, AuthError> {
        // Redis drops expired keys on its own.
        Ok(0)
    }
}
