use super::UserId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Per-token identifier carried in the `jti` claim. Revocation is keyed on it.
#[derive(Debug, Clone, Copy, Ord, PartialOrd, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub uuid::Uuid);

impl TokenId {
    pub fn generate() -> Self {
        TokenId(uuid::Uuid::new_v4())
    }
}

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TokenId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        uuid::Uuid::from_str(s).map(TokenId)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => write!(f, "access"),
            TokenKind::Refresh => write!(f, "refresh"),
        }
    }
}

/// Payload of a signed token. Timestamps are unix seconds, as in JWT.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenClaims {
    pub sub: UserId,
    pub typ: TokenKind,
    pub iat: i64,
    pub exp: i64,
    pub jti: TokenId,
    pub iss: String,
    pub aud: String,
}

impl TokenClaims {
    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// A token stops being acceptable at the second named by `exp`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Time left before natural expiry, never less than one second so that a
    /// revocation written for it is always observable.
    pub fn remaining_ttl(&self, now: DateTime<Utc>) -> Duration {
        let secs = self.exp - now.timestamp();
        if secs <= 0 {
            Duration::from_secs(1)
        } else {
            Duration::from_secs(secs as u64)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims_expiring_at(exp: i64) -> TokenClaims {
        TokenClaims {
            sub: UserId::new_v4(),
            typ: TokenKind::Access,
            iat: exp - 60,
            exp,
            jti: TokenId::generate(),
            iss: "tollgate.test".to_string(),
            aud: "tollgate-client".to_string(),
        }
    }

    #[test]
    fn expiry_boundary_is_inclusive() {
        let now = Utc::now();
        let claims = claims_expiring_at(now.timestamp());
        assert!(claims.is_expired_at(now));

        let claims = claims_expiring_at(now.timestamp() + 1);
        assert!(!claims.is_expired_at(now));
    }

    #[test]
    fn remaining_ttl_is_clamped_to_one_second() {
        let now = Utc::now();
        let claims = claims_expiring_at(now.timestamp() - 30);
        assert_eq!(claims.remaining_ttl(now), Duration::from_secs(1));

        let claims = claims_expiring_at(now.timestamp() + 90);
        assert_eq!(claims.remaining_ttl(now), Duration::from_secs(90));
    }

    #[test]
    fn token_kind_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&TokenKind::Refresh).unwrap(), "\"refresh\"");
        let kind: TokenKind = serde_json::from_str("\"access\"").unwrap();
        assert_eq!(kind, TokenKind::Access);
    }
}
