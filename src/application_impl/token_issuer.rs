use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::Clock;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct TokenLifetimes {
    pub issuer: String,
    pub audience: String,
    pub access_ttl: Duration,
    pub refresh_ttl: Duration,
}

/// A freshly minted pair together with the claims that went into it.
#[derive(Debug, Clone)]
pub struct IssuedPair {
    pub tokens: AuthTokens,
    pub access_claims: TokenClaims,
    pub refresh_claims: TokenClaims,
}

pub struct TokenIssuer {
    codec: Arc<dyn TokenCodec>,
    clock: Arc<dyn Clock>,
    lifetimes: TokenLifetimes,
}

impl TokenIssuer {
    pub fn new(codec: Arc<dyn TokenCodec>, clock: Arc<dyn Clock>, lifetimes: TokenLifetimes) -> Self {
        Self {
            codec,
            clock,
            lifetimes,
        }
    }

    pub fn access_ttl(&self) -> Duration {
        self.lifetimes.access_ttl
    }

    fn mint(&self, subject: UserId, typ: TokenKind, ttl: Duration) -> TokenClaims {
        let iat = self.clock.now().timestamp();
        TokenClaims {
            sub: subject,
            typ,
            iat,
            exp: iat.saturating_add(ttl.as_secs() as i64),
            jti: TokenId::generate(),
            iss: self.lifetimes.issuer.clone(),
            aud: self.lifetimes.audience.clone(),
        }
    }

    pub fn issue_pair(&self, subject: UserId) -> Result<IssuedPair, AuthError> {
        let access_claims = self.mint(subject, TokenKind::Access, self.lifetimes.access_ttl);
        let refresh_claims = self.mint(subject, TokenKind::Refresh, self.lifetimes.refresh_ttl);

        let access_token = AccessToken(self.codec.encode(&access_claims)?);
        let refresh_token = RefreshToken(self.codec.encode(&refresh_claims)?);

        Ok(IssuedPair {
            tokens: AuthTokens {
                access_token,
                refresh_token,
                access_token_expires_at: access_claims.expires_at(),
                refresh_token_expires_at: refresh_claims.expires_at(),
            },
            access_claims,
            refresh_claims,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application_impl::{JwtConfig, JwtHs256Codec};
    use crate::domain_port::ManualClock;
    use chrono::Utc;

    fn issuer(clock: Arc<ManualClock>) -> (TokenIssuer, Arc<dyn TokenCodec>) {
        let codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: "tollgate.test".to_string(),
            audience: "tollgate-client".to_string(),
            signing_key: b"test-secret-key-at-least-32-characters-long".to_vec(),
        }));
        let issuer = TokenIssuer::new(
            codec.clone(),
            clock,
            TokenLifetimes {
                issuer: "tollgate.test".to_string(),
                audience: "tollgate-client".to_string(),
                access_ttl: Duration::from_secs(900),
                refresh_ttl: Duration::from_secs(7 * 24 * 60 * 60),
            },
        );
        (issuer, codec)
    }

    #[test]
    fn pair_carries_distinct_ids_and_lifetimes() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (issuer, codec) = issuer(clock.clone());
        let subject = UserId::new_v4();

        let issued = issuer.issue_pair(subject).unwrap();

        let access = codec.decode(&issued.tokens.access_token.0).unwrap();
        let refresh = codec.decode(&issued.tokens.refresh_token.0).unwrap();
        assert_eq!(access, issued.access_claims);
        assert_eq!(refresh, issued.refresh_claims);

        assert_eq!(access.sub, subject);
        assert_eq!(refresh.sub, subject);
        assert_eq!(access.typ, TokenKind::Access);
        assert_eq!(refresh.typ, TokenKind::Refresh);
        assert_ne!(access.jti, refresh.jti);

        let now = clock.now().timestamp();
        assert_eq!(access.exp - now, 900);
        assert_eq!(refresh.exp - now, 7 * 24 * 60 * 60);
        assert_eq!(issued.tokens.access_token_expires_at.timestamp(), access.exp);
    }

    #[test]
    fn every_pair_is_fresh() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let (issuer, _) = issuer(clock);
        let subject = UserId::new_v4();

        let first = issuer.issue_pair(subject).unwrap();
        let second = issuer.issue_pair(subject).unwrap();

        assert_ne!(first.refresh_claims.jti, second.refresh_claims.jti);
        assert_ne!(first.tokens.refresh_token, second.tokens.refresh_token);
    }
}
