use super::{CredentialValidator, RefreshCoordinator, TokenIssuer, TokenLifetimes, TokenVerifier};
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::{Clock, NewUser, RevocationStore, UserStore};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Clone)]
pub struct AuthPolicy {
    /// Minimum time a logged-out access token stays revoked.
    pub logout_window: Duration,
    pub min_identity_len: usize,
    pub min_secret_len: usize,
}

impl Default for AuthPolicy {
    fn default() -> Self {
        Self {
            logout_window: Duration::from_secs(3600),
            min_identity_len: 3,
            min_secret_len: 8,
        }
    }
}

pub struct RealAuthService {
    user_store: Arc<dyn UserStore>,
    credential_hasher: Arc<dyn CredentialHasher>,
    credentials: Arc<CredentialValidator>,
    issuer: Arc<TokenIssuer>,
    verifier: Arc<TokenVerifier>,
    refresher: RefreshCoordinator,
    revocations: Arc<dyn RevocationStore>,
    clock: Arc<dyn Clock>,
    policy: AuthPolicy,
}

impl RealAuthService {
    pub fn new(
        user_store: Arc<dyn UserStore>,
        credential_hasher: Arc<dyn CredentialHasher>,
        token_codec: Arc<dyn TokenCodec>,
        revocations: Arc<dyn RevocationStore>,
        clock: Arc<dyn Clock>,
        lifetimes: TokenLifetimes,
        policy: AuthPolicy,
    ) -> Self {
        let issuer = Arc::new(TokenIssuer::new(
            token_codec.clone(),
            clock.clone(),
            lifetimes,
        ));
        let verifier = Arc::new(TokenVerifier::new(
            token_codec,
            revocations.clone(),
            clock.clone(),
        ));
        let credentials = Arc::new(CredentialValidator::new(
            user_store.clone(),
            credential_hasher.clone(),
        ));
        let refresher = RefreshCoordinator::new(
            verifier.clone(),
            issuer.clone(),
            credentials.clone(),
            revocations.clone(),
            clock.clone(),
        );

        Self {
            user_store,
            credential_hasher,
            credentials,
            issuer,
            verifier,
            refresher,
            revocations,
            clock,
            policy,
        }
    }

    fn validate_signup(&self, identity: &str, secret: &str) -> Result<(), AuthError> {
        if identity.chars().count() < self.policy.min_identity_len {
            return Err(AuthError::InvalidInput("identity too short".to_string()));
        }
        if secret.len() < self.policy.min_secret_len {
            return Err(AuthError::InvalidInput("secret too short".to_string()));
        }
        Ok(())
    }

    /// Blacklist span for a logged-out token: the configured window, or the
    /// token's own remaining lifetime if that is longer.
    fn logout_ttl(&self, claims: &TokenClaims) -> Duration {
        let remaining = claims.remaining_ttl(self.clock.now());
        self.policy.logout_window.max(remaining)
    }
}

/// Identities compare trimmed and case-folded in every store.
fn normalize_identity(identity: &str) -> String {
    identity.trim().to_lowercase()
}

#[async_trait::async_trait]
impl AuthService for RealAuthService {
    async fn signup(&self, request: SignupInput) -> Result<UserId, AuthError> {
        let SignupInput {
            identity,
            secret,
            display_name,
        } = request;

        let identity = normalize_identity(&identity);
        self.validate_signup(&identity, &secret)?;

        let password_hash = self.credential_hasher.hash_password(&secret).await?;
        let user_id = self
            .user_store
            .create(NewUser {
                identity,
                password_hash,
                display_name,
            })
            .await?;

        tracing::debug!(%user_id, "user signed up");
        Ok(user_id)
    }

    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError> {
        let LoginInput { identity, secret } = request;

        let user_id = self
            .credentials
            .validate(&normalize_identity(&identity), &secret)
            .await?;
        let issued = self.issuer.issue_pair(user_id)?;

        Ok(LoginResult {
            user_id,
            tokens: issued.tokens,
        })
    }

    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError> {
        self.refresher.refresh(refresh_token).await
    }

    async fn logout(&self, access_token: &str) -> Result<(), AuthError> {
        let claims = self.verifier.verify(access_token, TokenKind::Access).await?;
        let ttl = self.logout_ttl(&claims);
        self.revocations.revoke(claims.jti, ttl).await?;

        tracing::debug!(
            user_id = %claims.sub,
            jti = %claims.jti,
            ttl_secs = ttl.as_secs(),
            "access token revoked"
        );
        Ok(())
    }

    async fn authenticate(&self, access_token: &str) -> Result<UserId, AuthError> {
        let claims = self.verifier.verify(access_token, TokenKind::Access).await?;
        let record = self.credentials.require_active(claims.sub).await?;
        Ok(record.user_id)
    }

    async fn profile(&self, access_token: &str) -> Result<UserProfile, AuthError> {
        let claims = self.verifier.verify(access_token, TokenKind::Access).await?;
        let record = self.credentials.require_active(claims.sub).await?;
        Ok(record.into())
    }
}
