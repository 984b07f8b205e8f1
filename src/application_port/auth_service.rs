use crate::domain_model::{TokenClaims, UserId, UserProfile};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,
    #[error("identity already registered")]
    DuplicateIdentity,
    #[error("token malformed")]
    MalformedToken,
    #[error("token expired")]
    TokenExpired,
    #[error("wrong token type")]
    WrongTokenType,
    #[error("token revoked")]
    TokenRevoked,
    #[error("refresh token already rotated")]
    TokenAlreadyRotated,
    #[error("missing token")]
    MissingToken,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("store error: {0}")]
    Store(String),
    #[error("internal error: {0}")]
    InternalError(String),
}

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub identity: String,
    pub secret: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub identity: String,
    pub secret: String,
}

#[derive(Debug, Clone)]
pub struct LoginResult {
    pub user_id: UserId,
    pub tokens: AuthTokens,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessToken(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RefreshToken(pub String);

#[derive(Debug, Clone, Serialize)]
pub struct AuthTokens {
    pub access_token: AccessToken,
    pub refresh_token: RefreshToken,
    pub access_token_expires_at: DateTime<Utc>,
    pub refresh_token_expires_at: DateTime<Utc>,
}

/// Signs and opens token payloads. Only the signature (and issuer/audience)
/// is judged here; expiry, type and revocation belong to the verifier.
pub trait TokenCodec: Send + Sync {
    fn encode(&self, claims: &TokenClaims) -> Result<String, AuthError>;
    fn decode(&self, token: &str) -> Result<TokenClaims, AuthError>;
}

#[async_trait::async_trait]
pub trait CredentialHasher: Send + Sync {
    async fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    async fn verify_password(&self, password: &str, password_hash: &str)
    -> Result<bool, AuthError>;
    /// A well-formed hash, at production cost, that no secret matches.
    fn decoy_hash(&self) -> &str;
}

#[async_trait::async_trait]
pub trait AuthService: Send + Sync {
    async fn signup(&self, request: SignupInput) -> Result<UserId, AuthError>;
    async fn login(&self, request: LoginInput) -> Result<LoginResult, AuthError>;
    async fn refresh_token(&self, refresh_token: &str) -> Result<AuthTokens, AuthError>;
    /// Revokes the presented access token. The caller has already checked
    /// that a token was supplied.
    async fn logout(&self, access_token: &str) -> Result<(), AuthError>;
    async fn authenticate(&self, access_token: &str) -> Result<UserId, AuthError>;
    async fn profile(&self, access_token: &str) -> Result<UserProfile, AuthError>;
}
