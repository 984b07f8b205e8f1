use crate::application_port::*;
use crate::domain_model::*;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct StoredCredential {
    pub user_id: UserId,
    pub identity: String,
    pub password_hash: String,
    pub is_active: bool,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub identity: String,
    pub password_hash: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub user_id: UserId,
    pub identity: String,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<UserRecord> for UserProfile {
    fn from(record: UserRecord) -> Self {
        UserProfile {
            user_id: record.user_id,
            identity: record.identity,
            display_name: record.display_name,
            created_at: record.created_at,
        }
    }
}

#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Fetch credentials by identity (for login).
    async fn find_by_identity(&self, identity: &str)
    -> Result<Option<StoredCredential>, AuthError>;

    /// Insert a user. Fails with [`AuthError::DuplicateIdentity`] if the
    /// identity is taken.
    async fn create(&self, new_user: NewUser) -> Result<UserId, AuthError>;

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError>;
}
