use super::util::is_dup_key;
use crate::application_port::*;
use crate::domain_model::*;
use crate::domain_port::*;
use chrono::{DateTime, Utc};
use sqlx::mysql::MySqlRow;
use sqlx::{MySqlPool, Row};
use uuid::Uuid;

/// Users in table `auth_user`; see `schema/mysql.sql`.
pub struct MySqlUserStore {
    pool: MySqlPool,
}

impl MySqlUserStore {
    pub fn new(pool: MySqlPool) -> Self {
        MySqlUserStore { pool }
    }

    #[inline]
    fn uid_from_bytes(id: &[u8]) -> Result<UserId, AuthError> {
        Ok(UserId(
            Uuid::from_slice(id).map_err(|e| AuthError::Store(e.to_string()))?,
        ))
    }

    fn row_to_credential(row: MySqlRow) -> Result<StoredCredential, AuthError> {
        let user_id_bytes: Vec<u8> = row
            .try_get("user_id")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let identity: String = row
            .try_get("identity")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let password_hash: String = row
            .try_get("password_hash")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let is_active: bool = row
            .try_get("is_active")
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(StoredCredential {
            user_id: Self::uid_from_bytes(&user_id_bytes)?,
            identity,
            password_hash,
            is_active,
        })
    }

    fn row_to_record(row: MySqlRow) -> Result<UserRecord, AuthError> {
        let user_id_bytes: Vec<u8> = row
            .try_get("user_id")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let identity: String = row
            .try_get("identity")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let display_name: Option<String> = row
            .try_get("display_name")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let is_active: bool = row
            .try_get("is_active")
            .map_err(|e| AuthError::Store(e.to_string()))?;
        let created_at: DateTime<Utc> = row
            .try_get("created_at")
            .map_err(|e| AuthError::Store(e.to_string()))?;

        Ok(UserRecord {
            user_id: Self::uid_from_bytes(&user_id_bytes)?,
            identity,
            display_name,
            is_active,
            created_at,
        })
    }
}

#[async_trait::async_trait]
impl UserStore for MySqlUserStore {
    async fn find_by_identity(
        &self,
        identity: &str,
    ) -> Result<Option<StoredCredential>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT user_id, identity, password_hash, is_active
FROM auth_user
WHERE identity = ?
"#,
        )
        .bind(identity)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(e.to_string()))?;

        row_opt.map(Self::row_to_credential).transpose()
    }

    async fn create(&self, new_user: NewUser) -> Result<UserId, AuthError> {
        let user_id = UserId::new_v4();

        sqlx::query(
            r#"
INSERT INTO auth_user (user_id, identity, password_hash, display_name, is_active)
VALUES (?, ?, ?, ?, ?)
"#,
        )
        .bind(user_id.0.as_bytes() as &[u8])
        .bind(&new_user.identity)
        .bind(&new_user.password_hash)
        .bind(&new_user.display_name)
        .bind(true)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if is_dup_key(&e) {
                AuthError::DuplicateIdentity
            } else {
                AuthError::Store(e.to_string())
            }
        })?;

        Ok(user_id)
    }

    async fn find_by_id(&self, user_id: UserId) -> Result<Option<UserRecord>, AuthError> {
        let row_opt: Option<MySqlRow> = sqlx::query(
            r#"
SELECT user_id, identity, display_name, is_active, created_at
FROM auth_user
WHERE user_id = ?
"#,
        )
        .bind(user_id.0.as_bytes() as &[u8])
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AuthError::Store(format!("query user: {e}")))?;

        row_opt.map(Self::row_to_record).transpose()
    }
}
