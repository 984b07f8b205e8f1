use crate::application_impl::*;
use crate::application_port::*;
use crate::domain_port::*;
use crate::infra_memory::*;
use crate::infra_mysql::*;
use crate::infra_redis::*;
use crate::logger::*;
use crate::server::RevocationSweeper;
use crate::settings::{self, Settings};
use sqlx::{MySql, Pool};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub struct Server {
    pub auth_service: Arc<dyn AuthService>,
    sweeper_handle: Mutex<Option<JoinHandle<()>>>,
    cancel: CancellationToken,
    pool: Option<Pool<MySql>>,
}

impl Server {
    pub async fn try_new(settings: &Settings) -> anyhow::Result<Self> {
        // Fail before touching any backend if tokens could not be signed.
        let signing_key = signing_key(&settings.auth)?;
        let lifetimes = token_lifetimes(&settings.auth)?;
        let policy = AuthPolicy {
            logout_window: Duration::from_secs(settings.auth.logout_window_secs),
            min_identity_len: settings.auth.min_identity_len,
            min_secret_len: settings.auth.min_secret_len,
        };

        let clock: Arc<dyn Clock> = Arc::new(SystemClock);

        let revocations: Arc<dyn RevocationStore> = match settings.revocation.backend.as_str() {
            "memory" => Arc::new(MemoryRevocationStore::new(clock.clone())),
            "redis" => {
                let dsn = settings
                    .revocation
                    .redis_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("revocation.redis_url is required for the redis backend"))?;
                let redis_client = redis::Client::open(dsn)?;
                let redis_manager = redis_client.get_connection_manager().await?;
                Arc::new(RedisRevocationStore::new(
                    redis_manager,
                    settings.revocation.key_prefix.clone(),
                ))
            }
            other => return Err(anyhow::anyhow!("Unknown revocation backend: {}", other)),
        };
        info!(backend = %settings.revocation.backend, "revocation store ready");

        let mut pool = None;
        let user_store: Arc<dyn UserStore> = match settings.user.backend.as_str() {
            "memory" => Arc::new(MemoryUserStore::new(clock.clone())),
            "mysql" => {
                let dsn = settings
                    .user
                    .mysql_url
                    .as_deref()
                    .ok_or_else(|| anyhow::anyhow!("user.mysql_url is required for the mysql backend"))?;
                let mysql = Pool::<MySql>::connect(dsn).await?;
                pool = Some(mysql.clone());
                Arc::new(MySqlUserStore::new(mysql))
            }
            other => return Err(anyhow::anyhow!("Unknown user backend: {}", other)),
        };
        info!(backend = %settings.user.backend, "user store ready");

        let credential_hasher: Arc<dyn CredentialHasher> = Arc::new(Argon2PasswordHasher);
        let token_codec: Arc<dyn TokenCodec> = Arc::new(JwtHs256Codec::new(JwtConfig {
            issuer: settings.auth.issuer.clone(),
            audience: settings.auth.audience.clone(),
            signing_key,
        }));

        let auth_service: Arc<dyn AuthService> = Arc::new(RealAuthService::new(
            user_store,
            credential_hasher,
            token_codec,
            revocations.clone(),
            clock,
            lifetimes,
            policy,
        ));

        let cancel = CancellationToken::new();
        let sweeper = RevocationSweeper::new(
            revocations,
            Duration::from_secs(settings.revocation.sweep_interval_secs.max(1)),
            cancel.clone(),
        );
        let sweeper_handle = tokio::spawn(async move {
            sweeper.run().await;
        });

        info!("server started");

        Ok(Self {
            auth_service,
            sweeper_handle: Mutex::new(Some(sweeper_handle)),
            cancel,
            pool,
        })
    }

    pub async fn shutdown(&self) {
        info!("server shutting down...");

        self.cancel.cancel();

        let handle = self.sweeper_handle.lock().ok().and_then(|mut lock| lock.take());
        if let Some(handle) = handle {
            let r = handle.await;
            info!("sweeper handle dropped: {:?}", r);
        }

        if let Some(pool) = &self.pool {
            pool.close().await;
        }
    }
}

fn signing_key(auth: &settings::Auth) -> anyhow::Result<Vec<u8>> {
    let key = auth
        .signing_key
        .as_deref()
        .filter(|key| !key.is_empty())
        .ok_or_else(|| anyhow::anyhow!("auth.signing_key is not set"))?;
    if key.len() < MIN_SIGNING_KEY_LEN {
        return Err(anyhow::anyhow!(
            "auth.signing_key must be at least {} bytes",
            MIN_SIGNING_KEY_LEN
        ));
    }
    Ok(key.as_bytes().to_vec())
}

fn token_lifetimes(auth: &settings::Auth) -> anyhow::Result<TokenLifetimes> {
    if auth.access_ttl_secs == 0 || auth.refresh_ttl_secs == 0 {
        return Err(anyhow::anyhow!("token lifetimes must be positive"));
    }
    Ok(TokenLifetimes {
        issuer: auth.issuer.clone(),
        audience: auth.audience.clone(),
        access_ttl: Duration::from_secs(auth.access_ttl_secs),
        refresh_ttl: Duration::from_secs(auth.refresh_ttl_secs),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::parse_settings;

    #[tokio::test]
    async fn missing_signing_key_is_fatal() {
        let mut settings = parse_settings(Some("settings/dev.toml")).unwrap();
        settings.auth.signing_key = None;

        let err = Server::try_new(&settings).await.err().unwrap();
        assert!(err.to_string().contains("signing_key"));
    }

    #[tokio::test]
    async fn short_signing_key_is_fatal() {
        let mut settings = parse_settings(Some("settings/dev.toml")).unwrap();
        settings.auth.signing_key = Some("short".to_string());

        assert!(Server::try_new(&settings).await.is_err());
    }

    #[tokio::test]
    async fn unknown_backend_is_fatal() {
        let mut settings = parse_settings(Some("settings/dev.toml")).unwrap();
        settings.revocation.backend = "etcd".to_string();

        let err = Server::try_new(&settings).await.err().unwrap();
        assert!(err.to_string().contains("etcd"));
    }

    #[tokio::test]
    async fn memory_backends_start_and_stop() {
        let settings = parse_settings(Some("settings/dev.toml")).unwrap();
        let server = Server::try_new(&settings).await.unwrap();

        let user_id = server
            .auth_service
            .signup(SignupInput {
                identity: "alice".to_string(),
                secret: "correct-horse".to_string(),
                display_name: None,
            })
            .await
            .unwrap();
        let login = server
            .auth_service
            .login(LoginInput {
                identity: "alice".to_string(),
                secret: "correct-horse".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(login.user_id, user_id);

        server.shutdown().await;
    }
}
