use anyhow::{Result, anyhow};
use config::{Config, Environment, File};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub auth: Auth,
    pub revocation: Revocation,
    pub user: User,
    pub http: Http,
    pub log: Log,
}

#[derive(Deserialize)]
pub struct Auth {
    pub issuer: String,
    pub audience: String,
    pub access_ttl_secs: u64,
    pub refresh_ttl_secs: u64,
    pub logout_window_secs: u64,
    /// Usually supplied as `TOLLGATE__AUTH__SIGNING_KEY` rather than written to disk.
    pub signing_key: Option<String>,
    pub min_identity_len: usize,
    pub min_secret_len: usize,
}

impl std::fmt::Debug for Auth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Auth")
            .field("issuer", &self.issuer)
            .field("audience", &self.audience)
            .field("access_ttl_secs", &self.access_ttl_secs)
            .field("refresh_ttl_secs", &self.refresh_ttl_secs)
            .field("logout_window_secs", &self.logout_window_secs)
            .field("signing_key", &self.signing_key.as_ref().map(|_| "<redacted>"))
            .field("min_identity_len", &self.min_identity_len)
            .field("min_secret_len", &self.min_secret_len)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
pub struct Revocation {
    pub backend: String, // "memory" or "redis"
    pub redis_url: Option<String>,
    pub key_prefix: String,
    pub sweep_interval_secs: u64,
}

#[derive(Debug, Deserialize)]
pub struct User {
    pub backend: String, // "memory" or "mysql"
    pub mysql_url: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    pub address: String,
    pub tls: Option<Tls>,
}

#[derive(Debug, Deserialize)]
pub struct Tls {
    pub cert_path: String,
    pub key_path: String,
}

#[derive(Debug, Deserialize)]
pub struct Log {
    pub filter: String,
}

#[cfg(debug_assertions)]
const SETTINGS_PATH: &str = "settings/dev.toml";
#[cfg(not(debug_assertions))]
const SETTINGS_PATH: &str = "settings/release.toml";

pub fn parse_settings(path: Option<&str>) -> Result<Settings> {
    let path = path.unwrap_or(SETTINGS_PATH);

    let settings: Settings = Config::builder()
        .add_source(File::with_name(path))
        .add_source(Environment::with_prefix("TOLLGATE").separator("__"))
        .build()
        .map_err(|e| anyhow!(e))?
        .try_deserialize()
        .map_err(|e| anyhow!(e))?;

    Ok(settings)
}
