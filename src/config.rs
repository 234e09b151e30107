use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub const CONFIG_FILE: &str = "config.toml";
pub const ENV_PREFIX: &str = "CHURCH_";

/// Application configuration.
///
/// Layered as: built-in defaults, then `config.toml` (optional), then
/// `CHURCH_*` environment variables with `__` separating nested keys,
/// e.g. `CHURCH_BASIC__DATABASE_URL`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub basic: BasicConfig,
    pub church: ChurchConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BasicConfig {
    pub listen_addr: String,
    pub database_url: String,
    pub loglevel: String,
    /// Secret used to encrypt session cookies. At least 64 bytes; when absent
    /// a random key is generated and sessions do not survive restarts.
    pub session_key: Option<String>,
    /// Drop the `Secure` attribute on session cookies (plain-HTTP deployments).
    pub insecure_cookie: bool,
    pub session_hours: i64,
}

impl Default for BasicConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8000".to_string(),
            database_url: "sqlite://church.db".to_string(),
            loglevel: "info".to_string(),
            session_key: None,
            insecure_cookie: false,
            session_hours: 12,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChurchConfig {
    pub currency: String,
    pub announcement_limit: usize,
    pub recent_limit: usize,
    /// JSON array of members upserted into the directory at start-up.
    pub members_file: Option<PathBuf>,
    pub seed_default_users: bool,
    pub at_risk_window: usize,
    pub at_risk_missed_threshold: usize,
}

impl Default for ChurchConfig {
    fn default() -> Self {
        Self {
            currency: "GHS".to_string(),
            announcement_limit: 10,
            recent_limit: 20,
            members_file: None,
            seed_default_users: true,
            at_risk_window: 3,
            at_risk_missed_threshold: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    pub min_password_len: usize,
    pub argon2_memory_kib: u32,
    pub argon2_iterations: u32,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            min_password_len: 6,
            argon2_memory_kib: 19 * 1024,
            argon2_iterations: 2,
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }
}
