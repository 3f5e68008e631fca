use std::env;
use std::path::PathBuf;

/// Runtime configuration for the state engine, read from environment
/// variables with sensible local-demo defaults.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Directory holding the embedded database.
    pub data_dir: PathBuf,
    /// Artificial latency applied to login and register calls.
    pub login_delay_ms: u64,
    /// Credentials for the seeded creator account.
    pub admin_email: String,
    pub admin_password: String,
}

impl EngineConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let data_dir = env::var("CREATORHUB_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("creatorhub-data"));

        let login_delay_ms = env::var("CREATORHUB_LOGIN_DELAY_MS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .unwrap_or(500);

        let admin_email =
            env::var("CREATORHUB_ADMIN_EMAIL").unwrap_or_else(|_| "admin@example.com".to_string());
        let admin_password =
            env::var("CREATORHUB_ADMIN_PASSWORD").unwrap_or_else(|_| "admin123".to_string());

        Ok(Self {
            data_dir,
            login_delay_ms,
            admin_email,
            admin_password,
        })
    }
}
