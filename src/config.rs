//! Configuration
//! Mission: Load all settings once at startup, fail loudly when incomplete

use anyhow::{Context, Result};

/// Startup configuration.
///
/// Built once in `main` and handed to component constructors; request
/// handlers never read the environment directly.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: String,
    pub port: u16,
    /// Secret for signing session tokens. Required.
    pub jwt_secret: String,
    /// Google OAuth client id, used as the expected audience of federated
    /// identity tokens. Required.
    pub google_client_id: String,
    /// Session token lifetime in seconds.
    pub session_ttl_secs: i64,
}

pub const DEFAULT_SESSION_TTL_SECS: i64 = 3600;

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv::dotenv().ok();

        let database_path =
            std::env::var("DATABASE_PATH").unwrap_or_else(|_| "./taskdeck.db".to_string());

        let port = std::env::var("PORT")
            .unwrap_or_else(|_| "5000".to_string())
            .parse()
            .unwrap_or(5000);

        let jwt_secret = std::env::var("JWT_SECRET").context("JWT_SECRET must be set")?;

        let google_client_id =
            std::env::var("GOOGLE_CLIENT_ID").context("GOOGLE_CLIENT_ID must be set")?;

        let session_ttl_secs = std::env::var("SESSION_TTL_SECS")
            .ok()
            .and_then(|v| v.parse::<i64>().ok())
            .filter(|&v| v > 0)
            .unwrap_or(DEFAULT_SESSION_TTL_SECS);

        Ok(Self {
            database_path,
            port,
            jwt_secret,
            google_client_id,
            session_ttl_secs,
        })
    }
}
