//! Application configuration loaded from the environment.
//!
//! Secrets (the access password, the session token) come only from the
//! environment or `.env`; nothing sensitive has a default in source.

use crate::config::database::DEFAULT_DATABASE_URL;
use crate::errors::{Error, Result};
use std::path::PathBuf;
use tracing::warn;

/// Session cookie settings.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Password accepted by the login form
    pub access_password: String,
    /// Cookie name
    pub cookie_name: String,
    /// Value the cookie must carry to count as a session
    pub token: String,
    /// `Max-Age` set when the cookie is issued
    pub max_age_secs: u64,
}

/// Object storage settings.
#[derive(Debug, Clone)]
pub struct StorageConfig {
    /// Directory uploaded objects are written under
    pub root_dir: PathBuf,
    /// URL prefix objects are served from
    pub public_base_url: String,
}

/// Top-level configuration.
///
/// | Env Var                 | Default                               |
/// |-------------------------|---------------------------------------|
/// | `DATABASE_URL`          | `sqlite://data/events.sqlite?mode=rwc`|
/// | `HOST`                  | `0.0.0.0`                             |
/// | `PORT`                  | `3000`                                |
/// | `ACCESS_PASSWORD`       | required                              |
/// | `SESSION_TOKEN`         | random per start                      |
/// | `SESSION_COOKIE_NAME`   | `em_session`                          |
/// | `SESSION_MAX_AGE_SECS`  | `604800`                              |
/// | `STORAGE_DIR`           | `data/storage`                        |
/// | `STORAGE_PUBLIC_URL`    | `/files`                              |
/// | `SEED_CONFIG`           | `config.toml`                         |
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Database connection string
    pub database_url: String,
    /// Bind host
    pub host: String,
    /// Bind port
    pub port: u16,
    /// Session settings
    pub session: SessionConfig,
    /// Storage settings
    pub storage: StorageConfig,
    /// Path of the TOML seed file
    pub seed_config_path: PathBuf,
}

impl AppConfig {
    /// Reads configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds configuration from any key lookup; `from_env` passes `std::env::var`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let port = get("PORT", "3000").parse::<u16>().map_err(|e| Error::Config {
            message: format!("PORT must be a valid port number: {e}"),
        })?;

        let max_age_secs = get("SESSION_MAX_AGE_SECS", "604800")
            .parse::<u64>()
            .map_err(|e| Error::Config {
                message: format!("SESSION_MAX_AGE_SECS must be a number of seconds: {e}"),
            })?;

        let access_password = lookup("ACCESS_PASSWORD")
            .filter(|p| !p.is_empty())
            .ok_or_else(|| Error::Config {
                message: "ACCESS_PASSWORD must be set".to_string(),
            })?;

        let token = lookup("SESSION_TOKEN").filter(|t| !t.is_empty()).unwrap_or_else(|| {
            warn!("SESSION_TOKEN not set; sessions will not survive a restart");
            uuid::Uuid::new_v4().simple().to_string()
        });

        Ok(Self {
            database_url: get("DATABASE_URL", DEFAULT_DATABASE_URL),
            host: get("HOST", "0.0.0.0"),
            port,
            session: SessionConfig {
                access_password,
                cookie_name: get("SESSION_COOKIE_NAME", "em_session"),
                token,
                max_age_secs,
            },
            storage: StorageConfig {
                root_dir: PathBuf::from(get("STORAGE_DIR", "data/storage")),
                public_base_url: get("STORAGE_PUBLIC_URL", "/files"),
            },
            seed_config_path: PathBuf::from(get("SEED_CONFIG", "config.toml")),
        })
    }
}
