//! Runtime configuration loaded from environment variables.
//!
//! A `.env` file in the working directory is read first (see `main`), so
//! every key below may live there instead of the real environment.

use std::path::PathBuf;
use std::time::Duration;

use crate::services::auth::Credentials;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_DATA_FILE: &str = "data.csv";
const DEFAULT_SESSION_IDLE_SECS: u64 = 3600;
const DEFAULT_SESSION_SWEEP_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    /// CSV file holding every post.
    pub data_file: PathBuf,
    /// Submitting and voting need a logged-in session.
    pub require_login: bool,
    /// Sessions untouched for this long are discarded.
    pub session_idle: Duration,
    /// How often the sweeper looks for idle sessions.
    pub session_sweep: Duration,
    pub cookie_secure: bool,
    pub credentials: Credentials,
}

impl Config {
    #[must_use]
    pub fn from_env() -> Self {
        Self {
            port: env_parse("PORT", DEFAULT_PORT),
            data_file: std::env::var("DATA_FILE").map_or_else(|_| PathBuf::from(DEFAULT_DATA_FILE), PathBuf::from),
            require_login: env_bool("REQUIRE_LOGIN").unwrap_or(false),
            session_idle: Duration::from_secs(env_parse("SESSION_IDLE_SECS", DEFAULT_SESSION_IDLE_SECS)),
            session_sweep: Duration::from_secs(env_parse("SESSION_SWEEP_SECS", DEFAULT_SESSION_SWEEP_SECS)),
            cookie_secure: env_bool("COOKIE_SECURE").unwrap_or(false),
            credentials: Credentials::from_env(),
        }
    }
}

pub(crate) fn env_parse<T>(key: &str, default: T) -> T
where
    T: std::str::FromStr + Copy,
{
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}

pub(crate) fn env_bool(key: &str) -> Option<bool> {
    std::env::var(key)
        .ok()
        .and_then(|raw| match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        })
}

/// Non-empty value of `key`, if set.
pub(crate) fn env_secret(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
