//! Server configuration.
//!
//! Values come from environment variables and can be overridden by CLI flags:
//! - `DRAFTLEAGUE_HOST` - Bind address (default: `127.0.0.1`)
//! - `DRAFTLEAGUE_PORT` - HTTP port (default: `17020`)
//! - `DRAFTLEAGUE_DB` - Database file (default: platform data directory)
//! - `DRAFTLEAGUE_API_KEY` - Bearer key; enables auth and rate limiting
//! - `DRAFTLEAGUE_RATE_LIMIT` - Requests per minute per caller (default: 120)
//! - `DRAFTLEAGUE_CORS_ORIGINS` - Comma-separated allowed origins

use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;

use crate::api::middleware::{RateLimiter, SecurityConfig};
use crate::db::Database;

pub const DEFAULT_PORT: u16 = 17020;
pub const DEFAULT_RATE_LIMIT: u32 = 120;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// `None` means the platform data directory.
    pub db_path: Option<PathBuf>,
    pub api_key: Option<String>,
    pub rate_limit: u32,
    pub cors_origins: Option<Vec<String>>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
            db_path: None,
            api_key: None,
            rate_limit: DEFAULT_RATE_LIMIT,
            cors_origins: None,
        }
    }
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source. Unparseable numbers fall back
    /// to their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        Self {
            host: lookup("DRAFTLEAGUE_HOST").unwrap_or(defaults.host),
            port: lookup("DRAFTLEAGUE_PORT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            db_path: lookup("DRAFTLEAGUE_DB").map(PathBuf::from),
            api_key: lookup("DRAFTLEAGUE_API_KEY").filter(|k| !k.is_empty()),
            rate_limit: lookup("DRAFTLEAGUE_RATE_LIMIT")
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.rate_limit),
            cors_origins: lookup("DRAFTLEAGUE_CORS_ORIGINS")
                .map(|s| s.split(',').map(|o| o.trim().to_string()).collect()),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Open and migrate the configured database.
    pub fn open_database(&self) -> anyhow::Result<Database> {
        let db = match &self.db_path {
            Some(path) => Database::open(path.clone())
                .with_context(|| format!("Failed to open database at {}", path.display()))?,
            None => Database::open_default().context("Failed to open the default database")?,
        };
        db.migrate().context("Failed to run migrations")?;
        Ok(db)
    }

    /// Auth and rate limiting are only switched on with an API key (remote
    /// deployments).
    pub fn security(&self) -> SecurityConfig {
        let rate_limiter = self
            .api_key
            .as_ref()
            .map(|_| RateLimiter::new(self.rate_limit, Duration::from_secs(60)));
        SecurityConfig {
            api_key: self.api_key.clone(),
            cors_origins: self.cors_origins.clone(),
            rate_limiter,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[]));
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_addr(), "127.0.0.1:17020");
    }

    #[test]
    fn reads_every_variable() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("DRAFTLEAGUE_PORT", "8080"),
            ("DRAFTLEAGUE_DB", "/tmp/league.db"),
            ("DRAFTLEAGUE_API_KEY", "secret"),
            ("DRAFTLEAGUE_RATE_LIMIT", "30"),
            ("DRAFTLEAGUE_CORS_ORIGINS", "https://a.example, https://b.example"),
        ]));
        assert_eq!(config.port, 8080);
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/league.db")));
        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.rate_limit, 30);
        assert_eq!(
            config.cors_origins,
            Some(vec!["https://a.example".to_string(), "https://b.example".to_string()])
        );
    }

    #[test]
    fn bad_numbers_fall_back() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("DRAFTLEAGUE_PORT", "http"),
            ("DRAFTLEAGUE_RATE_LIMIT", "-1"),
        ]));
        assert_eq!(config.port, DEFAULT_PORT);
        assert_eq!(config.rate_limit, DEFAULT_RATE_LIMIT);
    }

    #[test]
    fn security_needs_an_api_key() {
        assert!(ServerConfig::default().security().rate_limiter.is_none());

        let config = ServerConfig {
            api_key: Some("secret".to_string()),
            ..ServerConfig::default()
        };
        let security = config.security();
        assert_eq!(security.api_key.as_deref(), Some("secret"));
        assert!(security.rate_limiter.is_some());
    }
}
