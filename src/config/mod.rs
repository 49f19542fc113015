mod file_config;

pub use file_config::{AuthConfig, FileConfig};

use crate::auth::{token_lifetime, DEFAULT_TOKEN_LIFETIME_MINUTES, MAX_TOKEN_LIFETIME_MINUTES};
use crate::server::RequestsLoggingLevel;
use anyhow::{anyhow, bail, Result};
use clap::ValueEnum;
use std::path::PathBuf;

/// CLI arguments that can be used for config resolution.
/// Environment variables are already folded in by clap.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub db_path: Option<PathBuf>,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub auth_username: Option<String>,
    pub auth_secret: Option<String>,
    pub token_lifetime_minutes: i64,
    pub read_pool_size: usize,
}

impl Default for CliConfig {
    fn default() -> Self {
        CliConfig {
            db_path: None,
            port: 5000,
            metrics_port: 9091,
            logging_level: RequestsLoggingLevel::Path,
            auth_username: None,
            auth_secret: None,
            token_lifetime_minutes: DEFAULT_TOKEN_LIFETIME_MINUTES,
            read_pool_size: 4,
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub db_path: PathBuf,
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub auth_username: String,
    pub auth_secret: String,
    pub token_lifetime: chrono::Duration,
    pub read_pool_size: usize,
}

// Keeps the secret out of logs.
impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("db_path", &self.db_path)
            .field("port", &self.port)
            .field("metrics_port", &self.metrics_port)
            .field("logging_level", &self.logging_level)
            .field("auth_username", &self.auth_username)
            .field("auth_secret", &"<redacted>")
            .field("token_lifetime", &self.token_lifetime)
            .field("read_pool_size", &self.read_pool_size)
            .finish()
    }
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();
        let auth = file.auth.unwrap_or_default();

        let db_path = file
            .db_path
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .ok_or_else(|| anyhow!("db_path must be specified on the command line or in config file"))?;

        if db_path.is_dir() {
            bail!("db_path is a directory: {:?}", db_path);
        }
        if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            if !parent.exists() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port && port != 0 {
            bail!("port and metrics_port must differ, both are {}", port);
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let auth_username = auth
            .username
            .or_else(|| cli.auth_username.clone())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("An auth username must be configured"))?;
        let auth_secret = auth
            .secret
            .or_else(|| cli.auth_secret.clone())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| anyhow!("An auth secret must be configured"))?;

        let token_lifetime_minutes = auth
            .token_lifetime_minutes
            .unwrap_or(cli.token_lifetime_minutes);
        let token_lifetime = token_lifetime(token_lifetime_minutes).ok_or_else(|| {
            anyhow!(
                "token_lifetime_minutes must be between 1 and {}, got {}",
                MAX_TOKEN_LIFETIME_MINUTES,
                token_lifetime_minutes
            )
        })?;

        let read_pool_size = file.read_pool_size.unwrap_or(cli.read_pool_size);
        if read_pool_size == 0 {
            bail!("read_pool_size must be at least 1");
        }

        Ok(Self {
            db_path,
            port,
            metrics_port,
            logging_level,
            auth_username,
            auth_secret,
            token_lifetime,
            read_pool_size,
        })
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
