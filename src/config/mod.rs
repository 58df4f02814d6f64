use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::db::{SESSIONS_FILE, USERS_FILE};

#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub seed: SeedConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Holds `sessions.json`, `users.json` and the `uploads/` directory
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
    /// Prebuilt UI bundle served for non-API paths, if present
    #[serde(default)]
    pub static_dir: Option<PathBuf>,
    /// Maximum request body size in bytes (bounds PDF uploads)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: usize,
    /// Allow cross-origin requests from any origin
    #[serde(default = "default_cors")]
    pub cors: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            data_dir: default_data_dir(),
            static_dir: None,
            max_upload_bytes: default_max_upload_bytes(),
            cors: default_cors(),
        }
    }
}

impl ServerConfig {
    pub fn sessions_file(&self) -> PathBuf {
        self.data_dir.join(SESSIONS_FILE)
    }

    pub fn users_file(&self) -> PathBuf {
        self.data_dir.join(USERS_FILE)
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.data_dir.join("uploads")
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_max_upload_bytes() -> usize {
    10 * 1024 * 1024
}

fn default_cors() -> bool {
    true
}

/// Accounts written to a fresh users file on first start
#[derive(Debug, Clone, Deserialize)]
pub struct SeedConfig {
    #[serde(default = "default_admin_name")]
    pub admin_name: String,
    #[serde(default = "default_admin_email")]
    pub admin_email: String,
    #[serde(default = "default_admin_password")]
    pub admin_password: String,
    #[serde(default = "default_user_name")]
    pub user_name: String,
    #[serde(default = "default_user_email")]
    pub user_email: String,
    #[serde(default = "default_user_password")]
    pub user_password: String,
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            admin_name: default_admin_name(),
            admin_email: default_admin_email(),
            admin_password: default_admin_password(),
            user_name: default_user_name(),
            user_email: default_user_email(),
            user_password: default_user_password(),
        }
    }
}

fn default_admin_name() -> String {
    "Admin User".to_string()
}

fn default_admin_email() -> String {
    "admin@example.com".to_string()
}

fn default_admin_password() -> String {
    "admin123".to_string()
}

fn default_user_name() -> String {
    "Regular User".to_string()
}

fn default_user_email() -> String {
    "user@example.com".to_string()
}

fn default_user_password() -> String {
    "user123".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        if path.exists() {
            info!("Loading configuration from {}", path.display());
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file: {}", path.display()))?;
            Self::parse(&content)
        } else {
            info!("No config file found, using defaults");
            Ok(Config::default())
        }
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).with_context(|| "Failed to parse configuration file")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.server.sessions_file(), PathBuf::from("./data/sessions.json"));
        assert_eq!(config.server.users_file(), PathBuf::from("./data/users.json"));
        assert_eq!(config.server.uploads_dir(), PathBuf::from("./data/uploads"));
        assert_eq!(config.seed.admin_email, "admin@example.com");
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::parse(
            r#"
            [server]
            port = 8081
            data_dir = "/var/lib/schedule"

            [seed]
            admin_password = "change-me"
            "#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8081);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.uploads_dir(), PathBuf::from("/var/lib/schedule/uploads"));
        assert_eq!(config.seed.admin_password, "change-me");
        assert_eq!(config.seed.admin_email, "admin@example.com");
        assert!(config.server.static_dir.is_none());
    }

    #[test]
    fn test_invalid_file_is_rejected() {
        assert!(Config::parse("[server]\nport = \"not a port\"").is_err());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load(Path::new("/definitely/not/here.toml")).unwrap();
        assert_eq!(config.server.bind_addr(), "0.0.0.0:3000");
    }
}
