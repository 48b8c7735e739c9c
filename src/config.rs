//! Configuration module for Keygate.
//!
//! Loads configuration from YAML files and environment variables.

use std::path::PathBuf;

use config::{Config as ConfigLoader, ConfigError, Environment, File};
use serde::Deserialize;

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    pub auth: AuthConfig,
    #[serde(default)]
    pub keys: KeyStoreConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Basic authentication configuration.
#[derive(Clone, Deserialize)]
pub struct AuthConfig {
    /// Expected user name.
    pub username: String,
    /// Expected password.
    pub password: String,
    /// Realm announced in the `WWW-Authenticate` challenge.
    #[serde(default = "default_realm")]
    pub realm: String,
}

// Hand-written so the password never ends up in logs.
impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("realm", &self.realm)
            .finish()
    }
}

/// Locations of the trust store and the tracking directory.
#[derive(Debug, Clone, Deserialize)]
pub struct KeyStoreConfig {
    /// The `authorized_keys` file new keys are appended to.
    #[serde(default = "default_authorized_keys_path")]
    pub authorized_keys_path: PathBuf,
    /// Directory receiving one file per accepted key.
    #[serde(default = "default_tracking_dir")]
    pub tracking_dir: PathBuf,
    /// Prefix of the numbered files in `tracking_dir`.
    #[serde(default = "default_tracking_file_prefix")]
    pub tracking_file_prefix: String,
}

/// Log output configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `EnvFilter` directives, used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
    #[serde(default)]
    pub format: LogFormat,
}

/// Log line format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// One JSON object per event, for log shippers.
    #[default]
    Json,
    /// Multi-line human readable output.
    Pretty,
}

fn default_log_filter() -> String {
    "keygate=info,tower_http=info".to_string()
}

fn default_realm() -> String {
    "Restricted Area".to_string()
}

fn default_authorized_keys_path() -> PathBuf {
    PathBuf::from("/opt/ssh/authorized_keys")
}

fn default_tracking_dir() -> PathBuf {
    PathBuf::from("/opt/ssh/authorized_keys.d")
}

fn default_tracking_file_prefix() -> String {
    "http_server_added_".to_string()
}

impl Config {
    /// Load configuration from files and environment.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (KEYGATE_*)
    /// 2. config/local.yaml (if exists)
    /// 3. config/default.yaml
    pub fn load() -> Result<Self, ConfigError> {
        let config = ConfigLoader::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                Environment::with_prefix("KEYGATE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
            format: LogFormat::default(),
        }
    }
}

impl Default for KeyStoreConfig {
    fn default() -> Self {
        Self {
            authorized_keys_path: default_authorized_keys_path(),
            tracking_dir: default_tracking_dir(),
            tracking_file_prefix: default_tracking_file_prefix(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;

    fn from_yaml(yaml: &str) -> Result<Config, ConfigError> {
        ConfigLoader::builder()
            .add_source(File::from_str(yaml, FileFormat::Yaml))
            .build()?
            .try_deserialize()
    }

    #[test]
    fn test_default_key_store_config() {
        let config = KeyStoreConfig::default();
        assert_eq!(
            config.authorized_keys_path,
            PathBuf::from("/opt/ssh/authorized_keys")
        );
        assert_eq!(config.tracking_dir, PathBuf::from("/opt/ssh/authorized_keys.d"));
        assert_eq!(config.tracking_file_prefix, "http_server_added_");
    }

    #[test]
    fn test_minimal_config_fills_defaults() {
        let config = from_yaml("auth:\n  username: admin\n  password: secret\n").unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.auth.realm, "Restricted Area");
        assert_eq!(config.keys.tracking_file_prefix, "http_server_added_");
        assert_eq!(config.logging.filter, "keygate=info,tower_http=info");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_logging_section() {
        let config = from_yaml(
            "auth:\n  username: admin\n  password: secret\n\
             logging:\n  filter: keygate=debug\n  format: pretty\n",
        )
        .unwrap();

        assert_eq!(config.logging.filter, "keygate=debug");
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_credentials_are_required() {
        assert!(from_yaml("server:\n  host: 127.0.0.1\n  port: 9000\n").is_err());
    }

    #[test]
    fn test_auth_debug_redacts_password() {
        let config = from_yaml("auth:\n  username: admin\n  password: hunter2\n").unwrap();
        let rendered = format!("{:?}", config.auth);

        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));
    }
}
