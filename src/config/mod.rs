//! Configuration management
//!
//! This module handles loading and parsing configuration for the clubhub
//! backend. Configuration can be loaded from:
//! - clubhub.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults. Secrets
//! (cloud storage credentials, bootstrap credentials) are read from the
//! environment only and never from the config file.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Upload configuration
    #[serde(default)]
    pub upload: UploadConfig,
    /// Media storage backend configuration
    #[serde(default)]
    pub storage: StorageConfig,
    /// Authentication configuration
    #[serde(default)]
    pub auth: AuthConfig,
    /// Optional data directory for the JSON state mirror.
    /// Unset means pure in-memory state (discarded on restart).
    #[serde(default)]
    pub data_dir: Option<PathBuf>,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origin (for cookie-based dashboards)
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_cors_origin() -> String {
    "http://localhost:5500".to_string()
}

/// Upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Upload directory path (local backend)
    #[serde(default = "default_upload_path")]
    pub path: PathBuf,
    /// Maximum file size in bytes (default: 100MB)
    #[serde(default = "default_max_file_size")]
    pub max_file_size: u64,
    /// Maximum files accepted in one batch
    #[serde(default = "default_max_batch")]
    pub max_batch: usize,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            path: default_upload_path(),
            max_file_size: default_max_file_size(),
            max_batch: default_max_batch(),
        }
    }
}

fn default_upload_path() -> PathBuf {
    PathBuf::from("uploads")
}

fn default_max_file_size() -> u64 {
    100 * 1024 * 1024 // 100MB
}

fn default_max_batch() -> usize {
    10
}

/// Media storage backend selection
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Which backend stores uploaded files
    #[serde(default)]
    pub backend: StorageBackend,
    /// Cloud asset store credentials, environment only
    #[serde(skip)]
    pub cloud: Option<CloudCredentials>,
}

/// Storage backend driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Local filesystem under the upload path (default)
    #[default]
    Local,
    /// Managed cloud asset store
    Cloud,
}

/// Cloud asset store credentials (name/key/secret)
#[derive(Debug, Clone)]
pub struct CloudCredentials {
    pub cloud_name: String,
    pub api_key: String,
    pub api_secret: String,
}

/// Authentication configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthConfig {
    /// Email domains accepted for login and signup
    #[serde(default = "default_allowed_domains")]
    pub allowed_domains: Vec<String>,
    /// Institutional domain whose accounts receive the admin role
    #[serde(default = "default_admin_domain")]
    pub admin_domain: String,
    /// Minimum signup password length
    #[serde(default = "default_min_password_len")]
    pub min_password_len: usize,
    /// Administrative bootstrap credentials, environment only.
    /// Unset disables the bootstrap login path entirely.
    #[serde(skip)]
    pub bootstrap: Option<BootstrapCredentials>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allowed_domains: default_allowed_domains(),
            admin_domain: default_admin_domain(),
            min_password_len: default_min_password_len(),
            bootstrap: None,
        }
    }
}

fn default_allowed_domains() -> Vec<String> {
    vec!["gmail.com".to_string(), "college.edu".to_string()]
}

fn default_admin_domain() -> String {
    "college.edu".to_string()
}

fn default_min_password_len() -> usize {
    6
}

/// Bootstrap credential pair provisioned through the environment
#[derive(Debug, Clone)]
pub struct BootstrapCredentials {
    pub email: String,
    pub password: String,
}

/// Error type for configuration parsing
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    FileRead {
        path: String,
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{path}': {message}")]
    ParseError { path: String, message: String },
}

impl Config {
    /// Load configuration from file.
    ///
    /// If the file doesn't exist, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with
    /// location details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileRead {
            path: path.display().to_string(),
            source: e,
        })?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError {
                path: path.display().to_string(),
                message: format_yaml_error(&e),
            }
        })?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides.
    ///
    /// Environment variables follow the pattern:
    /// - CLUBHUB_SERVER_HOST / CLUBHUB_SERVER_PORT / CLUBHUB_SERVER_CORS_ORIGIN
    /// - CLUBHUB_UPLOAD_PATH / CLUBHUB_UPLOAD_MAX_FILE_SIZE
    /// - CLUBHUB_STORAGE_BACKEND (local|cloud)
    /// - CLUBHUB_STORAGE_CLOUD_NAME / _KEY / _SECRET
    /// - CLUBHUB_AUTH_BOOTSTRAP_EMAIL / _PASSWORD
    /// - CLUBHUB_DATA_DIR
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides to the configuration
    fn apply_env_overrides(&mut self) {
        if let Ok(host) = std::env::var("CLUBHUB_SERVER_HOST") {
            self.server.host = host;
        }
        if let Ok(port) = std::env::var("CLUBHUB_SERVER_PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(cors_origin) = std::env::var("CLUBHUB_SERVER_CORS_ORIGIN") {
            self.server.cors_origin = cors_origin;
        }

        if let Ok(path) = std::env::var("CLUBHUB_UPLOAD_PATH") {
            self.upload.path = PathBuf::from(path);
        }
        if let Ok(size) = std::env::var("CLUBHUB_UPLOAD_MAX_FILE_SIZE") {
            if let Ok(size) = size.parse::<u64>() {
                self.upload.max_file_size = size;
            }
        }

        if let Ok(backend) = std::env::var("CLUBHUB_STORAGE_BACKEND") {
            match backend.to_lowercase().as_str() {
                "local" => self.storage.backend = StorageBackend::Local,
                "cloud" => self.storage.backend = StorageBackend::Cloud,
                _ => {} // Ignore invalid values
            }
        }
        if let (Ok(cloud_name), Ok(api_key), Ok(api_secret)) = (
            std::env::var("CLUBHUB_STORAGE_CLOUD_NAME"),
            std::env::var("CLUBHUB_STORAGE_CLOUD_KEY"),
            std::env::var("CLUBHUB_STORAGE_CLOUD_SECRET"),
        ) {
            self.storage.cloud = Some(CloudCredentials {
                cloud_name,
                api_key,
                api_secret,
            });
        }

        if let (Ok(email), Ok(password)) = (
            std::env::var("CLUBHUB_AUTH_BOOTSTRAP_EMAIL"),
            std::env::var("CLUBHUB_AUTH_BOOTSTRAP_PASSWORD"),
        ) {
            self.auth.bootstrap = Some(BootstrapCredentials { email, password });
        }

        if let Ok(dir) = std::env::var("CLUBHUB_DATA_DIR") {
            self.data_dir = Some(PathBuf::from(dir));
        }
    }
}

/// Format YAML parsing error with location and context
fn format_yaml_error(e: &serde_yaml::Error) -> String {
    if let Some(location) = e.location() {
        format!(
            "at line {}, column {}: {}",
            location.line(),
            location.column(),
            e
        )
    } else {
        e.to_string()
    }
}

// Shared mutex for config tests that modify environment variables.
#[cfg(test)]
static CONFIG_ENV_MUTEX: std::sync::Mutex<()> = std::sync::Mutex::new(());

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const ENV_VARS: &[&str] = &[
        "CLUBHUB_SERVER_HOST",
        "CLUBHUB_SERVER_PORT",
        "CLUBHUB_SERVER_CORS_ORIGIN",
        "CLUBHUB_UPLOAD_PATH",
        "CLUBHUB_UPLOAD_MAX_FILE_SIZE",
        "CLUBHUB_STORAGE_BACKEND",
        "CLUBHUB_STORAGE_CLOUD_NAME",
        "CLUBHUB_STORAGE_CLOUD_KEY",
        "CLUBHUB_STORAGE_CLOUD_SECRET",
        "CLUBHUB_AUTH_BOOTSTRAP_EMAIL",
        "CLUBHUB_AUTH_BOOTSTRAP_PASSWORD",
        "CLUBHUB_DATA_DIR",
    ];

    fn lock_env() -> std::sync::MutexGuard<'static, ()> {
        let guard = super::CONFIG_ENV_MUTEX
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        for var in ENV_VARS {
            std::env::remove_var(var);
        }
        guard
    }

    #[test]
    fn test_load_missing_file_returns_defaults() {
        let path = std::path::Path::new("nonexistent_clubhub.yml");
        let config = Config::load(path).unwrap();

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.upload.max_file_size, 100 * 1024 * 1024);
        assert_eq!(config.upload.path, PathBuf::from("uploads"));
        assert_eq!(config.storage.backend, StorageBackend::Local);
        assert_eq!(config.auth.admin_domain, "college.edu");
        assert_eq!(config.auth.min_password_len, 6);
        assert!(config.auth.bootstrap.is_none());
        assert!(config.data_dir.is_none());
    }

    #[test]
    fn test_load_partial_config_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  port: 8088\n").unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.server.port, 8088);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.storage.backend, StorageBackend::Local);
    }

    #[test]
    fn test_load_full_config() {
        let mut file = NamedTempFile::new().unwrap();
        write!(
            file,
            r#"
server:
  host: "127.0.0.1"
  port: 9000
  cors_origin: "https://clubs.college.edu"
upload:
  path: "media"
  max_file_size: 1048576
storage:
  backend: cloud
auth:
  allowed_domains: ["college.edu"]
  admin_domain: "college.edu"
  min_password_len: 10
data_dir: "state"
"#
        )
        .unwrap();

        let config = Config::load(file.path()).unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.upload.path, PathBuf::from("media"));
        assert_eq!(config.upload.max_file_size, 1048576);
        assert_eq!(config.storage.backend, StorageBackend::Cloud);
        assert_eq!(config.auth.allowed_domains, vec!["college.edu"]);
        assert_eq!(config.auth.min_password_len, 10);
        assert_eq!(config.data_dir, Some(PathBuf::from("state")));
    }

    #[test]
    fn test_load_invalid_yaml_returns_error() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  port: not_a_number\n").unwrap();

        let result = Config::load(file.path());
        assert!(result.is_err());
    }

    #[test]
    fn test_env_override_server_config() {
        let _guard = lock_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  port: 3000\n").unwrap();

        std::env::set_var("CLUBHUB_SERVER_HOST", "192.168.1.1");
        std::env::set_var("CLUBHUB_SERVER_PORT", "4000");

        let config = Config::load_with_env(file.path()).unwrap();

        assert_eq!(config.server.host, "192.168.1.1");
        assert_eq!(config.server.port, 4000);

        std::env::remove_var("CLUBHUB_SERVER_HOST");
        std::env::remove_var("CLUBHUB_SERVER_PORT");
    }

    #[test]
    fn test_env_override_invalid_port_ignored() {
        let _guard = lock_env();

        let mut file = NamedTempFile::new().unwrap();
        write!(file, "server:\n  port: 3000\n").unwrap();

        std::env::set_var("CLUBHUB_SERVER_PORT", "not_a_number");

        let config = Config::load_with_env(file.path()).unwrap();
        assert_eq!(config.server.port, 3000);

        std::env::remove_var("CLUBHUB_SERVER_PORT");
    }

    #[test]
    fn test_cloud_credentials_require_all_three_vars() {
        let _guard = lock_env();

        let file = NamedTempFile::new().unwrap();

        std::env::set_var("CLUBHUB_STORAGE_CLOUD_NAME", "demo");
        std::env::set_var("CLUBHUB_STORAGE_CLOUD_KEY", "key");
        // Secret missing: credentials stay unset

        let config = Config::load_with_env(file.path()).unwrap();
        assert!(config.storage.cloud.is_none());

        std::env::set_var("CLUBHUB_STORAGE_CLOUD_SECRET", "secret");
        let config = Config::load_with_env(file.path()).unwrap();
        let cloud = config.storage.cloud.expect("credentials set");
        assert_eq!(cloud.cloud_name, "demo");

        std::env::remove_var("CLUBHUB_STORAGE_CLOUD_NAME");
        std::env::remove_var("CLUBHUB_STORAGE_CLOUD_KEY");
        std::env::remove_var("CLUBHUB_STORAGE_CLOUD_SECRET");
    }

    #[test]
    fn test_bootstrap_credentials_from_env_only() {
        let _guard = lock_env();

        let file = NamedTempFile::new().unwrap();
        let config = Config::load_with_env(file.path()).unwrap();
        assert!(config.auth.bootstrap.is_none());

        std::env::set_var("CLUBHUB_AUTH_BOOTSTRAP_EMAIL", "ops@college.edu");
        std::env::set_var("CLUBHUB_AUTH_BOOTSTRAP_PASSWORD", "long-random-secret");

        let config = Config::load_with_env(file.path()).unwrap();
        let bootstrap = config.auth.bootstrap.expect("bootstrap set");
        assert_eq!(bootstrap.email, "ops@college.edu");

        std::env::remove_var("CLUBHUB_AUTH_BOOTSTRAP_EMAIL");
        std::env::remove_var("CLUBHUB_AUTH_BOOTSTRAP_PASSWORD");
    }

    #[test]
    fn test_invalid_storage_backend_ignored() {
        let _guard = lock_env();

        let file = NamedTempFile::new().unwrap();
        std::env::set_var("CLUBHUB_STORAGE_BACKEND", "tape");

        let config = Config::load_with_env(file.path()).unwrap();
        assert_eq!(config.storage.backend, StorageBackend::Local);

        std::env::remove_var("CLUBHUB_STORAGE_BACKEND");
    }
}
