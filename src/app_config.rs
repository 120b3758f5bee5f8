//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with CHATDESK_, nested keys split by `__`)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! Secrets like the database URL and the session signing key are read from
//! the environment directly (`DATABASE_URL`, `SECRET_KEY`), never from here.
//!
//! The loaded [`AppConfig`] is handed to the web layer as `web::Data` rather
//! than kept in a global, so tests can build apps with their own settings.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Address the server binds to
    pub bind: String,
    /// Number of actix workers. 0 lets actix pick one per core.
    pub workers: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            workers: 0,
        }
    }
}

/// Session cookie configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Only send the session cookie over HTTPS
    pub cookie_secure: bool,
    /// Name of the session cookie shared with the login system
    pub cookie_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_secure: false,
            cookie_name: "session".to_string(),
        }
    }
}

/// File upload configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UploadConfig {
    /// Directory uploads are written to. Created on first upload.
    pub folder: String,
    /// Lowercase extensions accepted by `POST /upload`
    pub allowed_extensions: Vec<String>,
    /// Maximum upload size in MB
    pub max_size_mb: u32,
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            folder: "./uploads".to_string(),
            allowed_extensions: ["png", "jpg", "jpeg", "gif", "pdf", "docx"]
                .iter()
                .map(|ext| ext.to_string())
                .collect(),
            max_size_mb: 10,
        }
    }
}

impl UploadConfig {
    /// Upload limit in bytes.
    pub fn max_size_bytes(&self) -> usize {
        self.max_size_mb as usize * 1024 * 1024
    }
}

/// Chat behaviour configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Value of `usuarios.role` that marks an administrator
    pub admin_role: String,
    /// Maximum length of a posted message in characters
    pub message_max_length: usize,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            admin_role: crate::constants::ADMIN_ROLE.to_string(),
            message_max_length: crate::constants::MAX_MESSAGE_LENGTH,
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub session: SessionConfig,
    pub upload: UploadConfig,
    pub chat: ChatConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from_path("config.toml")
    }

    /// Load configuration from a specific path
    pub fn load_from_path(path: &str) -> Result<Self, ConfigError> {
        use config::FileFormat;

        let config = Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(File::new(path, FileFormat::Toml).required(false))
            // e.g. CHATDESK_UPLOAD__FOLDER, CHATDESK_UPLOAD__ALLOWED_EXTENSIONS=png,pdf
            .add_source(
                Environment::with_prefix("CHATDESK")
                    .prefix_separator("_")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("upload.allowed_extensions")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Load configuration, falling back to defaults when the file is broken.
    pub fn load_or_default() -> Self {
        let config = Self::load().unwrap_or_else(|e| {
            log::warn!("Failed to load config file, using defaults: {}", e);
            AppConfig::default()
        });
        log::info!(
            "Configuration loaded: bind = {}, upload folder = {}",
            config.server.bind,
            config.upload.folder
        );
        config
    }
}
