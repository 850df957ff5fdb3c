//! Application configuration from file and environment variables
//!
//! Configuration is loaded with the following priority (highest to lowest):
//! 1. Environment variables (prefixed with VOTEBOX_)
//! 2. Config file (config.toml)
//! 3. Default values
//!
//! Secrets like the database URL and the session key should be kept in environment
//! variables (`DATABASE_URL`, `SECRET_KEY`, `SALT`), not in the config file.

use config::{Config, ConfigError, Environment, File};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// Global application configuration
pub static APP_CONFIG: Lazy<RwLock<AppConfig>> = Lazy::new(|| {
    RwLock::new(AppConfig::load().unwrap_or_else(|e| {
        log::warn!("Failed to load config file, using defaults: {}", e);
        AppConfig::default()
    }))
});

/// Site configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub name: String,
    /// Used to build shareable poll links.
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            name: "Votebox".to_string(),
            base_url: "http://localhost:8080".to_string(),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    /// Set the `Secure` attribute on the session cookie.
    pub secure_cookies: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:8080".to_string(),
            secure_cookies: false,
        }
    }
}

/// Rate limiting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Votes per window per client address
    pub vote_max_requests: u32,
    pub vote_window_seconds: u32,
    /// Polls created per window per user
    pub poll_creation_max_requests: u32,
    pub poll_creation_window_seconds: u32,
    /// Login attempts per window per address
    pub login_max_attempts: u32,
    pub login_window_seconds: u32,
    /// Registrations per window per address
    pub registration_max_requests: u32,
    pub registration_window_seconds: u32,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            vote_max_requests: 30,
            vote_window_seconds: 60,
            poll_creation_max_requests: 10,
            poll_creation_window_seconds: 300,
            login_max_attempts: 5,
            login_window_seconds: 300,
            registration_max_requests: 3,
            registration_window_seconds: 3600,
        }
    }
}

/// Content limits configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum size of one option image in kilobytes
    pub max_image_size_kb: u32,
    /// Maximum number of options on one poll
    pub max_options: u32,
    /// Polls listed per dashboard page
    pub polls_per_page: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_image_size_kb: 4092,
            max_options: 20,
            polls_per_page: 50,
        }
    }
}

/// Storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding uploaded option images, served under `/images`
    pub images_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            images_path: "./public/images".to_string(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub site: SiteConfig,
    pub server: ServerConfig,
    pub rate_limit: RateLimitConfig,
    pub limits: LimitsConfig,
    pub storage: StorageConfig,
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
            // e.g., VOTEBOX_SITE__NAME, VOTEBOX_LIMITS__MAX_OPTIONS
            .add_source(
                Environment::with_prefix("VOTEBOX")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        config.try_deserialize()
    }

    /// Reload configuration from file
    pub fn reload() -> Result<(), ConfigError> {
        let new_config = Self::load()?;
        if let Ok(mut config) = APP_CONFIG.write() {
            *config = new_config;
            log::info!("Configuration reloaded");
        }
        Ok(())
    }
}

/// Initialize application configuration
///
/// This triggers the lazy loading of the config file and logs the result.
/// Should be called early in application startup.
pub fn init() {
    let config = get_config();
    log::info!(
        "Configuration loaded: site.name = {}, images at {}",
        config.site.name,
        config.storage.images_path
    );
}

/// Get the current application configuration
pub fn get_config() -> AppConfig {
    APP_CONFIG.read().map(|c| c.clone()).unwrap_or_default()
}

/// Get site configuration
pub fn site() -> SiteConfig {
    get_config().site
}

/// Get server configuration
pub fn server() -> ServerConfig {
    get_config().server
}

/// Get rate limit configuration
pub fn rate_limit() -> RateLimitConfig {
    get_config().rate_limit
}

/// Get limits configuration
pub fn limits() -> LimitsConfig {
    get_config().limits
}

/// Get storage configuration
pub fn storage() -> StorageConfig {
    get_config().storage
}
