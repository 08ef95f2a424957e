//! Application configuration: schema, loading, and first-run setup.

pub mod loader;
pub mod schema;

pub use loader::{load_config, load_config_from_str};
pub use schema::{Config, UploadDefaults};

use std::fs;
use std::path::{Path, PathBuf};

use log::info;

use crate::error::ConfigError;

/// Returns the default config directory path for the current platform.
/// - macOS: ~/Library/Application Support/invodash
/// - Linux: ~/.config/invodash
/// - Windows: %APPDATA%/invodash
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("invodash"))
}

/// Ensures the config directory exists and has a minimal config file.
/// Creates the directory and a default `config.json` if they don't exist.
pub fn ensure_config_initialized(config_dir: &Path) -> Result<PathBuf, ConfigError> {
    if !config_dir.exists() {
        info!("Creating config directory: {:?}", config_dir);
        fs::create_dir_all(config_dir).map_err(|e| ConfigError::WriteFile {
            path: config_dir.to_path_buf(),
            source: e,
        })?;
    }

    let config_path = config_dir.join("config.json");
    if !config_path.exists() {
        info!("Creating default config.json");
        let default_config = r#"{
  "version": "1.0",
  "api_base_url": "https://backend.example.com/api/v3",
  "request_timeout_secs": 30,
  "region_cache_ttl_secs": 900,
  "upload": {
    "batch_size": 10,
    "async_mode": false
  }
}
"#;
        fs::write(&config_path, default_config).map_err(|e| ConfigError::WriteFile {
            path: config_path.clone(),
            source: e,
        })?;
    }

    Ok(config_path)
}
