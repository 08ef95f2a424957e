//! Configuration data model.

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Configuration format version. Only "1.0" is supported.
    pub version: String,

    /// Base URL of the backend REST API, including the `/api/v3` prefix.
    pub api_base_url: String,

    /// Base URL for WebSocket push channels. When omitted it is derived
    /// from `api_base_url` by swapping the scheme (http -> ws, https -> wss).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ws_base_url: Option<String>,

    /// Timeout applied to every REST request, in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Time-to-live of the cached region/country catalog, in seconds.
    #[serde(default = "default_region_cache_ttl_secs")]
    pub region_cache_ttl_secs: u64,

    /// Defaults for the upload-and-analyze workflow.
    #[serde(default)]
    pub upload: UploadDefaults,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_region_cache_ttl_secs() -> u64 {
    900
}

/// Defaults for spreadsheet uploads.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadDefaults {
    /// Default categorization batch size (5, 10, 15, or 20).
    #[serde(default = "default_batch_size")]
    pub batch_size: u32,

    /// Whether uploads request asynchronous background processing by default.
    #[serde(default)]
    pub async_mode: bool,
}

fn default_batch_size() -> u32 {
    10
}

impl Default for UploadDefaults {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            async_mode: false,
        }
    }
}

impl Config {
    /// Returns the WebSocket base URL, deriving it from the API base URL
    /// when not configured explicitly.
    pub fn ws_base(&self) -> String {
        if let Some(ws) = &self.ws_base_url {
            return ws.clone();
        }
        if let Some(rest) = self.api_base_url.strip_prefix("https://") {
            format!("wss://{}", rest)
        } else if let Some(rest) = self.api_base_url.strip_prefix("http://") {
            format!("ws://{}", rest)
        } else {
            self.api_base_url.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ws_base_derived_from_api_base() {
        let config: Config = serde_json::from_str(
            r#"{"version": "1.0", "api_base_url": "https://backend.example.com/api/v3"}"#,
        )
        .unwrap();
        assert_eq!(config.ws_base(), "wss://backend.example.com/api/v3");
    }

    #[test]
    fn test_ws_base_explicit_wins() {
        let config: Config = serde_json::from_str(
            r#"{
                "version": "1.0",
                "api_base_url": "http://localhost:8000/api/v3",
                "ws_base_url": "ws://localhost:8001/api/v3"
            }"#,
        )
        .unwrap();
        assert_eq!(config.ws_base(), "ws://localhost:8001/api/v3");
    }

    #[test]
    fn test_defaults_applied() {
        let config: Config = serde_json::from_str(
            r#"{"version": "1.0", "api_base_url": "http://localhost:8000/api/v3"}"#,
        )
        .unwrap();
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.region_cache_ttl_secs, 900);
        assert_eq!(config.upload.batch_size, 10);
        assert!(!config.upload.async_mode);
    }
}
