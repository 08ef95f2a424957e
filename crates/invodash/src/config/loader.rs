use std::path::Path;

use crate::config::schema::Config;
use crate::error::ConfigError;

const SCHEMA_JSON: &str = include_str!("../../../../schema/config-v1.json");

pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;

    load_config_from_str(&content)
}

pub fn load_config_from_str(content: &str) -> Result<Config, ConfigError> {
    let json_value: serde_json::Value = serde_json::from_str(content)?;

    validate_schema(&json_value)?;

    let config: Config = serde_json::from_value(json_value)?;

    validate_config(&config)?;

    Ok(config)
}

fn validate_schema(json_value: &serde_json::Value) -> Result<(), ConfigError> {
    let schema: serde_json::Value =
        serde_json::from_str(SCHEMA_JSON).map_err(|e| ConfigError::Validation {
            message: format!("Invalid embedded schema JSON: {}", e),
        })?;

    let compiled =
        jsonschema::JSONSchema::compile(&schema).map_err(|e| ConfigError::Validation {
            message: format!("Failed to compile JSON schema: {}", e),
        })?;

    let result = compiled.validate(json_value);
    if let Err(errors) = result {
        let error_messages: Vec<String> = errors
            .map(|e| format!("{} at {}", e, e.instance_path))
            .collect();
        return Err(ConfigError::SchemaValidation {
            errors: error_messages.join("; "),
        });
    }

    Ok(())
}

fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Validate version
    if config.version != "1.0" {
        return Err(ConfigError::Validation {
            message: format!("Unsupported config version: {}", config.version),
        });
    }

    // The REST base URL must parse and use an HTTP scheme
    let api_url = reqwest::Url::parse(&config.api_base_url).map_err(|e| {
        ConfigError::Validation {
            message: format!("Invalid api_base_url '{}': {}", config.api_base_url, e),
        }
    })?;
    if api_url.scheme() != "http" && api_url.scheme() != "https" {
        return Err(ConfigError::Validation {
            message: format!(
                "api_base_url must use http or https, got '{}'",
                api_url.scheme()
            ),
        });
    }

    // The push channel base URL, when set, must use a WebSocket scheme
    if let Some(ws) = &config.ws_base_url {
        let ws_url = reqwest::Url::parse(ws).map_err(|e| ConfigError::Validation {
            message: format!("Invalid ws_base_url '{}': {}", ws, e),
        })?;
        if ws_url.scheme() != "ws" && ws_url.scheme() != "wss" {
            return Err(ConfigError::Validation {
                message: format!("ws_base_url must use ws or wss, got '{}'", ws_url.scheme()),
            });
        }
    }

    if config.request_timeout_secs == 0 {
        return Err(ConfigError::Validation {
            message: "request_timeout_secs must be greater than zero".to_string(),
        });
    }

    if ![5, 10, 15, 20].contains(&config.upload.batch_size) {
        return Err(ConfigError::Validation {
            message: format!(
                "upload.batch_size must be one of 5, 10, 15, 20, got {}",
                config.upload.batch_size
            ),
        });
    }

    Ok(())
}
