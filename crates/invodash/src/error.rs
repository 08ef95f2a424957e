use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvodashError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Session error: {0}")]
    Session(#[from] SessionError),

    #[error("API error: {0}")]
    Api(#[from] ApiError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Tracker error: {0}")]
    Tracker(#[from] TrackerError),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file '{path}': {source}")]
    ReadFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write config file '{path}': {source}")]
    WriteFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config JSON: {0}")]
    ParseJson(#[from] serde_json::Error),

    #[error("Config validation failed: {message}")]
    Validation { message: String },

    #[error("Schema validation failed: {errors}")]
    SchemaValidation { errors: String },
}

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Failed to read session store '{path}': {source}")]
    ReadStore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write session store '{path}': {source}")]
    WriteStore {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse session store: {0}")]
    ParseStore(#[from] serde_json::Error),

    #[error("Login rejected: {message}")]
    LoginFailed { message: String },

    #[error("Not logged in")]
    NotLoggedIn,
}

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid endpoint URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    #[error("Backend returned {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("Malformed response from {context}: {source}")]
    MalformedResponse {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to read upload file '{path}': {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid batch size {0}, expected one of 5, 10, 15, 20")]
    InvalidBatchSize(u32),
}

/// Push channel failures. These never surface as `Err` to callers; the
/// tracker turns them into a terminal `Failed` phase and a notification.
#[derive(Error, Debug, Clone)]
pub enum ChannelError {
    #[error("Failed to open push channel for task {task_id}: {message}")]
    Connect { task_id: String, message: String },

    #[error("Push channel transport error: {0}")]
    Transport(String),

    #[error("Push channel closed before completion")]
    ClosedEarly,
}

#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("A job is already being tracked: {task_id}")]
    AlreadyActive { task_id: String },

    #[error("No tracked job matches task {task_id}")]
    NotTracking { task_id: String },

    #[error("An upload is already in flight on this workflow")]
    UploadInFlight,
}

pub type Result<T> = std::result::Result<T, InvodashError>;
