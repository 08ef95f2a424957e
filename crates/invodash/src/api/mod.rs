//! REST access to the invoice and incident backends.

pub mod client;
pub mod types;

pub use client::ApiClient;
pub use types::{
    AgentQuestion, AgentReply, AnalysisResult, AsyncAccepted, BatchSize, DashboardSummary,
    FileInfo, ProcessingStats, UploadOptions, UploadOutcome,
};
