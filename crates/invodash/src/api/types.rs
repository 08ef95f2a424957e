//! Wire types for the backend REST endpoints.
//!
//! Invoice/incident backend bodies are snake_case; the dashboard and region
//! payloads are camelCase. Each type mirrors its endpoint exactly.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::ApiError;

// ─── Analysis result ────────────────────────────────────────────────────────

/// Structured analysis payload (category breakdowns, quality metrics,
/// downloadable artifact) returned by a synchronous upload, a completion
/// event, or the incident analytics endpoint.
///
/// Treated as a value object: the client checks for existence of fields but
/// never interprets the analytics themselves.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct AnalysisResult(serde_json::Value);

impl AnalysisResult {
    pub fn new(value: serde_json::Value) -> Self {
        Self(value)
    }

    pub fn as_value(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn get(&self, key: &str) -> Option<&serde_json::Value> {
        self.0.get(key)
    }

    pub fn total_processed(&self) -> Option<u64> {
        self.0.get("total_processed").and_then(|v| v.as_u64())
    }

    pub fn processing_time_seconds(&self) -> Option<f64> {
        self.0.get("processing_time_seconds").and_then(|v| v.as_f64())
    }

    pub fn has_download(&self) -> bool {
        self.0.get("download_url").is_some()
    }
}

// ─── Upload ─────────────────────────────────────────────────────────────────

/// Allowed categorization batch sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchSize {
    Five,
    Ten,
    Fifteen,
    Twenty,
}

impl BatchSize {
    pub fn as_u32(&self) -> u32 {
        match self {
            BatchSize::Five => 5,
            BatchSize::Ten => 10,
            BatchSize::Fifteen => 15,
            BatchSize::Twenty => 20,
        }
    }
}

impl Default for BatchSize {
    fn default() -> Self {
        BatchSize::Ten
    }
}

impl TryFrom<u32> for BatchSize {
    type Error = ApiError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        match value {
            5 => Ok(BatchSize::Five),
            10 => Ok(BatchSize::Ten),
            15 => Ok(BatchSize::Fifteen),
            20 => Ok(BatchSize::Twenty),
            other => Err(ApiError::InvalidBatchSize(other)),
        }
    }
}

/// Processing options for a spreadsheet upload.
#[derive(Debug, Clone, Copy, Default)]
pub struct UploadOptions {
    pub batch_size: BatchSize,
    pub async_mode: bool,
}

/// Metadata about the uploaded file, echoed by the backend.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct FileInfo {
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(default)]
    pub size_bytes: Option<u64>,
    #[serde(default)]
    pub total_rows: Option<u64>,
}

/// Batch plan for an asynchronous categorization run.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProcessingStats {
    #[serde(default)]
    pub total_batches: Option<u32>,
    #[serde(default)]
    pub batch_size: Option<u32>,
    #[serde(default)]
    pub total_rows: Option<u64>,
}

/// Backend acceptance of an upload for background processing.
#[derive(Debug, Clone, Deserialize)]
pub struct AsyncAccepted {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub async_mode: bool,
    pub task_id: String,
    #[serde(default)]
    pub websocket_url: Option<String>,
    #[serde(default)]
    pub estimated_completion_minutes: Option<f64>,
    #[serde(default)]
    pub file_info: Option<FileInfo>,
    #[serde(default)]
    pub processing_stats: Option<ProcessingStats>,
    #[serde(default)]
    pub message: Option<String>,
}

impl AsyncAccepted {
    /// Planned batch count, zero when the backend did not provide one.
    pub fn total_batches(&self) -> u32 {
        self.processing_stats
            .as_ref()
            .and_then(|s| s.total_batches)
            .unwrap_or(0)
    }

    /// Resolves the push channel URL. The backend may send an absolute
    /// `ws(s)://` URL, a path, or nothing; paths resolve against `ws_base`.
    pub fn channel_url(&self, ws_base: &str) -> String {
        match &self.websocket_url {
            Some(url) if url.starts_with("ws://") || url.starts_with("wss://") => url.clone(),
            Some(path) => format!(
                "{}/{}",
                ws_base.trim_end_matches('/'),
                path.trim_start_matches('/')
            ),
            None => format!(
                "{}/categorization/ws/{}",
                ws_base.trim_end_matches('/'),
                self.task_id
            ),
        }
    }
}

/// Outcome of an upload request: a complete result right away, or acceptance
/// for background processing.
#[derive(Debug, Clone)]
pub enum UploadOutcome {
    Direct(AnalysisResult),
    Accepted(AsyncAccepted),
}

impl UploadOutcome {
    /// Branches on the response body: `async_mode: true` plus a `task_id`
    /// means a background job, anything else is a complete result.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        let is_async = value
            .get("async_mode")
            .and_then(|v| v.as_bool())
            .unwrap_or(false)
            && value.get("task_id").is_some();

        if is_async {
            let accepted: AsyncAccepted = serde_json::from_value(value)?;
            Ok(UploadOutcome::Accepted(accepted))
        } else {
            Ok(UploadOutcome::Direct(AnalysisResult::new(value)))
        }
    }
}

// ─── Dashboard ──────────────────────────────────────────────────────────────

/// Aggregate invoice statistics.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total_processed: u64,
    pub total_success: u64,
    pub total_failed: u64,
}

/// Per-day success/failure counts for the trend chart.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProcessingTrend {
    pub labels: Vec<String>,
    pub success: Vec<u64>,
    pub failed: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TopValue {
    pub value: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FieldTopValues {
    pub field: String,
    pub top_values: Vec<TopValue>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldGroup {
    pub fields: Vec<String>,
    pub values: Vec<FieldTopValues>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TopFields {
    pub header: FieldGroup,
    pub line_items: FieldGroup,
    pub tax_data: FieldGroup,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateRange {
    pub from: String,
    pub to: String,
}

/// Filter options the backend offers for the dashboard.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardFilters {
    pub regions: Vec<String>,
    pub countries: HashMap<String, Vec<String>>,
    pub vendors: Vec<String>,
    pub date_range: DateRange,
}

/// Response of `POST /invoice-management/dashboard/filter`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub statistics: Statistics,
    pub processing_trend: ProcessingTrend,
    pub top5_fields: TopFields,
    pub filters: DashboardFilters,
}

// ─── Agents ─────────────────────────────────────────────────────────────────

/// Question for the invoice SQL agent or the incident analytics agent.
#[derive(Debug, Clone, Serialize)]
pub struct AgentQuestion {
    pub question: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
}

/// Agent reply. The invoice agent answers in `answer`, the incident agent in
/// `response`; `text()` hides the difference.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct AgentReply {
    #[serde(default)]
    pub question: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub response: Option<String>,
    #[serde(default)]
    pub sql_queries: Vec<String>,
    #[serde(default)]
    pub session_id: Option<String>,
}

impl AgentReply {
    pub fn text(&self) -> Option<&str> {
        self.answer.as_deref().or(self.response.as_deref())
    }
}
