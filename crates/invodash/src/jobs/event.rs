//! Typed events for the job tracker.
//!
//! `ChannelFrame` mirrors the wire format of the push channel; `TrackerEvent`
//! is the union fed into the tracker's transition function. Transport code
//! only produces events, it never touches job state.

use serde::{Deserialize, Deserializer};

use crate::api::AsyncAccepted;
use crate::error::ChannelError;

/// Status carried by a progress frame. Statuses this client does not know
/// are kept as `Other` instead of failing the whole frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressStatus {
    Processing,
    BatchComplete,
    Other,
}

impl<'de> Deserialize<'de> for ProgressStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = String::deserialize(deserializer)?;
        Ok(match value.as_str() {
            "processing" => ProgressStatus::Processing,
            "batch_complete" => ProgressStatus::BatchComplete,
            _ => ProgressStatus::Other,
        })
    }
}

/// Payload of a progress frame. Every field except `status` is optional;
/// the backend fills in what it knows per batch.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ProgressData {
    pub status: ProgressStatus,
    #[serde(default)]
    pub current_batch: Option<u32>,
    #[serde(default)]
    pub total_batches: Option<u32>,
    #[serde(default)]
    pub processed: Option<u64>,
    #[serde(default)]
    pub total: Option<u64>,
    #[serde(default)]
    pub progress_percentage: Option<f64>,
    #[serde(default)]
    pub throughput_per_minute: Option<f64>,
    #[serde(default)]
    pub message: Option<String>,
}

/// One JSON frame from the push channel:
/// `{"type": "progress"|"completion", "task_id": …, "data": …}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ChannelFrame {
    Progress {
        task_id: String,
        data: ProgressData,
    },
    Completion {
        task_id: String,
        data: serde_json::Value,
    },
}

impl ChannelFrame {
    pub fn task_id(&self) -> &str {
        match self {
            ChannelFrame::Progress { task_id, .. } => task_id,
            ChannelFrame::Completion { task_id, .. } => task_id,
        }
    }

    /// Parses a text frame. Malformed frames are the caller's problem to log
    /// and drop; they never reach the tracker.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }
}

/// Event union consumed by the tracker's transition function.
#[derive(Debug, Clone)]
pub enum TrackerEvent {
    /// Upload accepted for background processing; `channel_url` is already
    /// resolved against the WebSocket base.
    Accepted {
        accepted: AsyncAccepted,
        channel_url: String,
    },
    /// The tracker is opening the push channel.
    ChannelOpening { task_id: String },
    /// The push channel reported ready.
    ChannelOpened { task_id: String },
    /// A parsed frame arrived.
    Frame(ChannelFrame),
    /// The push channel failed.
    ChannelFailed {
        task_id: String,
        error: ChannelError,
    },
    /// The push channel closed.
    ChannelClosed { task_id: String },
    /// User-initiated reset.
    Cancel,
}
