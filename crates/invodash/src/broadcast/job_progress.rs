//! Job progress broadcasting for the tracking views.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

use crate::api::AnalysisResult;

/// Lifecycle phase of an analysis job.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum JobPhase {
    Idle,
    Pending,
    Connecting,
    Streaming,
    Completed,
    Failed,
    Cancelled,
}

impl JobPhase {
    /// Terminal phases hold no open channel and accept no further events.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobPhase::Completed | JobPhase::Failed | JobPhase::Cancelled)
    }
}

impl std::fmt::Display for JobPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JobPhase::Idle => write!(f, "Idle"),
            JobPhase::Pending => write!(f, "Pending"),
            JobPhase::Connecting => write!(f, "Connecting"),
            JobPhase::Streaming => write!(f, "Streaming"),
            JobPhase::Completed => write!(f, "Completed"),
            JobPhase::Failed => write!(f, "Failed"),
            JobPhase::Cancelled => write!(f, "Cancelled"),
        }
    }
}

/// Snapshot of a tracked job, emitted on every state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProgressEvent {
    /// Backend task identifier.
    pub task_id: String,
    /// Current phase.
    pub phase: JobPhase,
    /// Human-readable status message.
    pub message: String,
    /// Batch currently being processed.
    pub current_batch: u32,
    /// Planned batch count.
    pub total_batches: u32,
    /// Rows processed so far.
    pub processed: u64,
    /// Total rows in the upload.
    pub total: u64,
    /// Backend-computed percentage, when provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress_percentage: Option<f64>,
    /// Rows per minute, when provided.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub throughput_per_minute: Option<f64>,
    /// Completed batch indices in arrival order, duplicates kept for display.
    #[serde(default)]
    pub completed_batches: Vec<u32>,
    /// Backend estimate in minutes, from the acceptance payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_minutes: Option<f64>,
    /// Timestamp of this event.
    pub timestamp: DateTime<Utc>,
    /// Final analysis payload (set on completion).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<AnalysisResult>,
    /// Error message (set on failure).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Broadcasts job progress events for streaming to tracking views.
#[derive(Clone)]
pub struct JobProgressBroadcaster {
    sender: Arc<broadcast::Sender<JobProgressEvent>>,
}

impl JobProgressBroadcaster {
    /// Creates a new broadcaster with the specified channel capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Sends a progress event to all subscribers.
    pub fn send(&self, event: JobProgressEvent) {
        // Ignore errors - no active receivers is fine
        let _ = self.sender.send(event);
    }

    /// Creates a new subscriber for progress events.
    pub fn subscribe(&self) -> broadcast::Receiver<JobProgressEvent> {
        self.sender.subscribe()
    }
}

impl Default for JobProgressBroadcaster {
    fn default() -> Self {
        Self::new(100)
    }
}
