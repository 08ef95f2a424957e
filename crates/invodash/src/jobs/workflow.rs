//! Upload-and-analyze workflow.
//!
//! Submits one spreadsheet for categorization and branches on the backend's
//! answer: a complete result is surfaced directly and no job is created; an
//! async acceptance is handed to the tracker, which begins background
//! tracking at once.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use log::info;

use crate::api::{AnalysisResult, ApiClient, UploadOptions, UploadOutcome};
use crate::broadcast::{JobProgressBroadcaster, NotificationBroadcaster};
use crate::error::{InvodashError, TrackerError};

use super::registry::ChannelRegistry;
use super::tracker::JobTracker;

/// Outcome of one analyze invocation.
#[derive(Debug, Clone)]
pub enum AnalysisOutcome {
    /// Synchronous processing; the result is already here.
    Direct(AnalysisResult),
    /// Background processing; progress streams to the tracker.
    Tracking { task_id: String },
}

/// One workflow instance: at most one sync call in flight, at most one
/// tracked job. Concurrent analyses use independent instances.
pub struct UploadWorkflow {
    api: Arc<ApiClient>,
    tracker: Arc<JobTracker>,
    ws_base: String,
    upload_in_flight: AtomicBool,
}

impl UploadWorkflow {
    pub fn new(
        api: Arc<ApiClient>,
        ws_base: String,
        registry: Arc<ChannelRegistry>,
        broadcaster: JobProgressBroadcaster,
        notifier: NotificationBroadcaster,
    ) -> Self {
        Self {
            api,
            tracker: JobTracker::new(registry, broadcaster, notifier),
            ws_base,
            upload_in_flight: AtomicBool::new(false),
        }
    }

    pub fn tracker(&self) -> &Arc<JobTracker> {
        &self.tracker
    }

    /// True while the upload request itself is in flight. The UI disables
    /// its trigger off this; re-invoking concurrently is rejected.
    pub fn is_uploading(&self) -> bool {
        self.upload_in_flight.load(Ordering::SeqCst)
    }

    /// True while this instance tracks a background job.
    pub fn is_tracking(&self) -> bool {
        self.tracker.is_active()
    }

    /// Uploads the spreadsheet and either returns the result or starts
    /// background tracking.
    pub async fn analyze(
        &self,
        file: &Path,
        options: &UploadOptions,
    ) -> Result<AnalysisOutcome, InvodashError> {
        if self.upload_in_flight.swap(true, Ordering::SeqCst) {
            return Err(TrackerError::UploadInFlight.into());
        }

        let outcome = self.api.upload_spreadsheet(file, options).await;
        self.upload_in_flight.store(false, Ordering::SeqCst);

        match outcome? {
            UploadOutcome::Direct(result) => {
                info!("Upload processed synchronously");
                Ok(AnalysisOutcome::Direct(result))
            }
            UploadOutcome::Accepted(accepted) => {
                let task_id = accepted.task_id.clone();
                let channel_url = accepted.channel_url(&self.ws_base);
                info!("Upload accepted as background task {}", task_id);
                self.tracker.start(accepted, channel_url)?;
                Ok(AnalysisOutcome::Tracking { task_id })
            }
        }
    }

    /// User reset: cancels any tracked job on this instance.
    pub fn cancel(&self) {
        self.tracker.cancel();
    }
}
