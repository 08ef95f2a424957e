//! Job tracking state machine.
//!
//! `Tracker::apply` is a pure transition function: a `TrackerEvent` goes in,
//! state mutates, and a list of `TrackerAction`s comes out for the owning
//! `JobTracker` to execute (open/close the channel, publish snapshots). No
//! I/O happens here, which keeps every transition testable without a socket.

use chrono::{DateTime, Utc};

use crate::api::{AnalysisResult, AsyncAccepted};
use crate::broadcast::{JobPhase, JobProgressEvent};
use crate::error::ChannelError;

use super::event::{ChannelFrame, ProgressStatus, TrackerEvent};

/// One background categorization run being tracked.
#[derive(Debug, Clone)]
pub struct AnalysisJob {
    pub task_id: String,
    pub channel_url: String,
    pub estimated_minutes: Option<f64>,
    pub total_batches: u32,
    pub current_batch: u32,
    pub processed: u64,
    pub total: u64,
    pub progress_percentage: Option<f64>,
    pub throughput_per_minute: Option<f64>,
    pub message: String,
    /// Completed batch indices in arrival order. Duplicates are kept; the
    /// tracking view renders what the backend reported.
    pub completed_batches: Vec<u32>,
    pub started_at: DateTime<Utc>,
}

impl AnalysisJob {
    fn from_acceptance(accepted: &AsyncAccepted, channel_url: String) -> Self {
        Self {
            task_id: accepted.task_id.clone(),
            channel_url,
            estimated_minutes: accepted.estimated_completion_minutes,
            total_batches: accepted.total_batches(),
            current_batch: 0,
            processed: 0,
            total: accepted
                .file_info
                .as_ref()
                .and_then(|f| f.total_rows)
                .unwrap_or(0),
            progress_percentage: None,
            throughput_per_minute: None,
            message: accepted
                .message
                .clone()
                .unwrap_or_else(|| "Accepted for background processing".to_string()),
            completed_batches: Vec::new(),
            started_at: Utc::now(),
        }
    }

    fn snapshot(&self, phase: JobPhase) -> JobProgressEvent {
        JobProgressEvent {
            task_id: self.task_id.clone(),
            phase,
            message: self.message.clone(),
            current_batch: self.current_batch,
            total_batches: self.total_batches,
            processed: self.processed,
            total: self.total,
            progress_percentage: self.progress_percentage,
            throughput_per_minute: self.throughput_per_minute,
            completed_batches: self.completed_batches.clone(),
            estimated_minutes: self.estimated_minutes,
            timestamp: Utc::now(),
            result: None,
            error: None,
        }
    }
}

/// Side effects requested by a transition.
#[derive(Debug, Clone)]
pub enum TrackerAction {
    OpenChannel { task_id: String, url: String },
    CloseChannel { task_id: String },
    Publish(JobProgressEvent),
}

/// The tracker state machine.
///
/// Phases: Idle -> Pending -> Connecting -> Streaming -> Completed/Failed,
/// with Cancelled on user reset from any non-terminal phase. After a terminal
/// event the job record is cleared; `phase` keeps the terminal value
/// (Completed/Failed) until the next acceptance, except cancel which rests
/// the tracker back at Idle for reuse.
#[derive(Debug)]
pub struct Tracker {
    phase: JobPhase,
    job: Option<AnalysisJob>,
    result: Option<AnalysisResult>,
}

impl Tracker {
    pub fn new() -> Self {
        Self {
            phase: JobPhase::Idle,
            job: None,
            result: None,
        }
    }

    pub fn phase(&self) -> JobPhase {
        self.phase
    }

    pub fn job(&self) -> Option<&AnalysisJob> {
        self.job.as_ref()
    }

    /// Final analysis payload of the last completed job.
    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    /// True while a job is in a non-terminal phase.
    pub fn is_active(&self) -> bool {
        self.job.is_some()
    }

    fn matches(&self, task_id: &str) -> bool {
        self.job
            .as_ref()
            .map(|j| j.task_id == task_id)
            .unwrap_or(false)
    }

    /// Applies one event and returns the side effects to run.
    ///
    /// Events for a task id that is not the tracked one are ignored and
    /// produce no state mutation.
    pub fn apply(&mut self, event: TrackerEvent) -> Vec<TrackerAction> {
        match event {
            TrackerEvent::Accepted {
                accepted,
                channel_url,
            } => self.on_accepted(accepted, channel_url),
            TrackerEvent::ChannelOpening { task_id } => self.on_channel_opening(&task_id),
            TrackerEvent::ChannelOpened { task_id } => self.on_channel_opened(&task_id),
            TrackerEvent::Frame(frame) => self.on_frame(frame),
            TrackerEvent::ChannelFailed { task_id, error } => {
                self.on_channel_failure(&task_id, error.to_string())
            }
            TrackerEvent::ChannelClosed { task_id } => {
                self.on_channel_failure(&task_id, ChannelError::ClosedEarly.to_string())
            }
            TrackerEvent::Cancel => self.on_cancel(),
        }
    }

    fn on_accepted(&mut self, accepted: AsyncAccepted, channel_url: String) -> Vec<TrackerAction> {
        if self.job.is_some() {
            // One active job per workflow instance; the caller enforces this
            // and a second acceptance here is a bug upstream.
            return Vec::new();
        }

        let job = AnalysisJob::from_acceptance(&accepted, channel_url.clone());
        let snapshot = job.snapshot(JobPhase::Pending);
        let task_id = job.task_id.clone();

        self.phase = JobPhase::Pending;
        self.result = None;
        self.job = Some(job);

        vec![
            TrackerAction::Publish(snapshot),
            TrackerAction::OpenChannel {
                task_id,
                url: channel_url,
            },
        ]
    }

    fn on_channel_opening(&mut self, task_id: &str) -> Vec<TrackerAction> {
        if self.phase != JobPhase::Pending || !self.matches(task_id) {
            return Vec::new();
        }
        let Some(job) = self.job.as_ref() else {
            return Vec::new();
        };
        self.phase = JobPhase::Connecting;
        vec![TrackerAction::Publish(job.snapshot(JobPhase::Connecting))]
    }

    fn on_channel_opened(&mut self, task_id: &str) -> Vec<TrackerAction> {
        if !self.matches(task_id) {
            return Vec::new();
        }
        if self.phase != JobPhase::Pending && self.phase != JobPhase::Connecting {
            return Vec::new();
        }
        let Some(job) = self.job.as_mut() else {
            return Vec::new();
        };
        self.phase = JobPhase::Streaming;
        job.message = "Processing batches".to_string();
        vec![TrackerAction::Publish(job.snapshot(JobPhase::Streaming))]
    }

    fn on_frame(&mut self, frame: ChannelFrame) -> Vec<TrackerAction> {
        if !self.matches(frame.task_id()) {
            return Vec::new();
        }

        match frame {
            ChannelFrame::Progress { data, .. } => {
                if self.phase != JobPhase::Streaming && self.phase != JobPhase::Connecting {
                    return Vec::new();
                }
                let Some(job) = self.job.as_mut() else {
                    return Vec::new();
                };
                // A frame can beat the open notification; promote first.
                self.phase = JobPhase::Streaming;
                if let Some(current) = data.current_batch {
                    job.current_batch = current;
                }
                if let Some(total) = data.total_batches {
                    job.total_batches = total;
                }
                if let Some(processed) = data.processed {
                    job.processed = processed;
                }
                if let Some(total) = data.total {
                    job.total = total;
                }
                if let Some(pct) = data.progress_percentage {
                    job.progress_percentage = Some(pct);
                }
                if let Some(throughput) = data.throughput_per_minute {
                    job.throughput_per_minute = Some(throughput);
                }
                if let Some(message) = data.message {
                    job.message = message;
                }
                if data.status == ProgressStatus::BatchComplete {
                    if let Some(current) = data.current_batch {
                        job.completed_batches.push(current);
                    }
                }

                vec![TrackerAction::Publish(job.snapshot(JobPhase::Streaming))]
            }
            ChannelFrame::Completion { data, .. } => {
                // Completion wins over anything still in flight.
                let Some(job) = self.job.take() else {
                    return Vec::new();
                };
                let result = AnalysisResult::new(data);

                let mut snapshot = job.snapshot(JobPhase::Completed);
                snapshot.message = "Analysis complete".to_string();
                snapshot.result = Some(result.clone());

                self.phase = JobPhase::Completed;
                self.result = Some(result);

                vec![
                    TrackerAction::Publish(snapshot),
                    TrackerAction::CloseChannel {
                        task_id: job.task_id,
                    },
                ]
            }
        }
    }

    fn on_channel_failure(&mut self, task_id: &str, message: String) -> Vec<TrackerAction> {
        if !self.matches(task_id) {
            return Vec::new();
        }

        let Some(job) = self.job.take() else {
            return Vec::new();
        };
        let mut snapshot = job.snapshot(JobPhase::Failed);
        snapshot.message = message.clone();
        snapshot.error = Some(message);

        self.phase = JobPhase::Failed;

        vec![
            TrackerAction::Publish(snapshot),
            TrackerAction::CloseChannel {
                task_id: job.task_id,
            },
        ]
    }

    fn on_cancel(&mut self) -> Vec<TrackerAction> {
        let job = match self.job.take() {
            Some(job) => job,
            None => return Vec::new(),
        };

        let mut snapshot = job.snapshot(JobPhase::Cancelled);
        snapshot.message = "Analysis cancelled".to_string();

        // Cancelled is the job's terminal event; the tracker itself rests at
        // Idle so the workflow instance can be reused.
        self.phase = JobPhase::Idle;
        self.result = None;

        vec![
            TrackerAction::Publish(snapshot),
            TrackerAction::CloseChannel {
                task_id: job.task_id,
            },
        ]
    }
}

impl Default for Tracker {
    fn default() -> Self {
        Self::new()
    }
}
