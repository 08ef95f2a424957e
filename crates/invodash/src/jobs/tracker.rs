//! The job tracker: owns one job lifecycle and its push channel.

use std::sync::{Arc, Mutex};

use log::warn;
use tokio::sync::{mpsc, oneshot};

use crate::api::AsyncAccepted;
use crate::broadcast::{JobPhase, JobProgressBroadcaster, NotificationBroadcaster};
use crate::error::TrackerError;

use super::channel::run_channel;
use super::event::TrackerEvent;
use super::registry::ChannelRegistry;
use super::state::{AnalysisJob, Tracker, TrackerAction};

/// Read-only view of the tracker for the presentation layer.
#[derive(Debug, Clone)]
pub struct TrackerSnapshot {
    pub phase: JobPhase,
    pub job: Option<AnalysisJob>,
    pub result: Option<crate::api::AnalysisResult>,
}

/// Owns the lifecycle of one background analysis job at a time.
///
/// The tracker is the sole mutator of job state: channel tasks feed events
/// in, the transition function decides, and the tracker executes the
/// resulting actions (spawn/close channels, publish snapshots, raise
/// notifications). The presentation layer only reads snapshots and calls
/// `start`/`cancel`/`attach_view`.
pub struct JobTracker {
    state: Mutex<Tracker>,
    registry: Arc<ChannelRegistry>,
    broadcaster: JobProgressBroadcaster,
    notifier: NotificationBroadcaster,
    events_tx: mpsc::Sender<TrackerEvent>,
}

impl JobTracker {
    /// Creates a tracker and spawns its event pump. Must be called from
    /// within a tokio runtime.
    pub fn new(
        registry: Arc<ChannelRegistry>,
        broadcaster: JobProgressBroadcaster,
        notifier: NotificationBroadcaster,
    ) -> Arc<Self> {
        let (events_tx, mut events_rx) = mpsc::channel::<TrackerEvent>(64);

        let tracker = Arc::new(Self {
            state: Mutex::new(Tracker::new()),
            registry,
            broadcaster,
            notifier,
            events_tx,
        });

        // Event pump: channel tasks -> transition function. Holds only a
        // weak reference so a dropped tracker tears the pump down.
        let weak = Arc::downgrade(&tracker);
        tokio::spawn(async move {
            while let Some(event) = events_rx.recv().await {
                match weak.upgrade() {
                    Some(tracker) => tracker.ingest(event),
                    None => break,
                }
            }
        });

        tracker
    }

    /// Begins tracking an accepted background job. Tracking starts
    /// immediately; no view needs to be open.
    pub fn start(&self, accepted: AsyncAccepted, channel_url: String) -> Result<(), TrackerError> {
        {
            let state = self.lock_state();
            if state.is_active() {
                let task_id = state
                    .job()
                    .map(|j| j.task_id.clone())
                    .unwrap_or_default();
                return Err(TrackerError::AlreadyActive { task_id });
            }
        }

        self.ingest(TrackerEvent::Accepted {
            accepted,
            channel_url,
        });
        Ok(())
    }

    /// User-initiated reset: closes the channel if open and clears job state
    /// synchronously. Events still in flight for the old task are ignored.
    pub fn cancel(&self) {
        self.ingest(TrackerEvent::Cancel);
    }

    /// Attaches a tracking view to the job's open channel. Idempotent with
    /// respect to connections: never opens a second channel.
    pub fn attach_view(&self, task_id: &str) -> bool {
        self.registry.attach_view(task_id)
    }

    pub fn detach_view(&self, task_id: &str) {
        self.registry.detach_view(task_id);
    }

    pub fn snapshot(&self) -> TrackerSnapshot {
        let state = self.lock_state();
        TrackerSnapshot {
            phase: state.phase(),
            job: state.job().cloned(),
            result: state.result().cloned(),
        }
    }

    /// True while a job is in a non-terminal phase.
    pub fn is_active(&self) -> bool {
        self.lock_state().is_active()
    }

    /// True when this tracker owns the given task.
    pub fn is_tracking(&self, task_id: &str) -> bool {
        self.lock_state()
            .job()
            .map(|j| j.task_id == task_id)
            .unwrap_or(false)
    }

    fn ingest(&self, event: TrackerEvent) {
        let actions = { self.lock_state().apply(event) };
        self.run_actions(actions);
    }

    fn run_actions(&self, actions: Vec<TrackerAction>) {
        for action in actions {
            match action {
                TrackerAction::Publish(event) => {
                    if event.phase == JobPhase::Failed {
                        let detail = event
                            .error
                            .clone()
                            .unwrap_or_else(|| "unknown error".to_string());
                        self.notifier
                            .error(format!("Analysis {} failed: {}", event.task_id, detail));
                    }
                    self.broadcaster.send(event);
                }
                TrackerAction::CloseChannel { task_id } => {
                    self.registry.close(&task_id);
                }
                TrackerAction::OpenChannel { task_id, url } => {
                    self.open_channel(task_id, url);
                }
            }
        }
    }

    fn open_channel(&self, task_id: String, url: String) {
        // Reopening for the same task id reuses the existing connection
        if self.registry.is_open(&task_id) {
            return;
        }

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        if !self.registry.register(&task_id, shutdown_tx) {
            return;
        }

        tokio::spawn(run_channel(
            url,
            task_id.clone(),
            self.events_tx.clone(),
            shutdown_rx,
        ));

        self.ingest(TrackerEvent::ChannelOpening { task_id });
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, Tracker> {
        match self.state.lock() {
            Ok(g) => g,
            Err(poisoned) => {
                warn!("Tracker state lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}
