//! Connection registry for push channels.
//!
//! One open channel per task id, owned by the tracker. Tracking views attach
//! and detach by reference count; attaching to an already-open channel never
//! creates a second connection, and detaching the last view does not close
//! it, since tracking continues in the background until a terminal event.

use std::collections::HashMap;
use std::sync::Mutex;

use log::{debug, warn};
use tokio::sync::oneshot;

struct ChannelEntry {
    shutdown: Option<oneshot::Sender<()>>,
    viewers: usize,
}

/// Registry of open push channels keyed by task id.
#[derive(Default)]
pub struct ChannelRegistry {
    channels: Mutex<HashMap<String, ChannelEntry>>,
}

impl ChannelRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a newly opened channel. Returns false (and drops the
    /// shutdown handle) when a channel for the task id is already open.
    pub fn register(&self, task_id: &str, shutdown: oneshot::Sender<()>) -> bool {
        let mut channels = self.lock();
        if channels.contains_key(task_id) {
            warn!("Channel for task {} already registered", task_id);
            return false;
        }
        channels.insert(
            task_id.to_string(),
            ChannelEntry {
                shutdown: Some(shutdown),
                viewers: 0,
            },
        );
        true
    }

    /// Attaches a tracking view to an open channel. Returns whether a
    /// channel for the task id exists; it is never duplicated.
    pub fn attach_view(&self, task_id: &str) -> bool {
        let mut channels = self.lock();
        match channels.get_mut(task_id) {
            Some(entry) => {
                entry.viewers += 1;
                debug!("View attached to task {} ({} viewers)", task_id, entry.viewers);
                true
            }
            None => false,
        }
    }

    /// Detaches a tracking view. The channel stays open for background
    /// tracking.
    pub fn detach_view(&self, task_id: &str) {
        let mut channels = self.lock();
        if let Some(entry) = channels.get_mut(task_id) {
            entry.viewers = entry.viewers.saturating_sub(1);
            debug!("View detached from task {} ({} viewers)", task_id, entry.viewers);
        }
    }

    /// Closes and forgets the channel for a task id. Best effort: the
    /// shutdown signal is not acknowledged.
    pub fn close(&self, task_id: &str) {
        let entry = self.lock().remove(task_id);
        if let Some(mut entry) = entry {
            if let Some(shutdown) = entry.shutdown.take() {
                // The channel task may already have ended on its own
                let _ = shutdown.send(());
            }
            debug!("Channel for task {} closed", task_id);
        }
    }

    pub fn is_open(&self, task_id: &str) -> bool {
        self.lock().contains_key(task_id)
    }

    pub fn viewers(&self, task_id: &str) -> usize {
        self.lock().get(task_id).map(|e| e.viewers).unwrap_or(0)
    }

    /// Number of open channels, across all task ids.
    pub fn connection_count(&self) -> usize {
        self.lock().len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, ChannelEntry>> {
        match self.channels.lock() {
            Ok(g) => g,
            Err(poisoned) => {
                warn!("Channel registry lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}
