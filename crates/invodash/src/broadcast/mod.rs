//! Broadcasting modules for real-time event streaming.
//!
//! This module contains the event streams the presentation layer subscribes
//! to: job progress snapshots and user-facing notifications. Receivers that
//! lag or disappear are tolerated; senders never fail because nobody is
//! listening.

pub mod job_progress;
pub mod notifier;

pub use job_progress::{JobPhase, JobProgressBroadcaster, JobProgressEvent};
pub use notifier::{Notification, NotificationBroadcaster, Severity};
