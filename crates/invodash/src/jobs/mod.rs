//! Asynchronous job tracking.
//!
//! Lifecycle of a background categorization run: upload accepted, push
//! channel opened, progress streamed, completion or failure reconciled, all
//! behind a pure transition function. Transport wiring lives in `channel`,
//! state in `state`, channel bookkeeping in `registry`, orchestration in
//! `tracker` and `workflow`.

pub mod channel;
pub mod event;
pub mod registry;
pub mod state;
pub mod tracker;
pub mod workflow;

pub use event::{ChannelFrame, ProgressData, ProgressStatus, TrackerEvent};
pub use registry::ChannelRegistry;
pub use state::{AnalysisJob, Tracker, TrackerAction};
pub use tracker::{JobTracker, TrackerSnapshot};
pub use workflow::{AnalysisOutcome, UploadWorkflow};
