pub mod api;
pub mod app;
pub mod broadcast;
pub mod config;
pub mod error;
pub mod filters;
pub mod jobs;
pub mod regions;
pub mod session;

pub use api::{
    AgentQuestion, AgentReply, AnalysisResult, ApiClient, BatchSize, DashboardSummary,
    UploadOptions, UploadOutcome,
};
pub use app::AppState;
pub use broadcast::{
    JobPhase, JobProgressBroadcaster, JobProgressEvent, Notification, NotificationBroadcaster,
    Severity,
};
pub use config::{load_config, Config};
pub use error::{
    ApiError, ChannelError, ConfigError, InvodashError, Result, SessionError, TrackerError,
};
pub use filters::{AnalyticsQuery, DashboardFilter, FilterState};
pub use jobs::{AnalysisOutcome, ChannelRegistry, JobTracker, UploadWorkflow};
pub use regions::{RegionCatalog, RegionDirectory};
pub use session::{SessionContext, SessionStore};
