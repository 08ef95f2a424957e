//! Application facade for the presentation layer.
//!
//! `AppState` wires the session context, API client, region catalog, and job
//! tracking together and exposes the command surface a webview shell binds.
//! The shell only reads snapshots, subscribes to the broadcast streams, and
//! invokes these operations; it never mutates state directly.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use log::{info, warn};
use tokio::sync::broadcast;

use crate::api::{
    AgentQuestion, AgentReply, AnalysisResult, ApiClient, DashboardSummary, UploadOptions,
};
use crate::broadcast::{
    JobProgressBroadcaster, JobProgressEvent, Notification, NotificationBroadcaster,
};
use crate::config::Config;
use crate::error::{InvodashError, Result, TrackerError};
use crate::filters::{AnalyticsQuery, DashboardFilter};
use crate::jobs::{AnalysisOutcome, ChannelRegistry, TrackerSnapshot, UploadWorkflow};
use crate::regions::{RegionCatalog, RegionDirectory};
use crate::session::{SessionContext, SessionSnapshot, SessionStore};

/// Shared application state.
pub struct AppState {
    config: Config,
    session: Arc<SessionContext>,
    api: Arc<ApiClient>,
    regions: RegionCatalog,
    registry: Arc<ChannelRegistry>,
    job_broadcaster: JobProgressBroadcaster,
    notifier: NotificationBroadcaster,
    analyses: Mutex<Vec<Arc<UploadWorkflow>>>,
}

impl AppState {
    /// Builds the application state: restores the persisted session and
    /// wires the API client, region catalog, and broadcasters.
    pub fn initialize(config: Config, config_dir: &Path) -> Result<Self> {
        let store = SessionStore::new(config_dir.join("session.json"));
        let session = Arc::new(SessionContext::restore(store));
        if session.is_authenticated() {
            info!("Restored persisted session");
        }

        let api = Arc::new(ApiClient::new(&config, Arc::clone(&session))?);
        let regions = RegionCatalog::new(
            Arc::clone(&api),
            Duration::from_secs(config.region_cache_ttl_secs),
        );

        Ok(Self {
            config,
            session,
            api,
            regions,
            registry: Arc::new(ChannelRegistry::new()),
            job_broadcaster: JobProgressBroadcaster::default(),
            notifier: NotificationBroadcaster::default(),
            analyses: Mutex::new(Vec::new()),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ─── Session ────────────────────────────────────────────────────────────

    /// Records a successful login. Auth failures surface inline to the
    /// login form, not as notifications.
    pub fn login(&self, username: &str, role: &str, session_id: &str) -> Result<()> {
        self.session.login(username, role, session_id)?;
        info!("User {} logged in", username);
        Ok(())
    }

    pub fn logout(&self) -> Result<()> {
        self.session.logout()?;
        info!("User logged out");
        Ok(())
    }

    pub fn session(&self) -> Option<SessionSnapshot> {
        self.session.current()
    }

    // ─── Read endpoints ─────────────────────────────────────────────────────

    /// Loads the filtered invoice dashboard.
    pub async fn dashboard(&self, filter: &DashboardFilter) -> Result<DashboardSummary> {
        match self.api.dashboard(filter).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                self.notifier.error(format!("Failed to load dashboard: {}", e));
                Err(e.into())
            }
        }
    }

    /// Loads the incident analytics for the given query.
    pub async fn incident_analytics(&self, query: &AnalyticsQuery) -> Result<AnalysisResult> {
        match self.api.incident_analytics(query).await {
            Ok(result) => Ok(result),
            Err(e) => {
                self.notifier
                    .error(format!("Failed to load incident analytics: {}", e));
                Err(e.into())
            }
        }
    }

    /// The region hierarchy behind the dependent dropdowns.
    pub async fn region_directory(&self) -> Result<Arc<RegionDirectory>> {
        match self.regions.directory().await {
            Ok(directory) => Ok(directory),
            Err(e) => {
                self.notifier.error(format!("Failed to load regions: {}", e));
                Err(e)
            }
        }
    }

    // ─── Agents ─────────────────────────────────────────────────────────────

    /// Asks the invoice SQL agent. A fresh conversation id is generated when
    /// none is supplied; the backend echoes the id to continue with.
    pub async fn ask_invoice_agent(
        &self,
        question: &str,
        conversation_id: Option<String>,
    ) -> Result<AgentReply> {
        let request = Self::agent_question(question, conversation_id);
        match self.api.ask_invoice_agent(&request).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                self.notifier.error(format!("Invoice agent failed: {}", e));
                Err(e.into())
            }
        }
    }

    /// Asks the incident analytics agent.
    pub async fn ask_incident_agent(
        &self,
        question: &str,
        conversation_id: Option<String>,
    ) -> Result<AgentReply> {
        let request = Self::agent_question(question, conversation_id);
        match self.api.ask_incident_agent(&request).await {
            Ok(reply) => Ok(reply),
            Err(e) => {
                self.notifier.error(format!("Incident agent failed: {}", e));
                Err(e.into())
            }
        }
    }

    fn agent_question(question: &str, conversation_id: Option<String>) -> AgentQuestion {
        AgentQuestion {
            question: question.to_string(),
            session_id: Some(
                conversation_id.unwrap_or_else(|| uuid::Uuid::new_v4().to_string()),
            ),
        }
    }

    // ─── Upload and job tracking ────────────────────────────────────────────

    /// Uploads a spreadsheet for categorization. A busy workflow instance is
    /// never reused: re-invoking while a background job is active starts an
    /// independent instance, and the existing job keeps running.
    pub async fn analyze_spreadsheet(
        &self,
        file: &Path,
        options: &UploadOptions,
    ) -> Result<AnalysisOutcome> {
        let workflow = self.available_workflow();
        match workflow.analyze(file, options).await {
            Ok(outcome) => Ok(outcome),
            Err(e) => {
                self.notifier.error(format!("Spreadsheet analysis failed: {}", e));
                Err(e)
            }
        }
    }

    /// Cancels the tracked job with the given task id.
    pub fn cancel_analysis(&self, task_id: &str) -> Result<()> {
        let workflow = {
            let analyses = self.lock_analyses();
            analyses
                .iter()
                .find(|w| w.tracker().is_tracking(task_id))
                .cloned()
        };

        match workflow {
            Some(workflow) => {
                workflow.cancel();
                Ok(())
            }
            None => {
                warn!("Cancel requested for unknown task {}", task_id);
                Err(InvodashError::Tracker(TrackerError::NotTracking {
                    task_id: task_id.to_string(),
                }))
            }
        }
    }

    /// Attaches a tracking view to a running job's channel. Never opens a
    /// second connection.
    pub fn attach_view(&self, task_id: &str) -> bool {
        self.registry.attach_view(task_id)
    }

    pub fn detach_view(&self, task_id: &str) {
        self.registry.detach_view(task_id);
    }

    /// Snapshots of all workflow instances that currently track a job.
    pub fn active_analyses(&self) -> Vec<TrackerSnapshot> {
        let analyses = self.lock_analyses();
        analyses
            .iter()
            .map(|w| w.tracker().snapshot())
            .filter(|s| s.job.is_some())
            .collect()
    }

    // ─── Subscriptions ──────────────────────────────────────────────────────

    pub fn subscribe_job_progress(&self) -> broadcast::Receiver<JobProgressEvent> {
        self.job_broadcaster.subscribe()
    }

    pub fn subscribe_notifications(&self) -> broadcast::Receiver<Notification> {
        self.notifier.subscribe()
    }

    // ─── Internal ───────────────────────────────────────────────────────────

    /// Returns an idle workflow instance, creating one when all are busy.
    fn available_workflow(&self) -> Arc<UploadWorkflow> {
        let mut analyses = self.lock_analyses();
        if let Some(idle) = analyses
            .iter()
            .find(|w| !w.is_uploading() && !w.is_tracking())
        {
            return Arc::clone(idle);
        }

        let workflow = Arc::new(UploadWorkflow::new(
            Arc::clone(&self.api),
            self.config.ws_base(),
            Arc::clone(&self.registry),
            self.job_broadcaster.clone(),
            self.notifier.clone(),
        ));
        analyses.push(Arc::clone(&workflow));
        workflow
    }

    fn lock_analyses(&self) -> std::sync::MutexGuard<'_, Vec<Arc<UploadWorkflow>>> {
        match self.analyses.lock() {
            Ok(g) => g,
            Err(poisoned) => {
                warn!("Workflow list lock was poisoned, recovering");
                poisoned.into_inner()
            }
        }
    }
}

/// Default location of the session store and config file.
pub fn default_state_dir() -> Option<PathBuf> {
    crate::config::default_config_dir()
}
