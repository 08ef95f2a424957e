//! HTTP client for the invoice and incident backends.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use log::debug;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::config::Config;
use crate::error::ApiError;
use crate::filters::{AnalyticsQuery, DashboardFilter};
use crate::regions::{AllRegionsResponse, RegionWithCountries, RegionsListResponse};
use crate::session::SessionContext;

use super::types::{
    AgentQuestion, AgentReply, AnalysisResult, DashboardSummary, UploadOptions, UploadOutcome,
};

/// Maximum length of error bodies echoed into error values, to keep logs and
/// notifications readable.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Extracts the FastAPI `detail` message from an error body, falling back to
/// the truncated raw body.
fn extract_detail(body: &str) -> String {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(body) {
        if let Some(detail) = value.get("detail").and_then(|d| d.as_str()) {
            return detail.to_string();
        }
    }
    if body.len() > MAX_ERROR_BODY_LENGTH {
        format!("{}... (truncated)", &body[..MAX_ERROR_BODY_LENGTH])
    } else {
        body.to_string()
    }
}

/// Shared REST client. Holds one `reqwest::Client`, the configured base URL,
/// and the session context the `X-Session-ID` header is read from.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: reqwest::Url,
    session: Arc<SessionContext>,
}

impl ApiClient {
    pub fn new(config: &Config, session: Arc<SessionContext>) -> Result<Self, ApiError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        // A trailing slash makes Url::join treat the last segment as a
        // directory instead of replacing it.
        let mut base = config.api_base_url.clone();
        if !base.ends_with('/') {
            base.push('/');
        }
        let base_url = reqwest::Url::parse(&base).map_err(|e| ApiError::InvalidBaseUrl {
            url: base.clone(),
            message: e.to_string(),
        })?;

        Ok(Self {
            http,
            base_url,
            session,
        })
    }

    fn endpoint(&self, path: &str) -> Result<reqwest::Url, ApiError> {
        self.base_url.join(path).map_err(|e| ApiError::InvalidBaseUrl {
            url: path.to_string(),
            message: e.to_string(),
        })
    }

    fn with_session(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match self.session.session_id_header() {
            Some(session_id) => request.header("X-Session-ID", session_id),
            None => request,
        }
    }

    async fn execute<T: DeserializeOwned>(
        &self,
        request: reqwest::RequestBuilder,
        context: &str,
    ) -> Result<T, ApiError> {
        let response = self.with_session(request).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            return Err(ApiError::Status {
                status: status.as_u16(),
                detail: extract_detail(&body),
            });
        }

        serde_json::from_str(&body).map_err(|e| ApiError::MalformedResponse {
            context: context.to_string(),
            source: e,
        })
    }

    async fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!("POST {}", url);
        self.execute(self.http.post(url).json(body), path).await
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.endpoint(path)?;
        debug!("GET {}", url);
        self.execute(self.http.get(url).query(query), path).await
    }

    // ─── Endpoints ──────────────────────────────────────────────────────────

    /// `POST /invoice-management/dashboard/filter`
    pub async fn dashboard(&self, filter: &DashboardFilter) -> Result<DashboardSummary, ApiError> {
        self.post_json("invoice-management/dashboard/filter", &filter.to_body())
            .await
    }

    /// `GET /live-incidents/analytics`
    pub async fn incident_analytics(
        &self,
        query: &AnalyticsQuery,
    ) -> Result<AnalysisResult, ApiError> {
        self.get_json("live-incidents/analytics", &query.query_pairs())
            .await
    }

    /// `GET /regions-management/regions-countries`
    pub async fn regions_countries(&self) -> Result<AllRegionsResponse, ApiError> {
        self.get_json("regions-management/regions-countries", &[])
            .await
    }

    /// `GET /regions-management/regions`
    pub async fn regions(&self) -> Result<RegionsListResponse, ApiError> {
        self.get_json("regions-management/regions", &[]).await
    }

    /// `GET /regions-management/regions/{region_code}/countries`
    pub async fn region_countries(
        &self,
        region_code: &str,
    ) -> Result<RegionWithCountries, ApiError> {
        self.get_json(
            &format!("regions-management/regions/{}/countries", region_code),
            &[],
        )
        .await
    }

    /// `POST /invoice-management/sql-agent`
    pub async fn ask_invoice_agent(&self, question: &AgentQuestion) -> Result<AgentReply, ApiError> {
        self.post_json("invoice-management/sql-agent", question).await
    }

    /// `POST /incident-analytics-agent/query`
    pub async fn ask_incident_agent(
        &self,
        question: &AgentQuestion,
    ) -> Result<AgentReply, ApiError> {
        self.post_json("incident-analytics-agent/query", question)
            .await
    }

    /// `POST /categorization/upload-excel` (multipart).
    ///
    /// Returns either the complete result or the async acceptance; the
    /// caller decides whether a job gets tracked.
    pub async fn upload_spreadsheet(
        &self,
        file: &Path,
        options: &UploadOptions,
    ) -> Result<UploadOutcome, ApiError> {
        let bytes = tokio::fs::read(file).await.map_err(|e| ApiError::FileRead {
            path: file.to_path_buf(),
            source: e,
        })?;

        let filename = file
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "upload.xlsx".to_string());

        let mime = match file.extension().and_then(|e| e.to_str()) {
            Some("xlsx") => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            Some("xls") => "application/vnd.ms-excel",
            Some("csv") => "text/csv",
            _ => "application/octet-stream",
        };

        let part = Part::bytes(bytes).file_name(filename).mime_str(mime)?;
        let mut form = Form::new()
            .part("file", part)
            .text("batch_size", options.batch_size.as_u32().to_string());
        if options.async_mode {
            form = form.text("async_mode", "true");
        }

        let url = self.endpoint("categorization/upload-excel")?;
        debug!("POST {} (multipart, batch_size={})", url, options.batch_size.as_u32());

        let value: serde_json::Value = self
            .execute(self.http.post(url).multipart(form), "categorization/upload-excel")
            .await?;

        UploadOutcome::from_value(value).map_err(|e| ApiError::MalformedResponse {
            context: "categorization/upload-excel".to_string(),
            source: e,
        })
    }
}
