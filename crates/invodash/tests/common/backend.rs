//! Mock REST backend for integration tests.

use std::collections::VecDeque;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use axum::extract::{Multipart, Path, RawQuery, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

/// Captured state of the fake backend, inspected by tests.
#[derive(Default)]
pub struct BackendState {
    /// Queue of `(status, body)` replies for the upload endpoint. The last
    /// entry is sticky once the queue drains to one element.
    pub upload_replies: Mutex<VecDeque<(u16, Value)>>,
    /// Multipart text fields of the last upload (`file` recorded by size).
    pub upload_fields: Mutex<Vec<(String, String)>>,
    /// `X-Session-ID` header of the most recent request that carried one.
    pub last_session_header: Mutex<Option<String>>,
    /// Body of the last dashboard filter request.
    pub last_dashboard_body: Mutex<Option<Value>>,
    /// Raw query string of the last analytics request.
    pub last_analytics_query: Mutex<Option<String>>,
    /// Number of region catalog fetches served.
    pub regions_hits: AtomicUsize,
}

impl BackendState {
    fn record_session(&self, headers: &HeaderMap) {
        if let Some(value) = headers.get("X-Session-ID").and_then(|v| v.to_str().ok()) {
            *self.last_session_header.lock().unwrap() = Some(value.to_string());
        }
    }
}

/// A running mock backend bound to an ephemeral port.
pub struct MockBackend {
    pub addr: SocketAddr,
    pub state: Arc<BackendState>,
}

impl MockBackend {
    pub async fn start() -> Self {
        let state = Arc::new(BackendState::default());

        let app = Router::new()
            .route("/api/v3/categorization/upload-excel", post(upload))
            .route(
                "/api/v3/regions-management/regions-countries",
                get(regions_countries),
            )
            .route("/api/v3/regions-management/regions", get(regions_list))
            .route(
                "/api/v3/regions-management/regions/:region_code/countries",
                get(region_countries),
            )
            .route(
                "/api/v3/invoice-management/dashboard/filter",
                post(dashboard_filter),
            )
            .route("/api/v3/invoice-management/sql-agent", post(invoice_agent))
            .route("/api/v3/live-incidents/analytics", get(analytics))
            .with_state(Arc::clone(&state));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { addr, state }
    }

    pub fn api_base(&self) -> String {
        format!("http://{}/api/v3", self.addr)
    }

    /// Queues one reply for the upload endpoint.
    pub fn push_upload_reply(&self, status: u16, body: Value) {
        self.state
            .upload_replies
            .lock()
            .unwrap()
            .push_back((status, body));
    }

    pub fn upload_field(&self, name: &str) -> Option<String> {
        self.state
            .upload_fields
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.clone())
    }
}

async fn upload(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> impl IntoResponse {
    state.record_session(&headers);

    let mut fields = Vec::new();
    while let Some(field) = multipart.next_field().await.unwrap() {
        let name = field.name().unwrap_or("").to_string();
        if name == "file" {
            let bytes = field.bytes().await.unwrap();
            fields.push((name, format!("{} bytes", bytes.len())));
        } else {
            let text = field.text().await.unwrap();
            fields.push((name, text));
        }
    }
    *state.upload_fields.lock().unwrap() = fields;

    let (status, body) = {
        let mut replies = state.upload_replies.lock().unwrap();
        if replies.len() > 1 {
            replies.pop_front().unwrap()
        } else {
            replies
                .front()
                .cloned()
                .unwrap_or((500, json!({"detail": "no reply configured"})))
        }
    };

    (StatusCode::from_u16(status).unwrap(), Json(body))
}

async fn regions_countries(State(state): State<Arc<BackendState>>) -> impl IntoResponse {
    state.regions_hits.fetch_add(1, Ordering::SeqCst);
    Json(json!({
        "regions": [
            {
                "regionCode": "NA",
                "regionName": "North America",
                "countries": [
                    {"countryCode": "US", "countryName": "United States"},
                    {"countryCode": "CA", "countryName": "Canada"}
                ],
                "totalCountries": 2
            },
            {
                "regionCode": "EMEA",
                "regionName": "Europe, Middle East and Africa",
                "countries": [
                    {"countryCode": "DE", "countryName": "Germany"},
                    {"countryCode": "FR", "countryName": "France"}
                ],
                "totalCountries": 2
            }
        ],
        "simpleMapping": {"NA": ["US", "CA"], "EMEA": ["DE", "FR"]},
        "totalRegions": 2,
        "totalCountries": 4
    }))
}

async fn regions_list(State(_state): State<Arc<BackendState>>) -> impl IntoResponse {
    Json(json!({
        "regions": [
            {"regionCode": "NA", "regionName": "North America", "countryCount": 2},
            {"regionCode": "EMEA", "regionName": "Europe, Middle East and Africa", "countryCount": 2}
        ],
        "totalRegions": 2
    }))
}

async fn region_countries(
    State(_state): State<Arc<BackendState>>,
    Path(region_code): Path<String>,
) -> impl IntoResponse {
    match region_code.as_str() {
        "NA" => Json(json!({
            "regionCode": "NA",
            "regionName": "North America",
            "countries": [
                {"countryCode": "US", "countryName": "United States"},
                {"countryCode": "CA", "countryName": "Canada"}
            ],
            "totalCountries": 2
        }))
        .into_response(),
        other => (
            StatusCode::NOT_FOUND,
            Json(json!({"detail": format!("Region '{}' not found", other)})),
        )
            .into_response(),
    }
}

async fn dashboard_filter(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.record_session(&headers);
    *state.last_dashboard_body.lock().unwrap() = Some(body);

    Json(json!({
        "statistics": {"totalProcessed": 120, "totalSuccess": 110, "totalFailed": 10},
        "processingTrend": {
            "labels": ["2026-07-01", "2026-07-02"],
            "success": [60, 50],
            "failed": [4, 6]
        },
        "top5Fields": {
            "header": {"fields": ["vendor"], "values": [
                {"field": "vendor", "topValues": [{"value": "Acme", "count": 12}]}
            ]},
            "lineItems": {"fields": [], "values": []},
            "taxData": {"fields": [], "values": []}
        },
        "filters": {
            "regions": ["NA", "EMEA"],
            "countries": {"NA": ["US", "CA"], "EMEA": ["DE", "FR"]},
            "vendors": ["Acme"],
            "dateRange": {"from": "2026-01-01", "to": "2026-07-31"}
        }
    }))
}

async fn invoice_agent(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> impl IntoResponse {
    state.record_session(&headers);
    let question = body["question"].as_str().unwrap_or_default().to_string();
    let session_id = body["session_id"].as_str().unwrap_or("generated").to_string();

    Json(json!({
        "question": question,
        "answer": "42 invoices",
        "sql_queries": ["SELECT COUNT(*) FROM invoice_headers"],
        "session_id": session_id
    }))
}

async fn analytics(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    RawQuery(query): RawQuery,
) -> impl IntoResponse {
    state.record_session(&headers);
    *state.last_analytics_query.lock().unwrap() = query;

    Json(json!({
        "total_incidents": 12,
        "major_incidents": 3,
        "categories": {"Change": 5, "Capacity": 7}
    }))
}
