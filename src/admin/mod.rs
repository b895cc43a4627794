//! Administrative RPC surface
//!
//! Thin axum layer over the lifecycle manager and the probe orchestrator:
//! list tagged test orders, bulk-delete them, and trigger a probe run. Every
//! route except `/health` requires the operator bearer token; an
//! unauthorized call is answered with a structured failure before any state
//! is touched, and never affects in-flight or future runs.

use crate::config::ProbeSettings;
use crate::domain::auth::{AdminAuth, Operator};
use crate::domain::types::{
    CheckoutUrl, OrderId, RequestCount, ResourceId, RunId,
};
use crate::lifecycle::LifecycleManager;
use crate::probe::{
    Classification, PayloadSnapshot, ProbeOrchestrator, RequestOutcome, TestRunConfig,
};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;
use tracing::warn;

/// How many resource ids a listing response carries before truncating
pub const LIST_PREVIEW_LIMIT: usize = 20;

/// Authorization header prefix for bearer tokens
const BEARER_PREFIX: &str = "Bearer ";

/// Shared state behind the admin routes
#[derive(Clone)]
pub struct AdminState {
    pub auth: Arc<AdminAuth>,
    pub lifecycle: Arc<LifecycleManager>,
    pub orchestrator: Arc<ProbeOrchestrator>,
    pub probe: ProbeSettings,
}

/// Build the admin router
pub fn router(state: AdminState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(
            "/admin/test-orders",
            get(list_test_orders).delete(delete_test_orders),
        )
        .route("/admin/probe/run", post(run_probe))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Debug, Serialize)]
struct TaggedResourcesResponse {
    count: usize,
    ids: Vec<ResourceId>,
    truncated: bool,
}

#[derive(Debug, Serialize)]
struct DeleteAllResponse {
    success: bool,
    deleted: usize,
    message: String,
}

#[derive(Debug, Serialize)]
struct AdminFailure {
    success: bool,
    error: String,
}

#[derive(Debug, Default, Deserialize)]
struct ProbeRunRequest {
    /// Overrides the configured request count for this run
    request_count: Option<u32>,
    /// Captured checkout submission body; defaults to an empty form
    payload: Option<String>,
}

#[derive(Debug, Serialize)]
struct ProbeReport {
    run_id: RunId,
    classification: Classification,
    fix_enabled: bool,
    unique_order_ids: Vec<OrderId>,
    outcomes: Vec<OutcomeReport>,
}

#[derive(Debug, Serialize)]
struct OutcomeReport {
    index: u32,
    success: bool,
    order_id: Option<OrderId>,
    error: Option<String>,
    latency_ms: u64,
}

impl From<&RequestOutcome> for OutcomeReport {
    fn from(outcome: &RequestOutcome) -> Self {
        Self {
            index: outcome.index().into_inner(),
            success: outcome.is_success(),
            order_id: outcome.order_id(),
            error: outcome.error().map(|e| e.clone().into_inner()),
            latency_ms: outcome.latency().as_millis() as u64,
        }
    }
}

async fn health() -> &'static str {
    "OK"
}

async fn list_test_orders(State(state): State<AdminState>, headers: HeaderMap) -> Response {
    let op = match authorize(&state, &headers) {
        Ok(op) => op,
        Err(response) => return response,
    };

    let ids = state.lifecycle.list_tagged(&op);
    let count = ids.len();
    let truncated = count > LIST_PREVIEW_LIMIT;
    let ids = ids.into_iter().take(LIST_PREVIEW_LIMIT).collect();

    Json(TaggedResourcesResponse {
        count,
        ids,
        truncated,
    })
    .into_response()
}

async fn delete_test_orders(State(state): State<AdminState>, headers: HeaderMap) -> Response {
    let op = match authorize(&state, &headers) {
        Ok(op) => op,
        Err(response) => return response,
    };

    let report = state.lifecycle.delete_all(&op).await;
    Json(DeleteAllResponse {
        success: true,
        deleted: report.deleted,
        message: format!("removed {} test orders", report.deleted),
    })
    .into_response()
}

async fn run_probe(
    State(state): State<AdminState>,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    let _op = match authorize(&state, &headers) {
        Ok(op) => op,
        Err(response) => return response,
    };

    if !state.probe.enabled {
        return failure(StatusCode::CONFLICT, "checkout probe is disabled");
    }

    // An empty body means "run with the configured defaults"
    let request: ProbeRunRequest = if body.is_empty() {
        ProbeRunRequest::default()
    } else {
        match serde_json::from_slice(&body) {
            Ok(request) => request,
            Err(error) => {
                return failure(
                    StatusCode::BAD_REQUEST,
                    &format!("malformed run request: {error}"),
                )
            }
        }
    };

    let count = request.request_count.unwrap_or(state.probe.request_count);
    let count = match RequestCount::try_new(count) {
        Ok(count) => count,
        Err(error) => {
            return failure(
                StatusCode::BAD_REQUEST,
                &format!("invalid request count: {error}"),
            )
        }
    };

    let endpoint = match CheckoutUrl::try_new(state.probe.checkout_url.clone()) {
        Ok(endpoint) => endpoint,
        Err(error) => {
            return failure(
                StatusCode::INTERNAL_SERVER_ERROR,
                &format!("invalid checkout url: {error}"),
            )
        }
    };

    let payload = match request.payload {
        Some(body) => PayloadSnapshot::new(body.into_bytes(), crate::probe::types::FORM_CONTENT_TYPE),
        None => PayloadSnapshot::form(&[]),
    };

    let config = TestRunConfig::new(
        count,
        endpoint,
        payload,
        Duration::from_secs(state.probe.request_timeout_secs),
    );

    let result = state.orchestrator.run(&config).await;
    let report = ProbeReport {
        run_id: RunId::new(),
        classification: result.classification(),
        fix_enabled: state.probe.fix_enabled,
        unique_order_ids: result.unique_order_ids().iter().copied().collect(),
        outcomes: result.outcomes().iter().map(OutcomeReport::from).collect(),
    };

    Json(report).into_response()
}

/// Check the bearer token before touching any state
fn authorize(state: &AdminState, headers: &HeaderMap) -> Result<Operator, Response> {
    let presented = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER_PREFIX))
        .map(str::trim)
        .unwrap_or("");

    state.auth.authorize(presented).map_err(|_| {
        warn!("rejected admin call with missing or invalid operator token");
        failure(StatusCode::UNAUTHORIZED, "unauthorized operator token")
    })
}

fn failure(status: StatusCode, error: &str) -> Response {
    (
        status,
        Json(AdminFailure {
            success: false,
            error: error.to_string(),
        }),
    )
        .into_response()
}
