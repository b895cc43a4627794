//! Test orchestrator: fan-out of N identical checkout submissions
//!
//! All N requests are spawned onto a `JoinSet` back to back with no
//! intentional staggering, so as many as possible land inside the target's
//! race window between its precondition check and order creation. The run
//! suspends at the join-all barrier and returns only once every outcome is
//! known; no request is retried and no request can cancel or delay a
//! sibling.

use crate::domain::types::{ErrorSummary, RequestIndex, RunId};
use crate::probe::aggregator;
use crate::probe::parser::{order_id_from_url, ParsedResponse, ResponseParser};
use crate::probe::types::{
    PayloadSnapshot, ProbeError, RequestOutcome, TestRunConfig, TestRunResult,
};
use bytes::Bytes;
use http::{header, HeaderMap, Method, Request, StatusCode};
use http_body_util::{BodyExt, Full};
use hyper_util::client::legacy::{connect::HttpConnector, Client};
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

/// Dispatches probe runs against the checkout endpoint
#[derive(Clone)]
pub struct ProbeOrchestrator {
    client: Client<HttpConnector, Full<Bytes>>,
    parser: ResponseParser,
}

impl ProbeOrchestrator {
    pub fn new() -> Self {
        let client =
            hyper_util::client::legacy::Client::builder(hyper_util::rt::TokioExecutor::new())
                .build_http();

        Self {
            client,
            parser: ResponseParser::new(),
        }
    }

    /// Fire one probe run and classify it.
    ///
    /// Always returns a full result set: per-request failures (network,
    /// timeout, unparseable response, even a panicked task) are recorded as
    /// failed outcomes in dispatch order, never propagated.
    #[instrument(
        skip_all,
        fields(run_id = %RunId::new(), requests = %config.request_count(), endpoint = %config.endpoint())
    )]
    pub async fn run(&self, config: &TestRunConfig) -> TestRunResult {
        let n = config.request_count().into_inner() as usize;
        let mut tasks = JoinSet::new();

        for index in 1..=n as u32 {
            let client = self.client.clone();
            let parser = self.parser.clone();
            let endpoint = config.endpoint().clone().into_inner();
            let payload = config.payload().clone();
            let timeout = config.request_timeout();

            tasks.spawn(async move {
                dispatch(
                    client,
                    parser,
                    RequestIndex::from(index),
                    endpoint,
                    payload,
                    timeout,
                )
                .await
            });
        }

        // Join-all barrier: every request finishes (one way or another)
        // before classification. Each task owns its outcome slot.
        let mut slots: Vec<Option<RequestOutcome>> = vec![None; n];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(outcome) => {
                    let slot = outcome.index().into_inner() as usize - 1;
                    slots[slot] = Some(outcome);
                }
                Err(join_error) => {
                    warn!(%join_error, "request task did not complete");
                }
            }
        }

        let outcomes = slots
            .into_iter()
            .enumerate()
            .map(|(i, slot)| {
                slot.unwrap_or_else(|| {
                    RequestOutcome::failure(
                        RequestIndex::from(i as u32 + 1),
                        ErrorSummary::clipped("request task did not complete"),
                        Duration::ZERO,
                    )
                })
            })
            .collect();

        let result = aggregator::classify(outcomes);
        info!(
            classification = %result.classification(),
            unique_orders = result.unique_order_ids().len(),
            "probe run complete"
        );
        result
    }
}

impl Default for ProbeOrchestrator {
    fn default() -> Self {
        Self::new()
    }
}

/// Send one request and record its outcome. Infallible by construction.
async fn dispatch(
    client: Client<HttpConnector, Full<Bytes>>,
    parser: ResponseParser,
    index: RequestIndex,
    endpoint: String,
    payload: PayloadSnapshot,
    timeout: Duration,
) -> RequestOutcome {
    let start = Instant::now();
    let outcome = match send(client, &endpoint, &payload, timeout).await {
        Ok((status, headers, body)) => {
            interpret(&parser, index, status, &headers, &body, start.elapsed())
        }
        Err(error) => {
            debug!(index = %index, %error, "request failed");
            RequestOutcome::failure(index, Some(error.summary()), start.elapsed())
        }
    };
    debug!(
        index = %index,
        success = outcome.is_success(),
        order_id = ?outcome.order_id(),
        "request outcome recorded"
    );
    outcome
}

/// Issue the submission and collect the response under a single deadline
/// covering both connection and body collection
async fn send(
    client: Client<HttpConnector, Full<Bytes>>,
    endpoint: &str,
    payload: &PayloadSnapshot,
    timeout: Duration,
) -> Result<(StatusCode, HeaderMap, Bytes), ProbeError> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(endpoint)
        .header(header::CONTENT_TYPE, payload.content_type())
        .body(Full::new(payload.body()))
        .map_err(|e| ProbeError::Network(e.to_string()))?;

    let exchange = async {
        let response = client
            .request(request)
            .await
            .map_err(|e| ProbeError::Network(e.to_string()))?;
        let (parts, body) = response.into_parts();
        let collected = body
            .collect()
            .await
            .map_err(|e| ProbeError::Network(e.to_string()))?;
        Ok((parts.status, parts.headers, collected.to_bytes()))
    };

    tokio::time::timeout(timeout, exchange)
        .await
        .map_err(|_| ProbeError::Timeout(timeout))?
}

/// Turn a parsed response into an outcome, exhaustively by shape
fn interpret(
    parser: &ResponseParser,
    index: RequestIndex,
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
    latency: Duration,
) -> RequestOutcome {
    match parser.parse(status, headers, body) {
        ParsedResponse::StructuredSuccess { order_id } => {
            RequestOutcome::success(index, order_id, latency)
        }
        ParsedResponse::RedirectSuccess { url } => match order_id_from_url(&url) {
            Some(order_id) => RequestOutcome::success(index, order_id, latency),
            None => {
                let error = ProbeError::Parse(format!("redirect target has no order id: {url}"));
                RequestOutcome::failure(index, Some(error.summary()), latency)
            }
        },
        ParsedResponse::Failure { message } => RequestOutcome::failure(index, message, latency),
    }
}
