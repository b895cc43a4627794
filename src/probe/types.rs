//! Type definitions for the probe module

use crate::domain::types::{CheckoutUrl, ErrorSummary, OrderId, RequestCount, RequestIndex};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::time::Duration;
use thiserror::Error;

/// Content type used for captured form-encoded checkout payloads
pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// An immutable capture of one checkout submission body.
///
/// Every request in a run sends exactly these bytes with exactly this content
/// type, so all N submissions carry the same session and identity context.
#[derive(Clone, Debug)]
pub struct PayloadSnapshot {
    body: Bytes,
    content_type: String,
}

impl PayloadSnapshot {
    pub fn new(body: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            content_type: content_type.into(),
        }
    }

    /// Capture a form submission as a url-encoded payload
    pub fn form(fields: &[(&str, &str)]) -> Self {
        let body = fields
            .iter()
            .map(|(name, value)| {
                format!("{}={}", urlencoding::encode(name), urlencoding::encode(value))
            })
            .collect::<Vec<_>>()
            .join("&");
        Self::new(body.into_bytes(), FORM_CONTENT_TYPE)
    }

    /// Cheap handle to the payload bytes (shared, not copied)
    pub fn body(&self) -> Bytes {
        self.body.clone()
    }

    pub fn content_type(&self) -> &str {
        &self.content_type
    }
}

/// Configuration for one probe run; built fresh per invocation, never mutated
#[derive(Clone, Debug)]
pub struct TestRunConfig {
    request_count: RequestCount,
    endpoint: CheckoutUrl,
    payload: PayloadSnapshot,
    request_timeout: Duration,
}

impl TestRunConfig {
    pub fn new(
        request_count: RequestCount,
        endpoint: CheckoutUrl,
        payload: PayloadSnapshot,
        request_timeout: Duration,
    ) -> Self {
        Self {
            request_count,
            endpoint,
            payload,
            request_timeout,
        }
    }

    pub fn request_count(&self) -> RequestCount {
        self.request_count
    }

    pub fn endpoint(&self) -> &CheckoutUrl {
        &self.endpoint
    }

    pub fn payload(&self) -> &PayloadSnapshot {
        &self.payload
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

/// Errors that can befall a single request within a run.
///
/// These never escalate: each is converted to a failed [`RequestOutcome`]
/// and the run always completes with a full result set.
#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out after {0:?}")]
    Timeout(Duration),

    #[error("unrecognized response shape: {0}")]
    Parse(String),
}

impl ProbeError {
    /// Display-capped summary for attaching to an outcome
    pub fn summary(&self) -> ErrorSummary {
        ErrorSummary::clipped(&self.to_string())
            .unwrap_or_else(|| ErrorSummary::clipped("request failed").expect("literal is valid"))
    }
}

/// The recorded fate of one dispatched request; immutable once built
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestOutcome {
    index: RequestIndex,
    success: bool,
    order_id: Option<OrderId>,
    error: Option<ErrorSummary>,
    latency: Duration,
}

impl RequestOutcome {
    pub fn success(index: RequestIndex, order_id: OrderId, latency: Duration) -> Self {
        Self {
            index,
            success: true,
            order_id: Some(order_id),
            error: None,
            latency,
        }
    }

    pub fn failure(index: RequestIndex, error: Option<ErrorSummary>, latency: Duration) -> Self {
        Self {
            index,
            success: false,
            order_id: None,
            error,
            latency,
        }
    }

    pub fn index(&self) -> RequestIndex {
        self.index
    }

    pub fn is_success(&self) -> bool {
        self.success
    }

    pub fn order_id(&self) -> Option<OrderId> {
        self.order_id
    }

    pub fn error(&self) -> Option<&ErrorSummary> {
        self.error.as_ref()
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

/// Verdict of a probe run, determined purely by how many distinct orders
/// the N submissions produced
#[derive(
    Clone, Copy, Debug, derive_more::Display, PartialEq, Eq, Serialize, Deserialize,
)]
pub enum Classification {
    /// No order was created at all
    #[display("no orders created")]
    NoOrders,
    /// Exactly one order: the target serialized the concurrent submissions
    #[display("fix working: exactly one order created")]
    FixWorking,
    /// More than one order: the race window is open
    #[display("duplicates detected: multiple orders created")]
    DuplicatesDetected,
}

/// The classified result of one probe run.
///
/// `outcomes` preserves dispatch index order regardless of completion order;
/// `unique_order_ids` is the deduplicated set the classification is derived
/// from. Never mutated after construction.
#[derive(Clone, Debug)]
pub struct TestRunResult {
    outcomes: Vec<RequestOutcome>,
    unique_order_ids: BTreeSet<OrderId>,
    classification: Classification,
}

impl TestRunResult {
    pub(crate) fn new(
        outcomes: Vec<RequestOutcome>,
        unique_order_ids: BTreeSet<OrderId>,
        classification: Classification,
    ) -> Self {
        Self {
            outcomes,
            unique_order_ids,
            classification,
        }
    }

    pub fn outcomes(&self) -> &[RequestOutcome] {
        &self.outcomes
    }

    pub fn unique_order_ids(&self) -> &BTreeSet<OrderId> {
        &self.unique_order_ids
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }
}
