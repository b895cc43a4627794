//! Response parser for checkout submission replies
//!
//! The target endpoint answers in more than one shape: a structured JSON
//! body carrying an explicit order id, a WooCommerce-style success envelope
//! whose `redirect` URL embeds the id, or a plain HTTP redirect. Parsing is
//! best-effort and never fails; anything unrecognized becomes a [`Failure`]
//! with an optional display-capped diagnostic.
//!
//! [`Failure`]: ParsedResponse::Failure

use crate::domain::types::{ErrorSummary, OrderId, ORDER_RECEIVED_MARKER};
use http::{header, HeaderMap, StatusCode};
use regex::Regex;
use serde_json::Value;

/// Tagged result of parsing one raw response, consumed by exhaustive matching
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedResponse {
    /// A structured success body with an explicit order-id field
    StructuredSuccess { order_id: OrderId },
    /// A redirect (header or JSON field) whose URL may embed the order id
    RedirectSuccess { url: String },
    /// Anything else, with a markup-stripped diagnostic when one was present
    Failure { message: Option<ErrorSummary> },
}

impl ParsedResponse {
    /// The order id this response yields, if any
    pub fn order_id(&self) -> Option<OrderId> {
        match self {
            Self::StructuredSuccess { order_id } => Some(*order_id),
            Self::RedirectSuccess { url } => order_id_from_url(url),
            Self::Failure { .. } => None,
        }
    }
}

/// Best-effort extractor for order ids and diagnostics
#[derive(Clone, Debug)]
pub struct ResponseParser {
    markup: Regex,
}

impl ResponseParser {
    pub fn new() -> Self {
        Self {
            // Matches HTML/XML tags for stripping from diagnostic text
            markup: Regex::new(r"<[^>]*>").expect("tag pattern is a valid regex"),
        }
    }

    /// Parse one raw response into a tagged result. Never fails.
    pub fn parse(&self, status: StatusCode, headers: &HeaderMap, body: &[u8]) -> ParsedResponse {
        if status.is_redirection() {
            if let Some(location) = headers
                .get(header::LOCATION)
                .and_then(|value| value.to_str().ok())
            {
                return ParsedResponse::RedirectSuccess {
                    url: location.to_string(),
                };
            }
        }

        let Ok(value) = serde_json::from_slice::<Value>(body) else {
            return ParsedResponse::Failure { message: None };
        };

        if let Some(order_id) = explicit_order_id(&value) {
            return ParsedResponse::StructuredSuccess { order_id };
        }

        let failed = value.get("result").and_then(Value::as_str) == Some("failure");
        if !failed {
            if let Some(url) = value.get("redirect").and_then(Value::as_str) {
                return ParsedResponse::RedirectSuccess {
                    url: url.to_string(),
                };
            }
        }

        ParsedResponse::Failure {
            message: self.diagnostic(&value),
        }
    }

    /// Pull a human-readable message out of a failure body, markup stripped
    /// and capped for display
    fn diagnostic(&self, value: &Value) -> Option<ErrorSummary> {
        let raw = ["messages", "message", "error"]
            .iter()
            .find_map(|field| value.get(field).and_then(Value::as_str))?;
        let stripped = self.markup.replace_all(raw, " ");
        let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
        ErrorSummary::clipped(&collapsed)
    }
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Look for an explicit order-id field in a structured success body
fn explicit_order_id(value: &Value) -> Option<OrderId> {
    let field = value.get("order_id").or_else(|| value.get("order-id"))?;
    let id = match field {
        Value::Number(n) => n.as_u64()?,
        Value::String(s) => s.trim().parse().ok()?,
        _ => return None,
    };
    Some(OrderId::from(id))
}

/// Extract the order id from a checkout redirect URL.
///
/// The id is the path segment immediately after the `order-received` marker,
/// e.g. `https://shop.test/checkout/order-received/123/?key=wc_abc`.
pub fn order_id_from_url(url: &str) -> Option<OrderId> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let mut segments = path.split('/').filter(|segment| !segment.is_empty());
    segments
        .by_ref()
        .find(|segment| *segment == ORDER_RECEIVED_MARKER)?;
    let id = segments.next()?.parse::<u64>().ok()?;
    Some(OrderId::from(id))
}
