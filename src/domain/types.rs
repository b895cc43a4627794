//! Newtype definitions shared across the probe, lifecycle, and admin layers

use nutype::nutype;
#[allow(unused_imports)] // These are used by nutype derive macros
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Upper bound on concurrent requests per probe run.
///
/// Counts above this are rejected at construction time to bound socket and
/// task usage.
pub const MAX_REQUEST_COUNT: u32 = 64;

/// Maximum length of a diagnostic message kept on a request outcome
pub const ERROR_SUMMARY_MAX_CHARS: usize = 80;

/// URL path segment that precedes the order id in a checkout redirect
pub const ORDER_RECEIVED_MARKER: &str = "order-received";

/// Identifier of an order created by the target commerce system
#[nutype(derive(
    Clone,
    Copy,
    Debug,
    Display,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    From,
    AsRef
))]
pub struct OrderId(u64);

/// Identifier of a host-system resource indexed by the lifecycle manager
#[nutype(derive(
    Clone,
    Copy,
    Debug,
    Display,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    From,
    AsRef
))]
pub struct ResourceId(u64);

/// Dispatch position of one request within a probe run (1..=N)
#[nutype(derive(
    Clone, Copy, Debug, Display, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, From,
    AsRef
))]
pub struct RequestIndex(u32);

/// Number of concurrent requests in one probe run
///
/// Values outside `1..=MAX_REQUEST_COUNT` are rejected rather than clamped,
/// so a misconfigured run fails loudly instead of silently doing less (or
/// far more) work than asked.
#[nutype(
    derive(Clone, Copy, Debug, Display, PartialEq, Eq, Serialize, Deserialize, TryFrom, AsRef),
    validate(predicate = |n| (1..=MAX_REQUEST_COUNT).contains(n)),
)]
pub struct RequestCount(u32);

/// Diagnostic message attached to a failed request outcome
///
/// Capped at 80 characters for display; callers truncate before construction
/// via [`ErrorSummary::clipped`].
#[nutype(
    derive(Clone, Debug, Display, PartialEq, Eq, Serialize, Deserialize, TryFrom, AsRef),
    validate(not_empty, len_char_max = 80),
)]
pub struct ErrorSummary(String);

impl ErrorSummary {
    /// Build a summary from arbitrary text: trim, cap at
    /// [`ERROR_SUMMARY_MAX_CHARS`], and return `None` if nothing is left.
    pub fn clipped(text: &str) -> Option<Self> {
        let trimmed = text.trim();
        let capped: String = trimmed.chars().take(ERROR_SUMMARY_MAX_CHARS).collect();
        Self::try_new(capped).ok()
    }
}

/// Target checkout submission endpoint
#[nutype(
    derive(Clone, Debug, Display, PartialEq, Eq, Serialize, Deserialize, TryFrom, AsRef),
    validate(predicate = |s| s.starts_with("http://") || s.starts_with("https://")),
)]
pub struct CheckoutUrl(String);

/// Bearer token that authorizes administrative operations
///
/// Deliberately has no `Display` derive so it cannot leak into logs.
#[nutype(
    derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, TryFrom, AsRef),
    validate(not_empty),
)]
pub struct OperatorToken(String);

/// Correlation id for one probe run
#[nutype(
    derive(Clone, Copy, Debug, Display, Serialize, Deserialize, TryFrom, AsRef),
    validate(predicate = |id: &Uuid| id.get_version_num() == 7),
    new_unchecked,
)]
pub struct RunId(Uuid);

impl RunId {
    /// Create a new RunId with a v7 UUID
    #[allow(unsafe_code)]
    pub fn new() -> Self {
        // Uuid::now_v7() always creates a valid v7 UUID
        unsafe { Self::new_unchecked(Uuid::now_v7()) }
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}
