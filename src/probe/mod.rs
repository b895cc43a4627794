//! Concurrent checkout probe
//!
//! The probe fans out N byte-identical checkout submissions at once, parses
//! whatever comes back, and classifies the run by how many distinct orders
//! were created. A target that serializes order creation yields exactly one;
//! a target with the race window open yields several.

pub mod aggregator;
pub mod orchestrator;
pub mod parser;
pub mod types;

pub use aggregator::classify;
pub use orchestrator::ProbeOrchestrator;
pub use parser::{ParsedResponse, ResponseParser};
pub use types::{
    Classification, PayloadSnapshot, ProbeError, RequestOutcome, TestRunConfig, TestRunResult,
};
