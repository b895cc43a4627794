//! Domain types for the checkout probe
//!
//! Newtypes for the identifiers and bounded values that cross component
//! boundaries, so validation happens once at construction instead of being
//! re-checked everywhere.

pub mod auth;
pub mod types;

pub use auth::{AdminAuth, Operator};
pub use types::*;
