//! Checkout Probe - a race-condition test harness for checkout flows
//!
//! Fires N byte-identical checkout submissions at a target endpoint at once,
//! classifies the run by how many distinct orders were created, and manages
//! the test resources the runs leave behind.

pub mod admin;
pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod lifecycle;
pub mod probe;

pub use application::Application;
pub use error::{Error, Result};

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_basic_functionality() {
        // Basic smoke test to ensure the library compiles and basic types work
        let result: Result<()> = Ok(());
        assert!(result.is_ok());
    }
}
