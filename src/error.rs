use thiserror::Error;

/// Checkout-probe application error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid operator token: {0}")]
    InvalidOperatorToken(String),

    #[error("Invalid checkout url: {0}")]
    InvalidCheckoutUrl(String),

    #[error("Invalid request count: {0}")]
    InvalidRequestCount(String),

    #[error("Checkout probe is disabled")]
    ProbeDisabled,

    #[error("Unauthorized")]
    Unauthorized,
}

pub type Result<T> = std::result::Result<T, Error>;
