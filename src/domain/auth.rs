//! Operator authorization for administrative operations
//!
//! Lifecycle and admin entry points take an [`Operator`] capability rather
//! than a raw token, so authorization is necessarily checked before any state
//! is read or mutated: the only way to obtain an `Operator` is through
//! [`AdminAuth::authorize`].

use crate::domain::types::OperatorToken;
use crate::error::{Error, Result};

/// Proof that the caller presented a valid operator token.
///
/// Not constructible outside this module.
#[derive(Debug)]
pub struct Operator {
    _priv: (),
}

/// Validates presented tokens against the configured operator token
#[derive(Clone, Debug)]
pub struct AdminAuth {
    token: OperatorToken,
}

impl AdminAuth {
    pub fn new(token: OperatorToken) -> Self {
        Self { token }
    }

    /// Check a presented bearer token and mint an [`Operator`] capability.
    ///
    /// Fails with [`Error::Unauthorized`] on any mismatch; no state has been
    /// touched at that point.
    pub fn authorize(&self, presented: &str) -> Result<Operator> {
        if presented == self.token.as_ref() {
            Ok(Operator { _priv: () })
        } else {
            Err(Error::Unauthorized)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn auth() -> AdminAuth {
        AdminAuth::new(OperatorToken::try_new("secret-token".to_string()).unwrap())
    }

    #[test]
    fn matching_token_is_authorized() {
        assert!(auth().authorize("secret-token").is_ok());
    }

    #[test]
    fn mismatched_token_is_rejected() {
        assert!(matches!(
            auth().authorize("wrong"),
            Err(Error::Unauthorized)
        ));
    }

    #[test]
    fn empty_token_is_rejected() {
        assert!(auth().authorize("").is_err());
    }
}
