//! Common error type shared across Lorekeep crates.

use thiserror::Error;

/// Errors shared between the server and API clients.
#[derive(Debug, Error)]
pub enum Error {
    /// A request or payload failed validation.
    #[error("Validation failed: {0}")]
    Validation(String),

    /// A referenced entity does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Catch-all for protocol-level failures.
    #[error("Protocol error: {0}")]
    Protocol(String),
}

/// Result alias using the common [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let e = Error::Validation("slug too long".into());
        assert!(e.to_string().contains("slug too long"));

        let e = Error::NotFound("organization".into());
        assert!(e.to_string().contains("organization"));
    }

    #[test]
    fn test_from_serde_json() {
        let bad: std::result::Result<serde_json::Value, _> = serde_json::from_str("{");
        let e: Error = bad.unwrap_err().into();
        assert!(matches!(e, Error::Serialization(_)));
    }
}
