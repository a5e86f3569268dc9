//! Error types for loopia-dns
//!
//! Every failure is scoped to the record being reconciled; nothing here is
//! fatal to the process and nothing is retried.

use thiserror::Error;

/// Result type alias for loopia-dns operations
pub type Result<T> = std::result::Result<T, Error>;

/// Boxed underlying cause of a delivery failure
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Core error type for loopia-dns
#[derive(Error, Debug)]
pub enum Error {
    /// Missing or invalid credentials, endpoint or timeout
    #[error("Configuration error: {0}")]
    Config(String),

    /// A desired record failed validation before any remote call
    #[error("Invalid record: {0}")]
    InvalidRecord(String),

    /// The request could not be delivered (network, timeout, non-2xx status)
    #[error("Delivery of {method} failed")]
    Delivery {
        /// Remote method that was being called
        method: &'static str,
        /// Underlying transport error
        #[source]
        source: BoxError,
    },

    /// The remote system answered a listing with a fault instead of records
    #[error("Remote fault ({code}): {message}")]
    ProtocolFault {
        /// Fault code, 0 when the remote only returned a status string
        code: i64,
        /// Fault string or status code
        message: String,
    },

    /// A listing response could not be decoded
    #[error("Malformed response: {0}")]
    MalformedResponse(String),
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid record error
    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    /// Create a delivery error wrapping its cause
    pub fn delivery(method: &'static str, source: impl Into<BoxError>) -> Self {
        Self::Delivery {
            method,
            source: source.into(),
        }
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Returns true for transport-level failures
    pub fn is_delivery(&self) -> bool {
        matches!(self, Self::Delivery { .. })
    }
}
