//! Error types for DNS-01 challenge handling
//!
//! [`Error`] is the classification produced by [`ZoneRecordApi`](crate::ZoneRecordApi)
//! implementations. [`PluginError`] is the single failure type surfaced by the
//! challenge entry points.

use thiserror::Error;

/// Result type alias for provider operations
pub type Result<T> = std::result::Result<T, Error>;

/// Provider client error classification
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// No zone managed by the provider matches the domain
    #[error("Zone not found for domain: {0}")]
    ZoneNotFound(String),

    /// No TXT record exists at the requested name
    ///
    /// This is an expected condition during the challenge workflow.
    #[error("Record not found: {0}")]
    RecordNotFound(String),

    /// The API token was rejected (HTTP 401/403)
    #[error("Not authorized: {0}")]
    NotAuthorized(String),

    /// The API answered with an unexpected status or payload shape
    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    /// Transport-level failure (connection refused, DNS failure, timeout)
    #[error("Connection error: {0}")]
    Connection(String),

    /// Invalid configuration or credentials
    #[error("Configuration error: {0}")]
    Config(String),
}

impl Error {
    /// Create a "zone not found" error
    pub fn zone_not_found(domain: impl Into<String>) -> Self {
        Self::ZoneNotFound(domain.into())
    }

    /// Create a "record not found" error
    pub fn record_not_found(name: impl Into<String>) -> Self {
        Self::RecordNotFound(name.into())
    }

    /// Create an authorization error
    pub fn not_authorized(msg: impl Into<String>) -> Self {
        Self::NotAuthorized(msg.into())
    }

    /// Create a malformed response error
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    /// Create a connection error
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::Connection(msg.into())
    }

    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Whether this error means the TXT record does not exist
    pub fn is_record_not_found(&self) -> bool {
        matches!(self, Self::RecordNotFound(_))
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Self::MalformedResponse(err.to_string())
    }
}

/// User-facing failure of a `perform` or `cleanup` call
///
/// The issuance tool treats any `PluginError` as fatal for that challenge.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{source}")]
pub struct PluginError {
    #[from]
    source: Error,
}

impl PluginError {
    /// The classified provider error that caused this failure
    pub fn cause(&self) -> &Error {
        &self.source
    }
}
