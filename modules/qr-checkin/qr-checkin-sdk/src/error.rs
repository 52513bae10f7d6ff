//! QR check-in error types.
//!
//! Transport-agnostic error definitions shared by the workflow core and the
//! collaborator adapters.

use thiserror::Error;

use crate::models::SessionPhase;

/// A scanned payload that cannot be used as a lookup key.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// Payload is empty (or whitespace only).
    #[error("scanned payload is empty")]
    Empty,
}

/// Error reported by a camera/barcode engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CameraError {
    /// The engine (or the device camera) is not available.
    #[error("camera unavailable: {message}")]
    Unavailable { message: String },

    /// The engine failed while serving a call.
    #[error("camera engine failure: {message}")]
    Engine { message: String },
}

impl CameraError {
    /// Create an unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable {
            message: message.into(),
        }
    }

    /// Create an engine failure error.
    #[must_use]
    pub fn engine(message: impl Into<String>) -> Self {
        Self::Engine {
            message: message.into(),
        }
    }
}

/// Transport or protocol failure of a lookup/validate call.
///
/// Reported next to the placeholder outcome so callers can tell a transient
/// failure apart from a record that does not exist.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupFailure {
    /// Request did not complete within the configured timeout.
    #[error("lookup timed out")]
    Timeout,

    /// Connection to the lookup service could not be established.
    #[error("connection to lookup service failed: {message}")]
    Connect { message: String },

    /// Lookup service answered with a non-2xx status.
    #[error("lookup service returned HTTP {status}")]
    Status { status: u16 },

    /// Response body could not be decoded.
    #[error("malformed lookup response: {message}")]
    Malformed { message: String },

    /// Response body exceeded the configured size limit.
    #[error("lookup response too large: limit {limit} bytes, got {actual} bytes")]
    BodyTooLarge { limit: usize, actual: usize },

    /// Any other request failure (redirect loop, body read error, ...).
    #[error("lookup request failed: {message}")]
    Request { message: String },

    /// Lookup URL could not be built for the identifier.
    #[error("invalid lookup URL: {message}")]
    InvalidUrl { message: String },
}

impl LookupFailure {
    /// Create a connection error.
    #[must_use]
    pub fn connect(message: impl Into<String>) -> Self {
        Self::Connect {
            message: message.into(),
        }
    }

    /// Create a malformed response error.
    #[must_use]
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }

    /// Create a generic request error.
    #[must_use]
    pub fn request(message: impl Into<String>) -> Self {
        Self::Request {
            message: message.into(),
        }
    }

    /// Create an invalid URL error.
    #[must_use]
    pub fn invalid_url(message: impl Into<String>) -> Self {
        Self::InvalidUrl {
            message: message.into(),
        }
    }
}

/// Rejection of a workflow action requested by the presentation layer.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WorkflowError {
    /// Confirm was requested while no confirmable outcome is shown.
    #[error("confirm is not available in phase {phase}")]
    ConfirmUnavailable { phase: SessionPhase },

    /// The attempt was replaced by a newer scan request before it finished.
    #[error("attempt {attempt} was superseded by a newer scan request")]
    Superseded { attempt: u64 },
}
