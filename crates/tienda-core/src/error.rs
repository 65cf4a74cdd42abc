//! Error types for tienda.
//!
//! This module provides a unified error type with explicit variants for
//! transport, protocol, authentication, credential storage and input
//! validation errors.

use std::fmt;
use thiserror::Error;

/// The unified error type for tienda operations.
///
/// `Error` is `Clone` so that the outcome of a failed token refresh can be
/// handed to every request that was queued behind it.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// Network transport errors (connection, timeout, client failures).
    #[error("transport error: {0}")]
    Transport(#[from] TransportError),

    /// Authentication errors that did not come from an HTTP response.
    #[error("authentication error: {0}")]
    Auth(#[from] AuthError),

    /// Protocol errors (non-success statuses, unexpected bodies).
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// Credential store failures.
    #[error("credential store error: {0}")]
    Store(#[from] StoreError),

    /// Input validation errors.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns the HTTP status carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Protocol(e) => Some(e.status),
            _ => None,
        }
    }

    /// Returns true if this error is an authentication failure reported by the API.
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, Error::Protocol(e) if e.is_auth_error())
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out: {message}")]
    Timeout { message: String },

    /// Generic HTTP client error.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// Authentication errors raised by the client itself.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// No session is stored.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A refresh was required but no refresh token is stored.
    #[error("no refresh token stored")]
    RefreshTokenMissing,

    /// The refresh exchange ended without settling its waiters.
    #[error("session refresh aborted")]
    RefreshAborted,
}

/// Protocol-level errors from API responses.
#[derive(Debug, Clone)]
pub struct ProtocolError {
    /// HTTP status code.
    pub status: u16,
    /// Error code reported by the server (if present).
    pub error: Option<String>,
    /// Error message from the server.
    pub message: Option<String>,
}

impl fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}", self.status)?;
        if let Some(ref error) = self.error {
            write!(f, " [{}]", error)?;
        }
        if let Some(ref message) = self.message {
            write!(f, ": {}", message)?;
        }
        Ok(())
    }
}

impl std::error::Error for ProtocolError {}

impl ProtocolError {
    /// Create a new protocol error.
    pub fn new(status: u16, error: Option<String>, message: Option<String>) -> Self {
        Self {
            status,
            error,
            message,
        }
    }

    /// A successful response whose body could not be interpreted.
    pub fn unexpected_body(status: u16, reason: impl Into<String>) -> Self {
        Self::new(status, Some("InvalidResponse".to_string()), Some(reason.into()))
    }

    /// Check if this is an authentication failure (HTTP 401).
    pub fn is_auth_error(&self) -> bool {
        self.status == 401
    }
}

/// Credential store errors.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// The backing storage could not be read or written.
    #[error("storage unavailable: {message}")]
    Unavailable { message: String },

    /// The stored data could not be parsed.
    #[error("stored credentials are corrupt: {message}")]
    Corrupt { message: String },
}

/// Input validation errors.
#[derive(Debug, Clone, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// A request field failed validation.
    #[error("invalid {field}: {reason}")]
    Field { field: &'static str, reason: String },

    /// Generic invalid input.
    #[error("{message}")]
    Other { message: String },
}
