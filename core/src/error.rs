//! Error types for the user-management client.
//!
//! # Design
//! Failures are classified once, at the transport boundary, into an
//! `ApiError` variant. Everything downstream (stores, views) matches on the
//! variant instead of poking at response bodies.

use thiserror::Error;

use crate::types::ErrorEnvelope;

pub const NETWORK_ERROR_MESSAGE: &str = "network error, please check your connection";

/// Errors returned by `HttpClient` and everything built on top of it.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No response was received: connection refused, DNS failure, timeout.
    #[error("network error: {0}")]
    Network(String),

    /// The server answered with a status below 500 that is not a success.
    #[error("HTTP {status}: {message}")]
    Client { status: u16, message: String },

    /// The server answered with a 5xx status.
    #[error("HTTP {status}: {message}")]
    Server { status: u16, message: String },

    /// The request interceptor failed before anything was sent.
    #[error("request interceptor failed: {0}")]
    Interceptor(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A success response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),
}

impl ApiError {
    /// Classify a non-2xx response. The message follows the fixed status
    /// table; for 409, 422 and unlisted statuses a server-provided
    /// `error.message` takes precedence over the generic text.
    pub fn from_status(status: u16, body: &str) -> Self {
        let server_message = || ErrorEnvelope::message_from(body);
        let message = match status {
            401 => "unauthorized, please re-login".to_string(),
            403 => "access denied".to_string(),
            404 => "resource not found".to_string(),
            409 => server_message().unwrap_or_else(|| "resource conflict".to_string()),
            422 => server_message().unwrap_or_else(|| "validation failed".to_string()),
            500 => "server error".to_string(),
            _ => server_message().unwrap_or_else(|| "request failed".to_string()),
        };
        if status >= 500 {
            ApiError::Server { status, message }
        } else {
            ApiError::Client { status, message }
        }
    }

    /// Text suitable for showing to the end user.
    pub fn notice(&self) -> String {
        match self {
            ApiError::Network(_) | ApiError::Interceptor(_) => NETWORK_ERROR_MESSAGE.to_string(),
            ApiError::Client { message, .. } | ApiError::Server { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }

    /// HTTP status, when the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Client { status, .. } | ApiError::Server { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }
}

/// A transport could not produce any response.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{0}")]
pub struct TransportError(pub String);

/// Persisted token storage could not be read or written.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("token storage I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("token storage is corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
}
