//! Domain DTOs for the user-management API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A user as returned by the API. `id` and the timestamps are assigned by the
/// server; the client never sets them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub username: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub is_active: bool,
    pub is_superuser: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request payload for creating a new user.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCreate {
    pub email: String,
    pub username: String,
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Request payload for updating an existing user. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
}

/// Offset/limit for the list endpoint. Unset fields are left to the server.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListParams {
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl ListParams {
    pub fn page(skip: u32, limit: u32) -> Self {
        Self {
            skip: Some(skip),
            limit: Some(limit),
        }
    }

    pub(crate) fn to_query(self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(skip) = self.skip {
            query.push(("skip".to_string(), skip.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query
    }
}

/// Error envelope returned by the backend on failure:
/// `{"error": {"code": ..., "message": ..., "details": ..., "request_id": ...}}`.
/// Every field is optional; servers are not trusted to fill them in.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(default)]
    pub error: Option<ErrorBody>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
    #[serde(default)]
    pub request_id: Option<String>,
}

impl ErrorEnvelope {
    /// Pull `error.message` out of a raw response body, if the body is an
    /// error envelope carrying a non-empty message.
    pub fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<ErrorEnvelope>(body)
            .ok()?
            .error?
            .message
            .filter(|m| !m.is_empty())
    }
}
