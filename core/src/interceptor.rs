//! Cross-cutting hooks run around every request.
//!
//! The request side attaches the bearer token and a fresh correlation id.
//! The response side unwraps successful bodies and turns everything else into
//! a classified `ApiError`, notifying the user before handing the error back.

use uuid::Uuid;

use crate::auth::TokenStore;
use crate::error::{ApiError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::notify::{Notice, Notifier};

pub const AUTHORIZATION_HEADER: &str = "Authorization";
pub const REQUEST_ID_HEADER: &str = "X-Request-ID";

/// Attach `Authorization: Bearer <token>` when a token is stored, and a new
/// `X-Request-ID` unconditionally. Returns the generated request id.
///
/// A token-store failure aborts the request; nothing is retried.
pub fn intercept_request(
    request: &mut HttpRequest,
    tokens: &dyn TokenStore,
) -> Result<String, ApiError> {
    let token = tokens.access_token().map_err(|e| {
        tracing::error!(error = %e, "request interceptor failed");
        ApiError::Interceptor(e.to_string())
    })?;
    if let Some(token) = token {
        request.set_header(AUTHORIZATION_HEADER, format!("Bearer {token}"));
    }

    let request_id = Uuid::new_v4().to_string();
    request.set_header(REQUEST_ID_HEADER, request_id.clone());
    Ok(request_id)
}

/// Unwrap a 2xx response to its body; classify and report anything else.
///
/// Failures are always returned after the notice is emitted, never swallowed.
pub fn intercept_response(
    outcome: Result<HttpResponse, TransportError>,
    notifier: &dyn Notifier,
) -> Result<String, ApiError> {
    let response = match outcome {
        Ok(response) => response,
        Err(e) => {
            tracing::error!(error = %e, "request failed without a response");
            let err = ApiError::Network(e.0);
            notifier.notify(Notice::error(err.notice()));
            return Err(err);
        }
    };

    if response.is_success() {
        if let Some(id) = response.header(REQUEST_ID_HEADER) {
            tracing::info!("[{id}] response received");
        }
        return Ok(response.body);
    }

    let err = ApiError::from_status(response.status, &response.body);
    tracing::warn!(
        status = response.status,
        request_id = response.header(REQUEST_ID_HEADER).unwrap_or("n/a"),
        "{err}"
    );
    notifier.notify(Notice::error(err.notice()));
    Err(err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryTokenStore;
    use crate::error::StorageError;
    use crate::http::HttpMethod;
    use crate::notify::{ChannelNotifier, NoticeLevel};

    struct BrokenStore;

    impl TokenStore for BrokenStore {
        fn access_token(&self) -> Result<Option<String>, StorageError> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied").into())
        }
        fn set_access_token(&self, _token: &str) -> Result<(), StorageError> {
            Ok(())
        }
        fn clear(&self) -> Result<(), StorageError> {
            Ok(())
        }
    }

    fn response(status: u16, body: &str) -> HttpResponse {
        HttpResponse {
            status,
            headers: Vec::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn bearer_header_added_when_token_present() {
        let mut req = HttpRequest::new(HttpMethod::Get, "/api/v1/users");
        intercept_request(&mut req, &MemoryTokenStore::with_token("tok-123")).unwrap();
        assert_eq!(req.header("authorization"), Some("Bearer tok-123"));
    }

    #[test]
    fn no_bearer_header_without_token() {
        let mut req = HttpRequest::new(HttpMethod::Get, "/api/v1/users");
        intercept_request(&mut req, &MemoryTokenStore::new()).unwrap();
        assert!(req.header("authorization").is_none());
    }

    #[test]
    fn request_ids_are_fresh_per_call() {
        let tokens = MemoryTokenStore::new();
        let mut ids = std::collections::HashSet::new();
        for _ in 0..50 {
            let mut req = HttpRequest::new(HttpMethod::Get, "/api/v1/users");
            let id = intercept_request(&mut req, &tokens).unwrap();
            assert!(!id.is_empty());
            assert_eq!(req.header("x-request-id"), Some(id.as_str()));
            assert!(ids.insert(id), "request id reused");
        }
    }

    #[test]
    fn storage_failure_aborts_request() {
        let mut req = HttpRequest::new(HttpMethod::Get, "/api/v1/users");
        let err = intercept_request(&mut req, &BrokenStore).unwrap_err();
        assert!(matches!(err, ApiError::Interceptor(_)));
        assert!(req.header("x-request-id").is_none());
    }

    #[test]
    fn success_returns_body_only_and_stays_silent() {
        let (notifier, mut rx) = ChannelNotifier::new();
        let body = intercept_response(Ok(response(200, r#"[{"id":1}]"#)), &notifier).unwrap();
        assert_eq!(body, r#"[{"id":1}]"#);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn http_failure_notifies_and_rejects() {
        let (notifier, mut rx) = ChannelNotifier::new();
        let err = intercept_response(
            Ok(response(409, r#"{"error":{"message":"Email already registered"}}"#)),
            &notifier,
        )
        .unwrap_err();
        assert_eq!(
            err,
            ApiError::Client {
                status: 409,
                message: "Email already registered".to_string()
            }
        );
        let notice = rx.try_recv().unwrap();
        assert_eq!(notice.level, NoticeLevel::Error);
        assert_eq!(notice.message, "Email already registered");
    }

    #[test]
    fn missing_response_is_a_network_error() {
        let (notifier, mut rx) = ChannelNotifier::new();
        let err = intercept_response(
            Err(TransportError("connection refused".to_string())),
            &notifier,
        )
        .unwrap_err();
        assert_eq!(err, ApiError::Network("connection refused".to_string()));
        assert_eq!(
            rx.try_recv().unwrap().message,
            "network error, please check your connection"
        );
    }
}
