//! Shared HTTP client with interceptors.
//!
//! # Design
//! `HttpClient` owns the configuration and the three collaborators every
//! request needs: a `Transport`, a `TokenStore` and a `Notifier`. All of them
//! are injected, so a test can swap any one. Cloning is cheap and clones share
//! the same collaborators.

use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::auth::{FileTokenStore, MemoryTokenStore, TokenStore};
use crate::config::ClientConfig;
use crate::error::ApiError;
use crate::http::HttpRequest;
use crate::interceptor::{intercept_request, intercept_response};
use crate::notify::{LogNotifier, Notice, Notifier};
use crate::transport::{Transport, UreqTransport};

const DEFAULT_HEADERS: &[(&str, &str)] = &[("Content-Type", "application/json")];

#[derive(Clone)]
pub struct HttpClient {
    config: Arc<ClientConfig>,
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
    notifier: Arc<dyn Notifier>,
}

impl HttpClient {
    pub fn new(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        tokens: Arc<dyn TokenStore>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            transport,
            tokens,
            notifier,
        }
    }

    /// Production wiring: `ureq` transport with the configured timeout, a
    /// file-backed token store when `token_file` is set (in-memory otherwise),
    /// and the given notifier.
    pub fn from_config(config: ClientConfig, notifier: Arc<dyn Notifier>) -> Self {
        let transport = Arc::new(UreqTransport::new(config.timeout()));
        let tokens: Arc<dyn TokenStore> = match &config.token_file {
            Some(path) => Arc::new(FileTokenStore::new(path, config.token_key.clone())),
            None => Arc::new(MemoryTokenStore::new()),
        };
        Self::new(config, transport, tokens, notifier)
    }

    /// `from_config` with notices going to the log.
    pub fn with_log_notifier(config: ClientConfig) -> Self {
        Self::from_config(config, Arc::new(LogNotifier))
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn tokens(&self) -> &dyn TokenStore {
        self.tokens.as_ref()
    }

    /// Send `request` and decode the body of a 2xx response as `T`.
    ///
    /// An empty body decodes as JSON `null`, so `T = ()` accepts 204 replies.
    /// A request that fails before it is sent is reported like a lost
    /// connection.
    pub async fn request<T: DeserializeOwned>(&self, request: HttpRequest) -> Result<T, ApiError> {
        let (request, request_id) = self.prepare(request).inspect_err(|err| {
            if matches!(err, ApiError::Interceptor(_)) {
                self.notifier.notify(Notice::error(err.notice()));
            }
        })?;
        tracing::debug!(
            method = request.method.as_str(),
            url = %request.url,
            request_id = %request_id,
            "sending request"
        );
        let outcome = self.transport.execute(request).await;
        let body = intercept_response(outcome, self.notifier.as_ref())?;
        decode(&body)
    }

    /// Resolve the URL, apply default headers and run the request
    /// interceptor. Returns the outgoing request and its correlation id.
    pub fn prepare(&self, mut request: HttpRequest) -> Result<(HttpRequest, String), ApiError> {
        request.url = resolve_url(self.config.base_url(), &request.url);
        for (name, value) in DEFAULT_HEADERS {
            if request.header(name).is_none() {
                request.set_header(name, *value);
            }
        }
        let request_id = intercept_request(&mut request, self.tokens.as_ref())?;
        Ok((request, request_id))
    }
}

fn resolve_url(base: &str, url: &str) -> String {
    if url.starts_with("http://") || url.starts_with("https://") {
        url.to_string()
    } else {
        format!("{base}/{}", url.trim_start_matches('/'))
    }
}

fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let decoded = if body.trim().is_empty() {
        serde_json::from_value(serde_json::Value::Null)
    } else {
        serde_json::from_str(body)
    };
    decoded.map_err(|e| {
        tracing::error!(error = %e, "response body could not be decoded");
        ApiError::Deserialization(e.to_string())
    })
}
