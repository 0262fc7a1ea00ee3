//! Network transports.
//!
//! A transport performs one HTTP round-trip and reports every status code as
//! data. Only failures that leave the caller without a response (refused
//! connection, DNS, timeout, broken body stream) become `TransportError`.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Transport backed by a blocking `ureq` agent, driven from the blocking
/// thread pool so callers stay async.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    /// `timeout` bounds the whole request; exceeding it surfaces as a
    /// transport failure.
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

#[async_trait]
impl Transport for UreqTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let agent = self.agent.clone();
        tokio::task::spawn_blocking(move || execute_blocking(&agent, request))
            .await
            .map_err(|e| TransportError(format!("transport task failed: {e}")))?
    }
}

fn decorate<B>(
    mut builder: ureq::RequestBuilder<B>,
    query: &[(String, String)],
    headers: &[(String, String)],
) -> ureq::RequestBuilder<B> {
    for (k, v) in query {
        builder = builder.query(k, v);
    }
    for (k, v) in headers {
        builder = builder.header(k.as_str(), v.as_str());
    }
    builder
}

fn execute_blocking(agent: &ureq::Agent, req: HttpRequest) -> Result<HttpResponse, TransportError> {
    let HttpRequest {
        method,
        url,
        query,
        headers,
        body,
    } = req;

    let result = match method {
        HttpMethod::Get => decorate(agent.get(&url), &query, &headers).call(),
        HttpMethod::Delete => decorate(agent.delete(&url), &query, &headers).call(),
        HttpMethod::Post => {
            let builder = decorate(agent.post(&url), &query, &headers);
            match body {
                Some(body) => builder.send(body.as_bytes()),
                None => builder.send_empty(),
            }
        }
        HttpMethod::Put => {
            let builder = decorate(agent.put(&url), &query, &headers);
            match body {
                Some(body) => builder.send(body.as_bytes()),
                None => builder.send_empty(),
            }
        }
    };
    let mut response = result.map_err(|e| TransportError(e.to_string()))?;

    let status = response.status().as_u16();
    let headers = response
        .headers()
        .iter()
        .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
        .collect();
    let body = response
        .body_mut()
        .read_to_string()
        .map_err(|e| TransportError(e.to_string()))?;

    Ok(HttpResponse {
        status,
        headers,
        body,
    })
}
