//! Request executor: performs one HTTP round-trip for a `PreparedCall`.
//!
//! # Design
//! `Transport` is the only I/O seam. `UreqTransport` is the production
//! implementation; tests substitute their own. Status interpretation never
//! happens here: the raw `HttpResponse` goes back to the core's
//! `PreparedCall::interpret`, so 4xx/5xx must come back as data rather than
//! as transport errors.

use developool_core::{ApiError, ApiResult, HttpMethod, HttpRequest, HttpResponse, PreparedCall};
use thiserror::Error;
use ureq::{Agent, RequestBuilder};

/// A request that produced no HTTP response.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error(transparent)]
    Http(#[from] ureq::Error),

    #[error("{0}")]
    Other(String),
}

/// Moves one `HttpRequest` over the wire.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// Blocking transport backed by a ureq `Agent`.
///
/// The response body is always read to the end, which hands the connection
/// back to the agent (or closes it) on every path.
#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: Agent,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn send(&self, request: &HttpRequest) -> Result<HttpResponse, TransportError> {
        let url = request.url.as_str();
        let headers = request.headers.as_slice();
        let body = request.body.as_deref().map(str::as_bytes);

        let mut response = match (request.method, body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(url), headers).call(),
            (HttpMethod::Delete, _) => with_headers(self.agent.delete(url), headers).call(),
            (HttpMethod::Post, Some(body)) => with_headers(self.agent.post(url), headers).send(body),
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), headers).send_empty(),
            (HttpMethod::Put, Some(body)) => with_headers(self.agent.put(url), headers).send(body),
            (HttpMethod::Put, None) => with_headers(self.agent.put(url), headers).send_empty(),
        }?;

        let status = response.status().as_u16();
        let response_headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_string(), value.to_string()))
            })
            .collect();
        let body = response.body_mut().read_to_string()?;

        Ok(HttpResponse {
            status,
            headers: response_headers,
            body,
        })
    }
}

fn with_headers<B>(mut builder: RequestBuilder<B>, headers: &[(String, String)]) -> RequestBuilder<B> {
    for (name, value) in headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}

/// Send `call` once and classify the outcome. Never panics and never
/// returns anything but an `ApiResult`.
pub fn execute(transport: &dyn Transport, call: &PreparedCall) -> ApiResult {
    let response = transport
        .send(&call.request)
        .map_err(|e| ApiError::TransportError(e.to_string()))?;
    call.interpret(response)
}
