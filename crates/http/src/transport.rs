//! reqwest transport
//!
//! Implements the Transport trait from drb-core.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;

use drb_core::{Error, HttpRequest, HttpResponse, Method, RequestBody, Result, Transport};

const USER_AGENT: &str = concat!("drb/", env!("CARGO_PKG_VERSION"));

/// HTTP transport backed by a shared reqwest client
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    inner: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self> {
        let inner = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| Error::Network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { inner })
    }

    /// Wrap an existing reqwest client
    pub fn from_client(inner: reqwest::Client) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
        };

        let mut builder = self.inner.request(method, &request.url);

        if let Some(timeout) = request.timeout {
            builder = builder.timeout(timeout);
        }

        builder = match request.body {
            RequestBody::Empty => builder,
            RequestBody::Form(form) => builder
                .header(CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(form),
            RequestBody::Raw(bytes) => builder
                .header(CONTENT_TYPE, "application/octet-stream")
                .body(bytes),
        };

        let response = builder.send().await.map_err(map_error)?;
        let status = response.status().as_u16();

        let header = request
            .capture_header
            .and_then(|name| response.headers().get(name))
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);

        let body = response.bytes().await.map_err(map_error)?;

        tracing::debug!(status, bytes = body.len(), "Response received");

        Ok(HttpResponse {
            status,
            header,
            body,
        })
    }
}

/// Map a reqwest failure onto the local error taxonomy
/// The URL carries the OAuth signature, so it never reaches the message
fn map_error(error: reqwest::Error) -> Error {
    let error = error.without_url();
    if error.is_timeout() {
        Error::Timeout
    } else if error.is_connect() || error.is_request() || error.is_body() || error.is_decode() {
        Error::Network(error.to_string())
    } else {
        Error::Unknown(error.to_string())
    }
}
