//! Collaborator traits
//!
//! The core never talks to the network or computes signatures itself. A
//! [`Transport`] performs one HTTP exchange, a [`Signer`] adds the OAuth
//! parameters. Both are provided by the `drb-http` crate and mocked in tests.

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;

use crate::auth::Credentials;
use crate::endpoint::Method;
use crate::error::Result;
use crate::resolve::QueryString;

/// Payload of an outgoing request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RequestBody {
    #[default]
    Empty,
    /// `application/x-www-form-urlencoded` parameters
    Form(String),
    /// Raw upload bytes, sent as `application/octet-stream`
    Raw(Bytes),
}

/// One HTTP request, fully signed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub body: RequestBody,
    /// Response header whose value the caller wants back
    pub capture_header: Option<&'static str>,
    /// `None` means no client-side timeout
    pub timeout: Option<Duration>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            body: RequestBody::Empty,
            capture_header: None,
            timeout: None,
        }
    }

    pub fn body(mut self, body: RequestBody) -> Self {
        self.body = body;
        self
    }

    pub fn capture_header(mut self, name: &'static str) -> Self {
        self.capture_header = Some(name);
        self
    }

    /// Set the timeout in seconds, 0 meaning none
    pub fn timeout_secs(mut self, secs: u64) -> Self {
        self.timeout = (secs > 0).then(|| Duration::from_secs(secs));
        self
    }
}

/// Raw answer of the server
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Value of the captured header, if requested and present
    pub header: Option<String>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            header: None,
            body: body.into(),
        }
    }

    pub fn with_header(mut self, value: impl Into<String>) -> Self {
        self.header = Some(value.into());
        self
    }

    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

/// Performs HTTP exchanges
///
/// Failures below HTTP (DNS, TLS, connection, timeout) are reported as
/// [`crate::Error::Network`] or [`crate::Error::Timeout`]; any HTTP status,
/// including errors, is a successful exchange.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse>;
}

/// Computes OAuth 1.0 request parameters
pub trait Signer: Send + Sync {
    /// Return `params` extended with the OAuth protocol parameters and the
    /// signature, encoded as `name=value` pairs joined by `&`
    ///
    /// `url` is the request URL without query; `params` holds the already
    /// encoded request parameters.
    fn sign(
        &self,
        method: Method,
        url: &str,
        params: &QueryString,
        credentials: &Credentials,
    ) -> Result<String>;
}
