//! The Send stage: authorizers and transports.
//!
//! # Design
//! A `Transport` executes one prepared request and returns the response with
//! its body fully read. It has no retry logic; a retrying transport, if
//! needed, is a wrapper implementing the same trait. An `Authorizer` adds
//! credentials to the request just before it is handed to the transport.
//! Token acquisition lives outside this crate.

use std::time::Duration;

use async_trait::async_trait;

use crate::error::TransportError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub const ENV_ACCESS_TOKEN: &str = "AZURE_ACCESS_TOKEN";

/// Adds credentials to an outgoing request.
pub trait Authorizer: Send + Sync {
    fn authorize(&self, request: &mut HttpRequest) -> Result<(), TransportError>;
}

/// Sends requests without credentials, for local endpoints and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoAuthorizer;

impl Authorizer for NoAuthorizer {
    fn authorize(&self, _request: &mut HttpRequest) -> Result<(), TransportError> {
        Ok(())
    }
}

/// Adds a fixed `Authorization: Bearer` header.
#[derive(Clone)]
pub struct BearerTokenAuthorizer {
    token: String,
}

impl BearerTokenAuthorizer {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Reads the token from `AZURE_ACCESS_TOKEN`.
    pub fn from_env() -> Option<Self> {
        std::env::var(ENV_ACCESS_TOKEN)
            .ok()
            .filter(|t| !t.trim().is_empty())
            .map(Self::new)
    }
}

impl std::fmt::Debug for BearerTokenAuthorizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BearerTokenAuthorizer")
            .field("token", &"[censored]")
            .finish()
    }
}

impl Authorizer for BearerTokenAuthorizer {
    fn authorize(&self, request: &mut HttpRequest) -> Result<(), TransportError> {
        if self.token.is_empty() {
            return Err(TransportError::Authorization("empty bearer token".to_string()));
        }
        request.set_header("authorization", format!("Bearer {}", self.token));
        Ok(())
    }
}

/// Executes exactly one HTTP round trip.
#[async_trait]
pub trait Transport: Send + Sync {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError>;
}

/// `Transport` backed by `reqwest`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Result<Self, TransportError> {
        Self::with_builder(reqwest::Client::builder())
    }

    /// A transport whose requests fail with `TransportError::Timeout` after
    /// `timeout`. There is no timeout by default.
    pub fn with_timeout(timeout: Duration) -> Result<Self, TransportError> {
        Self::with_builder(reqwest::Client::builder().timeout(timeout))
    }

    fn with_builder(builder: reqwest::ClientBuilder) -> Result<Self, TransportError> {
        let client = builder.build().map_err(|e| TransportError::Io(e.to_string()))?;
        Ok(Self { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Delete => reqwest::Method::DELETE,
            HttpMethod::Patch => reqwest::Method::PATCH,
            HttpMethod::Head => reqwest::Method::HEAD,
        };

        let mut builder = self.client.request(method, &request.url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body {
            Some(body) => builder.body(body),
            // PUT/POST without a payload still need an explicit length.
            None if matches!(request.method, HttpMethod::Put | HttpMethod::Post) => {
                builder.header(reqwest::header::CONTENT_LENGTH, "0")
            }
            None => builder,
        };

        let response = builder.send().await.map_err(classify)?;
        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(k, v)| v.to_str().ok().map(|v| (k.as_str().to_string(), v.to_string())))
            .collect();
        let body = response.bytes().await.map_err(classify)?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn classify(error: reqwest::Error) -> TransportError {
    if error.is_timeout() {
        TransportError::Timeout(error.to_string())
    } else if error.is_connect() {
        TransportError::Connect(error.to_string())
    } else {
        TransportError::Io(error.to_string())
    }
}
