//! The management client shared by every resource family.
//!
//! # Design
//! `ManagementClient` holds the immutable configuration, the authorizer and
//! the transport behind `Arc`s, so cloning it is cheap and every resource
//! client can own a copy. It carries no per-call state.
//!
//! Each stage of the pipeline is exposed on its own so callers can inspect a
//! request before it goes out or decode a response themselves:
//!
//! - `prepare` builds the `HttpRequest` (no I/O),
//! - `send` authorizes and transmits it (one round trip, cancellable),
//! - the `respond_*` functions validate and decode the `HttpResponse`.
//!
//! `call_json`, `call_empty` and friends chain the three for the common case.

use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::config::ClientConfig;
use crate::error::{ApiError, TransportError};
use crate::http::{HttpRequest, HttpResponse};
use crate::pagination::{Continuation, PageResult, Paginator};
use crate::prepare::{Operation, Params, prepare_request};
use crate::respond::{Response, respond_empty, respond_json, respond_optional_json};
use crate::transport::{Authorizer, ReqwestTransport, Transport};

/// Placeholder for operations that send no body.
pub const NO_BODY: Option<&()> = None;

pub const CLIENT_REQUEST_ID_HEADER: &str = "x-ms-client-request-id";

#[derive(Clone)]
pub struct ManagementClient {
    config: Arc<ClientConfig>,
    authorizer: Arc<dyn Authorizer>,
    transport: Arc<dyn Transport>,
}

impl std::fmt::Debug for ManagementClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ManagementClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl ManagementClient {
    /// Creates a client sending through a default `reqwest` transport.
    pub fn new(config: ClientConfig, authorizer: impl Authorizer + 'static) -> Result<Self, TransportError> {
        Ok(Self::with_transport(config, authorizer, ReqwestTransport::new()?))
    }

    pub fn with_transport(
        config: ClientConfig,
        authorizer: impl Authorizer + 'static,
        transport: impl Transport + 'static,
    ) -> Self {
        Self {
            config: Arc::new(config),
            authorizer: Arc::new(authorizer),
            transport: Arc::new(transport),
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// A client sharing this one's authorizer and transport that sends
    /// `api_version` instead.
    pub fn with_api_version(&self, api_version: &str) -> Self {
        let config = ClientConfig::clone(&self.config).with_api_version(api_version);
        Self {
            config: Arc::new(config),
            authorizer: Arc::clone(&self.authorizer),
            transport: Arc::clone(&self.transport),
        }
    }

    /// Builds the request for `op` without sending it.
    pub fn prepare<B>(&self, op: &Operation, params: &Params, body: Option<&B>) -> Result<HttpRequest, ApiError>
    where
        B: Serialize + ?Sized,
    {
        prepare_request(&self.config, op, params, body).map_err(|e| ApiError::new(op.name, e))
    }

    /// Authorizes and transmits `request`.
    ///
    /// When `cancel` fires before the response has been read, the exchange
    /// is dropped and a cancellation error returned. A token that is already
    /// cancelled fails the call without sending anything.
    pub async fn send(
        &self,
        op: &Operation,
        mut request: HttpRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<HttpResponse, ApiError> {
        request.set_header("user-agent", self.config.user_agent());
        request.set_header(CLIENT_REQUEST_ID_HEADER, Uuid::new_v4().to_string());
        self.authorizer
            .authorize(&mut request)
            .map_err(|e| ApiError::new(op.name, e))?;

        tracing::debug!(
            operation = op.name,
            method = %request.method,
            url = %request.url,
            "sending request"
        );

        let exchange = self.transport.execute(request);
        let result = match cancel {
            Some(token) => tokio::select! {
                biased;
                _ = token.cancelled() => {
                    tracing::debug!(operation = op.name, "request cancelled");
                    Err(TransportError::Cancelled)
                }
                r = exchange => r,
            },
            None => exchange.await,
        };
        result.map_err(|e| ApiError::new(op.name, e))
    }

    /// Prepares and sends, returning the undecoded response.
    pub async fn execute<B>(
        &self,
        op: &Operation,
        params: &Params,
        body: Option<&B>,
        cancel: Option<&CancellationToken>,
    ) -> Result<HttpResponse, ApiError>
    where
        B: Serialize + ?Sized,
    {
        let request = self.prepare(op, params, body)?;
        self.send(op, request, cancel).await
    }

    pub async fn call_json<T, B>(
        &self,
        op: &Operation,
        params: &Params,
        body: Option<&B>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Response<T>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        respond_json(op, self.execute(op, params, body, cancel).await?)
    }

    pub async fn call_optional_json<T, B>(
        &self,
        op: &Operation,
        params: &Params,
        body: Option<&B>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Response<Option<T>>, ApiError>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        respond_optional_json(op, self.execute(op, params, body, cancel).await?)
    }

    pub async fn call_empty<B>(
        &self,
        op: &Operation,
        params: &Params,
        body: Option<&B>,
        cancel: Option<&CancellationToken>,
    ) -> Result<Response<()>, ApiError>
    where
        B: Serialize + ?Sized,
    {
        respond_empty(op, self.execute(op, params, body, cancel).await?)
    }

    /// Fetches the page after `last` using `op`'s accepted statuses.
    ///
    /// On a last page this sends nothing and returns an empty page whose raw
    /// status is `0`.
    pub async fn next_results<T, C>(
        &self,
        op: &Operation,
        last: &C,
        cancel: Option<&CancellationToken>,
    ) -> PageResult<T>
    where
        T: DeserializeOwned,
        C: Continuation + ?Sized,
    {
        let request = match last.next_request() {
            Ok(Some(request)) => request,
            Ok(None) => return Ok(Response::default()),
            Err(e) => return Err(ApiError::new(op.name, e)),
        };
        respond_json(op, self.send(op, request, cancel).await?)
    }

    /// Streams every page of a list operation, starting from `params`.
    pub fn pages<T>(&self, op: &'static Operation, params: Params) -> Paginator<T>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let client = self.clone();
        Paginator::new(move |link: Option<String>| {
            let client = client.clone();
            let params = params.clone();
            async move {
                match link {
                    None => client.call_json(op, &params, NO_BODY, None).await,
                    Some(link) => client.next_results(op, &NextLink(link), None).await,
                }
            }
        })
    }
}

/// A bare continuation link, as carried between pages by `pages`.
struct NextLink(String);

impl Continuation for NextLink {
    fn continuation(&self) -> Option<&str> {
        Some(self.0.as_str()).filter(|l| !l.is_empty())
    }
}
