//! Client core for the Azure Resource Manager REST APIs.
//!
//! # Overview
//! Every operation runs the same three-stage pipeline:
//!
//! 1. **Prepare** turns an `Operation` descriptor plus caller arguments into
//!    an `HttpRequest`. No I/O; identical inputs give identical requests.
//! 2. **Send** applies the `Authorizer` and hands the request to a
//!    `Transport` for exactly one round trip, optionally racing a
//!    `CancellationToken`.
//! 3. **Respond** checks the status against the operation's accepted set and
//!    decodes the body.
//!
//! Operations that declare constraints validate their input before Prepare.
//! List operations return one `Page` at a time; `next_results` follows the
//! page's continuation link and `*_pages` streams them all.
//!
//! # Design
//! - `ManagementClient` holds only immutable configuration and shared
//!   handles, so one client can serve concurrent calls.
//! - The stages are public on their own. Callers can inspect a prepared
//!   request or decode a response they obtained elsewhere.
//! - Every failure is an `ApiError` naming the operation plus an
//!   `ErrorKind` telling whether anything reached the network.
//! - The crate logs through `tracing` and never installs a subscriber.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod pagination;
pub mod prepare;
pub mod respond;
pub mod services;
pub mod transport;
pub mod types;
pub mod validation;

pub use client::{ManagementClient, NO_BODY};
pub use config::{ClientConfig, ConfigError};
pub use error::{ApiError, ErrorKind, PrepareError, ServiceError, TransportError, ValidationError};
pub use http::{HttpMethod, HttpRequest, HttpResponse, RawResponse};
pub use pagination::{Continuation, Page, PageResult, Paginator};
pub use prepare::{Operation, Params, prepare_request};
pub use respond::{Response, respond_empty, respond_json, respond_optional_json};
pub use tokio_util::sync::CancellationToken;
pub use transport::{Authorizer, BearerTokenAuthorizer, NoAuthorizer, ReqwestTransport, Transport};
