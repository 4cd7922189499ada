//! The Respond stage: status validation and decoding.
//!
//! Every function here takes the `HttpResponse` by value. The body is
//! released when the function returns, on the success path and on every
//! error path alike.

use std::ops::Deref;

use bytes::Bytes;
use serde::de::DeserializeOwned;

use crate::error::{ApiError, ErrorKind, ServiceError};
use crate::http::{HttpResponse, RawResponse};
use crate::prepare::Operation;

/// Longest response body excerpt written to logs.
const MAX_LOG_BODY_LENGTH: usize = 200;

/// A decoded result together with the status and headers it arrived with.
#[derive(Debug, Clone, PartialEq)]
pub struct Response<T> {
    raw: RawResponse,
    inner: T,
}

impl<T> Response<T> {
    pub fn new(raw: RawResponse, inner: T) -> Self {
        Self { raw, inner }
    }

    pub fn raw(&self) -> &RawResponse {
        &self.raw
    }

    pub fn status(&self) -> u16 {
        self.raw.status
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.raw.header(name)
    }

    pub fn value(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }

    pub fn into_parts(self) -> (RawResponse, T) {
        (self.raw, self.inner)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Response<U> {
        Response {
            raw: self.raw,
            inner: f(self.inner),
        }
    }
}

impl<T: Default> Default for Response<T> {
    fn default() -> Self {
        Self::new(RawResponse::default(), T::default())
    }
}

impl<T> Deref for Response<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

/// Accepts the response when its status is in `op.accepted`; otherwise turns
/// it into a status error carrying the service error payload.
pub fn check_status(op: &Operation, response: HttpResponse) -> Result<(RawResponse, Bytes), ApiError> {
    let (raw, body) = response.into_parts();
    tracing::debug!(operation = op.name, status = raw.status, "received response");
    if op.accepts(raw.status) {
        return Ok((raw, body));
    }

    let text = String::from_utf8_lossy(&body).into_owned();
    tracing::warn!(
        operation = op.name,
        status = raw.status,
        request_id = raw.request_id().unwrap_or("-"),
        body = %sanitize_for_log(&text),
        "unexpected status"
    );
    Err(ApiError::new(
        op.name,
        ErrorKind::Status {
            status: raw.status,
            error: ServiceError::from_body(&body),
            body: text,
        },
    ))
}

/// Validates the status and decodes a JSON body into `T`.
pub fn respond_json<T: DeserializeOwned>(op: &Operation, response: HttpResponse) -> Result<Response<T>, ApiError> {
    let (raw, body) = check_status(op, response)?;
    let value = serde_json::from_slice(&body).map_err(|e| ApiError::new(op.name, ErrorKind::Decode(e)))?;
    Ok(Response::new(raw, value))
}

/// Like `respond_json`, but an empty body (as sent with 202 or 204) decodes
/// to `None`.
pub fn respond_optional_json<T: DeserializeOwned>(
    op: &Operation,
    response: HttpResponse,
) -> Result<Response<Option<T>>, ApiError> {
    let (raw, body) = check_status(op, response)?;
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Response::new(raw, None));
    }
    let value = serde_json::from_slice(&body).map_err(|e| ApiError::new(op.name, ErrorKind::Decode(e)))?;
    Ok(Response::new(raw, Some(value)))
}

/// Validates the status and discards the body.
pub fn respond_empty(op: &Operation, response: HttpResponse) -> Result<Response<()>, ApiError> {
    let (raw, _) = check_status(op, response)?;
    Ok(Response::new(raw, ()))
}

/// Truncates a response body and drops non-printable characters before it
/// is logged.
fn sanitize_for_log(body: &str) -> String {
    let truncated = if body.len() > MAX_LOG_BODY_LENGTH {
        let cut = (0..=MAX_LOG_BODY_LENGTH)
            .rev()
            .find(|i| body.is_char_boundary(*i))
            .unwrap_or(0);
        format!("{}... [truncated, {} bytes total]", &body[..cut], body.len())
    } else {
        body.to_string()
    };
    truncated.replace(|c: char| !c.is_ascii_graphic() && c != ' ', "")
}
