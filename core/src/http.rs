//! HTTP request and response values passed between pipeline stages.
//!
//! # Design
//! Requests and responses are plain data. Prepare produces an `HttpRequest`
//! without touching the network, a `Transport` turns it into an
//! `HttpResponse`, and Respond consumes that response by value. Passing the
//! response by value is what guarantees the body is released exactly once:
//! whichever branch Respond takes, the body is dropped when it returns.

use std::fmt;

use bytes::Bytes;

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Put,
    Post,
    Delete,
    Patch,
    Head,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Head => "HEAD",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An HTTP request described as plain data.
///
/// Built by the Prepare stage. Owned by the call that built it and consumed
/// when it is sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    /// Returns the first header value with the given name (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Replaces any existing header with the same name.
    pub fn set_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((name.to_string(), value.into()));
    }
}

/// An HTTP response as returned by a `Transport`.
///
/// The body is fully read before the transport returns. It is consumed by
/// the Respond stage.
#[derive(Debug)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Bytes,
}

impl HttpResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// Splits off the status and headers, handing back the body separately.
    pub fn into_parts(self) -> (RawResponse, Bytes) {
        (
            RawResponse {
                status: self.status,
                headers: self.headers,
            },
            self.body,
        )
    }
}

/// Status and headers of a response, attached to every decoded result.
///
/// A status of `0` means no request was sent, which is what a `next_results`
/// call on an exhausted page returns.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
}

impl RawResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        find_header(&self.headers, name)
    }

    /// The service-generated request id, when the service sent one.
    pub fn request_id(&self) -> Option<&str> {
        self.header("x-ms-request-id")
    }
}

fn find_header<'a>(headers: &'a [(String, String)], name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(k, _)| k.eq_ignore_ascii_case(name))
        .map(|(_, v)| v.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_lookup_is_case_insensitive() {
        let raw = RawResponse {
            status: 200,
            headers: vec![("X-Ms-Request-Id".to_string(), "abc".to_string())],
        };
        assert_eq!(raw.request_id(), Some("abc"));
        assert_eq!(raw.header("x-ms-request-id"), Some("abc"));
        assert_eq!(raw.header("missing"), None);
    }

    #[test]
    fn set_header_replaces_existing_value() {
        let mut req = HttpRequest {
            method: HttpMethod::Get,
            url: "https://example.test/".to_string(),
            headers: vec![("user-agent".to_string(), "old".to_string())],
            body: None,
        };
        req.set_header("User-Agent", "new");
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.header("user-agent"), Some("new"));
    }

    #[test]
    fn into_parts_keeps_status_and_headers() {
        let resp = HttpResponse {
            status: 201,
            headers: vec![("x-ms-snapshot".to_string(), "t".to_string())],
            body: Bytes::from_static(b"{}"),
        };
        let (raw, body) = resp.into_parts();
        assert_eq!(raw.status, 201);
        assert_eq!(raw.header("x-ms-snapshot"), Some("t"));
        assert_eq!(&body[..], b"{}");
    }
}
