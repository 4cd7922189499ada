//! The Prepare stage: operation descriptors and request building.
//!
//! # Design
//! An `Operation` is a constant describing one REST action: its name, verb,
//! path template and the statuses it accepts. The caller's arguments go into
//! a `Params` value. `prepare_request` combines the two with the client
//! configuration into an `HttpRequest` without any I/O, so the same inputs
//! always produce the same request.

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;

use crate::config::ClientConfig;
use crate::error::PrepareError;
use crate::http::{HttpMethod, HttpRequest};

/// Everything except the RFC 3986 unreserved characters is escaped, in both
/// path segments and query values.
const ENCODED_CHARS: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

pub const API_VERSION_PARAMETER: &str = "api-version";
pub const SUBSCRIPTION_PARAMETER: &str = "subscriptionId";

/// Where the configured API version travels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVersionIn {
    /// `?api-version=...`, used by every management endpoint.
    Query,
    /// A request header, used by the blob data plane (`x-ms-version`).
    Header(&'static str),
}

/// A declarative description of one REST action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Operation {
    /// `package.Client.Method`, used to annotate errors and logs.
    pub name: &'static str,
    pub method: HttpMethod,
    pub path: &'static str,
    pub accepted: &'static [u16],
    pub api_version: ApiVersionIn,
}

impl Operation {
    pub const fn new(
        name: &'static str,
        method: HttpMethod,
        path: &'static str,
        accepted: &'static [u16],
    ) -> Self {
        Self {
            name,
            method,
            path,
            accepted,
            api_version: ApiVersionIn::Query,
        }
    }

    pub const fn with_api_version_header(mut self, header: &'static str) -> Self {
        self.api_version = ApiVersionIn::Header(header);
        self
    }

    pub fn accepts(&self, status: u16) -> bool {
        self.accepted.contains(&status)
    }
}

/// A value that may appear in a query string.
///
/// `None` and empty strings produce no parameter at all.
pub trait QueryValue {
    fn to_query(&self) -> Option<String>;
}

impl QueryValue for str {
    fn to_query(&self) -> Option<String> {
        (!self.is_empty()).then(|| self.to_string())
    }
}

impl QueryValue for String {
    fn to_query(&self) -> Option<String> {
        self.as_str().to_query()
    }
}

impl QueryValue for i32 {
    fn to_query(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl QueryValue for i64 {
    fn to_query(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl QueryValue for bool {
    fn to_query(&self) -> Option<String> {
        Some(self.to_string())
    }
}

impl<T: QueryValue + ?Sized> QueryValue for &T {
    fn to_query(&self) -> Option<String> {
        (**self).to_query()
    }
}

impl<T: QueryValue> QueryValue for Option<T> {
    fn to_query(&self) -> Option<String> {
        self.as_ref().and_then(QueryValue::to_query)
    }
}

/// Raw (unencoded) path and query arguments for one call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    path: BTreeMap<String, String>,
    query: BTreeMap<String, String>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn path(mut self, name: &str, value: impl Into<String>) -> Self {
        self.path.insert(name.to_string(), value.into());
        self
    }

    /// Adds a query parameter, or nothing when the value is absent or empty.
    pub fn query(mut self, name: &str, value: impl QueryValue) -> Self {
        if let Some(v) = value.to_query() {
            self.query.insert(name.to_string(), v);
        }
        self
    }
}

/// Builds the request for `op`. Performs no I/O.
///
/// `subscriptionId` is filled from the configuration unless the caller set
/// it, and the API version always comes from the configuration.
pub fn prepare_request<B>(
    config: &ClientConfig,
    op: &Operation,
    params: &Params,
    body: Option<&B>,
) -> Result<HttpRequest, PrepareError>
where
    B: Serialize + ?Sized,
{
    let path = expand_template(op.path, |name| {
        params
            .path
            .get(name)
            .map(String::as_str)
            .or_else(|| (name == SUBSCRIPTION_PARAMETER).then(|| config.subscription_id()))
    })?;

    let mut query = params.query.clone();
    query.remove(API_VERSION_PARAMETER);
    let mut headers = Vec::new();
    match op.api_version {
        ApiVersionIn::Query => {
            query.insert(API_VERSION_PARAMETER.to_string(), config.api_version().to_string());
        }
        ApiVersionIn::Header(name) => {
            headers.push((name.to_string(), config.api_version().to_string()));
        }
    }

    let mut url = format!("{}{}", config.base_uri(), path);
    if !query.is_empty() {
        url.push('?');
        url.push_str(&encode_query(&query));
    }
    url::Url::parse(&url).map_err(|source| PrepareError::InvalidUrl {
        url: url.clone(),
        source,
    })?;

    let body = match body {
        Some(b) => {
            let json = serde_json::to_string(b).map_err(PrepareError::Serialization)?;
            headers.push((
                "content-type".to_string(),
                "application/json; charset=utf-8".to_string(),
            ));
            Some(json)
        }
        None => None,
    };

    Ok(HttpRequest {
        method: op.method,
        url,
        headers,
        body,
    })
}

/// Substitutes every `{name}` with its percent-encoded value.
fn expand_template<'a, F>(template: &str, lookup: F) -> Result<String, PrepareError>
where
    F: Fn(&str) -> Option<&'a str>,
{
    let malformed = || PrepareError::MalformedTemplate(template.to_string());
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find(['{', '}']) {
        if rest.as_bytes()[open] == b'}' {
            return Err(malformed());
        }
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let close = after.find('}').ok_or_else(malformed)?;
        let name = &after[..close];
        if name.is_empty() || name.contains('{') {
            return Err(malformed());
        }
        let value = lookup(name).ok_or_else(|| PrepareError::MissingPathParameter(name.to_string()))?;
        out.push_str(&encode(value));
        rest = &after[close + 1..];
    }
    out.push_str(rest);
    Ok(out)
}

fn encode_query(query: &BTreeMap<String, String>) -> String {
    query
        .iter()
        .map(|(k, v)| format!("{k}={}", encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

pub(crate) fn encode(value: &str) -> String {
    utf8_percent_encode(value, ENCODED_CHARS).to_string()
}
