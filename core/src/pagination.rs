//! Continuation-link pagination for list operations.
//!
//! # Design
//! A list response is a `Page`: the items of one page plus an optional
//! `nextLink`. The link is opaque; fetching the next page is a GET against
//! exactly that URL, never a request rebuilt from the original parameters.
//! Anything that carries a link implements `Continuation`, which is all a
//! client needs to produce the follow-up request.
//!
//! `Paginator` drives the loop for callers who want every page: it yields
//! pages in server order and ends after the first page without a link, or
//! after the first error.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::stream::{self, BoxStream, Stream, StreamExt};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, PrepareError};
use crate::http::{HttpMethod, HttpRequest};
use crate::respond::Response;

/// One page of a list operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    #[serde(default = "Vec::new")]
    pub value: Vec<T>,
    #[serde(rename = "nextLink", default, skip_serializing_if = "Option::is_none")]
    pub next_link: Option<String>,
}

impl<T> Default for Page<T> {
    fn default() -> Self {
        Self {
            value: Vec::new(),
            next_link: None,
        }
    }
}

impl<T> Page<T> {
    pub fn is_last(&self) -> bool {
        self.continuation().is_none()
    }
}

/// Something that may point at a further page of results.
pub trait Continuation {
    /// The continuation link, or `None` when this is the last page. An empty
    /// link counts as no link.
    fn continuation(&self) -> Option<&str>;

    /// The request that fetches the next page, or `None` on the last page.
    fn next_request(&self) -> Result<Option<HttpRequest>, PrepareError> {
        let Some(link) = self.continuation() else {
            return Ok(None);
        };
        url::Url::parse(link).map_err(|source| PrepareError::InvalidUrl {
            url: link.to_string(),
            source,
        })?;
        Ok(Some(HttpRequest {
            method: HttpMethod::Get,
            url: link.to_string(),
            headers: Vec::new(),
            body: None,
        }))
    }
}

impl<T> Continuation for Page<T> {
    fn continuation(&self) -> Option<&str> {
        self.next_link.as_deref().filter(|l| !l.is_empty())
    }
}

impl<P: Continuation> Continuation for Response<P> {
    fn continuation(&self) -> Option<&str> {
        self.value().continuation()
    }
}

pub type PageResult<T> = Result<Response<Page<T>>, ApiError>;

enum State {
    First,
    Next(String),
    Done,
}

/// A stream of successive pages of one list operation.
pub struct Paginator<T> {
    stream: BoxStream<'static, PageResult<T>>,
}

impl<T: Send + 'static> Paginator<T> {
    /// `fetch(None)` must return the first page and `fetch(Some(link))` the
    /// page behind `link`.
    pub fn new<F, Fut>(fetch: F) -> Self
    where
        F: Fn(Option<String>) -> Fut + Send + 'static,
        Fut: Future<Output = PageResult<T>> + Send + 'static,
    {
        let stream = stream::unfold(State::First, move |state| {
            let pending = match state {
                State::First => Some(fetch(None)),
                State::Next(link) => Some(fetch(Some(link))),
                State::Done => None,
            };
            async move {
                match pending?.await {
                    Ok(page) => {
                        let next = match page.continuation() {
                            Some(link) => State::Next(link.to_string()),
                            None => State::Done,
                        };
                        Some((Ok(page), next))
                    }
                    Err(e) => Some((Err(e), State::Done)),
                }
            }
        });
        Self {
            stream: stream.boxed(),
        }
    }

    /// Fetches every page and concatenates the items in order.
    pub async fn all_items(mut self) -> Result<Vec<T>, ApiError> {
        let mut items = Vec::new();
        while let Some(page) = self.next().await {
            items.extend(page?.into_inner().value);
        }
        Ok(items)
    }
}

impl<T> Stream for Paginator<T> {
    type Item = PageResult<T>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.stream.poll_next_unpin(cx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::http::RawResponse;
    use std::collections::VecDeque;
    use std::sync::{Arc, Mutex};

    fn page(items: &[&str], next: Option<&str>) -> Response<Page<String>> {
        Response::new(
            RawResponse {
                status: 200,
                headers: Vec::new(),
            },
            Page {
                value: items.iter().map(|s| s.to_string()).collect(),
                next_link: next.map(str::to_string),
            },
        )
    }

    #[test]
    fn deserializes_list_shape() {
        let p: Page<u32> = serde_json::from_str(r#"{"value":[1,2],"nextLink":"https://x/next"}"#).unwrap();
        assert_eq!(p.value, vec![1, 2]);
        assert_eq!(p.continuation(), Some("https://x/next"));

        let p: Page<u32> = serde_json::from_str(r#"{}"#).unwrap();
        assert!(p.value.is_empty());
        assert!(p.is_last());
    }

    #[test]
    fn empty_link_means_last_page() {
        let p = page(&["a"], Some(""));
        assert!(p.continuation().is_none());
        assert!(p.next_request().unwrap().is_none());
    }

    #[test]
    fn next_request_targets_link_verbatim() {
        let link = "https://management.example/subscriptions/s/resourcegroups?api-version=2016-09-01&$skiptoken=abc%3D%3D";
        let req = page(&[], Some(link)).next_request().unwrap().unwrap();
        assert_eq!(req.method, HttpMethod::Get);
        assert_eq!(req.url, link);
        assert!(req.body.is_none());
    }

    #[test]
    fn malformed_link_is_preparation_error() {
        let err = page(&[], Some("not a url")).next_request().unwrap_err();
        assert!(matches!(err, PrepareError::InvalidUrl { .. }));
    }

    #[tokio::test]
    async fn follows_links_until_exhausted() {
        let pages = Arc::new(Mutex::new(VecDeque::from(vec![
            page(&["a", "b"], Some("https://x/2")),
            page(&["c"], Some("https://x/3")),
            page(&["d"], None),
        ])));
        let seen = Arc::new(Mutex::new(Vec::new()));

        let fetch = {
            let pages = pages.clone();
            let seen = seen.clone();
            move |link: Option<String>| {
                seen.lock().unwrap().push(link);
                let next = pages.lock().unwrap().pop_front();
                async move { Ok(next.expect("fetched past the last page")) }
            }
        };

        let items = Paginator::new(fetch).all_items().await.unwrap();
        assert_eq!(items, vec!["a", "b", "c", "d"]);
        assert_eq!(
            *seen.lock().unwrap(),
            vec![None, Some("https://x/2".to_string()), Some("https://x/3".to_string())]
        );
    }

    #[tokio::test]
    async fn stops_after_first_error() {
        let calls = Arc::new(Mutex::new(0));
        let fetch = {
            let calls = calls.clone();
            move |_link: Option<String>| {
                let n = {
                    let mut c = calls.lock().unwrap();
                    *c += 1;
                    *c
                };
                async move {
                    if n == 1 {
                        Ok(page(&["a"], Some("https://x/2")))
                    } else {
                        Err(ApiError::new(
                            "test.Client.List",
                            ErrorKind::Status {
                                status: 500,
                                error: None,
                                body: String::new(),
                            },
                        ))
                    }
                }
            }
        };

        let mut pager = Paginator::new(fetch);
        assert!(pager.next().await.unwrap().is_ok());
        assert_eq!(pager.next().await.unwrap().unwrap_err().status(), Some(500));
        assert!(pager.next().await.is_none());
        assert_eq!(*calls.lock().unwrap(), 2);
    }
}
