//! Request classification: full page or partial update.

use std::convert::Infallible;

use axum::{extract::FromRequestParts, http::request::Parts};
use http::HeaderMap;

/// How the client expects the response to be delivered.
///
/// Classification happens once per request; the response builders match on
/// the result instead of re-reading headers.
///
/// A request is [`Partial`](Self::Partial) when any of these hold:
///
/// - `X-Requested-With: XMLHttpRequest`
/// - an `HX-Request` header is present
/// - the first media type in `Accept` is `application/json`
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(mode: RequestMode) -> impl IntoResponse {
///     match mode {
///         RequestMode::Page => "full document",
///         RequestMode::Partial => "fragment",
///     }
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RequestMode {
    /// Browser navigation; the body is a complete HTML document.
    #[default]
    Page,
    /// Script-driven update; the body is a JSON envelope.
    Partial,
}

impl RequestMode {
    /// Classify a request from its headers.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        if is_xml_http_request(headers) || headers.contains_key("hx-request") || prefers_json(headers)
        {
            Self::Partial
        } else {
            Self::Page
        }
    }

    /// Whether the response should be a JSON envelope.
    #[must_use]
    pub fn is_partial(self) -> bool {
        matches!(self, Self::Partial)
    }
}

fn is_xml_http_request(headers: &HeaderMap) -> bool {
    headers
        .get("x-requested-with")
        .and_then(|v| v.to_str().ok())
        .is_some_and(|s| s.eq_ignore_ascii_case("XMLHttpRequest"))
}

fn prefers_json(headers: &HeaderMap) -> bool {
    headers
        .get(http::header::ACCEPT)
        .and_then(|v| v.to_str().ok())
        .and_then(|accept| accept.split(',').next())
        .and_then(|first| first.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case("application/json"))
}

impl<S> FromRequestParts<S> for RequestMode
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Self::from_headers(&parts.headers))
    }
}
