//! Response builders used by views.
//!
//! A view calls exactly one of [`reply`], [`notify`] or [`redirect`] to
//! produce its response. [`flash`] and [`flash_message`] queue messages for
//! the session, for delivery with a later partial-update response.

use axum::response::{IntoResponse, Response};
use http::{header, HeaderValue, StatusCode};
use serde_json::{json, Value};

use crate::{
    context::ViewContext,
    error::Result,
    session::FlashMessage,
};

use super::{
    envelope::{Envelope, RedirectEnvelope},
    mode::RequestMode,
};

/// Final response produced by a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebResponse {
    status: StatusCode,
    kind: BodyKind,
    location: Option<String>,
    body: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BodyKind {
    Html,
    Json,
}

impl WebResponse {
    /// `200 OK` with an HTML body.
    #[must_use]
    pub fn html(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            kind: BodyKind::Html,
            location: None,
            body: body.into(),
        }
    }

    /// `200 OK` with a JSON body that is already encoded.
    #[must_use]
    pub fn json(body: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            kind: BodyKind::Json,
            location: None,
            body: body.into(),
        }
    }

    /// HTTP status of the response.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }

    /// Encoded body, HTML or JSON.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Redirect target, if this is a redirect.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    /// Whether the body is a JSON document.
    #[must_use]
    pub fn is_json(&self) -> bool {
        self.kind == BodyKind::Json
    }
}

impl IntoResponse for WebResponse {
    fn into_response(self) -> Response {
        let content_type = match self.kind {
            BodyKind::Html => "text/html; charset=utf-8",
            BodyKind::Json => "application/json",
        };

        let mut response = (
            self.status,
            [(header::CONTENT_TYPE, HeaderValue::from_static(content_type))],
            self.body,
        )
            .into_response();

        if let Some(location) = self.location {
            match HeaderValue::try_from(location.as_str()) {
                Ok(value) => {
                    response.headers_mut().insert(header::LOCATION, value);
                }
                Err(e) => {
                    tracing::warn!(location = %location, error = %e, "Redirect target is not a valid Location header");
                }
            }
        }

        response
    }
}

/// Answer the request with rendered content.
///
/// For a [`Page`](RequestMode::Page) request the body is `content`
/// verbatim and the flash queue is left alone.
///
/// For a [`Partial`](RequestMode::Partial) request the flash queue is
/// always drained. The body is then `params` when given, or an
/// [`Envelope`] carrying the non-empty parts of `content`, `doctitle` and
/// the drained messages.
///
/// # Errors
///
/// Fails if the body cannot be encoded.
pub async fn reply(
    ctx: &ViewContext,
    content: impl Into<String>,
    doctitle: &str,
    params: Option<Value>,
) -> Result<WebResponse> {
    let content = content.into();

    match ctx.mode() {
        RequestMode::Page => Ok(WebResponse::html(content)),
        RequestMode::Partial => {
            let flashes = drain_flashes(ctx);
            let body = match params {
                Some(params) => serde_json::to_string(&params)?,
                None => serde_json::to_string(&Envelope::new(&content, doctitle, &flashes))?,
            };
            Ok(WebResponse::json(body))
        }
    }
}

/// Answer with a single notification for this response only.
///
/// The notification does not go through the session; use [`flash`] for
/// messages that must survive until a later request.
///
/// When `params` is given the notification arguments are ignored and the
/// call is equivalent to `reply(ctx, "", "", None)`.
///
/// # Errors
///
/// Same as [`reply`].
pub async fn notify(
    ctx: &ViewContext,
    message: &str,
    category: &str,
    unique: bool,
    sticky: bool,
    params: Option<Value>,
) -> Result<WebResponse> {
    if params.is_some() {
        return reply(ctx, "", "", None).await;
    }

    let notification = FlashMessage {
        category: category.to_string(),
        message: message.to_string(),
        unique,
        sticky,
    };
    let params = json!({
        "notifications": [serde_json::to_value(notification.as_notification())?],
    });
    reply(ctx, "", "", Some(params)).await
}

/// Redirect the client to `url`.
///
/// The response carries `302 Found` with a `Location` header for
/// navigating clients, and a `{"redirect": url}` body for scripts. `blank`
/// adds `"blank": true`, asking the script to open a new browsing context.
///
/// # Errors
///
/// Fails if the body cannot be encoded.
pub fn redirect(url: &str, blank: bool) -> Result<WebResponse> {
    let body = serde_json::to_string(&RedirectEnvelope { redirect: url, blank })?;

    Ok(WebResponse {
        status: StatusCode::FOUND,
        kind: BodyKind::Json,
        location: Some(url.to_string()),
        body,
    })
}

/// Queue a message using an encoded category such as `"error.us"`.
///
/// See [`FlashMessage::decode`] for the encoding.
///
/// # Errors
///
/// Fails if the session cannot be given an id.
pub async fn flash(ctx: &ViewContext, raw_category: &str, message: impl Into<String>) -> Result<()> {
    flash_message(ctx, FlashMessage::decode(raw_category, message)).await
}

/// Queue a message for delivery with a later partial-update response.
///
/// # Errors
///
/// Fails if the session cannot be given an id.
pub async fn flash_message(ctx: &ViewContext, message: FlashMessage) -> Result<()> {
    ctx.flashes().push(ctx.session(), message).await?;
    Ok(())
}

/// Take every queued message and clear the queue.
#[must_use]
pub fn drain_flashes(ctx: &ViewContext) -> Vec<FlashMessage> {
    ctx.flashes().drain(ctx.session())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::{
        create_memory_session_layer, FlashStore, MemorySessionStore, SessionConfig,
    };
    use crate::state::AppState;
    use axum::{
        body::{to_bytes, Body},
        http::Request,
        routing::{get, post},
        Router,
    };
    use std::sync::Arc;
    use tower::ServiceExt;

    fn context(store: &MemorySessionStore, flashes: &FlashStore, mode: RequestMode) -> ViewContext {
        ViewContext::new(mode, Arc::new(store.session("s1")), flashes.clone())
    }

    fn body_json(response: &WebResponse) -> Value {
        serde_json::from_str(response.body()).unwrap()
    }

    #[tokio::test]
    async fn test_partial_reply_empty_envelope() {
        let store = MemorySessionStore::new();
        let ctx = context(&store, &FlashStore::new(), RequestMode::Partial);

        let response = reply(&ctx, "", "", None).await.unwrap();
        assert!(response.is_json());
        assert_eq!(response.body(), "{}");
    }

    #[tokio::test]
    async fn test_partial_reply_with_content_and_flashes() {
        let store = MemorySessionStore::new();
        let ctx = context(&store, &FlashStore::new(), RequestMode::Partial);

        let response = reply(&ctx, "X", "T", None).await.unwrap();
        assert_eq!(body_json(&response), json!({"payload": "X", "doctitle": "T"}));

        flash(&ctx, "info", "hi").await.unwrap();
        flash(&ctx, "warn.s", "careful").await.unwrap();
        let response = reply(&ctx, "X", "T", None).await.unwrap();
        assert_eq!(
            body_json(&response),
            json!({
                "payload": "X",
                "doctitle": "T",
                "notifications": [["info", "hi", false, false], ["warn", "careful", false, true]],
            })
        );

        let response = reply(&ctx, "", "", None).await.unwrap();
        assert_eq!(response.body(), "{}");
    }

    #[tokio::test]
    async fn test_params_replace_envelope_and_still_drain() {
        let store = MemorySessionStore::new();
        let ctx = context(&store, &FlashStore::new(), RequestMode::Partial);
        flash(&ctx, "info", "stale").await.unwrap();

        let response = reply(&ctx, "ignored", "ignored", Some(json!({"k": 1})))
            .await
            .unwrap();
        assert_eq!(response.body(), r#"{"k":1}"#);
        assert!(drain_flashes(&ctx).is_empty());
    }

    #[tokio::test]
    async fn test_page_reply_leaves_queue_untouched() {
        let store = MemorySessionStore::new();
        let flashes = FlashStore::new();
        let page = context(&store, &flashes, RequestMode::Page);
        flash(&page, "success", "Saved").await.unwrap();

        let response = reply(&page, "<p>hi</p>", "Home", None).await.unwrap();
        assert!(!response.is_json());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.body(), "<p>hi</p>");

        let partial = context(&store, &flashes, RequestMode::Partial);
        let response = reply(&partial, "", "", None).await.unwrap();
        assert_eq!(
            body_json(&response),
            json!({"notifications": [["success", "Saved", false, false]]})
        );
    }

    #[tokio::test]
    async fn test_notify_is_transient() {
        let store = MemorySessionStore::new();
        let ctx = context(&store, &FlashStore::new(), RequestMode::Partial);

        let response = notify(&ctx, "Hello", "info", true, false, None).await.unwrap();
        assert_eq!(
            body_json(&response),
            json!({"notifications": [["info", "Hello", true, false]]})
        );
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_notify_with_params_drops_notification() {
        let store = MemorySessionStore::new();
        let ctx = context(&store, &FlashStore::new(), RequestMode::Partial);
        flash(&ctx, "error", "pending").await.unwrap();

        let response = notify(&ctx, "Hello", "info", false, false, Some(json!({"k": 1})))
            .await
            .unwrap();
        assert_eq!(
            body_json(&response),
            json!({"notifications": [["error", "pending", false, false]]})
        );
    }

    #[test]
    fn test_redirect_shape() {
        let response = redirect("/home", false).unwrap();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.location(), Some("/home"));
        assert_eq!(response.body(), r#"{"redirect":"/home"}"#);

        let response = redirect("/home", true).unwrap();
        assert_eq!(response.body(), r#"{"redirect":"/home","blank":true}"#);
    }

    #[test]
    fn test_into_response_headers() {
        let response = WebResponse::html("<p>x</p>").into_response();
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "text/html; charset=utf-8"
        );

        let response = redirect("/next", false).unwrap().into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/next");
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn test_invalid_location_is_skipped() {
        let response = redirect("/bad\nurl", false).unwrap().into_response();
        assert_eq!(response.status(), StatusCode::FOUND);
        assert!(response.headers().get(header::LOCATION).is_none());
    }

    fn app() -> Router {
        let session = SessionConfig {
            secure: false,
            ..SessionConfig::default()
        };

        Router::new()
            .route(
                "/",
                get(|ctx: ViewContext| async move { reply(&ctx, "<p>hi</p>", "Home", None).await }),
            )
            .route(
                "/save",
                post(|ctx: ViewContext| async move {
                    flash(&ctx, "error.us", "boom").await?;
                    redirect("/", false)
                }),
            )
            .layer(create_memory_session_layer(&session))
            .with_state(AppState::default())
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, String) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(';').next())
            .map(str::to_string);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, cookie, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_flash_survives_redirect_and_page_view() {
        let app = app();

        let (status, cookie, body) = send(
            &app,
            Request::post("/save").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::FOUND);
        assert_eq!(body, r#"{"redirect":"/"}"#);
        let cookie = cookie.expect("session cookie");

        let (_, _, body) = send(
            &app,
            Request::get("/")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(body, "<p>hi</p>");

        let partial = || {
            Request::get("/")
                .header(header::COOKIE, &cookie)
                .header("x-requested-with", "XMLHttpRequest")
                .body(Body::empty())
                .unwrap()
        };

        let (_, _, body) = send(&app, partial()).await;
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(
            body,
            json!({"payload": "<p>hi</p>", "doctitle": "Home", "notifications": [["error", "boom", true, true]]})
        );

        let (_, _, body) = send(&app, partial()).await;
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body, json!({"payload": "<p>hi</p>", "doctitle": "Home"}));
    }

    fn overlapping_app() -> Router {
        let session = SessionConfig {
            secure: false,
            ..SessionConfig::default()
        };

        Router::new()
            .route(
                "/seed",
                get(|ctx: ViewContext| async move {
                    flash(&ctx, "info", "M0").await?;
                    reply(&ctx, "<p>seeded</p>", "", None).await
                }),
            )
            .route(
                "/push",
                post(|ctx: ViewContext| async move {
                    flash(&ctx, "info", "M1").await?;
                    // Keep the request open while another one drains
                    tokio::time::sleep(std::time::Duration::from_millis(300)).await;
                    redirect("/", false)
                }),
            )
            .route(
                "/drain",
                get(|ctx: ViewContext| async move { reply(&ctx, "", "", None).await }),
            )
            .layer(create_memory_session_layer(&session))
            .with_state(AppState::default())
    }

    fn delivered(body: &str) -> Vec<String> {
        let body: Value = serde_json::from_str(body).unwrap();
        body["notifications"]
            .as_array()
            .map(|list| {
                list.iter()
                    .map(|n| n[1].as_str().unwrap().to_string())
                    .collect()
            })
            .unwrap_or_default()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_overlapping_requests_deliver_each_flash_once() {
        let app = overlapping_app();

        let (_, cookie, body) = send(&app, Request::get("/seed").body(Body::empty()).unwrap()).await;
        assert_eq!(body, "<p>seeded</p>");
        let cookie = cookie.expect("session cookie");

        let drain = |cookie: &str| {
            Request::get("/drain")
                .header(header::COOKIE, cookie)
                .header("x-requested-with", "XMLHttpRequest")
                .body(Body::empty())
                .unwrap()
        };

        let push = {
            let app = app.clone();
            let request = Request::post("/push")
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap();
            tokio::spawn(async move { send(&app, request).await })
        };

        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        let (_, _, first) = send(&app, drain(&cookie)).await;

        let (status, _, _) = push.await.unwrap();
        assert_eq!(status, StatusCode::FOUND);

        let (_, _, second) = send(&app, drain(&cookie)).await;
        let (_, _, third) = send(&app, drain(&cookie)).await;

        let mut all = delivered(&first);
        all.extend(delivered(&second));
        all.extend(delivered(&third));
        all.sort();
        assert_eq!(all, vec!["M0".to_string(), "M1".to_string()]);
        assert_eq!(delivered(&first)[0], "M0");
        assert!(delivered(&third).is_empty());
    }

    #[tokio::test]
    async fn test_missing_session_layer_is_an_error() {
        let app = Router::new()
            .route(
                "/",
                get(|ctx: ViewContext| async move { reply(&ctx, "x", "", None).await }),
            )
            .with_state(AppState::default());

        let (status, _, body) = send(&app, Request::get("/").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(body.contains("SESSION_ERROR"));
    }
}
