//! Per-request view context.
//!
//! [`ViewContext`] is what response builders need to know about the current
//! request: how the client wants the answer delivered and which session the
//! flash queue lives in.

use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use tower_sessions::Session;

use crate::{
    error::Error,
    response::RequestMode,
    session::{FlashStore, SessionStore},
    state::AppState,
};

/// Request mode, session and flash store for one request.
///
/// Extract it in a handler; it requires a `SessionManagerLayer` on the
/// router and state from which [`AppState`] can be derived.
///
/// ```rust,ignore
/// async fn home(ctx: ViewContext) -> Result<WebResponse> {
///     reply(&ctx, "<p>Welcome</p>", "Home", None).await
/// }
/// ```
#[derive(Clone)]
pub struct ViewContext {
    mode: RequestMode,
    session: Arc<dyn SessionStore>,
    flashes: FlashStore,
}

impl ViewContext {
    /// Build a context from its parts.
    ///
    /// Useful outside axum handlers, or with a non-cookie session store.
    pub fn new(mode: RequestMode, session: Arc<dyn SessionStore>, flashes: FlashStore) -> Self {
        Self {
            mode,
            session,
            flashes,
        }
    }

    /// How the response should be delivered.
    #[must_use]
    pub fn mode(&self) -> RequestMode {
        self.mode
    }

    /// The current client's session.
    #[must_use]
    pub fn session(&self) -> &dyn SessionStore {
        self.session.as_ref()
    }

    /// Flash queues of all sessions.
    #[must_use]
    pub fn flashes(&self) -> &FlashStore {
        &self.flashes
    }
}

impl std::fmt::Debug for ViewContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewContext")
            .field("mode", &self.mode)
            .field("session", &self.session.session_id())
            .finish_non_exhaustive()
    }
}

impl<S> FromRequestParts<S> for ViewContext
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = Error;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // Get session from request extensions (set by SessionManagerLayer)
        let session = parts.extensions.get::<Session>().cloned().ok_or_else(|| {
            Error::Session(
                "Session not found in request extensions. Is SessionManagerLayer configured?"
                    .to_string(),
            )
        })?;

        let app = AppState::from_ref(state);

        Ok(Self {
            mode: RequestMode::from_headers(&parts.headers),
            session: Arc::new(session),
            flashes: app.flashes().clone(),
        })
    }
}
