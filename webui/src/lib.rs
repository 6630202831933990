//! # acton-webui
//!
//! Server-rendered views that serve two kinds of client from one code path:
//! browser navigation gets a full HTML document, script-driven partial
//! updates get a JSON envelope to patch into the current page.
//!
//! ## Features
//!
//! - **Template composition**: render an ordered set of fragments as one unit
//! - **Flash messages**: session-bound, one-shot, FIFO notifications
//! - **Dual-mode responses**: `reply`, `notify` and `redirect` pick HTML or JSON per request
//! - **axum integration**: `ViewContext` extractor, `WebResponse` responder, cookie sessions
//! - **Graceful shutdown**: Proper signal handling (SIGTERM, SIGINT)
//!
//! ## Example
//!
//! ```rust,no_run
//! use acton_webui::prelude::*;
//! use serde_json::json;
//!
//! async fn home(State(state): State<AppState>, ctx: ViewContext) -> Result<WebResponse> {
//!     let html = state.engine().render(
//!         &json!({ "message": "Welcome" }),
//!         &["webui/html.tpl", "home/mainpage.tpl"],
//!     )?;
//!     reply(&ctx, html, "Home", None).await
//! }
//!
//! async fn save(ctx: ViewContext) -> Result<WebResponse> {
//!     flash(&ctx, "success", "Saved").await?;
//!     redirect("/", false)
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     // Load configuration
//!     let config = Config::load()?;
//!
//!     // Initialize tracing
//!     init_tracing(&config)?;
//!
//!     let sessions = create_memory_session_layer(&config.session);
//!     let state = AppState::new(config.clone());
//!
//!     // Create router
//!     let app = Router::new()
//!         .route("/", get(home))
//!         .route("/save", post(save))
//!         .layer(sessions)
//!         .with_state(state);
//!
//!     // Run server
//!     Server::new(config).serve(app).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod observability;
pub mod response;
pub mod server;
pub mod session;
pub mod state;
pub mod templates;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{Config, ServiceConfig, TemplateConfig};
    pub use crate::context::ViewContext;
    pub use crate::error::{Error, Result};
    pub use crate::observability::init_tracing;
    pub use crate::response::{
        drain_flashes, flash, flash_message, notify, redirect, reply, RequestMode, WebResponse,
    };
    pub use crate::server::Server;
    pub use crate::session::{
        create_memory_session_layer, FlashMessage, MemorySessionStore, SessionConfig,
        SessionStore,
    };
    pub use crate::state::{AppState, AppStateBuilder};
    pub use crate::templates::{TemplateEngine, TemplateEngineBuilder};

    // Re-export tower-sessions Session type for direct use
    pub use tower_sessions::Session;

    // Re-export axum Html for non-templated HTML responses
    pub use axum::response::Html;

    pub use axum::{
        extract::{Form, FromRef, Path, Query, State},
        http::{HeaderMap, HeaderValue, StatusCode},
        response::{IntoResponse, Json, Response},
        routing::{get, post},
        Router,
    };

    pub use serde::{Deserialize, Serialize};

    // Re-export tracing macros and types
    pub use tracing::{debug, error, info, instrument, warn};

    // Re-export tokio for async runtime
    pub use tokio;
}
