//! Runtime template rendering for server-rendered views.
//!
//! A view is usually assembled from several fragments: a page shell, a
//! menu, the view's own body. [`TemplateEngine`] renders such a set as one
//! unit, with fragments referring to each other by file name.
//!
//! # Quick Start
//!
//! ```text
//! templates/
//!   webui/html.tpl      <html>{% include "mainpage.tpl" %}</html>
//!   home/mainpage.tpl   <p>{{ message }}</p>
//! ```
//!
//! ```rust,ignore
//! use acton_webui::prelude::*;
//! use serde_json::json;
//!
//! async fn home(State(state): State<AppState>, ctx: ViewContext) -> Result<WebResponse> {
//!     let html = state
//!         .engine()
//!         .render(&json!({"message": "Welcome"}), &["webui/html.tpl", "home/mainpage.tpl"])?;
//!     reply(&ctx, html, "Home", None).await
//! }
//! ```
//!
//! Missing keys render as empty output rather than failing, so a view can
//! pass a partial data map to a shared layout.

mod engine;
mod functions;

pub use engine::{TemplateEngine, TemplateEngineBuilder};
pub use functions::{join, pluralize, replace_all, slices_contains, truncate};

// Re-export for `TemplateEngineBuilder::configure`
pub use minijinja::Environment;
