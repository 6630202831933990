//! Session state consumed by views.
//!
//! The crate does not own a session backend. It needs a key/value view of
//! the current client's session ([`SessionStore`]) and keeps one piece of
//! state there: the flash queue.
//!
//! # Quick Start
//!
//! ```toml
//! # config.toml
//! [session]
//! cookie_name = "session_id"
//! expiry_secs = 86400
//! secure = false  # true in production
//! ```
//!
//! ```rust,ignore
//! use acton_webui::prelude::*;
//!
//! async fn save(ctx: ViewContext) -> Result<WebResponse> {
//!     flash(&ctx, "success", "Saved").await?;
//!     redirect("/items", false)
//! }
//!
//! async fn items(ctx: ViewContext) -> Result<WebResponse> {
//!     // The flash queued above is delivered here, once
//!     reply(&ctx, "<ul>...</ul>", "Items", None).await
//! }
//! ```

mod config;
mod flash;
mod store;

pub use config::{create_memory_session_layer, SameSitePolicy, SessionConfig};
pub use flash::{FlashStore, FlashMessage, Notification, FLASH_SESSION_KEY};
pub use store::{MemorySession, MemorySessionStore, SessionStore};

// Re-export tower-sessions types for convenience
pub use tower_sessions::{Expiry, Session, SessionManagerLayer};
pub use tower_sessions_memory_store::MemoryStore;
