//! Dual-mode responses.
//!
//! One view function serves both browser navigation and script-driven
//! partial updates. The request is classified into a [`RequestMode`]; the
//! builders in this module then produce either the rendered HTML as-is or
//! a JSON [`Envelope`] the client script applies to the current page.
//!
//! # Wire format
//!
//! Partial responses:
//!
//! ```json
//! {"payload": "<markup>", "doctitle": "Title", "notifications": [["info", "Saved", false, false]]}
//! ```
//!
//! Each key is present only when it carries something. Notifications are
//! `[category, message, unique, sticky]` tuples.
//!
//! Redirects answer `302 Found` with a `Location` header and the body
//! `{"redirect": "<url>"}`, plus `"blank": true` to request a new window.

mod envelope;
mod mode;
mod reply;

pub use envelope::{Envelope, RedirectEnvelope};
pub use mode::RequestMode;
pub use reply::{drain_flashes, flash, flash_message, notify, redirect, reply, WebResponse};
