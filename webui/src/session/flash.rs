//! Flash message support for server-rendered and AJAX-driven views.
//!
//! Flash messages are one-shot notifications bound to a session. They are
//! appended in arrival order and handed out exactly once: the first drain
//! after they were queued returns them and clears the queue.
//!
//! Queues live in a [`FlashStore`] owned by the application and keyed by
//! session id, not in the session record itself. A session record is
//! loaded once per request and written back after the handler returns, so
//! two overlapping requests would each update their own stale copy. The
//! store appends and takes under its own map lock instead.
//!
//! # Example
//!
//! ```rust,ignore
//! use acton_webui::session::{FlashMessage, FlashStore};
//!
//! let flashes = FlashStore::new();
//!
//! // Structured record built at the call site
//! flashes.push(&session, FlashMessage::error("Disk full").sticky()).await?;
//!
//! // Legacy encoded category: "error" with the unique and sticky modifiers
//! flashes.push(&session, FlashMessage::decode("error.us", "Disk full")).await?;
//!
//! // Later, usually on the next request
//! let messages = flashes.drain(&session); // queue is now empty
//! ```

use std::sync::Arc;

use dashmap::DashMap;
use serde::{ser::SerializeTuple, Deserialize, Serialize, Serializer};

use crate::error::Result;
use crate::session::store::SessionStore;

/// Session key marking a session that has owned a flash queue.
///
/// Writing it gives a new session its id and makes sure the cookie
/// carrying that id reaches the client.
pub const FLASH_SESSION_KEY: &str = "_flashes";

/// A single flash notification.
///
/// On the wire (inside a response envelope) a message is written as the
/// ordered tuple `[category, message, unique, sticky]`; see
/// [`FlashMessage::as_notification`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlashMessage {
    /// Category understood by the client script (`success`, `info`, `warn`, `error`, ...)
    pub category: String,
    /// The message content.
    pub message: String,
    /// Replace earlier notifications of the same category instead of stacking.
    #[serde(default)]
    pub unique: bool,
    /// Keep the notification visible until the user dismisses it.
    #[serde(default)]
    pub sticky: bool,
}

impl FlashMessage {
    /// Create a new flash message with no modifiers.
    #[must_use]
    pub fn new(category: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            message: message.into(),
            unique: false,
            sticky: false,
        }
    }

    /// Create a success flash message.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new("success", message)
    }

    /// Create an info flash message.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new("info", message)
    }

    /// Create a warning flash message.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new("warn", message)
    }

    /// Create an error flash message.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new("error", message)
    }

    /// Mark the message as unique.
    #[must_use]
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    /// Mark the message as sticky.
    #[must_use]
    pub fn sticky(mut self) -> Self {
        self.sticky = true;
        self
    }

    /// Build a message from a legacy encoded category.
    ///
    /// `raw` is either `"category"` or `"category.modifiers"`. The string is
    /// split on the first `.`; the modifiers are a set of flag characters
    /// where `u` means unique and `s` means sticky. Order, repetition and
    /// unknown characters do not matter.
    ///
    /// ```
    /// use acton_webui::session::FlashMessage;
    ///
    /// let msg = FlashMessage::decode("error.us", "boom");
    /// assert_eq!(msg.category, "error");
    /// assert!(msg.unique && msg.sticky);
    ///
    /// let msg = FlashMessage::decode("x.z", "ignored flag");
    /// assert!(!msg.unique && !msg.sticky);
    /// ```
    #[must_use]
    pub fn decode(raw: &str, message: impl Into<String>) -> Self {
        match raw.split_once('.') {
            Some((category, modifiers)) => Self {
                category: category.to_string(),
                message: message.into(),
                unique: modifiers.contains('u'),
                sticky: modifiers.contains('s'),
            },
            None => Self::new(raw, message),
        }
    }

    /// Wire view of the message as an envelope notification.
    #[must_use]
    pub fn as_notification(&self) -> Notification<'_> {
        Notification(self)
    }
}

/// Envelope form of a [`FlashMessage`]: `[category, message, unique, sticky]`.
#[derive(Debug, Clone, Copy)]
pub struct Notification<'a>(&'a FlashMessage);

impl Serialize for Notification<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut tuple = serializer.serialize_tuple(4)?;
        tuple.serialize_element(&self.0.category)?;
        tuple.serialize_element(&self.0.message)?;
        tuple.serialize_element(&self.0.unique)?;
        tuple.serialize_element(&self.0.sticky)?;
        tuple.end()
    }
}

/// Flash queues for every session, keyed by session id.
///
/// [`push`](Self::push) appends under the map's entry lock and
/// [`drain`](Self::drain) removes the whole queue in one step, so two
/// requests for the same session (two tabs, a double-submitted form) can
/// neither lose a message nor receive the same one twice.
///
/// One store is shared by the whole application (see
/// [`AppState`](crate::state::AppState)); cloning shares it. Queues are
/// held in process memory, so every request for a session must reach the
/// same process.
#[derive(Debug, Clone, Default)]
pub struct FlashStore {
    queues: Arc<DashMap<String, Vec<FlashMessage>>>,
}

impl FlashStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the session's queue.
    ///
    /// Returns the queue length after the append.
    ///
    /// # Errors
    ///
    /// Returns an error if the session cannot be given an id.
    pub async fn push<S>(&self, session: &S, message: FlashMessage) -> Result<usize>
    where
        S: SessionStore + ?Sized,
    {
        let id = session.ensure_id().await?;

        let len = {
            let mut queue = self.queues.entry(id.clone()).or_default();
            queue.push(message);
            queue.len()
        };

        tracing::debug!(session = %id, queued = len, "Flash message queued");
        Ok(len)
    }

    /// Take every queued message, in insertion order, and clear the queue.
    ///
    /// A second drain with no intervening [`push`](Self::push) returns an
    /// empty vector.
    pub fn drain<S>(&self, session: &S) -> Vec<FlashMessage>
    where
        S: SessionStore + ?Sized,
    {
        let Some(id) = session.session_id() else {
            return Vec::new();
        };

        match self.queues.remove(&id) {
            Some((_, queue)) => {
                tracing::debug!(session = %id, drained = queue.len(), "Flash messages drained");
                queue
            }
            None => Vec::new(),
        }
    }

    /// Number of sessions with undelivered messages.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.queues.len()
    }
}
