//! JSON bodies sent to partial-update clients.

use serde::Serialize;

use crate::session::{FlashMessage, Notification};

/// Envelope for a partial update.
///
/// Every key is optional and an absent key means "nothing to apply":
///
/// ```json
/// {"payload": "<p>..</p>", "doctitle": "Home", "notifications": [["info", "Saved", false, false]]}
/// ```
///
/// With nothing to carry the envelope serializes as `{}`.
#[derive(Debug, Default, Serialize)]
pub struct Envelope<'a> {
    /// Rendered markup to patch into the page.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<&'a str>,

    /// New document title.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doctitle: Option<&'a str>,

    /// Messages to display, in delivery order.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<Vec<Notification<'a>>>,
}

impl<'a> Envelope<'a> {
    /// Assemble an envelope, leaving out empty parts.
    #[must_use]
    pub fn new(content: &'a str, doctitle: &'a str, flashes: &'a [FlashMessage]) -> Self {
        Self {
            payload: (!content.is_empty()).then_some(content),
            doctitle: (!doctitle.is_empty()).then_some(doctitle),
            notifications: (!flashes.is_empty())
                .then(|| flashes.iter().map(FlashMessage::as_notification).collect()),
        }
    }
}

/// Body of a redirect: `{"redirect": url}` plus `"blank": true` when the
/// client should open the target in a new browsing context.
#[derive(Debug, Serialize)]
pub struct RedirectEnvelope<'a> {
    pub redirect: &'a str,

    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub blank: bool,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_envelope() {
        let body = serde_json::to_value(Envelope::new("", "", &[])).unwrap();
        assert_eq!(body, json!({}));
    }

    #[test]
    fn test_payload_and_title() {
        let body = serde_json::to_value(Envelope::new("X", "T", &[])).unwrap();
        assert_eq!(body, json!({"payload": "X", "doctitle": "T"}));
    }

    #[test]
    fn test_notifications_are_tuples() {
        let flashes = vec![
            FlashMessage::decode("error.us", "boom"),
            FlashMessage::info("hi"),
        ];
        let body = serde_json::to_value(Envelope::new("", "", &flashes)).unwrap();
        assert_eq!(
            body,
            json!({"notifications": [["error", "boom", true, true], ["info", "hi", false, false]]})
        );
    }

    #[test]
    fn test_redirect_blank_only_when_set() {
        let body = serde_json::to_string(&RedirectEnvelope { redirect: "/home", blank: false }).unwrap();
        assert_eq!(body, r#"{"redirect":"/home"}"#);

        let body = serde_json::to_string(&RedirectEnvelope { redirect: "/home", blank: true }).unwrap();
        assert_eq!(body, r#"{"redirect":"/home","blank":true}"#);
    }
}
