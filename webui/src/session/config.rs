//! Session cookie configuration and layer construction.

use serde::{Deserialize, Serialize};
use time::Duration;
use tower_sessions::{cookie::SameSite, Expiry, SessionManagerLayer};
use tower_sessions_memory_store::MemoryStore;

/// Cookie settings for the session layer.
///
/// ```toml
/// [session]
/// cookie_name = "session_id"
/// expiry_secs = 86400
/// secure = true
/// same_site = "lax"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,

    /// Lifetime in seconds; `0` makes the cookie last until the browser closes.
    pub expiry_secs: u64,

    /// Idle time after which the session lapses. Falls back to `expiry_secs`.
    pub inactivity_timeout_secs: Option<u64>,

    pub cookie_path: String,
    pub cookie_domain: Option<String>,

    /// Only send the cookie over HTTPS. Disable for local development.
    pub secure: bool,
    pub http_only: bool,
    pub same_site: SameSitePolicy,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "session_id".to_string(),
            expiry_secs: 86_400,
            inactivity_timeout_secs: None,
            cookie_path: "/".to_string(),
            cookie_domain: None,
            secure: true,
            http_only: true,
            same_site: SameSitePolicy::Lax,
        }
    }
}

/// `SameSite` attribute of the session cookie.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SameSitePolicy {
    Strict,
    #[default]
    Lax,
    None,
}

impl From<SameSitePolicy> for SameSite {
    fn from(policy: SameSitePolicy) -> Self {
        match policy {
            SameSitePolicy::Strict => SameSite::Strict,
            SameSitePolicy::Lax => SameSite::Lax,
            SameSitePolicy::None => SameSite::None,
        }
    }
}

impl SessionConfig {
    fn expiry(&self) -> Expiry {
        match (self.expiry_secs, self.inactivity_timeout_secs) {
            (0, _) => Expiry::OnSessionEnd,
            (_, Some(idle)) => Expiry::OnInactivity(seconds(idle)),
            (lifetime, None) => Expiry::OnInactivity(seconds(lifetime)),
        }
    }
}

fn seconds(secs: u64) -> Duration {
    Duration::seconds(i64::try_from(secs).unwrap_or(i64::MAX))
}

/// Build a cookie session layer backed by process memory.
///
/// Every request passing through it carries a `tower_sessions::Session`
/// in its extensions, which [`ViewContext`](crate::context::ViewContext)
/// picks up.
///
/// ```rust,ignore
/// let app = Router::new()
///     .route("/", get(index))
///     .layer(create_memory_session_layer(&config.session))
///     .with_state(state);
/// ```
pub fn create_memory_session_layer(config: &SessionConfig) -> SessionManagerLayer<MemoryStore> {
    let layer = SessionManagerLayer::new(MemoryStore::default())
        .with_name(config.cookie_name.clone())
        .with_path(config.cookie_path.clone())
        .with_expiry(config.expiry())
        .with_secure(config.secure)
        .with_http_only(config.http_only)
        .with_same_site(config.same_site.into());

    match &config.cookie_domain {
        Some(domain) => layer.with_domain(domain.clone()),
        None => layer,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.cookie_name, "session_id");
        assert_eq!(config.expiry_secs, 86_400);
        assert!(config.secure && config.http_only);
        assert_eq!(config.same_site, SameSitePolicy::Lax);
    }

    #[test]
    fn test_partial_table_fills_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"secure": false, "same_site": "strict"}"#).unwrap();
        assert!(!config.secure);
        assert_eq!(config.cookie_path, "/");
        assert_eq!(SameSite::from(config.same_site), SameSite::Strict);
    }

    #[test]
    fn test_expiry_selection() {
        let mut config = SessionConfig::default();
        assert!(matches!(config.expiry(), Expiry::OnInactivity(d) if d == Duration::seconds(86_400)));

        config.inactivity_timeout_secs = Some(600);
        assert!(matches!(config.expiry(), Expiry::OnInactivity(d) if d == Duration::seconds(600)));

        config.expiry_secs = 0;
        assert!(matches!(config.expiry(), Expiry::OnSessionEnd));
    }
}
