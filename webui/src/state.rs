//! Application state management

use std::sync::Arc;

use crate::{config::Config, session::FlashStore, templates::TemplateEngine};

/// Application state shared across handlers
///
/// Holds the template engine and the flash store. Both are built once at
/// startup and shared by every request. Embed it in a
/// larger state with [`axum::extract::FromRef`] to keep [`ViewContext`]
/// extraction working:
///
/// ```rust,ignore
/// #[derive(Clone, FromRef)]
/// struct MyState {
///     webui: AppState,
///     db: PgPool,
/// }
/// ```
///
/// [`ViewContext`]: crate::context::ViewContext
#[derive(Debug, Clone)]
pub struct AppState {
    config: Arc<Config>,
    engine: TemplateEngine,
    flashes: FlashStore,
}

impl Default for AppState {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl AppState {
    /// Create state with an engine built from `config.templates`
    pub fn new(config: Config) -> Self {
        Self::builder().config(config).build()
    }

    /// Create a builder for AppState
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::new()
    }

    /// Get the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the template engine
    pub fn engine(&self) -> &TemplateEngine {
        &self.engine
    }

    /// Get the flash queues of all sessions
    pub fn flashes(&self) -> &FlashStore {
        &self.flashes
    }
}

/// Builder for AppState
#[derive(Default)]
pub struct AppStateBuilder {
    config: Option<Config>,
    engine: Option<TemplateEngine>,
}

impl AppStateBuilder {
    /// Create a new builder
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Use a preconfigured engine, e.g. one with application functions
    pub fn engine(mut self, engine: TemplateEngine) -> Self {
        self.engine = Some(engine);
        self
    }

    /// Build the AppState
    pub fn build(self) -> AppState {
        let config = self.config.unwrap_or_default();
        let engine = self
            .engine
            .unwrap_or_else(|| TemplateEngine::new(&config.templates));

        AppState {
            config: Arc::new(config),
            engine,
            flashes: FlashStore::new(),
        }
    }
}
