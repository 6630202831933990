//! Multi-fragment template composition.
//!
//! A render call takes an ordered list of fragment identifiers and treats
//! them as one unit: every fragment is registered under its base name, so
//! fragments can `include`, `extend` or `import` one another, and the unit
//! is executed starting from the first fragment.

use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use minijinja::{AutoEscape, Environment, UndefinedBehavior};
use rust_embed::RustEmbed;
use serde::Serialize;

use crate::config::TemplateConfig;
use crate::error::{Error, Result};

use super::functions;

/// Composes fragment sets into markup.
///
/// The engine owns one function registry, built by
/// [`TemplateEngineBuilder::build`] and never modified afterwards, so a
/// single engine can serve any number of concurrent renders. Cloning is
/// cheap and shares the registry.
///
/// # Example
///
/// ```rust
/// use acton_webui::templates::TemplateEngine;
/// use serde_json::json;
///
/// let engine = TemplateEngine::builder().build();
/// let html = engine
///     .render_sources(
///         &json!({ "name": "Ann" }),
///         &[
///             ("page.tpl", r#"{% extends "layout.tpl" %}{% block body %}Hi {{ name }}{% endblock %}"#),
///             ("layout.tpl", "<main>{% block body %}{% endblock %}</main>"),
///         ],
///     )
///     .unwrap();
/// assert_eq!(html, "<main>Hi Ann</main>");
/// ```
#[derive(Clone)]
pub struct TemplateEngine {
    inner: Arc<EngineInner>,
}

struct EngineInner {
    env: Environment<'static>,
    root: PathBuf,
}

impl std::fmt::Debug for TemplateEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TemplateEngine")
            .field("root", &self.inner.root)
            .finish_non_exhaustive()
    }
}

impl TemplateEngine {
    /// Build an engine from configuration with the built-in function table.
    #[must_use]
    pub fn new(config: &TemplateConfig) -> Self {
        Self::builder().with_config(config).build()
    }

    /// Start configuring an engine.
    #[must_use]
    pub fn builder() -> TemplateEngineBuilder {
        TemplateEngineBuilder::default()
    }

    /// Directory that relative fragment paths are resolved against.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// Render fragments read from the filesystem.
    ///
    /// Relative paths are resolved against [`root`](Self::root). The unit's
    /// entry point is the first fragment.
    ///
    /// # Errors
    ///
    /// - [`Error::TemplateParse`] if `fragments` is empty, a file cannot be
    ///   read, or a fragment has a syntax error
    /// - [`Error::TemplateExec`] if execution fails
    pub fn render<S, P>(&self, data: &S, fragments: &[P]) -> Result<String>
    where
        S: Serialize + ?Sized,
        P: AsRef<Path>,
    {
        let mut sources = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            let path = self.inner.root.join(fragment.as_ref());
            let source = std::fs::read_to_string(&path)
                .map_err(|e| Error::parse(path.display().to_string(), e))?;
            sources.push((fragment.as_ref().to_string_lossy().into_owned(), source));
        }
        self.execute(data, sources)
    }

    /// Render fragments bundled into the binary with `rust-embed`.
    ///
    /// # Errors
    ///
    /// Same as [`render`](Self::render); a fragment missing from the bundle
    /// or not valid UTF-8 is a [`Error::TemplateParse`].
    pub fn render_embedded<E, S>(&self, data: &S, fragments: &[&str]) -> Result<String>
    where
        E: RustEmbed,
        S: Serialize + ?Sized,
    {
        let mut sources = Vec::with_capacity(fragments.len());
        for fragment in fragments {
            let file = E::get(fragment)
                .ok_or_else(|| Error::parse(*fragment, "fragment not found in embedded assets"))?;
            let source = match file.data {
                Cow::Borrowed(bytes) => std::str::from_utf8(bytes)
                    .map(str::to_string)
                    .map_err(|e| Error::parse(*fragment, e))?,
                Cow::Owned(bytes) => {
                    String::from_utf8(bytes).map_err(|e| Error::parse(*fragment, e))?
                }
            };
            sources.push((fragment.to_string(), source));
        }
        self.execute(data, sources)
    }

    /// Render in-memory fragments given as `(identifier, source)` pairs.
    ///
    /// # Errors
    ///
    /// Same as [`render`](Self::render).
    pub fn render_sources<S>(&self, data: &S, fragments: &[(&str, &str)]) -> Result<String>
    where
        S: Serialize + ?Sized,
    {
        let sources = fragments
            .iter()
            .map(|(name, source)| (name.to_string(), source.to_string()))
            .collect();
        self.execute(data, sources)
    }

    fn execute<S>(&self, data: &S, fragments: Vec<(String, String)>) -> Result<String>
    where
        S: Serialize + ?Sized,
    {
        let entry = fragments
            .first()
            .map(|(identifier, _)| base_name(identifier).to_string())
            .ok_or_else(|| Error::parse("<empty>", "no template fragments supplied"))?;

        // Per-call unit; the shared registry is copied by reference
        let mut env = self.inner.env.clone();
        let count = fragments.len();
        for (identifier, source) in fragments {
            let name = base_name(&identifier).to_string();
            env.add_template_owned(name, source)
                .map_err(|e| Error::parse(identifier, e))?;
        }

        tracing::debug!(unit = %entry, fragments = count, "Rendering template unit");

        let template = env
            .get_template(&entry)
            .map_err(|e| Error::exec(entry.as_str(), e))?;
        template
            .render(data)
            .map_err(|e| Error::exec(entry.as_str(), e))
    }
}

/// Builder for [`TemplateEngine`].
///
/// Everything that touches the function registry happens here; once
/// [`build`](Self::build) returns, the registry is frozen.
pub struct TemplateEngineBuilder {
    env: Environment<'static>,
    root: PathBuf,
}

impl Default for TemplateEngineBuilder {
    fn default() -> Self {
        let mut env = Environment::new();
        env.set_undefined_behavior(UndefinedBehavior::Chainable);
        env.set_auto_escape_callback(|_| AutoEscape::None);
        env.set_keep_trailing_newline(true);
        functions::register(&mut env);

        Self {
            env,
            root: TemplateConfig::default().root,
        }
    }
}

impl TemplateEngineBuilder {
    /// Apply a [`TemplateConfig`].
    #[must_use]
    pub fn with_config(self, config: &TemplateConfig) -> Self {
        self.root(&config.root)
            .auto_escape(config.auto_escape)
            .keep_trailing_newline(config.keep_trailing_newline)
    }

    /// Set the directory relative fragment paths are resolved against.
    #[must_use]
    pub fn root(mut self, root: impl Into<PathBuf>) -> Self {
        self.root = root.into();
        self
    }

    /// HTML-escape substituted values.
    #[must_use]
    pub fn auto_escape(mut self, enabled: bool) -> Self {
        if enabled {
            self.env.set_auto_escape_callback(|_| AutoEscape::Html);
        } else {
            self.env.set_auto_escape_callback(|_| AutoEscape::None);
        }
        self
    }

    /// Keep the final newline of each fragment.
    #[must_use]
    pub fn keep_trailing_newline(mut self, keep: bool) -> Self {
        self.env.set_keep_trailing_newline(keep);
        self
    }

    /// Register application functions, filters or globals.
    ///
    /// ```rust
    /// use acton_webui::templates::TemplateEngine;
    ///
    /// let engine = TemplateEngine::builder()
    ///     .configure(|env| env.add_function("shout", |s: String| s.to_uppercase()))
    ///     .build();
    /// let out = engine.render_sources(&(), &[("a.tpl", r#"{{ shout("hi") }}"#)]).unwrap();
    /// assert_eq!(out, "HI");
    /// ```
    #[must_use]
    pub fn configure<F>(mut self, f: F) -> Self
    where
        F: FnOnce(&mut Environment<'static>),
    {
        f(&mut self.env);
        self
    }

    /// Freeze the registry and produce the engine.
    #[must_use]
    pub fn build(self) -> TemplateEngine {
        TemplateEngine {
            inner: Arc::new(EngineInner {
                env: self.env,
                root: self.root,
            }),
        }
    }
}

fn base_name(identifier: &str) -> &str {
    identifier
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(identifier)
}
