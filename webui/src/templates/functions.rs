//! Functions available to every fragment.
//!
//! These are registered once, when the [`TemplateEngine`](super::TemplateEngine)
//! is built, and are shared read-only by every render afterwards.

use minijinja::Environment;

/// Register the built-in function table on an environment.
///
/// | Function | Example |
/// |---|---|
/// | `join(list, sep)` | `{{ join(tags, ", ") }}` |
/// | `replace_all(s, old, new)` | `{{ replace_all(path, "/", "-") }}` |
/// | `slices_contains(list, value)` | `{% if slices_contains(roles, "admin") %}` |
/// | `truncate(s, max_len)` | `{{ truncate(title, 20) }}` |
/// | `pluralize(count, singular, plural)` | `{{ pluralize(n, "item", "items") }}` |
/// | `classes(cond, if_true, if_false)` | `class="{{ classes(active, "on", "") }}"` |
pub(crate) fn register(env: &mut Environment<'static>) {
    env.add_function("join", join);
    env.add_function("replace_all", replace_all);
    env.add_function("slices_contains", slices_contains);
    env.add_function("truncate", truncate);
    env.add_function("pluralize", pluralize);
    env.add_function("classes", |condition: bool, if_true: String, if_false: String| {
        if condition {
            if_true
        } else {
            if_false
        }
    });
}

/// Concatenate strings with a separator.
///
/// ```rust
/// use acton_webui::templates::join;
///
/// assert_eq!(join(vec!["a".into(), "b".into()], "-"), "a-b");
/// ```
#[must_use]
pub fn join(values: Vec<String>, sep: &str) -> String {
    values.join(sep)
}

/// Replace every occurrence of `from` with `to`.
///
/// ```rust
/// use acton_webui::templates::replace_all;
///
/// assert_eq!(replace_all("a.b.c", ".", "/"), "a/b/c");
/// ```
#[must_use]
pub fn replace_all(s: &str, from: &str, to: &str) -> String {
    s.replace(from, to)
}

/// Whether `value` is one of `values`.
#[must_use]
pub fn slices_contains(values: Vec<String>, value: &str) -> bool {
    values.iter().any(|v| v == value)
}

/// Truncate text with ellipsis.
///
/// Lengths are counted in characters, so multi-byte text is never split
/// inside a code point.
///
/// ```rust
/// use acton_webui::templates::truncate;
///
/// assert_eq!(truncate("Hello, World!", 5), "He...");
/// assert_eq!(truncate("Hi", 10), "Hi");
/// ```
#[must_use]
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{kept}...")
    }
}

/// Pluralize a word based on count.
///
/// ```rust
/// use acton_webui::templates::pluralize;
///
/// assert_eq!(pluralize(1, "item", "items"), "item");
/// assert_eq!(pluralize(0, "item", "items"), "items");
/// ```
#[must_use]
pub fn pluralize(count: i64, singular: &str, plural: &str) -> String {
    if count == 1 {
        singular.to_string()
    } else {
        plural.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use minijinja::context;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("Hello, World!", 5), "He...");
        assert_eq!(truncate("Hi", 10), "Hi");
        assert_eq!(truncate("", 5), "");
        assert_eq!(truncate("Test", 4), "Test");
        assert_eq!(truncate("Test", 3), "...");
        assert_eq!(truncate("العربية", 5), "ال...");
    }

    #[test]
    fn test_pluralize() {
        assert_eq!(pluralize(0, "item", "items"), "items");
        assert_eq!(pluralize(1, "item", "items"), "item");
        assert_eq!(pluralize(2, "item", "items"), "items");
        assert_eq!(pluralize(-1, "item", "items"), "items");
    }

    #[test]
    fn test_slices_contains() {
        let values = vec!["en".to_string(), "fr".to_string()];
        assert!(slices_contains(values.clone(), "fr"));
        assert!(!slices_contains(values, "ar"));
    }

    #[test]
    fn test_registered_functions_render() {
        let mut env = Environment::new();
        register(&mut env);

        let out = env
            .render_str(
                r#"{{ join(tags, ",") }}|{{ replace_all("a-b", "-", "+") }}|{{ slices_contains(tags, "y") }}|{{ classes(on, "active", "idle") }}|{{ pluralize(2, "row", "rows") }}"#,
                context! { tags => vec!["x", "y"], on => false },
            )
            .unwrap();

        assert_eq!(out, "x,y|a+b|true|idle|rows");
    }
}
