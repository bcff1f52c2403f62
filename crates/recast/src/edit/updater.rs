//! In-place document edits as first-class, composable values.

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::error::{RecastError, Result};
use crate::pointer;
use crate::template;

use super::predicate::{KeyPredicate, Predicate};

type UpdateFn = dyn Fn(&mut Value) -> Result<()> + Send + Sync;
type KeyUpdateFn = dyn Fn(&str) -> Updater + Send + Sync;

/// One deterministic, in-place edit of a document.
///
/// The `Default` value is the vacant updater, a legal no-op whose
/// [`apply`](Updater::apply) succeeds without touching the document;
/// combinators can therefore be built incrementally without sentinel
/// checks.
#[derive(Clone, Default)]
pub struct Updater(Option<Arc<UpdateFn>>);

impl Updater {
    /// Wrap an arbitrary edit closure.
    pub fn new<F>(edit: F) -> Self
    where
        F: Fn(&mut Value) -> Result<()> + Send + Sync + 'static,
    {
        Updater(Some(Arc::new(edit)))
    }

    /// The vacant updater.
    pub fn noop() -> Self {
        Updater(None)
    }

    /// Run the edit against `doc`.
    pub fn apply(&self, doc: &mut Value) -> Result<()> {
        match &self.0 {
            Some(edit) => edit(doc),
            None => Ok(()),
        }
    }

    /// Run `self`, then `next`; a failure in `self` propagates without
    /// running `next`.
    pub fn then(self, next: Updater) -> Updater {
        Updater::new(move |doc| {
            self.apply(doc)?;
            next.apply(doc)
        })
    }

    /// Sequence any number of updaters in order; an empty sequence yields
    /// the vacant updater.
    pub fn compose<I>(updaters: I) -> Updater
    where
        I: IntoIterator<Item = Updater>,
    {
        updaters.into_iter().fold(Updater::noop(), Updater::then)
    }

    /// Set `path` to `value`.
    ///
    /// String values pass through the template expander against the
    /// document state at apply time.
    pub fn set(path: impl Into<String>, value: impl Into<Value>) -> Updater {
        let (path, value) = (path.into(), value.into());
        Updater::new(move |doc| pointer::set(doc, &path, value.clone()))
    }

    /// Delete the value at `path`.
    pub fn delete(path: impl Into<String>) -> Updater {
        let path = path.into();
        Updater::new(move |doc| pointer::delete(doc, &path))
    }

    /// Copy the value at `from` to `to`.
    pub fn copy(from: impl Into<String>, to: impl Into<String>) -> Updater {
        let (from, to) = (from.into(), to.into());
        Updater::new(move |doc| pointer::copy(doc, &from, &to))
    }

    /// Move the value at `from` to `to`.
    pub fn rename(from: impl Into<String>, to: impl Into<String>) -> Updater {
        let (from, to) = (from.into(), to.into());
        Updater::new(move |doc| pointer::rename(doc, &from, &to))
    }

    /// Replace the value at `path` with `f` applied to it.
    pub fn transform<F>(path: impl Into<String>, f: F) -> Updater
    where
        F: Fn(Value) -> Result<Value> + Send + Sync + 'static,
    {
        let path = path.into();
        Updater::new(move |doc| pointer::transform(doc, &path, |value| f(value)))
    }

    /// Regex replace-all on the string at `path`.
    ///
    /// The path must resolve to a string; a missing path is a path error
    /// and a resolved non-string a type mismatch, with the document left
    /// untouched either way. The replacement is template-expanded before
    /// the rewrite; `$1`-style capture references in the expanded
    /// replacement are honored by the regex engine. The result is written
    /// back through `set`.
    pub fn regex(
        path: impl Into<String>,
        pattern: Regex,
        replacement: impl Into<String>,
    ) -> Updater {
        let (path, replacement) = (path.into(), replacement.into());
        Updater::new(move |doc| replace_at(doc, &path, &pattern, &replacement))
    }

    /// Like [`Updater::regex`], except the match pattern is itself
    /// template-expanded and compiled at apply time; an invalid expanded
    /// pattern fails with a regex error.
    pub fn regex_match(
        path: impl Into<String>,
        pattern_template: impl Into<String>,
        replacement: impl Into<String>,
    ) -> Updater {
        let (path, pattern_template, replacement) =
            (path.into(), pattern_template.into(), replacement.into());
        Updater::new(move |doc| {
            let pattern = Regex::new(&template::expand(doc, &pattern_template)?)?;
            replace_at(doc, &path, &pattern, &replacement)
        })
    }

    /// Apply `edit`, bound to each child path in turn, to every child of
    /// the container at `path`. Single level; see [`pointer::walk`].
    pub fn walk(path: impl Into<String>, edit: KeyUpdater) -> Updater {
        let path = path.into();
        Updater::new(move |doc| {
            pointer::walk(doc, &path, |doc, child| edit.bind(child).apply(doc))
        })
    }

    /// Dispatch on `pred` at apply time: `on_true` when it holds,
    /// `on_false` otherwise. Exactly one branch runs.
    pub fn when(pred: Predicate, on_true: Updater, on_false: Updater) -> Updater {
        Updater::new(move |doc| {
            if pred.eval(doc) {
                on_true.apply(doc)
            } else {
                on_false.apply(doc)
            }
        })
    }

    /// Path-bound conditional: binds `path` into the predicate and into
    /// whichever branch runs.
    pub fn when_key(
        path: impl Into<String>,
        pred: KeyPredicate,
        on_true: KeyUpdater,
        on_false: KeyUpdater,
    ) -> Updater {
        let path = path.into();
        Updater::new(move |doc| {
            let branch = if pred.bind(&path).eval(doc) {
                &on_true
            } else {
                &on_false
            };
            branch.bind(&path).apply(doc)
        })
    }
}

/// An updater parameterized by a path supplied later, for per-child edits
/// during a walk and for path-bound conditionals.
///
/// The `Default` value binds every path to the vacant [`Updater`].
#[derive(Clone, Default)]
pub struct KeyUpdater(Option<Arc<KeyUpdateFn>>);

impl KeyUpdater {
    /// Wrap a path-to-updater constructor.
    pub fn new<F>(make: F) -> Self
    where
        F: Fn(&str) -> Updater + Send + Sync + 'static,
    {
        KeyUpdater(Some(Arc::new(make)))
    }

    /// The vacant key updater.
    pub fn noop() -> Self {
        KeyUpdater(None)
    }

    /// Bind `path`, yielding the concrete edit for that location.
    pub fn bind(&self, path: &str) -> Updater {
        match &self.0 {
            Some(make) => make(path),
            None => Updater::noop(),
        }
    }
}

/// Shared body of the regex edits: strict string read, expanded
/// replacement, replace-all, write back through `set`.
fn replace_at(doc: &mut Value, path: &str, pattern: &Regex, replacement: &str) -> Result<()> {
    let current = match pointer::get(doc, path)? {
        Value::String(text) => text.clone(),
        other => return Err(RecastError::type_mismatch(path, "string", other)),
    };
    let expanded = template::expand(doc, replacement)?;
    let next = pattern.replace_all(&current, expanded.as_str()).into_owned();
    pointer::set(doc, path, Value::String(next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_noop_and_default_do_nothing() {
        let mut doc = json!({"a": 1});
        Updater::noop().apply(&mut doc).unwrap();
        Updater::default().apply(&mut doc).unwrap();
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn test_set_accepts_plain_values() {
        let mut doc = json!({});
        Updater::set("/s", "text").apply(&mut doc).unwrap();
        Updater::set("/n", 7).apply(&mut doc).unwrap();
        Updater::set("/o", json!({"k": true})).apply(&mut doc).unwrap();
        assert_eq!(doc, json!({"s": "text", "n": 7, "o": {"k": true}}));
    }

    #[test]
    fn test_updater_is_reusable() {
        let bump = Updater::transform("/n", |v| {
            Ok(json!(v.as_i64().unwrap_or_default() + 1))
        });
        let mut doc = json!({"n": 0});
        bump.apply(&mut doc).unwrap();
        bump.apply(&mut doc).unwrap();
        assert_eq!(doc["n"], json!(2));
    }

    #[test]
    fn test_then_runs_in_order() {
        let mut doc = json!({});
        Updater::set("/a", "1")
            .then(Updater::rename("/a", "/b"))
            .apply(&mut doc)
            .unwrap();
        assert_eq!(doc, json!({"b": "1"}));
    }

    #[test]
    fn test_then_short_circuits_on_failure() {
        let ran = Arc::new(AtomicUsize::new(0));
        let observed = ran.clone();
        let second = Updater::new(move |_| {
            observed.fetch_add(1, Ordering::SeqCst);
            Ok(())
        });
        let mut doc = json!({});
        let err = Updater::delete("/missing").then(second).apply(&mut doc);
        assert!(err.is_err());
        assert_eq!(ran.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_compose_empty_is_noop() {
        let mut doc = json!({"a": 1});
        Updater::compose([]).apply(&mut doc).unwrap();
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn test_compose_runs_all_in_order() {
        let mut doc = json!({});
        Updater::compose([
            Updater::set("/a", "x"),
            Updater::copy("/a", "/b"),
            Updater::delete("/a"),
        ])
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc, json!({"b": "x"}));
    }

    #[test]
    fn test_compose_stops_at_first_failure() {
        let mut doc = json!({});
        let err = Updater::compose([
            Updater::set("/a", 1),
            Updater::delete("/missing"),
            Updater::set("/never", true),
        ])
        .apply(&mut doc)
        .unwrap_err();
        assert!(matches!(err, RecastError::PathNotFound { .. }));
        assert_eq!(doc, json!({"a": 1}));
    }

    #[test]
    fn test_when_dispatches_to_one_branch() {
        let mut doc = json!({"flag": true});
        Updater::when(
            Predicate::exists("/flag"),
            Updater::set("/taken", "true-branch"),
            Updater::set("/taken", "false-branch"),
        )
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc["taken"], json!("true-branch"));

        let mut doc = json!({});
        Updater::when(
            Predicate::exists("/flag"),
            Updater::set("/taken", "true-branch"),
            Updater::set("/taken", "false-branch"),
        )
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc["taken"], json!("false-branch"));
    }

    #[test]
    fn test_when_with_vacant_branch() {
        let mut doc = json!({});
        Updater::when(
            Predicate::exists("/flag"),
            Updater::set("/taken", true),
            Updater::noop(),
        )
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc, json!({}));
    }

    #[test]
    fn test_when_key_binds_path_everywhere() {
        let clear_if_empty = Updater::when_key(
            "/opt",
            KeyPredicate::new(|path| Predicate::value_empty(path)),
            KeyUpdater::new(|path| Updater::delete(path)),
            KeyUpdater::noop(),
        );
        let mut doc = json!({"opt": "", "other": 1});
        clear_if_empty.apply(&mut doc).unwrap();
        assert_eq!(doc, json!({"other": 1}));

        let mut doc = json!({"opt": "set", "other": 1});
        clear_if_empty.apply(&mut doc).unwrap();
        assert_eq!(doc, json!({"opt": "set", "other": 1}));
    }

    #[test]
    fn test_walk_per_child_rename() {
        let mut doc = json!({"xs": [{"old": 1}, {"old": 2}]});
        Updater::walk(
            "/xs",
            KeyUpdater::new(|child| {
                Updater::rename(format!("{child}/old"), format!("{child}/new"))
            }),
        )
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc, json!({"xs": [{"new": 1}, {"new": 2}]}));
    }

    #[test]
    fn test_walk_with_vacant_key_updater() {
        let mut doc = json!({"xs": [1, 2]});
        Updater::walk("/xs", KeyUpdater::noop())
            .apply(&mut doc)
            .unwrap();
        assert_eq!(doc, json!({"xs": [1, 2]}));
    }

    #[test]
    fn test_regex_replace() {
        let mut doc = json!({"greeting": "hello world"});
        Updater::regex("/greeting", Regex::new("world").unwrap(), "there")
            .apply(&mut doc)
            .unwrap();
        assert_eq!(doc["greeting"], json!("hello there"));
    }

    #[test]
    fn test_regex_replacement_is_template_expanded() {
        let mut doc = json!({"who": "crew", "greeting": "hello world"});
        Updater::regex(
            "/greeting",
            Regex::new("world").unwrap(),
            "{{key \"/who\"}}",
        )
        .apply(&mut doc)
        .unwrap();
        assert_eq!(doc["greeting"], json!("hello crew"));
    }

    #[test]
    fn test_regex_missing_path_fails_and_leaves_document() {
        let mut doc = json!({"present": "x"});
        let err = Updater::regex("/absent", Regex::new("^$").unwrap(), "conjured")
            .apply(&mut doc)
            .unwrap_err();
        assert!(matches!(err, RecastError::PathNotFound { .. }));
        assert_eq!(doc, json!({"present": "x"}));

        let err = Updater::regex_match("/absent", "^$", "conjured")
            .apply(&mut doc)
            .unwrap_err();
        assert!(matches!(err, RecastError::PathNotFound { .. }));
        assert_eq!(doc, json!({"present": "x"}));
    }

    #[test]
    fn test_regex_non_string_value_fails() {
        let mut doc = json!({"n": 7});
        let err = Updater::regex("/n", Regex::new("7").unwrap(), "8")
            .apply(&mut doc)
            .unwrap_err();
        assert!(matches!(err, RecastError::TypeMismatch { .. }));
        assert_eq!(doc, json!({"n": 7}));
    }

    #[test]
    fn test_regex_match_capture_groups() {
        let mut doc = json!({"v": "item42"});
        Updater::regex_match("/v", r"item(\d+)", "num$1")
            .apply(&mut doc)
            .unwrap();
        assert_eq!(doc["v"], json!("num42"));
    }

    #[test]
    fn test_regex_match_pattern_is_template_expanded() {
        let mut doc = json!({"needle": "b+", "v": "abbbc"});
        Updater::regex_match("/v", "{{key \"/needle\"}}", "B")
            .apply(&mut doc)
            .unwrap();
        assert_eq!(doc["v"], json!("aBc"));
    }

    #[test]
    fn test_regex_match_invalid_pattern_fails() {
        let mut doc = json!({"v": "x"});
        let err = Updater::regex_match("/v", "(unclosed", "y")
            .apply(&mut doc)
            .unwrap_err();
        assert!(matches!(err, RecastError::Regex(_)));
    }

    #[test]
    fn test_key_updater_bind() {
        let delete_child = KeyUpdater::new(|path| Updater::delete(path));
        let mut doc = json!({"a": 1, "b": 2});
        delete_child.bind("/a").apply(&mut doc).unwrap();
        assert_eq!(doc, json!({"b": 2}));
    }

    #[test]
    fn test_handles_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Updater>();
        assert_send_sync::<KeyUpdater>();
    }
}
