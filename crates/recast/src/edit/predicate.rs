//! Side-effect-free tests over documents.

use std::sync::Arc;

use regex::Regex;
use serde_json::Value;

use crate::pointer;

type PredicateFn = dyn Fn(&Value) -> bool + Send + Sync;
type KeyPredicateFn = dyn Fn(&str) -> Predicate + Send + Sync;

/// A boolean test over a document, used by the conditional combinators.
#[derive(Clone)]
pub struct Predicate(Arc<PredicateFn>);

impl Predicate {
    /// Wrap an arbitrary test closure.
    pub fn new<F>(test: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Predicate(Arc::new(test))
    }

    /// Evaluate against `doc`.
    pub fn eval(&self, doc: &Value) -> bool {
        (self.0)(doc)
    }

    /// True iff `path` resolves.
    pub fn exists(path: impl Into<String>) -> Predicate {
        let path = path.into();
        Predicate::new(move |doc| pointer::get(doc, &path).is_ok())
    }

    /// True iff the value at `path` is null, the zero value for its scalar
    /// type (empty string, zero number, false), or an empty object or
    /// sequence. False, not an error, when the path does not resolve.
    pub fn value_empty(path: impl Into<String>) -> Predicate {
        let path = path.into();
        Predicate::new(move |doc| pointer::get(doc, &path).is_ok_and(is_empty_value))
    }

    /// Deep structural equality with `expected`. False when the path does
    /// not resolve.
    pub fn value_equals(path: impl Into<String>, expected: impl Into<Value>) -> Predicate {
        let (path, expected) = (path.into(), expected.into());
        Predicate::new(move |doc| pointer::get(doc, &path).is_ok_and(|value| *value == expected))
    }

    /// True iff the string at `path` matches `pattern`.
    ///
    /// Reads through the lenient string get: a missing path tests the
    /// empty string, and a resolved non-string value is false.
    pub fn value_matches(path: impl Into<String>, pattern: Regex) -> Predicate {
        let path = path.into();
        Predicate::new(move |doc| {
            pointer::get_str(doc, &path).is_ok_and(|text| pattern.is_match(text))
        })
    }

    /// Logical negation.
    pub fn not(self) -> Predicate {
        Predicate::new(move |doc| !self.eval(doc))
    }
}

/// A predicate parameterized by a path supplied later, the test-side
/// counterpart of [`super::KeyUpdater`].
#[derive(Clone)]
pub struct KeyPredicate(Arc<KeyPredicateFn>);

impl KeyPredicate {
    /// Wrap a path-to-predicate constructor.
    pub fn new<F>(make: F) -> Self
    where
        F: Fn(&str) -> Predicate + Send + Sync + 'static,
    {
        KeyPredicate(Arc::new(make))
    }

    /// Bind `path`, yielding the concrete test for that location.
    pub fn bind(&self, path: &str) -> Predicate {
        (self.0)(path)
    }
}

fn is_empty_value(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
    }
}
