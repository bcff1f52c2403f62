//! `{{key "/path"}}` placeholder expansion inside string values.
//!
//! A placeholder references another location in the same document; every
//! write that goes through [`crate::pointer::set`] expands placeholders in
//! string values against the document state at that moment.
//!
//! Substitution is a single left-to-right pass. Substituted values are
//! never re-scanned and brace sequences that are not `key` placeholders
//! pass through untouched, so a value that itself contains template syntax
//! cannot inject a second expansion into the same pass.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::{RecastError, Result};
use crate::pointer;

/// Recognizes a placeholder span, `{{` through the nearest `}}`.
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{\s*key\s.*?\}\}").unwrap());

/// Strict form of the inner expression: `key "<path>"`.
static KEY_EXPR: Lazy<Regex> = Lazy::new(|| Regex::new(r#"^\s*key\s+"([^"]*)"\s*$"#).unwrap());

/// Expand every `{{key "/path"}}` placeholder in `text` against `doc`.
///
/// A string with no placeholders is returned unchanged. Fails when a
/// recognized placeholder's inner expression is not exactly
/// `key "<path>"`, or when a referenced path cannot be resolved.
pub fn expand(doc: &Value, text: &str) -> Result<String> {
    if !PLACEHOLDER.is_match(text) {
        return Ok(text.to_string());
    }
    let mut out = String::with_capacity(text.len());
    let mut tail = 0;
    for placeholder in PLACEHOLDER.find_iter(text) {
        let whole = placeholder.as_str();
        let inner = &whole[2..whole.len() - 2];
        let path = KEY_EXPR
            .captures(inner)
            .map(|captures| captures[1].to_string())
            .ok_or_else(|| RecastError::template(format!("invalid placeholder '{whole}'")))?;
        let value = pointer::get(doc, &path)
            .map_err(|err| RecastError::template(format!("cannot resolve '{path}': {err}")))?;
        out.push_str(&text[tail..placeholder.start()]);
        out.push_str(&render(value));
        tail = placeholder.end();
    }
    out.push_str(&text[tail..]);
    Ok(out)
}

/// String form of a looked-up value: strings verbatim, everything else as
/// compact JSON text.
fn render(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
