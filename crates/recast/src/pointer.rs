//! Path-addressed access to JSON-like documents.
//!
//! Paths use JSON-Pointer syntax: `/`-separated segments with `~0`/`~1`
//! escaping for `~` and `/` inside segment names. The empty path addresses
//! the document root. Paths are purely syntactic; whether one resolves is
//! only decided against a concrete document.

use serde_json::{Map, Value};

use crate::error::{RecastError, Result};
use crate::template;

// =============================================================================
// ACCESSOR OPERATIONS
// =============================================================================

/// Borrow the value at `path`.
///
/// Fails when the pointer is malformed or any segment does not resolve:
/// a missing object key, a sequence index past the end, or a traversal
/// through a scalar.
pub fn get<'a>(doc: &'a Value, path: &str) -> Result<&'a Value> {
    let segments = split(path)?;
    let mut current = doc;
    for segment in &segments {
        current = match current {
            Value::Object(map) => map
                .get(segment.as_str())
                .ok_or_else(|| RecastError::not_found(path))?,
            Value::Array(items) => {
                let index = parse_index(segment, path)?;
                let len = items.len();
                items
                    .get(index)
                    .ok_or_else(|| RecastError::index_out_of_bounds(path, index, len))?
            }
            other => return Err(RecastError::type_mismatch(path, "object or array", other)),
        };
    }
    Ok(current)
}

/// Borrow the string at `path`.
///
/// A path that does not resolve reads as the empty string rather than an
/// error; consumers relying on this looseness should pair it with an
/// existence check when the distinction matters. A resolved non-string
/// value is a type mismatch.
pub fn get_str<'a>(doc: &'a Value, path: &str) -> Result<&'a str> {
    match get(doc, path) {
        Ok(Value::String(text)) => Ok(text),
        Ok(other) => Err(RecastError::type_mismatch(path, "string", other)),
        Err(_) => Ok(""),
    }
}

/// Create or overwrite the value at `path`.
///
/// Missing or null object members along the way become empty objects; an
/// existing scalar intermediate is a type mismatch. A sequence index must
/// be in bounds, except that the final segment may equal the sequence
/// length, which appends. The empty path replaces the whole document.
///
/// A string `value` is first passed through the template expander against
/// the current document state, so placeholder resolution happens before
/// the write.
pub fn set(doc: &mut Value, path: &str, value: Value) -> Result<()> {
    let value = match value {
        Value::String(text) => Value::String(template::expand(doc, &text)?),
        other => other,
    };
    let segments = split(path)?;
    let Some((last, parents)) = segments.split_last() else {
        *doc = value;
        return Ok(());
    };
    let parent = resolve_or_create(doc, path, parents)?;
    if parent.is_null() {
        *parent = Value::Object(Map::new());
    }
    match parent {
        Value::Object(map) => {
            map.insert(last.clone(), value);
            Ok(())
        }
        Value::Array(items) => {
            let index = parse_index(last, path)?;
            let len = items.len();
            if index < len {
                items[index] = value;
                Ok(())
            } else if index == len {
                items.push(value);
                Ok(())
            } else {
                Err(RecastError::index_out_of_bounds(path, index, len))
            }
        }
        other => Err(RecastError::type_mismatch(path, "object or array", other)),
    }
}

/// Remove the entry at `path`.
///
/// Fails when the path does not resolve. Removing a sequence element
/// shifts later elements down. The document root cannot be deleted.
pub fn delete(doc: &mut Value, path: &str) -> Result<()> {
    let segments = split(path)?;
    let Some((last, parents)) = segments.split_last() else {
        return Err(RecastError::invalid_path(
            path,
            "cannot delete the document root",
        ));
    };
    let parent = resolve_mut(doc, path, parents)?;
    match parent {
        Value::Object(map) => match map.remove(last.as_str()) {
            Some(_) => Ok(()),
            None => Err(RecastError::not_found(path)),
        },
        Value::Array(items) => {
            let index = parse_index(last, path)?;
            let len = items.len();
            if index < len {
                items.remove(index);
                Ok(())
            } else {
                Err(RecastError::index_out_of_bounds(path, index, len))
            }
        }
        other => Err(RecastError::type_mismatch(path, "object or array", other)),
    }
}

/// Copy the value at `from` to `to`.
///
/// Composite, not atomic: `get` then `set`. When `set` fails, `from` is
/// untouched and no compensating action is taken. Because the write goes
/// through [`set`], a copied string passes through the template expander.
pub fn copy(doc: &mut Value, from: &str, to: &str) -> Result<()> {
    let value = get(doc, from)?.clone();
    set(doc, to, value)
}

/// Move the value at `from` to `to`.
///
/// `copy` then `delete`. When `copy` fails, the document is unmodified.
/// When `copy` succeeds but `delete` fails, the value is present at both
/// paths; callers can treat that state as fatal.
pub fn rename(doc: &mut Value, from: &str, to: &str) -> Result<()> {
    copy(doc, from, to)?;
    delete(doc, from)
}

/// Replace the value at `path` with `f` applied to it.
///
/// Any failure, in the lookup or in `f`, aborts before the write. The
/// write goes through [`set`], so a string result passes through the
/// template expander.
pub fn transform<F>(doc: &mut Value, path: &str, f: F) -> Result<()>
where
    F: FnOnce(Value) -> Result<Value>,
{
    let current = get(doc, path)?.clone();
    let next = f(current)?;
    set(doc, path, next)
}

/// Invoke `edit` once per child of the container at `path`.
///
/// Objects walk every key (iteration order unspecified); sequences walk
/// indices `0..n-1` in order; anything else is a type mismatch. The child
/// path list is captured before the first edit runs, so edits that insert
/// or remove siblings do not change the current walk's schedule. Not
/// recursive: an edit that should descend calls `walk` again itself.
///
/// The first failing edit aborts the walk with its error.
pub fn walk<F>(doc: &mut Value, path: &str, mut edit: F) -> Result<()>
where
    F: FnMut(&mut Value, &str) -> Result<()>,
{
    let children: Vec<String> = match get(doc, path)? {
        Value::Object(map) => map.keys().map(|key| join_child(path, key)).collect(),
        Value::Array(items) => (0..items.len()).map(|i| format!("{path}/{i}")).collect(),
        other => return Err(RecastError::type_mismatch(path, "object or array", other)),
    };
    for child in &children {
        edit(doc, child)?;
    }
    Ok(())
}

// =============================================================================
// PATH UTILITIES
// =============================================================================

/// Build a pointer from unescaped segment names.
///
/// Segments are escaped as they are joined; no segments yields the root
/// path.
pub fn join<I, S>(segments: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut path = String::new();
    for segment in segments {
        path.push('/');
        path.push_str(&escape(segment.as_ref()));
    }
    path
}

/// Decompose a pointer into unescaped segment names.
///
/// The root path yields no segments. Fails when a non-empty pointer does
/// not begin with `/`.
pub fn split(path: &str) -> Result<Vec<String>> {
    if path.is_empty() {
        return Ok(Vec::new());
    }
    let Some(rest) = path.strip_prefix('/') else {
        return Err(RecastError::invalid_path(path, "must begin with '/'"));
    };
    Ok(rest.split('/').map(unescape).collect())
}

/// The final, unescaped segment name of `path`; empty for the root path.
pub fn leaf(path: &str) -> String {
    match path.rfind('/') {
        Some(idx) => unescape(&path[idx + 1..]),
        None => String::new(),
    }
}

// =============================================================================
// RESOLUTION INTERNALS
// =============================================================================

fn escape(segment: &str) -> String {
    segment.replace('~', "~0").replace('/', "~1")
}

fn unescape(segment: &str) -> String {
    segment.replace("~1", "/").replace("~0", "~")
}

fn join_child(base: &str, key: &str) -> String {
    format!("{base}/{}", escape(key))
}

fn parse_index(segment: &str, path: &str) -> Result<usize> {
    segment.parse::<usize>().map_err(|_| {
        RecastError::invalid_path(path, format!("'{segment}' is not a valid array index"))
    })
}

/// Strict descent to the value addressed by `segments`.
fn resolve_mut<'a>(doc: &'a mut Value, path: &str, segments: &[String]) -> Result<&'a mut Value> {
    let mut current = doc;
    for segment in segments {
        current = match current {
            Value::Object(map) => map
                .get_mut(segment.as_str())
                .ok_or_else(|| RecastError::not_found(path))?,
            Value::Array(items) => {
                let index = parse_index(segment, path)?;
                let len = items.len();
                items
                    .get_mut(index)
                    .ok_or_else(|| RecastError::index_out_of_bounds(path, index, len))?
            }
            other => return Err(RecastError::type_mismatch(path, "object or array", other)),
        };
    }
    Ok(current)
}

/// Descent that materializes missing object members as empty objects.
/// Sequence segments must still resolve to existing indices.
fn resolve_or_create<'a>(
    doc: &'a mut Value,
    path: &str,
    segments: &[String],
) -> Result<&'a mut Value> {
    let mut current = doc;
    for segment in segments {
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        current = match current {
            Value::Object(map) => map.entry(segment.clone()).or_insert(Value::Null),
            Value::Array(items) => {
                let index = parse_index(segment, path)?;
                let len = items.len();
                items
                    .get_mut(index)
                    .ok_or_else(|| RecastError::index_out_of_bounds(path, index, len))?
            }
            other => return Err(RecastError::type_mismatch(path, "object or array", other)),
        };
    }
    Ok(current)
}
