//! Structural contracts: schema validation plus schema-declared defaults.

use std::fmt;
use std::sync::Arc;

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::error::{RecastError, Result, ValidationFailure, Violation};

/// The schema-engine seam the conformer chain works against.
///
/// `apply_defaults` fills schema-declared default values into a document
/// in place; `validate` is a pure check. Implementations are immutable
/// after construction and safe to share across threads.
pub trait Contract: Send + Sync {
    /// Fill schema-declared defaults into `doc` in place.
    fn apply_defaults(&self, doc: &mut Value) -> Result<()>;

    /// Check `doc` against the contract without mutating it.
    fn validate(&self, doc: &Value) -> Result<()>;
}

/// Shared contracts satisfy the seam too, so one compiled schema can back
/// any number of chains.
impl<C: Contract + ?Sized> Contract for Arc<C> {
    fn apply_defaults(&self, doc: &mut Value) -> Result<()> {
        (**self).apply_defaults(doc)
    }

    fn validate(&self, doc: &Value) -> Result<()> {
        (**self).validate(doc)
    }
}

/// A compiled JSON Schema.
///
/// The draft is detected from `$schema`, defaulting to draft 7. The raw
/// schema document is retained for the defaults walk.
pub struct Schema {
    raw: Value,
    compiled: JSONSchema,
    title: Option<String>,
}

impl Schema {
    /// Compile a schema document.
    pub fn new(schema: Value) -> Result<Self> {
        let compiled =
            JSONSchema::compile(&schema).map_err(|err| RecastError::Schema(err.to_string()))?;
        let title = schema
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_owned);
        Ok(Schema {
            raw: schema,
            compiled,
            title,
        })
    }

    /// Parse and compile a schema from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        Schema::new(serde_json::from_str(text)?)
    }

    /// The schema's declared title, when present. Surfaced in validation
    /// failures so multi-version chains produce self-identifying errors.
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    /// Borrow the raw schema document.
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl fmt::Debug for Schema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("title", &self.title)
            .finish_non_exhaustive()
    }
}

impl Contract for Schema {
    fn apply_defaults(&self, doc: &mut Value) -> Result<()> {
        fill_defaults(doc, &self.raw);
        Ok(())
    }

    fn validate(&self, doc: &Value) -> Result<()> {
        if let Err(errors) = self.compiled.validate(doc) {
            let violations = errors
                .map(|err| Violation {
                    path: err.instance_path.to_string(),
                    message: err.to_string(),
                })
                .collect();
            return Err(RecastError::Validation(ValidationFailure {
                schema: self.title.clone(),
                violations,
            }));
        }
        Ok(())
    }
}

/// Recursive defaults walk over the raw schema.
///
/// A null value whose schema declares a `default` receives a clone of it;
/// `properties` and `items` recurse. `$ref` is not resolved, and a value
/// whose shape does not match the keyword (scalar against `properties`,
/// say) is left alone.
fn fill_defaults(value: &mut Value, schema: &Value) {
    let Some(schema) = schema.as_object() else {
        return;
    };
    if value.is_null() {
        if let Some(default) = schema.get("default") {
            *value = default.clone();
        }
    }
    if let Some(properties) = schema.get("properties").and_then(Value::as_object) {
        if let Some(map) = value.as_object_mut() {
            for (name, property) in properties {
                let mut child = map.get(name).cloned().unwrap_or(Value::Null);
                fill_defaults(&mut child, property);
                if !child.is_null() {
                    map.insert(name.clone(), child);
                }
            }
        }
    }
    if let Some(items) = schema.get("items") {
        if let Some(list) = value.as_array_mut() {
            for item in list {
                fill_defaults(item, items);
            }
        }
    }
}
