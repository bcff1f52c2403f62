//! Error types for the recast library.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Main error type for recast operations.
#[derive(Debug, Error)]
pub enum RecastError {
    /// Pointer string that does not follow JSON-Pointer syntax.
    #[error("Invalid path '{path}': {reason}")]
    InvalidPath { path: String, reason: String },

    /// Well-formed pointer whose target does not exist.
    #[error("Path not found: '{path}'")]
    PathNotFound { path: String },

    /// Sequence index past the end of the addressed array.
    #[error("Index {index} out of bounds (len {len}) at '{path}'")]
    IndexOutOfBounds {
        path: String,
        index: usize,
        len: usize,
    },

    /// Value at a resolved path has the wrong shape for the operation.
    #[error("Type mismatch at '{path}': expected {expected}, found {found}")]
    TypeMismatch {
        path: String,
        expected: String,
        found: String,
    },

    /// Malformed placeholder, or a placeholder referencing an unresolvable path.
    #[error("Template error: {0}")]
    Template(String),

    /// Schema document that failed to compile.
    #[error("Invalid schema: {0}")]
    Schema(String),

    /// Document rejected by a schema's structural contract.
    #[error("{0}")]
    Validation(ValidationFailure),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Regex compilation error.
    #[error("Regex error: {0}")]
    Regex(#[from] regex::Error),
}

impl RecastError {
    /// Malformed-pointer error with a human-readable reason.
    pub fn invalid_path(path: impl Into<String>, reason: impl Into<String>) -> Self {
        RecastError::InvalidPath {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Unresolvable-path error.
    pub fn not_found(path: impl Into<String>) -> Self {
        RecastError::PathNotFound { path: path.into() }
    }

    /// Out-of-bounds sequence index error.
    pub fn index_out_of_bounds(path: impl Into<String>, index: usize, len: usize) -> Self {
        RecastError::IndexOutOfBounds {
            path: path.into(),
            index,
            len,
        }
    }

    /// Wrong-shape error naming the expected and the actual JSON type.
    pub fn type_mismatch(path: impl Into<String>, expected: &str, found: &Value) -> Self {
        RecastError::TypeMismatch {
            path: path.into(),
            expected: expected.to_string(),
            found: value_type_name(found).to_string(),
        }
    }

    /// Template expansion error.
    pub fn template(message: impl Into<String>) -> Self {
        RecastError::Template(message.into())
    }
}

/// Details of a document rejected by a schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationFailure {
    /// Declared title of the rejecting schema, when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,
    /// One entry per violated constraint.
    pub violations: Vec<Violation>,
}

/// A single violated schema constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Instance path of the offending value; empty for the document root.
    pub path: String,
    /// Constraint description from the schema engine.
    pub message: String,
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(name) => write!(f, "Document does not conform to schema '{name}'")?,
            None => write!(f, "Document does not conform to schema")?,
        }
        for (i, violation) in self.violations.iter().enumerate() {
            f.write_str(if i == 0 { ": " } else { "; " })?;
            if !violation.path.is_empty() {
                write!(f, "{}: ", violation.path)?;
            }
            f.write_str(&violation.message)?;
        }
        Ok(())
    }
}

/// Name of a JSON value's type, for error messages.
pub fn value_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Result type alias for recast operations.
pub type Result<T> = std::result::Result<T, RecastError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_value_type_name() {
        assert_eq!(value_type_name(&json!(null)), "null");
        assert_eq!(value_type_name(&json!(true)), "boolean");
        assert_eq!(value_type_name(&json!(1.5)), "number");
        assert_eq!(value_type_name(&json!("x")), "string");
        assert_eq!(value_type_name(&json!([])), "array");
        assert_eq!(value_type_name(&json!({})), "object");
    }

    #[test]
    fn test_type_mismatch_message() {
        let err = RecastError::type_mismatch("/a/b", "string", &json!(7));
        assert_eq!(
            err.to_string(),
            "Type mismatch at '/a/b': expected string, found number"
        );
    }

    #[test]
    fn test_validation_failure_display() {
        let failure = ValidationFailure {
            schema: Some("config-v2".to_string()),
            violations: vec![
                Violation {
                    path: String::new(),
                    message: "\"name\" is a required property".to_string(),
                },
                Violation {
                    path: "/port".to_string(),
                    message: "\"high\" is not of type \"integer\"".to_string(),
                },
            ],
        };
        assert_eq!(
            failure.to_string(),
            "Document does not conform to schema 'config-v2': \
             \"name\" is a required property; \
             /port: \"high\" is not of type \"integer\""
        );
    }

    #[test]
    fn test_validation_failure_display_untitled() {
        let failure = ValidationFailure {
            schema: None,
            violations: vec![],
        };
        assert_eq!(failure.to_string(), "Document does not conform to schema");
    }
}
