//! Recast: schema-conformance chains for JSON-like documents.
//!
//! Recast takes a document that may match any of several historical schema
//! versions and migrates it forward, one version hop at a time, until it
//! satisfies the current schema, or fails with that schema's own
//! validation error.
//!
//! # Core Principles
//!
//! - **Migrate, don't reject**: outdated-but-recognized documents are
//!   rewritten forward instead of bounced back to the caller
//! - **Path-addressed edits**: every migration step is composed from small
//!   JSON-Pointer edits that can reference other fields through
//!   `{{key "/path"}}` templates
//! - **Caller-relevant errors**: a failed conformance always reports the
//!   target schema's validation error, never an intermediate one
//!
//! # Example
//!
//! ```
//! use recast::{Conformer, Schema, Updater};
//! use serde_json::json;
//!
//! # fn main() -> recast::Result<()> {
//! // Current schema (v2) and its ancestor (v1).
//! let v2 = Schema::new(json!({
//!     "title": "config-v2",
//!     "type": "object",
//!     "properties": {"name": {"type": "string"}},
//!     "required": ["name"]
//! }))?;
//! let v1 = Schema::new(json!({
//!     "title": "config-v1",
//!     "type": "object",
//!     "properties": {"full_name": {"type": "string"}},
//!     "required": ["full_name"]
//! }))?;
//!
//! // One forward hop: v1 documents carry the value under "full_name".
//! let chain = Conformer::new(v2)
//!     .with_updater(Updater::rename("/full_name", "/name"))
//!     .with_next(Conformer::new(v1));
//!
//! let mut doc = json!({"full_name": "Ada Lovelace"});
//! chain.conform(&mut doc)?;
//! assert_eq!(doc, json!({"name": "Ada Lovelace"}));
//! # Ok(())
//! # }
//! ```

pub mod conform;
pub mod edit;
pub mod error;
pub mod pointer;
pub mod schema;
pub mod template;

pub use conform::Conformer;
pub use edit::{KeyPredicate, KeyUpdater, Predicate, Updater};
pub use error::{RecastError, Result, ValidationFailure, Violation};
pub use schema::{Contract, Schema};
