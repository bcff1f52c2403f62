//! The schema-conformance chain.
//!
//! A chain is a singly linked list of [`Conformer`] nodes from the newest
//! schema version (head) to the oldest (tail). Conforming a document finds
//! the newest ancestor contract the data already satisfies, then replays
//! each node's forward-migration edit on the way back up, validating at
//! every hop.

use std::sync::Arc;

use serde_json::Value;

use crate::edit::Updater;
use crate::error::Result;
use crate::schema::Contract;

/// One migration hop: a contract plus the edit that brings a document
/// matching the next (older) node's contract up to this one.
///
/// Chains are built once, typically at startup, and carry no per-call
/// state; a chain may be shared across threads and invoked concurrently
/// on different documents.
pub struct Conformer {
    contract: Arc<dyn Contract>,
    updater: Updater,
    next: Option<Box<Conformer>>,
}

impl Conformer {
    /// Node for `contract` with the vacant updater and no older link,
    /// which is what a chain tail wants.
    pub fn new(contract: impl Contract + 'static) -> Self {
        Conformer {
            contract: Arc::new(contract),
            updater: Updater::noop(),
            next: None,
        }
    }

    /// Attach the edit that migrates a document from the next node's
    /// shape to this node's shape.
    pub fn with_updater(mut self, updater: Updater) -> Self {
        self.updater = updater;
        self
    }

    /// Link the next (older) node.
    pub fn with_next(mut self, next: Conformer) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    /// Conform `doc` to this node's contract.
    ///
    /// A document that already satisfies the contract is returned
    /// untouched. Otherwise the call recurses down the chain; once some
    /// older node accepts (and migrates) the document, this node's
    /// updater runs and the result is checked again.
    ///
    /// On failure the returned error is this node's own validation error;
    /// deeper validation errors and updater errors are suppressed, so the
    /// caller always sees why the document does not satisfy *this*
    /// contract. A failed call may leave edits from deeper nodes applied.
    pub fn conform(&self, doc: &mut Value) -> Result<()> {
        let own_err = match self.check(doc) {
            Ok(()) => return Ok(()),
            Err(err) => err,
        };
        let Some(next) = &self.next else {
            return Err(own_err);
        };
        if next.conform(doc).is_err() {
            return Err(own_err);
        }
        if self.updater.apply(doc).is_err() {
            return Err(own_err);
        }
        self.check(doc)
    }

    /// Non-mutating contract check: defaults are applied to a private
    /// structural copy, and that copy is validated.
    fn check(&self, doc: &Value) -> Result<()> {
        let mut probe = doc.clone();
        self.contract.apply_defaults(&mut probe)?;
        self.contract.validate(&probe)
    }
}
