//! Composable, path-addressed document edits.
//!
//! The algebra has four value kinds: [`Updater`] (one in-place edit),
//! [`KeyUpdater`] (an edit waiting for its path), [`Predicate`] (a test
//! over a document), and [`KeyPredicate`] (a test waiting for its path).
//! All four are cheap-to-clone, thread-safe handles around immutable
//! closures, so a combinator tree built once can be applied to any number
//! of documents.

pub mod predicate;
pub mod updater;

pub use predicate::{KeyPredicate, Predicate};
pub use updater::{KeyUpdater, Updater};
