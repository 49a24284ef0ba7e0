//! Passes that act on a report or on the deletion log
//!
//! - [`LocalDeletionPass`] reads the report and removes `clean` refs locally,
//!   recording each removal in the deletion log.
//! - [`RemoteMirror`] replays the deletion log against a remote, either
//!   deleting the branches there or pushing back branches restored locally.
//!
//! All passes are best effort: a failing ref is reported and the pass moves
//! on to the next one.

mod local;
mod mirror;

pub use local::{Candidate, DeletionAttempt, LocalDeletionPass, LocalDeletionReport, RefKind};
pub use mirror::{MirrorAction, MirrorOutcome, RemoteMirror};
