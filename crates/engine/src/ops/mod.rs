//! Store-facing engine operations, one module per concern.

mod edits;
mod entries;
mod reports;

pub use edits::{EntryUpdate, UpdateOutcome};
pub use entries::LoggedEntry;
