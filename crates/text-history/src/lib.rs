//! Versioned in-memory text document.
//!
//! A `History` applies insert, replace and delete actions to a string one at
//! a time, numbering each resulting state with a new version and keeping
//! every applied action in an append-only log. Range queries over the log
//! return a compacted, text-equivalent copy of the selected actions.

pub mod action;
pub mod compact;
pub mod config;
pub mod error;
pub mod history;

pub use action::{replay, Action, ActionKind};
pub use compact::compact;
pub use config::HistoryConfig;
pub use error::{HistoryError, Result};
pub use history::History;
