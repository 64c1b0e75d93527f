/// Error type shared by every fallible history operation.
use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, HistoryError>;

/// Why an action or a query was rejected.
///
/// Every error is raised before any state changes, so a `History` that
/// returned one of these is exactly as it was before the call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum HistoryError {
    /// The position lies past the end of the text, or the version interval
    /// does not advance.
    #[error(
        "invalid action: position {pos} with text length {text_len}, versions {from_version}..{to_version}"
    )]
    InvalidAction {
        pos: usize,
        text_len: usize,
        from_version: u64,
        to_version: u64,
    },
    /// A delete would run past the end of the text.
    #[error("cannot delete {length} chars at position {pos}: text length is {text_len}")]
    OutOfRange {
        pos: usize,
        length: usize,
        text_len: usize,
    },
    /// Query bounds lie outside `0..=version` or are inverted.
    #[error("invalid version range {from_version}..{to_version}: current version is {version}")]
    InvalidRange {
        from_version: u64,
        to_version: u64,
        version: u64,
    },
}
