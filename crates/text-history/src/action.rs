/// Edit actions and how they transform text.
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{HistoryError, Result};

/// The edit an action performs.
///
/// Positions and lengths count chars, not bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ActionKind {
    /// Inserts `text` at `pos`.
    Insert { pos: usize, text: String },
    /// Overwrites as many chars as `text` holds, starting at `pos`.
    /// Whatever would overlap the end of the document is dropped.
    Replace { pos: usize, text: String },
    /// Removes `length` chars starting at `pos`.
    Delete { pos: usize, length: usize },
}

/// One recorded edit and the version interval it occupies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    #[serde(flatten)]
    pub kind: ActionKind,
    /// History version the action was applied on top of.
    pub from_version: u64,
    /// History version after the action. Widened when compaction merges
    /// several actions into one.
    pub to_version: u64,
}

impl Action {
    /// Creates an insert spanning `from_version..from_version + 1`.
    pub fn insert(pos: usize, text: impl Into<String>, from_version: u64) -> Self {
        Self::single_step(
            ActionKind::Insert {
                pos,
                text: text.into(),
            },
            from_version,
        )
    }

    /// Creates a replace spanning `from_version..from_version + 1`.
    pub fn replace(pos: usize, text: impl Into<String>, from_version: u64) -> Self {
        Self::single_step(
            ActionKind::Replace {
                pos,
                text: text.into(),
            },
            from_version,
        )
    }

    /// Creates a delete spanning `from_version..from_version + 1`.
    pub fn delete(pos: usize, length: usize, from_version: u64) -> Self {
        Self::single_step(ActionKind::Delete { pos, length }, from_version)
    }

    fn single_step(kind: ActionKind, from_version: u64) -> Self {
        Self {
            kind,
            from_version,
            to_version: from_version.saturating_add(1),
        }
    }

    /// Char offset the action targets.
    pub fn pos(&self) -> usize {
        match self.kind {
            ActionKind::Insert { pos, .. }
            | ActionKind::Replace { pos, .. }
            | ActionKind::Delete { pos, .. } => pos,
        }
    }

    /// Lowercase variant name, as used in the rendered form.
    pub fn name(&self) -> &'static str {
        match self.kind {
            ActionKind::Insert { .. } => "insert",
            ActionKind::Replace { .. } => "replace",
            ActionKind::Delete { .. } => "delete",
        }
    }

    /// Checks that the action can be applied to a text of `text_len` chars:
    /// the position lies within `0..=text_len` and the version interval
    /// advances.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidAction`] when either check fails.
    pub fn validate(&self, text_len: usize) -> Result<()> {
        let pos = self.pos();
        if pos > text_len || self.to_version <= self.from_version {
            return Err(HistoryError::InvalidAction {
                pos,
                text_len,
                from_version: self.from_version,
                to_version: self.to_version,
            });
        }
        Ok(())
    }

    /// Applies the action to `text` and returns the edited copy.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidAction`] if the position is past the
    /// end of `text`, and [`HistoryError::OutOfRange`] if a delete would run
    /// past the end.
    pub fn apply(&self, text: &str) -> Result<String> {
        let text_len = text.chars().count();
        let pos = self.pos();
        if pos > text_len {
            return Err(HistoryError::InvalidAction {
                pos,
                text_len,
                from_version: self.from_version,
                to_version: self.to_version,
            });
        }
        let start = byte_offset(text, pos);

        let edited = match &self.kind {
            ActionKind::Insert { text: inserted, .. } => {
                let mut out = String::with_capacity(text.len() + inserted.len());
                out.push_str(&text[..start]);
                out.push_str(inserted);
                out.push_str(&text[start..]);
                out
            }
            ActionKind::Replace { text: inserted, .. } => {
                let end = pos + inserted.chars().count();
                let mut out = String::with_capacity(text.len() + inserted.len());
                out.push_str(&text[..start]);
                out.push_str(inserted);
                if end < text_len {
                    out.push_str(&text[byte_offset(text, end)..]);
                }
                out
            }
            ActionKind::Delete { length, .. } => {
                let end = pos
                    .checked_add(*length)
                    .filter(|end| *end <= text_len)
                    .ok_or(HistoryError::OutOfRange {
                        pos,
                        length: *length,
                        text_len,
                    })?;
                let mut out = String::with_capacity(text.len());
                out.push_str(&text[..start]);
                out.push_str(&text[byte_offset(text, end)..]);
                out
            }
        };
        Ok(edited)
    }

    /// Folds `next` into `self` when the two are coalescible, returning
    /// whether it did. On `false`, `self` is untouched.
    ///
    /// Deletes at the same position add up. An insert at the same position
    /// lands in front of the earlier text; an insert right after the earlier
    /// text is appended to it. Nothing else merges.
    pub fn merge(&mut self, next: &Action) -> bool {
        let merged = match (&mut self.kind, &next.kind) {
            (
                ActionKind::Delete { pos, length },
                ActionKind::Delete {
                    pos: next_pos,
                    length: next_length,
                },
            ) if *pos == *next_pos => match length.checked_add(*next_length) {
                Some(total) => {
                    *length = total;
                    true
                }
                None => false,
            },
            (
                ActionKind::Insert { pos, text },
                ActionKind::Insert {
                    pos: next_pos,
                    text: next_text,
                },
            ) => {
                if *pos == *next_pos {
                    text.insert_str(0, next_text);
                    true
                } else if pos.checked_add(text.chars().count()) == Some(*next_pos) {
                    text.push_str(next_text);
                    true
                } else {
                    false
                }
            }
            _ => false,
        };
        if merged {
            self.to_version = next.to_version;
        }
        merged
    }
}

/// Renders as `insert("abc", pos = 0, version1 = 0, version2 = 1)` or
/// `delete(pos = 2, length = 2, version1 = 3, version2 = 4)`. Inserted text
/// is quoted and escaped the way `{:?}` formats a string.
impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ActionKind::Insert { pos, text } | ActionKind::Replace { pos, text } => write!(
                f,
                "{}({text:?}, pos = {pos}, version1 = {}, version2 = {})",
                self.name(),
                self.from_version,
                self.to_version
            ),
            ActionKind::Delete { pos, length } => write!(
                f,
                "delete(pos = {pos}, length = {length}, version1 = {}, version2 = {})",
                self.from_version, self.to_version
            ),
        }
    }
}

/// Validates and applies `actions` in order, starting from `base`.
///
/// # Errors
///
/// Returns the first validation or apply error encountered.
pub fn replay<'a>(base: &str, actions: impl IntoIterator<Item = &'a Action>) -> Result<String> {
    let mut text = base.to_string();
    for action in actions {
        action.validate(text.chars().count())?;
        text = action.apply(&text)?;
    }
    Ok(text)
}

/// Byte offset of the char at `char_pos`, or `text.len()` past the end.
fn byte_offset(text: &str, char_pos: usize) -> usize {
    text.char_indices()
        .nth(char_pos)
        .map_or(text.len(), |(idx, _)| idx)
}
