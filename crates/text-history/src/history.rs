/// Versioned text document backed by an append-only action log.
///
/// Every successful mutation applies one action to the text, advances the
/// version and appends the action to the log. Range queries read the log
/// and return a compacted copy; the log itself is never rewritten.
use crate::action::Action;
use crate::compact::compact;
use crate::config::HistoryConfig;
use crate::error::{HistoryError, Result};

/// Owns the current text, its version and the log of applied actions.
///
/// A `History` has a single owner. Callers that share one across threads
/// must wrap it in a lock so that validate, apply and append stay atomic.
#[derive(Clone, Default)]
pub struct History {
    /// Current materialized document.
    text: String,
    /// Version after the last applied action; 0 for the empty document.
    version: u64,
    /// Applied actions in application order.
    actions: Vec<Action>,
    /// Configuration parameters.
    config: HistoryConfig,
}

impl std::fmt::Debug for History {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("History")
            .field("text_len", &self.text.chars().count())
            .field("version", &self.version)
            .field("actions_len", &self.actions.len())
            .field("config", &self.config)
            .finish()
    }
}

impl History {
    /// Creates an empty history with the default config.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty history with an explicit config.
    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    /// Current text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current version.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// The raw log, uncompacted, in application order.
    pub fn actions(&self) -> &[Action] {
        &self.actions
    }

    /// Whether no action has been applied yet.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Configuration in use.
    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Inserts `text` at `pos`, or at the end of the document when `pos` is
    /// `None`. Returns the new version.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidAction`] if `pos` is past the end.
    pub fn insert(&mut self, text: &str, pos: Option<usize>) -> Result<u64> {
        let pos = pos.unwrap_or_else(|| self.text_len());
        self.action(Action::insert(pos, text, self.version))
    }

    /// Overwrites `text.chars().count()` chars at `pos` (or appends when
    /// `pos` is `None`), dropping whatever would run past the end.
    /// Returns the new version.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidAction`] if `pos` is past the end.
    pub fn replace(&mut self, text: &str, pos: Option<usize>) -> Result<u64> {
        let pos = pos.unwrap_or_else(|| self.text_len());
        self.action(Action::replace(pos, text, self.version))
    }

    /// Deletes `length` chars starting at `pos`. Returns the new version.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidAction`] if `pos` is past the end and
    /// [`HistoryError::OutOfRange`] if the deletion would run past the end.
    pub fn delete(&mut self, pos: usize, length: usize) -> Result<u64> {
        self.action(Action::delete(pos, length, self.version))
    }

    /// Validates and applies `action`, then records it.
    ///
    /// All mutations go through here. The action must span exactly
    /// `version..version + 1`. On success the text is replaced by the edited
    /// text, the version becomes `action.to_version` and the action is
    /// appended to the log. On error nothing changes.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidAction`] if the position is past the
    /// end or the version interval is not the next single step, and
    /// [`HistoryError::OutOfRange`] for a delete running past the end.
    pub fn action(&mut self, action: Action) -> Result<u64> {
        let edited = self
            .check_interval(&action)
            .and_then(|()| action.validate(self.text_len()))
            .and_then(|()| action.apply(&self.text))
            .inspect_err(|e| tracing::debug!("Rejected {action}: {e}"))?;

        self.text = edited;
        self.version = action.to_version;
        tracing::debug!("Applied {action}, now at version {}", self.version);
        self.actions.push(action);

        Ok(self.version)
    }

    /// Returns the actions starting in `from_version..to_version`, compacted
    /// unless the config disables it.
    ///
    /// `from_version` defaults to 0 and `to_version` to the current
    /// version. An action is selected when its own `from_version` falls in
    /// the half-open range.
    ///
    /// # Errors
    ///
    /// Returns [`HistoryError::InvalidRange`] if either bound exceeds the
    /// current version or `from_version > to_version`.
    pub fn get_actions(
        &self,
        from_version: Option<u64>,
        to_version: Option<u64>,
    ) -> Result<Vec<Action>> {
        let from_version = from_version.unwrap_or(0);
        let to_version = to_version.unwrap_or(self.version);
        if from_version > self.version || to_version > self.version || from_version > to_version
        {
            return Err(HistoryError::InvalidRange {
                from_version,
                to_version,
                version: self.version,
            });
        }

        let selected: Vec<Action> = self
            .actions
            .iter()
            .filter(|a| (from_version..to_version).contains(&a.from_version))
            .cloned()
            .collect();
        let selected_len = selected.len();

        let result = if self.config.compact_queries {
            compact(selected)
        } else {
            selected
        };
        tracing::trace!(
            "Query {from_version}..{to_version}: selected {selected_len}, returning {}",
            result.len()
        );
        Ok(result)
    }

    fn check_interval(&self, action: &Action) -> Result<()> {
        let next = self.version.checked_add(1);
        if action.from_version != self.version || Some(action.to_version) != next {
            return Err(HistoryError::InvalidAction {
                pos: action.pos(),
                text_len: self.text_len(),
                from_version: action.from_version,
                to_version: action.to_version,
            });
        }
        Ok(())
    }

    fn text_len(&self) -> usize {
        self.text.chars().count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::ActionKind;

    fn history_with(text: &str) -> History {
        let mut history = History::new();
        history.insert(text, None).unwrap();
        history
    }

    // --- Mutations ---

    #[test]
    fn test_new_history_is_empty() {
        let history = History::new();
        assert_eq!(history.text(), "");
        assert_eq!(history.version(), 0);
        assert!(history.is_empty());
        assert!(history.actions().is_empty());
    }

    #[test]
    fn test_insert_defaults_to_end() {
        let mut history = History::new();
        assert_eq!(history.insert("abc", None).unwrap(), 1);
        assert_eq!(history.text(), "abc");
        assert_eq!(history.insert("X", Some(1)).unwrap(), 2);
        assert_eq!(history.text(), "aXbc");
        assert_eq!(history.insert("!", None).unwrap(), 3);
        assert_eq!(history.text(), "aXbc!");
    }

    #[test]
    fn test_replace_overwrites_and_truncates() {
        let mut history = history_with("abcdef");
        history.replace("XY", Some(1)).unwrap();
        assert_eq!(history.text(), "aXYdef");

        let mut history = history_with("abcdef");
        history.replace("ZZZZZZZZ", Some(1)).unwrap();
        assert_eq!(history.text(), "aZZZZZZZZ");
    }

    #[test]
    fn test_replace_defaults_to_end() {
        let mut history = history_with("ab");
        history.replace("cd", None).unwrap();
        assert_eq!(history.text(), "abcd");
    }

    #[test]
    fn test_delete_within_bounds() {
        let mut history = history_with("abcde");
        assert_eq!(history.delete(2, 2).unwrap(), 2);
        assert_eq!(history.text(), "abe");
    }

    #[test]
    fn test_delete_past_end_leaves_state_unchanged() {
        let mut history = history_with("abcde");
        let err = history.delete(2, 10).unwrap_err();
        assert!(matches!(err, HistoryError::OutOfRange { .. }));
        assert_eq!(history.text(), "abcde");
        assert_eq!(history.version(), 1);
        assert_eq!(history.actions().len(), 1);
    }

    #[test]
    fn test_position_past_end_rejected() {
        let mut history = history_with("abc");
        for result in [
            history.insert("x", Some(4)),
            history.replace("x", Some(4)),
            history.delete(4, 0),
        ] {
            assert!(matches!(result, Err(HistoryError::InvalidAction { .. })));
        }
        assert_eq!(history.text(), "abc");
        assert_eq!(history.version(), 1);
    }

    #[test]
    fn test_action_rejects_non_advancing_interval() {
        let mut history = history_with("abc");
        let mut action = Action::insert(0, "x", 1);
        action.to_version = 1;
        assert!(matches!(
            history.action(action),
            Err(HistoryError::InvalidAction { .. })
        ));
        assert_eq!(history.version(), 1);
    }

    #[test]
    fn test_action_accepts_explicit_action() {
        let mut history = History::new();
        assert_eq!(history.action(Action::insert(0, "hi", 0)).unwrap(), 1);
        assert_eq!(history.text(), "hi");
    }

    #[test]
    fn test_action_rejects_stale_or_skipping_interval() {
        let mut history = History::new();
        for _ in 0..5 {
            history.insert("x", None).unwrap();
        }

        let mut skipping = Action::insert(0, "y", 5);
        skipping.to_version = 9;
        for action in [Action::insert(0, "y", 0), Action::insert(0, "y", 6), skipping] {
            assert!(matches!(
                history.action(action),
                Err(HistoryError::InvalidAction { .. })
            ));
        }

        assert_eq!(history.text(), "xxxxx");
        assert_eq!(history.version(), 5);
        assert_eq!(history.actions().len(), 5);
        assert_eq!(history.action(Action::insert(0, "y", 5)).unwrap(), 6);
    }

    #[test]
    fn test_logged_actions_carry_version_interval() {
        let mut history = History::new();
        history.insert("abc", None).unwrap();
        history.delete(0, 1).unwrap();
        history.replace("Z", Some(0)).unwrap();
        let intervals: Vec<(u64, u64)> = history
            .actions()
            .iter()
            .map(|a| (a.from_version, a.to_version))
            .collect();
        assert_eq!(intervals, [(0, 1), (1, 2), (2, 3)]);
    }

    // --- Queries ---

    #[test]
    fn test_get_actions_defaults_to_full_range() {
        let mut history = History::new();
        history.insert("a", None).unwrap();
        history.replace("b", Some(0)).unwrap();
        assert_eq!(history.get_actions(None, None).unwrap().len(), 2);
    }

    #[test]
    fn test_get_actions_half_open_selection() {
        let mut history = History::new();
        history.insert("a", None).unwrap();
        history.replace("b", Some(0)).unwrap();
        history.replace("c", Some(0)).unwrap();
        history.replace("d", Some(0)).unwrap();

        let actions = history.get_actions(Some(1), Some(3)).unwrap();
        let starts: Vec<u64> = actions.iter().map(|a| a.from_version).collect();
        assert_eq!(starts, [1, 2]);
        assert!(history.get_actions(Some(2), Some(2)).unwrap().is_empty());
    }

    #[test]
    fn test_get_actions_rejects_bad_ranges() {
        let mut history = History::new();
        for _ in 0..6 {
            history.insert("x", None).unwrap();
        }
        assert_eq!(
            history.get_actions(Some(5), Some(2)),
            Err(HistoryError::InvalidRange {
                from_version: 5,
                to_version: 2,
                version: 6,
            })
        );
        assert!(history.get_actions(None, Some(7)).is_err());
        assert!(history.get_actions(Some(7), None).is_err());
        assert!(history.get_actions(Some(6), None).unwrap().is_empty());
    }

    #[test]
    fn test_get_actions_compacts_without_touching_log() {
        let mut history = History::new();
        history.insert("A", Some(0)).unwrap();
        history.insert("B", Some(0)).unwrap();

        let actions = history.get_actions(None, None).unwrap();
        assert_eq!(actions.len(), 1);
        assert_eq!(actions[0].kind, ActionKind::Insert { pos: 0, text: "BA".into() });
        assert_eq!((actions[0].from_version, actions[0].to_version), (0, 2));

        assert_eq!(history.actions().len(), 2);
        assert_eq!(history.actions()[0], Action::insert(0, "A", 0));
        assert_eq!(history.actions()[1], Action::insert(0, "B", 1));
    }

    #[test]
    fn test_get_actions_uncompacted_when_disabled() {
        let mut history = History::with_config(HistoryConfig {
            compact_queries: false,
        });
        assert!(!history.config().compact_queries);
        history.insert("A", Some(0)).unwrap();
        history.insert("B", Some(0)).unwrap();
        assert_eq!(history.get_actions(None, None).unwrap(), history.actions());
    }

    #[test]
    fn test_debug_summarizes_state() {
        let history = history_with("abc");
        let rendered = format!("{history:?}");
        assert!(rendered.contains("text_len: 3"));
        assert!(rendered.contains("version: 1"));
    }
}
