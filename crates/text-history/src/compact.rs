/// Compaction of an action sequence into fewer, equivalent actions.
use crate::action::Action;

/// Merges runs of adjacent coalescible actions in a single forward pass.
///
/// Each action is folded into the one before it when [`Action::merge`]
/// allows; otherwise the accumulated action is emitted and the new one
/// starts the next run. Merged results are not rescanned, and the order of
/// whatever remains is preserved. Applying the output in order has the same
/// effect on the text as applying the input.
pub fn compact(actions: impl IntoIterator<Item = Action>) -> Vec<Action> {
    let mut iter = actions.into_iter();
    let Some(mut current) = iter.next() else {
        return Vec::new();
    };

    let mut compacted = Vec::new();
    for next in iter {
        if !current.merge(&next) {
            compacted.push(std::mem::replace(&mut current, next));
        }
    }
    compacted.push(current);
    compacted
}
