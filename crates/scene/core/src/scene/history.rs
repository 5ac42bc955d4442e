//! Stack of previously active actions.

use crate::ActionId;

/// Previously active actions, oldest first.
///
/// Entries are stable [`ActionId`] handles rather than positions, so inserting
/// actions into the scene does not invalidate the history.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<ActionId>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, id: ActionId) {
        self.entries.push(id);
    }

    pub fn pop(&mut self) -> Option<ActionId> {
        self.entries.pop()
    }

    pub fn last(&self) -> Option<ActionId> {
        self.entries.last().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = ActionId> + '_ {
        self.entries.iter().copied()
    }

    /// Drops the first occurrence of `id` and everything recorded after it.
    ///
    /// Returns `false` (and leaves the stack untouched) if `id` is absent.
    pub fn truncate_before(&mut self, id: ActionId) -> bool {
        match self.entries.iter().position(|&entry| entry == id) {
            Some(index) => {
                self.entries.truncate(index);
                true
            }
            None => false,
        }
    }
}
