//! Memoized default-path length.

use std::cell::Cell;

/// Cached result of the default-path walk.
///
/// The cache is invalidated by topology changes only (exits, selections,
/// insertions, reset). Normal progression keeps it valid because it moves
/// entries from the walked path into the history without changing the total.
#[derive(Debug, Default)]
pub(crate) struct LengthCache {
    value: Cell<Option<usize>>,
    walks: Cell<u64>,
}

impl LengthCache {
    pub fn get_or_compute(&self, walk: impl FnOnce() -> usize) -> usize {
        if let Some(value) = self.value.get() {
            return value;
        }
        let value = walk();
        self.walks.set(self.walks.get() + 1);
        self.value.set(Some(value));
        value
    }

    pub fn invalidate(&self) {
        self.value.set(None);
    }

    pub fn is_valid(&self) -> bool {
        self.value.get().is_some()
    }

    /// Number of walks performed so far.
    pub fn walks(&self) -> u64 {
        self.walks.get()
    }
}
