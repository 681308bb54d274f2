use std::collections::BTreeMap;

/// Holds out-of-order completions until their turn.
///
/// Items are inserted under their submission index in any order; only the item
/// at the cursor can be taken, after which the cursor advances by one.
#[derive(Debug)]
pub struct ReorderBuffer<T> {
    ready: BTreeMap<u64, T>,
    next: u64,
}

impl<T> Default for ReorderBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReorderBuffer<T> {
    pub fn new() -> Self {
        Self {
            ready: BTreeMap::new(),
            next: 0,
        }
    }

    /// Stores a completion. Indices below the cursor are already released and
    /// are ignored.
    pub fn insert(&mut self, index: u64, item: T) {
        if index >= self.next {
            self.ready.insert(index, item);
        }
    }

    pub fn take_next(&mut self) -> Option<(u64, T)> {
        let item = self.ready.remove(&self.next)?;
        let index = self.next;
        self.next += 1;
        Some((index, item))
    }

    /// Number of buffered completions not yet taken.
    pub fn len(&self) -> usize {
        self.ready.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ready.is_empty()
    }

    /// Drops every buffered completion; the cursor is kept.
    pub fn discard(&mut self) -> usize {
        let dropped = self.ready.len();
        self.ready.clear();
        dropped
    }
}
