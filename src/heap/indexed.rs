//! Heap with a reverse index for update and delete by value.

use std::collections::HashMap;
use std::hash::Hash;

use crate::error::{PrimitiveError, Result};
use crate::heap::{Order, children, parent};

/// Binary heap that tracks the array slot of every element.
///
/// The index is keyed by the value itself, so values must be unique: [`push`](Self::push)
/// ignores a value that is already present. To store duplicates, wrap each value in a
/// struct carrying a unique handle (a task id, a sequence number) and order by the
/// payload.
///
/// | Operation | Complexity |
/// |-----------|------------|
/// | `push` / `pop` | O(log n) |
/// | `contains` | O(1) |
/// | `update` / `delete` | O(log n) |
pub struct IndexedHeap<T, F = Order<T>> {
    data: Vec<T>,
    index: HashMap<T, usize>,
    less: F,
}

impl<T: Ord + Hash + Clone> IndexedHeap<T> {
    /// Create an empty indexed min-heap.
    pub fn min() -> Self {
        let less: Order<T> = |a, b| a < b;
        Self::with_comparator(less)
    }

    /// Create an empty indexed max-heap.
    pub fn max() -> Self {
        let less: Order<T> = |a, b| a > b;
        Self::with_comparator(less)
    }
}

impl<T, F> IndexedHeap<T, F>
where
    T: Eq + Hash + Clone,
    F: Fn(&T, &T) -> bool,
{
    /// Create an empty indexed heap ordered by `less`.
    pub fn with_comparator(less: F) -> Self {
        Self {
            data: Vec::new(),
            index: HashMap::new(),
            less,
        }
    }

    /// Insert a value. Returns `false` (and changes nothing) if it is already present.
    pub fn push(&mut self, value: T) -> bool {
        if self.index.contains_key(&value) {
            return false;
        }
        let idx = self.data.len();
        self.index.insert(value.clone(), idx);
        self.data.push(value);
        self.sift_up(idx);
        true
    }

    /// Remove and return the root.
    pub fn pop(&mut self) -> Option<T> {
        self.remove_at(0)
    }

    /// Borrow the root.
    pub fn peek(&self) -> Option<&T> {
        self.data.first()
    }

    /// Check whether `value` is in the heap.
    pub fn contains(&self, value: &T) -> bool {
        self.index.contains_key(value)
    }

    /// Replace `old` with `new` and restore heap order.
    ///
    /// The relative order of `new` is unknown, so the slot is sifted both ways.
    ///
    /// # Errors
    ///
    /// - [`PrimitiveError::NotFound`] if `old` is not present
    /// - [`PrimitiveError::Duplicate`] if `new` is already held by another slot
    pub fn update(&mut self, old: &T, new: T) -> Result<()> {
        let Some(&idx) = self.index.get(old) else {
            return Err(PrimitiveError::NotFound);
        };
        if old == &new {
            return Ok(());
        }
        if self.index.contains_key(&new) {
            return Err(PrimitiveError::Duplicate);
        }

        self.index.remove(old);
        self.index.insert(new.clone(), idx);
        self.data[idx] = new;

        self.sift_up(idx);
        self.sift_down(idx);
        Ok(())
    }

    /// Remove `value` from anywhere in the heap. Returns `false` if it was not present.
    pub fn delete(&mut self, value: &T) -> bool {
        match self.index.get(value) {
            Some(&idx) => self.remove_at(idx).is_some(),
            None => false,
        }
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Check if the heap is empty.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Remove all elements.
    pub fn clear(&mut self) {
        self.data.clear();
        self.index.clear();
    }

    /// Swap the slot with the last element, shrink, and re-heapify from the slot.
    fn remove_at(&mut self, idx: usize) -> Option<T> {
        let last = self.data.len().checked_sub(1)?;
        if idx != last {
            self.swap(idx, last);
        }
        let removed = self.data.pop()?;
        self.index.remove(&removed);

        if idx < self.data.len() {
            self.sift_up(idx);
            self.sift_down(idx);
        }
        Some(removed)
    }

    fn swap(&mut self, i: usize, j: usize) {
        self.data.swap(i, j);
        if let Some(slot) = self.index.get_mut(&self.data[i]) {
            *slot = i;
        }
        if let Some(slot) = self.index.get_mut(&self.data[j]) {
            *slot = j;
        }
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let p = parent(idx);
            if !(self.less)(&self.data[idx], &self.data[p]) {
                break;
            }
            self.swap(idx, p);
            idx = p;
        }
    }

    fn sift_down(&mut self, mut idx: usize) {
        let len = self.data.len();
        loop {
            let (left, right) = children(idx);
            let mut best = idx;

            if left < len && (self.less)(&self.data[left], &self.data[best]) {
                best = left;
            }
            if right < len && (self.less)(&self.data[right], &self.data[best]) {
                best = right;
            }
            if best == idx {
                break;
            }
            self.swap(idx, best);
            idx = best;
        }
    }

    #[cfg(test)]
    fn index_is_consistent(&self) -> bool {
        self.index.len() == self.data.len()
            && self
                .data
                .iter()
                .enumerate()
                .all(|(i, v)| self.index.get(v) == Some(&i))
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for IndexedHeap<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexedHeap").field("data", &self.data).finish()
    }
}
