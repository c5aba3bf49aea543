//! Comparator-driven binary heaps.
//!
//! [`Heap`] is an array-backed binary tree: slot `i` has children `2i + 1` and `2i + 2`,
//! and `less(parent, child)` never fails to hold unless the two compare equal. Min-heaps
//! and max-heaps are the same engine with the comparator flipped; ties are broken
//! arbitrarily.
//!
//! - [`IndexedHeap`]: heap plus a reverse index for O(log n) update and delete by value
//! - [`PriorityQueue`]: heap over `(value, priority)` pairs
//!
//! Heaps are unsynchronized building blocks and take `&mut self` for mutation. Share one
//! across threads behind a `parking_lot::Mutex`.
//!
//! # Example
//!
//! ```ignore
//! use skp_primitives::Heap;
//!
//! let mut heap = Heap::min();
//! for v in [5, 3, 7, 1, 9] {
//!     heap.push(v);
//! }
//! assert_eq!(heap.pop(), Some(1));
//! assert_eq!(heap.peek(), Some(&3));
//! ```

mod indexed;
mod priority_queue;

pub use indexed::IndexedHeap;
pub use priority_queue::{PqItem, PriorityQueue};

/// Ordering predicate used by the built-in constructors.
///
/// `less(a, b)` returns true when `a` belongs closer to the root than `b`.
pub type Order<T> = fn(&T, &T) -> bool;

/// Index of the parent slot.
#[inline]
pub(crate) fn parent(idx: usize) -> usize {
    (idx - 1) / 2
}

/// Indices of the two child slots.
#[inline]
pub(crate) fn children(idx: usize) -> (usize, usize) {
    (2 * idx + 1, 2 * idx + 2)
}

/// Binary heap ordered by a caller-supplied predicate.
pub struct Heap<T, F = Order<T>> {
    data: Vec<T>,
    less: F,
}

impl<T: Ord> Heap<T> {
    /// Create an empty min-heap (smallest element at the root).
    pub fn min() -> Self {
        let less: Order<T> = |a, b| a < b;
        Self::with_comparator(less)
    }

    /// Create an empty max-heap (largest element at the root).
    pub fn max() -> Self {
        let less: Order<T> = |a, b| a > b;
        Self::with_comparator(less)
    }
}

impl<T, F> Heap<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    /// Create an empty heap ordered by `less`.
    pub fn with_comparator(less: F) -> Self {
        Self {
            data: Vec::new(),
            less,
        }
    }

    /// Build a heap from an existing sequence in O(n).
    ///
    /// Sifts down every internal node, starting from the last one.
    pub fn from_vec(data: Vec<T>, less: F) -> Self {
        let mut heap = Self { data, less };
        for idx in (0..heap.data.len() / 2).rev() {
            heap.sift_down(idx);
        }
        heap
    }

    /// Insert a value in O(log n).
    pub fn push(&mut self, value: T) {
        self.data.push(value);
        self.sift_up(self.data.len() - 1);
    }

    /// Remove and return the root, or `None` if the heap is empty.
    pub fn pop(&mut self) -> Option<T> {
        if self.data.is_empty() {
            return None;
        }
        let top = self.data.swap_remove(0);
        if !self.data.is_empty() {
            self.sift_down(0);
        }
        Some(top)
    }

    /// Borrow the root without removing it.
    pub fn peek(&self) -> Option<&T> {
        self.data.first()
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
    }

    /// Elements in heap (array) order, not sorted.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    /// Drain the heap in pop order.
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut out = Vec::with_capacity(self.data.len());
        while let Some(value) = self.pop() {
            out.push(value);
        }
        out
    }

    fn sift_up(&mut self, mut idx: usize) {
        while idx > 0 {
            let p = parent(idx);
            if !(self.less)(&self.data[idx], &self.data[p]) {
                break;
            }
            self.data.swap(idx, p);
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
            self.data.swap(idx, best);
            idx = best;
        }
    }
}

impl<T: Clone, F> Heap<T, F>
where
    F: Fn(&T, &T) -> bool,
{
    /// Copy of the elements in heap order.
    pub fn to_vec(&self) -> Vec<T> {
        self.data.clone()
    }
}

impl<T: std::fmt::Debug, F> std::fmt::Debug for Heap<T, F> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Heap").field("data", &self.data).finish()
    }
}

impl<T: Ord> Default for Heap<T> {
    fn default() -> Self {
        Self::min()
    }
}

#[cfg(test)]
pub(crate) fn holds_heap_order<T, F: Fn(&T, &T) -> bool>(data: &[T], less: F) -> bool {
    (1..data.len()).all(|idx| !less(&data[idx], &data[parent(idx)]))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_min_heap_pop_order() {
        let mut heap = Heap::min();
        for v in [5, 3, 7, 1, 9] {
            heap.push(v);
        }

        let popped: Vec<_> = std::iter::from_fn(|| heap.pop()).collect();
        assert_eq!(popped, vec![1, 3, 5, 7, 9]);
    }

    #[test]
    fn test_max_heap_pop_order() {
        let mut heap = Heap::max();
        for v in [5, 3, 7, 1, 9] {
            heap.push(v);
        }
        assert_eq!(heap.into_sorted_vec(), vec![9, 7, 5, 3, 1]);
    }

    #[test]
    fn test_empty_heap() {
        let mut heap: Heap<i32> = Heap::min();
        assert!(heap.is_empty());
        assert_eq!(heap.peek(), None);
        assert_eq!(heap.pop(), None);
    }

    #[test]
    fn test_peek_does_not_mutate() {
        let mut heap = Heap::min();
        heap.push(4);
        heap.push(2);
        assert_eq!(heap.peek(), Some(&2));
        assert_eq!(heap.len(), 2);
    }

    #[test]
    fn test_from_vec_heapifies() {
        let data = vec![9, 4, 7, 1, 8, 2, 6, 3, 5, 0];
        let heap = Heap::from_vec(data, |a: &i32, b: &i32| a < b);
        assert!(holds_heap_order(heap.as_slice(), |a, b| a < b));
        assert_eq!(heap.into_sorted_vec(), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_custom_comparator() {
        let mut heap = Heap::with_comparator(|a: &&str, b: &&str| a.len() < b.len());
        heap.push("three");
        heap.push("a");
        heap.push("be");
        assert_eq!(heap.pop(), Some("a"));
        assert_eq!(heap.pop(), Some("be"));
    }

    #[test]
    fn test_interleaved_push_pop_matches_model() {
        let mut heap = Heap::min();
        let mut model: Vec<i32> = Vec::new();
        let input = [42, 17, 8, 99, 23, 4, 15, 16, 61, 3];

        for (i, v) in input.iter().enumerate() {
            heap.push(*v);
            model.push(*v);
            if i % 3 == 2 {
                model.sort_unstable();
                assert_eq!(heap.pop(), Some(model.remove(0)));
                assert!(holds_heap_order(heap.as_slice(), |a, b| a < b));
            }
        }

        model.sort_unstable();
        assert_eq!(heap.into_sorted_vec(), model);
    }

    #[test]
    fn test_clear() {
        let mut heap = Heap::max();
        heap.push(1);
        heap.push(2);
        heap.clear();
        assert!(heap.is_empty());
        assert_eq!(heap.to_vec(), Vec::<i32>::new());
    }
}
