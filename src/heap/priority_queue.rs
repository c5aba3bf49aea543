//! Priority queue over `(value, priority)` pairs.

use crate::heap::Heap;

/// A queued value with its priority.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PqItem<T, P = i64> {
    /// Queued value.
    pub value: T,
    /// Ordering key.
    pub priority: P,
}

type PqOrder<T, P> = fn(&PqItem<T, P>, &PqItem<T, P>) -> bool;

fn lower_first<T, P: Ord>(a: &PqItem<T, P>, b: &PqItem<T, P>) -> bool {
    a.priority < b.priority
}

fn higher_first<T, P: Ord>(a: &PqItem<T, P>, b: &PqItem<T, P>) -> bool {
    a.priority > b.priority
}

/// Priority queue backed by [`Heap`].
///
/// Equal priorities come out in no particular order.
pub struct PriorityQueue<T, P = i64> {
    heap: Heap<PqItem<T, P>, PqOrder<T, P>>,
}

impl<T, P: Ord> PriorityQueue<T, P> {
    /// Lowest priority value comes out first.
    pub fn min_first() -> Self {
        let less: PqOrder<T, P> = lower_first::<T, P>;
        Self {
            heap: Heap::with_comparator(less),
        }
    }

    /// Highest priority value comes out first.
    pub fn max_first() -> Self {
        let less: PqOrder<T, P> = higher_first::<T, P>;
        Self {
            heap: Heap::with_comparator(less),
        }
    }

    /// Queue `value` with `priority`.
    pub fn push(&mut self, value: T, priority: P) {
        self.heap.push(PqItem { value, priority });
    }

    /// Remove and return the value at the front.
    pub fn pop(&mut self) -> Option<T> {
        self.heap.pop().map(|item| item.value)
    }

    /// Remove and return the front value together with its priority.
    pub fn pop_item(&mut self) -> Option<PqItem<T, P>> {
        self.heap.pop()
    }

    /// Borrow the value at the front.
    pub fn peek(&self) -> Option<&T> {
        self.heap.peek().map(|item| &item.value)
    }

    /// Borrow the priority of the value at the front.
    pub fn peek_priority(&self) -> Option<&P> {
        self.heap.peek().map(|item| &item.priority)
    }

    /// Number of queued values.
    pub fn len(&self) -> usize {
        self.heap.len()
    }

    /// Check if the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Remove all queued values.
    pub fn clear(&mut self) {
        self.heap.clear();
    }
}

impl<T, P: Ord> Default for PriorityQueue<T, P> {
    fn default() -> Self {
        Self::min_first()
    }
}

impl<T: std::fmt::Debug, P: std::fmt::Debug> std::fmt::Debug for PriorityQueue<T, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PriorityQueue")
            .field("items", &self.heap.as_slice())
            .finish()
    }
}
