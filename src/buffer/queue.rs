//! Bounded FIFO that rejects writes instead of overwriting.

use crate::buffer::ring::Ring;
use crate::error::{PrimitiveError, Result, ensure_capacity, or_panic};

/// Fixed-capacity first-in first-out queue.
///
/// Unlike [`RingBuffer`](crate::RingBuffer), a full queue refuses new values with
/// [`PrimitiveError::Full`]. The queue is not synchronized; wrap it in a lock to share it.
#[derive(Debug)]
pub struct CircularQueue<T> {
    ring: Ring<T>,
}

impl<T> CircularQueue<T> {
    /// Create a queue holding at most `capacity` values.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        or_panic(Self::try_new(capacity))
    }

    /// Try to create a queue, returning an error if `capacity` is 0.
    pub fn try_new(capacity: usize) -> Result<Self> {
        ensure_capacity("capacity", capacity)?;
        Ok(Self {
            ring: Ring::with_capacity(capacity),
        })
    }

    /// Append `value` at the back.
    ///
    /// # Errors
    ///
    /// Returns [`PrimitiveError::Full`] if the queue is at capacity; the value is dropped.
    pub fn enqueue(&mut self, value: T) -> Result<()> {
        self.ring.try_push(value).map_err(|_| PrimitiveError::Full {
            capacity: self.ring.capacity(),
        })
    }

    /// Remove and return the front value.
    pub fn dequeue(&mut self) -> Result<T> {
        self.ring.pop_front().ok_or(PrimitiveError::Empty)
    }

    /// Borrow the oldest value.
    pub fn front(&self) -> Option<&T> {
        self.ring.front()
    }

    /// Borrow the newest value.
    pub fn back(&self) -> Option<&T> {
        self.ring.back()
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.ring.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.ring.is_full()
    }

    pub fn clear(&mut self) {
        self.ring.clear();
    }

    /// Values from front to back.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        self.ring.iter()
    }
}
