//! Fixed-capacity ring and the overwriting [`RingBuffer`] built on it.

use parking_lot::RwLock;

use crate::error::{PrimitiveError, Result, ensure_capacity, or_panic};

/// Unsynchronized circular storage shared by every fixed-capacity buffer.
///
/// `head` is the next write slot and `tail` the oldest element. Occupied slots are
/// exactly the `len` positions starting at `tail`; all others hold `None`.
#[derive(Debug)]
pub(crate) struct Ring<T> {
    slots: Vec<Option<T>>,
    head: usize,
    tail: usize,
    len: usize,
}

impl<T> Ring<T> {
    /// `capacity` must be non-zero; callers validate before constructing.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: (0..capacity).map(|_| None).collect(),
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Append, overwriting the oldest element when full. Returns the overwritten value.
    pub fn push_overwrite(&mut self, value: T) -> Option<T> {
        let capacity = self.capacity();
        let previous = self.slots[self.head].replace(value);
        self.head = (self.head + 1) % capacity;

        if self.len == capacity {
            self.tail = (self.tail + 1) % capacity;
            previous
        } else {
            self.len += 1;
            None
        }
    }

    /// Append only if there is room, handing the value back otherwise.
    pub fn try_push(&mut self, value: T) -> std::result::Result<(), T> {
        if self.is_full() {
            return Err(value);
        }
        self.push_overwrite(value);
        Ok(())
    }

    /// Remove the oldest element.
    pub fn pop_front(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let value = self.slots[self.tail].take()?;
        self.tail = (self.tail + 1) % self.capacity();
        self.len -= 1;
        Some(value)
    }

    pub fn front(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        self.slots[self.tail].as_ref()
    }

    pub fn back(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        let capacity = self.capacity();
        self.slots[(self.head + capacity - 1) % capacity].as_ref()
    }

    /// Oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> + '_ {
        let capacity = self.capacity();
        (0..self.len).filter_map(move |i| self.slots[(self.tail + i) % capacity].as_ref())
    }

    /// The `n` most recent elements, oldest of them first.
    pub fn latest(&self, n: usize) -> impl Iterator<Item = &T> + '_ {
        self.iter().skip(self.len - n.min(self.len))
    }

    pub fn clear(&mut self) {
        self.slots.iter_mut().for_each(|slot| *slot = None);
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }
}

/// Thread-safe circular buffer that overwrites its oldest element once full.
///
/// `write` never fails. Reads consume from the oldest end and report
/// [`PrimitiveError::Empty`] when nothing is left.
///
/// # Example
///
/// ```ignore
/// use skp_primitives::RingBuffer;
///
/// let buffer = RingBuffer::new(3);
/// buffer.write_multiple([1, 2, 3, 4]);
/// assert_eq!(buffer.to_vec(), vec![2, 3, 4]);
/// assert_eq!(buffer.get_latest(2), vec![3, 4]);
/// ```
pub struct RingBuffer<T> {
    inner: RwLock<Ring<T>>,
}

impl<T> RingBuffer<T> {
    /// Create a buffer holding at most `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        or_panic(Self::try_new(capacity))
    }

    /// Try to create a buffer, returning an error if `capacity` is 0.
    pub fn try_new(capacity: usize) -> Result<Self> {
        ensure_capacity("capacity", capacity)?;
        Ok(Self {
            inner: RwLock::new(Ring::with_capacity(capacity)),
        })
    }

    /// Append a value, dropping the oldest one if the buffer is full.
    pub fn write(&self, value: T) {
        self.inner.write().push_overwrite(value);
    }

    /// Append every value in order under a single lock.
    pub fn write_multiple<I>(&self, values: I)
    where
        I: IntoIterator<Item = T>,
    {
        let mut inner = self.inner.write();
        for value in values {
            inner.push_overwrite(value);
        }
    }

    /// Remove and return the oldest value.
    pub fn read(&self) -> Result<T> {
        self.inner.write().pop_front().ok_or(PrimitiveError::Empty)
    }

    /// Remove and return up to `n` of the oldest values, oldest first.
    ///
    /// Returns an empty vector when the buffer is empty.
    pub fn read_multiple(&self, n: usize) -> Vec<T> {
        let mut inner = self.inner.write();
        let take = n.min(inner.len());
        (0..take).filter_map(|_| inner.pop_front()).collect()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn capacity(&self) -> usize {
        self.inner.read().capacity()
    }

    pub fn is_full(&self) -> bool {
        self.inner.read().is_full()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn clear(&self) {
        self.inner.write().clear();
    }
}

impl<T: Clone> RingBuffer<T> {
    /// Return the oldest value without removing it.
    pub fn peek(&self) -> Result<T> {
        self.inner.read().front().cloned().ok_or(PrimitiveError::Empty)
    }

    /// All values, oldest to newest.
    pub fn to_vec(&self) -> Vec<T> {
        self.inner.read().iter().cloned().collect()
    }

    /// The `n` most recent values in the order they were written.
    pub fn get_latest(&self, n: usize) -> Vec<T> {
        self.inner.read().latest(n).cloned().collect()
    }
}

impl<T> std::fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("RingBuffer")
            .field("len", &inner.len())
            .field("capacity", &inner.capacity())
            .finish()
    }
}
