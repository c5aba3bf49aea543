//! Hash index over an arena-backed doubly linked recency list.
//!
//! ```text
//!   map: HashMap<K, SlotId>          nodes: Vec<Option<Node>>
//!   ┌─────┬──────┐                   ┌────┬──────────────────────────┐
//!   │ "a" │  2   │ ────────────────▶ │ 2  │ a  prev: None   next: 0  │ ◀─ head (MRU)
//!   │ "b" │  0   │ ────────────────▶ │ 0  │ b  prev: 2      next: 1  │
//!   │ "c" │  1   │ ────────────────▶ │ 1  │ c  prev: 0      next: None│ ◀─ tail (LRU)
//!   └─────┴──────┘                   └────┴──────────────────────────┘
//! ```
//!
//! Freed slots go on a free list and are reused by the next insert, so a cache at steady
//! state never reallocates.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::Instant;

type SlotId = usize;

/// One cached pair.
#[derive(Debug, Clone)]
pub(crate) struct Entry<K, V> {
    pub key: K,
    pub value: V,
    /// Absolute expiry; `None` for caches without TTL.
    pub expires_at: Option<Instant>,
}

impl<K, V> Entry<K, V> {
    pub fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| now >= at)
    }
}

#[derive(Debug)]
struct Node<K, V> {
    entry: Entry<K, V>,
    prev: Option<SlotId>,
    next: Option<SlotId>,
}

/// Bounded recency list with O(1) lookup, promotion and eviction.
#[derive(Debug)]
pub(crate) struct RecencyList<K, V> {
    capacity: usize,
    nodes: Vec<Option<Node<K, V>>>,
    free: Vec<SlotId>,
    map: HashMap<K, SlotId>,
    head: Option<SlotId>,
    tail: Option<SlotId>,
}

impl<K, V> RecencyList<K, V>
where
    K: Hash + Eq + Clone,
{
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            nodes: Vec::with_capacity(capacity),
            free: Vec::new(),
            map: HashMap::with_capacity(capacity),
            head: None,
            tail: None,
        }
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// Look up without changing recency.
    pub fn peek(&self, key: &K) -> Option<&Entry<K, V>> {
        let id = *self.map.get(key)?;
        self.node(id).map(|n| &n.entry)
    }

    /// Look up and promote to most-recently-used.
    pub fn touch(&mut self, key: &K) -> Option<&mut Entry<K, V>> {
        let id = *self.map.get(key)?;
        self.move_to_front(id);
        self.node_mut(id).map(|n| &mut n.entry)
    }

    /// Insert or overwrite, promoting the entry. Returns the evicted LRU entry, if any.
    pub fn insert(&mut self, key: K, value: V, expires_at: Option<Instant>) -> Option<Entry<K, V>> {
        if let Some(&id) = self.map.get(&key) {
            if let Some(node) = self.node_mut(id) {
                node.entry.value = value;
                node.entry.expires_at = expires_at;
            }
            self.move_to_front(id);
            return None;
        }

        let evicted = if self.map.len() >= self.capacity {
            self.pop_back()
        } else {
            None
        };

        let node = Node {
            entry: Entry {
                key: key.clone(),
                value,
                expires_at,
            },
            prev: None,
            next: None,
        };
        let id = self.alloc(node);
        self.map.insert(key, id);
        self.link_front(id);

        evicted
    }

    pub fn remove(&mut self, key: &K) -> Option<Entry<K, V>> {
        let id = self.map.remove(key)?;
        self.unlink(id);
        self.release(id)
    }

    /// Least-recently-used entry.
    pub fn back(&self) -> Option<&Entry<K, V>> {
        self.tail.and_then(|id| self.node(id)).map(|n| &n.entry)
    }

    pub fn pop_back(&mut self) -> Option<Entry<K, V>> {
        let id = self.tail?;
        self.unlink(id);
        let entry = self.release(id)?;
        self.map.remove(&entry.key);
        Some(entry)
    }

    /// Entries from most to least recently used.
    pub fn iter(&self) -> impl Iterator<Item = &Entry<K, V>> + '_ {
        let mut cursor = self.head;
        std::iter::from_fn(move || {
            let node = self.node(cursor?)?;
            cursor = node.next;
            Some(&node.entry)
        })
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.map.clear();
        self.head = None;
        self.tail = None;
    }

    fn node(&self, id: SlotId) -> Option<&Node<K, V>> {
        self.nodes.get(id).and_then(Option::as_ref)
    }

    fn node_mut(&mut self, id: SlotId) -> Option<&mut Node<K, V>> {
        self.nodes.get_mut(id).and_then(Option::as_mut)
    }

    fn alloc(&mut self, node: Node<K, V>) -> SlotId {
        match self.free.pop() {
            Some(id) => {
                self.nodes[id] = Some(node);
                id
            }
            None => {
                self.nodes.push(Some(node));
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, id: SlotId) -> Option<Entry<K, V>> {
        let node = self.nodes.get_mut(id)?.take()?;
        self.free.push(id);
        Some(node.entry)
    }

    fn move_to_front(&mut self, id: SlotId) {
        if self.head == Some(id) {
            return;
        }
        self.unlink(id);
        self.link_front(id);
    }

    fn link_front(&mut self, id: SlotId) {
        let old_head = self.head;
        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = old_head;
        }
        match old_head.and_then(|h| self.node_mut(h)) {
            Some(head) => head.prev = Some(id),
            None => self.tail = Some(id),
        }
        self.head = Some(id);
    }

    fn unlink(&mut self, id: SlotId) {
        let Some((prev, next)) = self.node(id).map(|n| (n.prev, n.next)) else {
            return;
        };

        match prev.and_then(|p| self.node_mut(p)) {
            Some(p) => p.next = next,
            None => self.head = next,
        }
        match next.and_then(|n| self.node_mut(n)) {
            Some(n) => n.prev = prev,
            None => self.tail = prev,
        }

        if let Some(node) = self.node_mut(id) {
            node.prev = None;
            node.next = None;
        }
    }
}
