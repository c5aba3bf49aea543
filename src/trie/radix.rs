//! Path-compressed trie.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::trie::{PrefixTree, WILDCARD};

/// Node whose incoming edge is `label`.
///
/// Children are keyed by the first character of their label; sibling labels never share
/// a first character. Every node except the root is terminal or has at least two
/// children.
#[derive(Debug)]
struct RadixNode<V> {
    label: String,
    children: BTreeMap<char, RadixNode<V>>,
    terminal: bool,
    value: Option<V>,
}

impl<V> RadixNode<V> {
    fn root() -> Self {
        Self {
            label: String::new(),
            children: BTreeMap::new(),
            terminal: false,
            value: None,
        }
    }

    fn leaf(label: &str, value: Option<V>) -> Self {
        Self {
            label: label.to_string(),
            children: BTreeMap::new(),
            terminal: true,
            value,
        }
    }

    /// Cut the label after `at` bytes, moving the tail and everything below it into a
    /// single child.
    fn split(&mut self, at: usize) {
        let tail_label = self.label.split_off(at);
        let Some(first) = tail_label.chars().next() else {
            return;
        };
        let tail = RadixNode {
            label: tail_label,
            children: std::mem::take(&mut self.children),
            terminal: self.terminal,
            value: self.value.take(),
        };
        self.terminal = false;
        self.children.insert(first, tail);
    }

    /// Absorb the only child into this node.
    fn merge_child(&mut self) {
        if let Some((_, only)) = self.children.pop_first() {
            self.label.push_str(&only.label);
            self.children = only.children;
            self.terminal = only.terminal;
            self.value = only.value;
        }
    }

    /// Returns `true` if a new word was added.
    fn insert(&mut self, rest: &str, value: Option<V>) -> bool {
        let Some(first) = rest.chars().next() else {
            let added = !self.terminal;
            self.terminal = true;
            if value.is_some() {
                self.value = value;
            }
            return added;
        };

        let Some(child) = self.children.get_mut(&first) else {
            self.children.insert(first, RadixNode::leaf(rest, value));
            return true;
        };
        let common = common_prefix_len(&child.label, rest);
        if common < child.label.len() {
            child.split(common);
        }
        child.insert(&rest[common..], value)
    }

    fn find(&self, word: &str) -> Option<&RadixNode<V>> {
        let mut node = self;
        let mut rest = word;
        while let Some(first) = rest.chars().next() {
            let child = node.children.get(&first)?;
            rest = rest.strip_prefix(child.label.as_str())?;
            node = child;
        }
        Some(node)
    }

    /// Node covering `prefix` and the full path spelled to reach it. The path is longer
    /// than `prefix` when the prefix ends inside an edge.
    fn find_prefix(&self, prefix: &str) -> Option<(&RadixNode<V>, String)> {
        let mut node = self;
        let mut rest = prefix;
        let mut path = String::new();
        while let Some(first) = rest.chars().next() {
            let child = node.children.get(&first)?;
            if let Some(remainder) = rest.strip_prefix(child.label.as_str()) {
                rest = remainder;
            } else if child.label.starts_with(rest) {
                rest = "";
            } else {
                return None;
            }
            path.push_str(&child.label);
            node = child;
        }
        Some((node, path))
    }

    fn collect(&self, current: &mut String, out: &mut Vec<String>) {
        if self.terminal {
            out.push(current.clone());
        }
        for child in self.children.values() {
            let mark = current.len();
            current.push_str(&child.label);
            child.collect(current, out);
            current.truncate(mark);
        }
    }

    fn wildcard(&self, pattern: &str, current: &mut String, out: &mut Vec<String>) {
        if pattern.is_empty() {
            if self.terminal {
                out.push(current.clone());
            }
            return;
        }
        for child in self.children.values() {
            if let Some(rest) = match_label(&child.label, pattern) {
                let mark = current.len();
                current.push_str(&child.label);
                child.wildcard(rest, current, out);
                current.truncate(mark);
            }
        }
    }

    /// Returns `true` if `rest` was terminal below this node.
    fn remove(&mut self, rest: &str) -> bool {
        let Some(first) = rest.chars().next() else {
            if !self.terminal {
                return false;
            }
            self.terminal = false;
            self.value = None;
            return true;
        };

        let Some(child) = self.children.get_mut(&first) else {
            return false;
        };
        let Some(remainder) = rest.strip_prefix(child.label.as_str()) else {
            return false;
        };
        if !child.remove(remainder) {
            return false;
        }

        if !child.terminal {
            match child.children.len() {
                0 => {
                    self.children.remove(&first);
                }
                1 => child.merge_child(),
                _ => {}
            }
        }
        true
    }

    fn count_nodes(&self) -> usize {
        1 + self.children.values().map(RadixNode::count_nodes).sum::<usize>()
    }
}

/// Byte length of the longest common prefix, always on a char boundary of both.
fn common_prefix_len(a: &str, b: &str) -> usize {
    a.char_indices()
        .zip(b.chars())
        .find(|((_, x), y)| x != y)
        .map_or_else(|| a.len().min(b.len()), |((at, _), _)| at)
}

/// Match `label` against the front of `pattern`, returning the unmatched pattern tail.
fn match_label<'p>(label: &str, pattern: &'p str) -> Option<&'p str> {
    let mut rest = pattern.chars();
    for ch in label.chars() {
        let want = rest.next()?;
        if want != WILDCARD && want != ch {
            return None;
        }
    }
    Some(rest.as_str())
}

#[derive(Debug)]
struct RadixInner<V> {
    root: RadixNode<V>,
    words: usize,
}

/// Radix (compressed) trie.
///
/// Stores the same words as [`Trie`](crate::trie::Trie) with one node per branching
/// point instead of one per character. Inserting a word that diverges partway along an
/// edge splits the edge at the divergence; deleting a word merges any node left with a
/// single child back into it.
#[derive(Debug)]
pub struct RadixTrie<V> {
    inner: RwLock<RadixInner<V>>,
}

impl<V> RadixTrie<V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(RadixInner {
                root: RadixNode::root(),
                words: 0,
            }),
        }
    }

    /// Number of nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.inner.read().root.count_nodes()
    }

    fn insert_entry(&self, word: &str, value: Option<V>) {
        let mut inner = self.inner.write();
        if inner.root.insert(word, value) {
            inner.words += 1;
        }
    }
}

impl<V> Default for RadixTrie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PrefixTree<V> for RadixTrie<V>
where
    V: Clone + Send + Sync,
{
    fn insert(&self, word: &str) {
        self.insert_entry(word, None);
    }

    fn insert_with_value(&self, word: &str, value: V) {
        self.insert_entry(word, Some(value));
    }

    fn search(&self, word: &str) -> bool {
        self.inner.read().root.find(word).is_some_and(|node| node.terminal)
    }

    fn search_with_value(&self, word: &str) -> Option<V> {
        let inner = self.inner.read();
        let node = inner.root.find(word)?;
        if node.terminal { node.value.clone() } else { None }
    }

    fn starts_with(&self, prefix: &str) -> bool {
        let inner = self.inner.read();
        if prefix.is_empty() {
            return inner.words > 0;
        }
        inner.root.find_prefix(prefix).is_some()
    }

    fn get_all_with_prefix(&self, prefix: &str) -> Vec<String> {
        let inner = self.inner.read();
        let mut out = Vec::new();
        if let Some((node, mut path)) = inner.root.find_prefix(prefix) {
            node.collect(&mut path, &mut out);
        }
        out
    }

    fn delete(&self, word: &str) -> bool {
        let mut inner = self.inner.write();
        let removed = inner.root.remove(word);
        if removed {
            inner.words -= 1;
        }
        removed
    }

    fn wildcard_search(&self, pattern: &str) -> Vec<String> {
        let inner = self.inner.read();
        let mut out = Vec::new();
        inner.root.wildcard(pattern, &mut String::new(), &mut out);
        out
    }

    fn len(&self) -> usize {
        self.inner.read().words
    }

    fn clear(&self) {
        let mut inner = self.inner.write();
        inner.root = RadixNode::root();
        inner.words = 0;
    }

    fn longest_common_prefix(&self) -> String {
        let inner = self.inner.read();
        let mut prefix = String::new();
        let mut node = &inner.root;
        while !node.terminal && node.children.len() == 1 {
            let Some(child) = node.children.values().next() else {
                break;
            };
            prefix.push_str(&child.label);
            node = child;
        }
        prefix
    }
}
