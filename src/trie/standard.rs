//! One node per character.

use std::collections::BTreeMap;

use parking_lot::RwLock;

use crate::trie::{PrefixTree, WILDCARD};

#[derive(Debug)]
struct TrieNode<V> {
    children: BTreeMap<char, TrieNode<V>>,
    terminal: bool,
    value: Option<V>,
}

impl<V> Default for TrieNode<V> {
    fn default() -> Self {
        Self {
            children: BTreeMap::new(),
            terminal: false,
            value: None,
        }
    }
}

impl<V> TrieNode<V> {
    fn find(&self, word: &str) -> Option<&TrieNode<V>> {
        word.chars().try_fold(self, |node, ch| node.children.get(&ch))
    }

    fn collect(&self, current: &mut String, out: &mut Vec<String>) {
        if self.terminal {
            out.push(current.clone());
        }
        for (ch, child) in &self.children {
            current.push(*ch);
            child.collect(current, out);
            current.pop();
        }
    }

    fn wildcard(&self, pattern: &str, current: &mut String, out: &mut Vec<String>) {
        let mut chars = pattern.chars();
        let Some(want) = chars.next() else {
            if self.terminal {
                out.push(current.clone());
            }
            return;
        };
        let rest = chars.as_str();

        if want == WILDCARD {
            for (ch, child) in &self.children {
                current.push(*ch);
                child.wildcard(rest, current, out);
                current.pop();
            }
        } else if let Some(child) = self.children.get(&want) {
            current.push(want);
            child.wildcard(rest, current, out);
            current.pop();
        }
    }

    /// Returns `true` if `word` was terminal below this node.
    fn remove(&mut self, word: &str) -> bool {
        let mut chars = word.chars();
        let Some(ch) = chars.next() else {
            if !self.terminal {
                return false;
            }
            self.terminal = false;
            self.value = None;
            return true;
        };

        let Some(child) = self.children.get_mut(&ch) else {
            return false;
        };
        if !child.remove(chars.as_str()) {
            return false;
        }
        if !child.terminal && child.children.is_empty() {
            self.children.remove(&ch);
        }
        true
    }

    fn count_nodes(&self) -> usize {
        1 + self.children.values().map(TrieNode::count_nodes).sum::<usize>()
    }
}

#[derive(Debug)]
struct TrieInner<V> {
    root: TrieNode<V>,
    words: usize,
}

impl<V> TrieInner<V> {
    fn insert(&mut self, word: &str, value: Option<V>) {
        let mut node = &mut self.root;
        for ch in word.chars() {
            node = node.children.entry(ch).or_default();
        }
        if !node.terminal {
            node.terminal = true;
            self.words += 1;
        }
        if value.is_some() {
            node.value = value;
        }
    }
}

/// Character trie.
///
/// Deleting a word prunes every node left with no word beneath it, so
/// [`starts_with`](PrefixTree::starts_with) only reports prefixes of live words.
#[derive(Debug)]
pub struct Trie<V> {
    inner: RwLock<TrieInner<V>>,
}

impl<V> Trie<V> {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(TrieInner {
                root: TrieNode::default(),
                words: 0,
            }),
        }
    }

    /// Number of nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.inner.read().root.count_nodes()
    }
}

impl<V> Default for Trie<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> PrefixTree<V> for Trie<V>
where
    V: Clone + Send + Sync,
{
    fn insert(&self, word: &str) {
        self.inner.write().insert(word, None);
    }

    fn insert_with_value(&self, word: &str, value: V) {
        self.inner.write().insert(word, Some(value));
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
        inner.root.find(prefix).is_some()
    }

    fn get_all_with_prefix(&self, prefix: &str) -> Vec<String> {
        let inner = self.inner.read();
        let mut out = Vec::new();
        if let Some(node) = inner.root.find(prefix) {
            let mut current = prefix.to_string();
            node.collect(&mut current, &mut out);
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
        inner.root = TrieNode::default();
        inner.words = 0;
    }

    fn longest_common_prefix(&self) -> String {
        let inner = self.inner.read();
        let mut prefix = String::new();
        let mut node = &inner.root;
        while !node.terminal && node.children.len() == 1 {
            let Some((ch, child)) = node.children.iter().next() else {
                break;
            };
            prefix.push(*ch);
            node = child;
        }
        prefix
    }
}
