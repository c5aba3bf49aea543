//! Prefix trees over `char` strings.
//!
//! [`Trie`] keeps one node per character. [`RadixTrie`] compresses single-child chains
//! into multi-character edge labels, splitting an edge on insert when a new word diverges
//! inside it and merging chains back together on delete. Both implement [`PrefixTree`]
//! and return identical results for the same set of words, so callers can swap them.
//!
//! Enumeration (`get_all_with_prefix`, `wildcard_search`, `get_all`) is depth first with
//! children visited in `char` order, which yields words in lexicographic order.
//!
//! Each tree guards its nodes with a `parking_lot::RwLock`; queries take the shared lock.
//!
//! # Example
//!
//! ```ignore
//! use skp_primitives::{PrefixTree, RadixTrie};
//!
//! let tree = RadixTrie::new();
//! tree.insert_with_value("romane", 1);
//! tree.insert_with_value("romanus", 2);
//! tree.insert("rubens");
//!
//! assert!(tree.starts_with("roma"));
//! assert_eq!(tree.search_with_value("romanus"), Some(2));
//! assert_eq!(tree.get_all_with_prefix("r"), vec!["romane", "romanus", "rubens"]);
//! assert_eq!(tree.wildcard_search("r.bens"), vec!["rubens"]);
//! ```

mod radix;
mod router;
mod standard;

pub use radix::RadixTrie;
pub use router::PathRouter;
pub use standard::Trie;

/// Character matching any single character in [`PrefixTree::wildcard_search`].
pub const WILDCARD: char = '.';

/// Shared contract of [`Trie`] and [`RadixTrie`].
///
/// A word may be stored with or without a payload. The empty string is a valid word.
pub trait PrefixTree<V>: Send + Sync {
    /// Store `word` without changing any payload it already has.
    fn insert(&self, word: &str);

    /// Store `word` with `value`, replacing any previous payload.
    fn insert_with_value(&self, word: &str, value: V);

    /// Check whether `word` was stored.
    fn search(&self, word: &str) -> bool;

    /// Payload of `word`; `None` if the word is absent or was stored without one.
    fn search_with_value(&self, word: &str) -> Option<V>;

    /// Check whether any stored word begins with `prefix`.
    fn starts_with(&self, prefix: &str) -> bool;

    /// Every stored word beginning with `prefix`, in lexicographic order.
    fn get_all_with_prefix(&self, prefix: &str) -> Vec<String>;

    /// Remove `word`, pruning nodes that no longer lead to a word. Returns `true` if the
    /// word was stored.
    fn delete(&self, word: &str) -> bool;

    /// Stored words matching `pattern` character for character, where [`WILDCARD`]
    /// matches any one character.
    fn wildcard_search(&self, pattern: &str) -> Vec<String>;

    /// Number of stored words.
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Remove every word.
    fn clear(&self);

    /// Every stored word in lexicographic order.
    fn get_all(&self) -> Vec<String> {
        self.get_all_with_prefix("")
    }

    /// At most `max` completions of `prefix`, in lexicographic order.
    fn auto_complete(&self, prefix: &str, max: usize) -> Vec<String> {
        let mut words = self.get_all_with_prefix(prefix);
        words.truncate(max);
        words
    }

    /// Longest prefix shared by every stored word; empty when the tree is empty.
    fn longest_common_prefix(&self) -> String;
}
