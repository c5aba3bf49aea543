//! Longest-prefix path routing over a [`PrefixTree`].

use std::marker::PhantomData;

use crate::trie::{PrefixTree, Trie};

/// Maps path patterns to handlers.
///
/// Lookup prefers an exact match, then falls back to the longest registered route made
/// of whole leading `/` segments of the path, ending with `/` itself. Paths without a
/// leading `/` are normalized to have one.
///
/// # Example
///
/// ```ignore
/// use skp_primitives::PathRouter;
///
/// let router = PathRouter::new();
/// router.add_route("/api/users", "users");
/// router.add_route("api", "api");
///
/// assert_eq!(router.find_route("/api/users"), Some("users"));
/// assert_eq!(router.find_route("/api/users/42"), Some("users"));
/// assert_eq!(router.find_route("/api/orders"), Some("api"));
/// assert_eq!(router.find_route("/health"), None);
/// ```
pub struct PathRouter<V, T = Trie<V>> {
    tree: T,
    _value: PhantomData<fn() -> V>,
}

impl<V> PathRouter<V>
where
    V: Clone + Send + Sync,
{
    /// Router backed by a [`Trie`].
    pub fn new() -> Self {
        Self::with_tree(Trie::new())
    }
}

impl<V, T> Default for PathRouter<V, T>
where
    T: PrefixTree<V> + Default,
{
    fn default() -> Self {
        Self::with_tree(T::default())
    }
}

impl<V, T> PathRouter<V, T>
where
    T: PrefixTree<V>,
{
    /// Route over an existing tree, typically a [`RadixTrie`](crate::trie::RadixTrie).
    pub fn with_tree(tree: T) -> Self {
        Self {
            tree,
            _value: PhantomData,
        }
    }

    /// Register `handler` for `pattern`, replacing any previous handler.
    pub fn add_route(&self, pattern: &str, handler: V) {
        self.tree.insert_with_value(&normalize(pattern), handler);
    }

    /// Unregister `pattern`. Returns `true` if it was registered.
    pub fn remove_route(&self, pattern: &str) -> bool {
        self.tree.delete(&normalize(pattern))
    }

    /// Handler for `path`.
    pub fn find_route(&self, path: &str) -> Option<V> {
        let path = normalize(path);
        let mut candidate = path.as_str();
        loop {
            if let Some(handler) = self.tree.search_with_value(candidate) {
                return Some(handler);
            }
            match candidate.rfind('/') {
                Some(at) if at > 0 => candidate = &candidate[..at],
                _ => break,
            }
        }
        if candidate == "/" {
            return None;
        }
        self.tree.search_with_value("/")
    }

    /// Registered patterns in lexicographic order.
    pub fn routes(&self) -> Vec<String> {
        self.tree.get_all()
    }

    pub fn len(&self) -> usize {
        self.tree.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }
}

impl<V, T> std::fmt::Debug for PathRouter<V, T>
where
    T: PrefixTree<V>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PathRouter").field("routes", &self.tree.len()).finish()
    }
}

fn normalize(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{path}")
    }
}
