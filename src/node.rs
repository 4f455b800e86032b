//! Parse tree nodes
//!
//! A [`Node`] records one successful match of one named grammar element.
//! Its value is a borrowed view into the caller's input (zero-copy), and
//! nodes are shared through [`NodeRef`] so that the node cache can hand the
//! same subtree to many parents.
//!
//! Children are held as a [`Children`] view: a prefix of a shared buffer.
//! A repetition emits one node per generation, and every generation reuses
//! the buffer of the longest one.
//!
//! [`Nodes`] is the ordered collection every operator appends to. When a
//! combinator has to rank ambiguous matches it uses [`rank`]:
//!
//! 1. longer value first
//! 2. more children first
//! 3. lower position first
//! 4. lexicographically smaller key first

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Deref, Index};
use std::slice;
use std::sync::Arc;

/// Shared rule/element name
pub type Key = Arc<str>;

/// Shared, immutable reference to a node
pub type NodeRef<'i> = Arc<Node<'i>>;

// ============================================================================
// Children
// ============================================================================

/// The first `len` entries of a shared child buffer
#[derive(Clone, Default)]
pub struct Children<'i> {
    items: Option<Arc<[NodeRef<'i>]>>,
    len: usize,
}

impl<'i> Children<'i> {
    /// No children
    pub const fn empty() -> Self {
        Self { items: None, len: 0 }
    }

    /// View the first `len` entries of `items`
    ///
    /// `len` is clamped to the buffer length.
    pub fn prefix(items: Arc<[NodeRef<'i>]>, len: usize) -> Self {
        let len = len.min(items.len());
        if len == 0 {
            return Self::empty();
        }
        Self {
            items: Some(items),
            len,
        }
    }

    /// Children as a slice
    #[inline]
    pub fn as_slice(&self) -> &[NodeRef<'i>] {
        match &self.items {
            Some(items) => &items[..self.len],
            None => &[],
        }
    }

    /// Buffer behind the view, `None` when empty
    #[inline]
    pub fn shared(&self) -> Option<&Arc<[NodeRef<'i>]>> {
        self.items.as_ref()
    }

    /// True when both views cover the same entries of the same buffer
    #[inline]
    pub fn same_view(&self, other: &Children<'_>) -> bool {
        self.len == other.len
            && match (&self.items, &other.items) {
                (Some(a), Some(b)) => std::ptr::eq(a.as_ptr().cast::<()>(), b.as_ptr().cast::<()>()),
                (None, None) => true,
                _ => false,
            }
    }
}

impl<'i> Deref for Children<'i> {
    type Target = [NodeRef<'i>];

    #[inline]
    fn deref(&self) -> &Self::Target {
        self.as_slice()
    }
}

impl<'i> From<Vec<NodeRef<'i>>> for Children<'i> {
    fn from(items: Vec<NodeRef<'i>>) -> Self {
        let len = items.len();
        if len == 0 {
            return Self::empty();
        }
        Self::prefix(items.into(), len)
    }
}

impl PartialEq for Children<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.same_view(other) || self.as_slice() == other.as_slice()
    }
}

impl Eq for Children<'_> {}

impl fmt::Debug for Children<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.as_slice()).finish()
    }
}

// ============================================================================
// Node
// ============================================================================

/// One named match over a byte range of the input
#[derive(Clone, PartialEq, Eq)]
pub struct Node<'i> {
    key: Key,
    pos: usize,
    value: &'i [u8],
    children: Children<'i>,
}

impl<'i> Node<'i> {
    /// Create a node
    ///
    /// `value` must be the slice of the input starting at `pos`.
    pub fn new(
        key: impl Into<Key>,
        pos: usize,
        value: &'i [u8],
        children: impl Into<Children<'i>>,
    ) -> Self {
        Self {
            key: key.into(),
            pos,
            value,
            children: children.into(),
        }
    }

    /// Create a node without children
    pub fn leaf(key: impl Into<Key>, pos: usize, value: &'i [u8]) -> Self {
        Self::new(key, pos, value, Children::empty())
    }

    /// Rule/element name
    #[inline]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Shared handle to the key
    #[inline]
    pub fn shared_key(&self) -> &Key {
        &self.key
    }

    /// Byte offset where the match begins
    #[inline]
    pub fn pos(&self) -> usize {
        self.pos
    }

    /// Matched bytes
    #[inline]
    pub fn value(&self) -> &'i [u8] {
        self.value
    }

    /// Matched bytes as UTF-8, if valid
    pub fn text(&self) -> Option<&'i str> {
        std::str::from_utf8(self.value).ok()
    }

    /// Length of the match in bytes
    #[inline]
    pub fn len(&self) -> usize {
        self.value.len()
    }

    /// True for empty matches (optional elements, zero repetitions)
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.value.is_empty()
    }

    /// Byte offset right after the match
    #[inline]
    pub fn end(&self) -> usize {
        self.pos + self.value.len()
    }

    /// Sub-matches in grammar order
    #[inline]
    pub fn children(&self) -> &[NodeRef<'i>] {
        self.children.as_slice()
    }

    /// Shared view of the sub-matches
    #[inline]
    pub fn shared_children(&self) -> &Children<'i> {
        &self.children
    }

    /// First node with the given key, searching depth-first starting from self
    pub fn get(&self, key: &str) -> Option<&Node<'i>> {
        if &*self.key == key {
            return Some(self);
        }
        self.children.iter().find_map(|child| child.get(key))
    }

    /// Every node with the given key, self included, in depth-first order
    pub fn get_all(&self, key: &str) -> Vec<&Node<'i>> {
        let mut found = Vec::new();
        self.collect(key, &mut found);
        found
    }

    fn collect<'a>(&'a self, key: &str, found: &mut Vec<&'a Node<'i>>) {
        if &*self.key == key {
            found.push(self);
        }
        for child in self.children.iter() {
            child.collect(key, found);
        }
    }

    /// Copy the matched bytes out of the input
    pub fn to_bytes(&self) -> Vec<u8> {
        self.value.to_vec()
    }
}

impl fmt::Display for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(self.value))
    }
}

impl fmt::Debug for Node<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Node");
        s.field("key", &&*self.key)
            .field("pos", &self.pos)
            .field("value", &String::from_utf8_lossy(self.value));
        if !self.children.is_empty() {
            s.field("children", &self.children.as_slice());
        }
        s.finish()
    }
}

/// Ranking used to order ambiguous matches; `Less` means "better"
pub fn rank(a: &Node<'_>, b: &Node<'_>) -> Ordering {
    b.value
        .len()
        .cmp(&a.value.len())
        .then_with(|| b.children.len().cmp(&a.children.len()))
        .then_with(|| a.pos.cmp(&b.pos))
        .then_with(|| a.key.cmp(&b.key))
}

/// Stable sort of matches, best first
pub fn sort_nodes(nodes: &mut [NodeRef<'_>]) {
    if nodes.len() > 1 {
        nodes.sort_by(|a, b| rank(a, b));
    }
}

/// Best match of a slice: the first of the top-ranked nodes
pub fn best_of<'a, 'i>(nodes: &'a [NodeRef<'i>]) -> Option<&'a NodeRef<'i>> {
    nodes.iter().min_by(|a, b| rank(a, b))
}

/// Ordered collection of matches
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Nodes<'i> {
    items: Vec<NodeRef<'i>>,
}

impl<'i> Nodes<'i> {
    /// Create an empty collection
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Create an empty collection with room for `capacity` nodes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            items: Vec::with_capacity(capacity),
        }
    }

    /// Append a match
    #[inline]
    pub fn push(&mut self, node: NodeRef<'i>) {
        self.items.push(node);
    }

    /// Remove and return the last match
    #[inline]
    pub fn pop(&mut self) -> Option<NodeRef<'i>> {
        self.items.pop()
    }

    /// Drop every match, keeping the allocation
    #[inline]
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Allocated capacity
    #[inline]
    pub fn capacity(&self) -> usize {
        self.items.capacity()
    }

    /// Remove every match, yielding them in order
    pub fn drain(&mut self) -> std::vec::Drain<'_, NodeRef<'i>> {
        self.items.drain(..)
    }

    /// Sort best first (stable)
    pub fn sort(&mut self) {
        sort_nodes(&mut self.items);
    }

    /// Top-ranked match, `None` when empty
    pub fn best(&self) -> Option<&NodeRef<'i>> {
        best_of(&self.items)
    }

    /// Compare two collections by the length of their best matches
    ///
    /// An empty collection ranks below any non-empty one.
    pub fn compare(&self, other: &Nodes<'_>) -> Ordering {
        let a = self.best().map(|n| n.len());
        let b = other.best().map(|n| n.len());
        a.cmp(&b)
    }

    /// First node with the given key across all matches, depth-first
    pub fn get(&self, key: &str) -> Option<&Node<'i>> {
        self.items.iter().find_map(|n| n.get(key))
    }

    /// Every node with the given key across all matches
    pub fn get_all(&self, key: &str) -> Vec<&Node<'i>> {
        let mut found = Vec::new();
        for n in &self.items {
            n.collect(key, &mut found);
        }
        found
    }

    /// Consume into the underlying vector
    pub fn into_vec(self) -> Vec<NodeRef<'i>> {
        self.items
    }
}

impl<'i> Deref for Nodes<'i> {
    type Target = [NodeRef<'i>];

    fn deref(&self) -> &Self::Target {
        &self.items
    }
}

impl<'i> Index<usize> for Nodes<'i> {
    type Output = NodeRef<'i>;

    fn index(&self, index: usize) -> &Self::Output {
        &self.items[index]
    }
}

impl<'i> Extend<NodeRef<'i>> for Nodes<'i> {
    fn extend<T: IntoIterator<Item = NodeRef<'i>>>(&mut self, iter: T) {
        self.items.extend(iter);
    }
}

impl<'i> From<Vec<NodeRef<'i>>> for Nodes<'i> {
    fn from(items: Vec<NodeRef<'i>>) -> Self {
        Self { items }
    }
}

impl<'i> FromIterator<NodeRef<'i>> for Nodes<'i> {
    fn from_iter<T: IntoIterator<Item = NodeRef<'i>>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'i> IntoIterator for Nodes<'i> {
    type Item = NodeRef<'i>;
    type IntoIter = std::vec::IntoIter<NodeRef<'i>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}

impl<'a, 'i> IntoIterator for &'a Nodes<'i> {
    type Item = &'a NodeRef<'i>;
    type IntoIter = slice::Iter<'a, NodeRef<'i>>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

impl fmt::Debug for Nodes<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.items.iter()).finish()
    }
}
