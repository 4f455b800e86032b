//! Structural node cache
//!
//! Ambiguous grammars re-derive the same sub-match many times: every
//! alternative, every frontier entry and every repetition generation may
//! build a node for the same element at the same place. The cache collapses
//! those re-derivations into a single shared [`NodeRef`].
//!
//! A node is identified by its structure:
//!
//! - operator key
//! - position and matched length
//! - identity of the input buffer (address and length)
//! - identities of its children, in order
//!
//! Child identities are stable because an entry keeps its children alive,
//! so an address cannot be reused while the entry exists.
//!
//! # Implementation Details
//!
//! The map is split into [`SHARDS`] `hashbrown` maps behind mutexes, all
//! hashed with one shared `ahash` state. Lookups go through the raw-entry
//! API with a precomputed hash, so a hit never allocates an owned key.

use std::hash::{BuildHasher, Hash, Hasher};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use hashbrown::HashMap;

use crate::node::{Children, Key, Node, NodeRef};

/// Number of independently locked shards
pub const SHARDS: usize = 16;

/// Structural identity of a node
///
/// Holding the children keeps their addresses from being reused.
struct CacheKey<'i> {
    key: Key,
    pos: usize,
    len: usize,
    input: (usize, usize),
    children: Children<'i>,
}

impl PartialEq for CacheKey<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.pos == other.pos
            && self.len == other.len
            && self.input == other.input
            && self.key == other.key
            && same_children(&self.children, &other.children)
    }
}

impl Eq for CacheKey<'_> {}

impl Hash for CacheKey<'_> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        write_parts(state, &self.key, self.pos, self.len, self.input, &self.children);
    }
}

/// Borrowed view of a node being built, hashed like its [`CacheKey`]
struct Probe<'a, 'i> {
    key: &'a str,
    pos: usize,
    len: usize,
    input: (usize, usize),
    children: &'a Children<'i>,
}

impl<'i> Probe<'_, 'i> {
    fn matches(&self, k: &CacheKey<'i>) -> bool {
        k.pos == self.pos
            && k.len == self.len
            && k.input == self.input
            && &*k.key == self.key
            && same_children(&k.children, self.children)
    }

    fn to_key(&self, key: &Key) -> CacheKey<'i> {
        CacheKey {
            key: key.clone(),
            pos: self.pos,
            len: self.len,
            input: self.input,
            children: self.children.clone(),
        }
    }
}

/// Hash everything but the inner children
///
/// Only the first and last child are hashed so that the long child lists of
/// repetitions hash in constant time; equality still compares every child.
fn write_parts<H: Hasher>(
    state: &mut H,
    key: &str,
    pos: usize,
    len: usize,
    input: (usize, usize),
    children: &[NodeRef<'_>],
) {
    key.hash(state);
    pos.hash(state);
    len.hash(state);
    input.hash(state);
    state.write_usize(children.len());
    if let (Some(first), Some(last)) = (children.first(), children.last()) {
        state.write_usize(identity(first));
        state.write_usize(identity(last));
    }
}

/// Same child nodes by identity, in order
fn same_children(a: &Children<'_>, b: &Children<'_>) -> bool {
    a.same_view(b)
        || (a.len() == b.len() && a.iter().zip(b.iter()).all(|(x, y)| identity(x) == identity(y)))
}

#[inline]
fn identity(node: &NodeRef<'_>) -> usize {
    Arc::as_ptr(node) as usize
}

/// Cache counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Interned nodes currently held
    pub entries: usize,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that built a new node
    pub misses: u64,
}

impl CacheStats {
    /// Fraction of lookups answered from the cache
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

type Shard<'i> = Mutex<HashMap<CacheKey<'i>, NodeRef<'i>, ahash::RandomState>>;

/// Thread-safe structural cache of nodes over inputs living for `'i`
///
/// Disabled by default. While enabled, buffers must not be mutated; the
/// `'i` borrow enforces it. Reusing a cache for a different buffer at the
/// same address requires [`NodeCache::clear`] first.
pub struct NodeCache<'i> {
    shards: Box<[Shard<'i>]>,
    hasher: ahash::RandomState,
    enabled: AtomicBool,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<'i> NodeCache<'i> {
    /// Create a disabled cache
    pub fn new() -> Self {
        let hasher = ahash::RandomState::new();
        let shards = (0..SHARDS)
            .map(|_| Mutex::new(HashMap::with_hasher(hasher.clone())))
            .collect();
        Self {
            shards,
            hasher,
            enabled: AtomicBool::new(false),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Turn the cache on, reserving room for about `size_hint` nodes
    ///
    /// Enabling an enabled cache only reserves.
    pub fn enable(&self, size_hint: usize) {
        let per_shard = size_hint.div_ceil(SHARDS);
        if per_shard > 0 {
            for shard in self.shards.iter() {
                shard
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .reserve(per_shard);
            }
        }
        if !self.enabled.swap(true, Ordering::AcqRel) {
            log_debug!("cache: enabled (size hint {})", size_hint);
        }
    }

    /// Turn the cache off and drop every entry
    pub fn disable(&self) {
        self.enabled.store(false, Ordering::Release);
        self.clear();
        log_debug!("cache: disabled");
    }

    /// Whether nodes are currently interned
    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Drop every entry and reset the counters
    pub fn clear(&self) {
        for shard in self.shards.iter() {
            shard.lock().unwrap_or_else(PoisonError::into_inner).clear();
        }
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        log_debug!("cache: cleared");
    }

    /// Number of interned nodes
    pub fn len(&self) -> usize {
        self.shards
            .iter()
            .map(|s| s.lock().unwrap_or_else(PoisonError::into_inner).len())
            .sum()
    }

    /// True when nothing is interned
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Current counters
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }

    /// Build a node, or return the structurally identical one already
    /// interned
    ///
    /// `pos + len` must lie within `input`.
    pub fn intern(
        &self,
        key: &Key,
        input: &'i [u8],
        pos: usize,
        len: usize,
        children: impl Into<Children<'i>>,
    ) -> NodeRef<'i> {
        let value = &input[pos..pos + len];
        let children = children.into();
        if !self.is_enabled() {
            return Arc::new(Node::new(key.clone(), pos, value, children));
        }

        let probe = Probe {
            key,
            pos,
            len,
            input: (input.as_ptr() as usize, input.len()),
            children: &children,
        };
        let hash = {
            let mut state = self.hasher.build_hasher();
            write_parts(
                &mut state,
                probe.key,
                probe.pos,
                probe.len,
                probe.input,
                probe.children,
            );
            state.finish()
        };

        let shard = &self.shards[(hash >> 32) as usize % SHARDS];
        let mut map = shard.lock().unwrap_or_else(PoisonError::into_inner);
        let mut built = false;
        let (_, node) = map
            .raw_entry_mut()
            .from_hash(hash, |k| probe.matches(k))
            .or_insert_with(|| {
                built = true;
                let node = Arc::new(Node::new(key.clone(), pos, value, children.clone()));
                (probe.to_key(key), node)
            });
        let node = node.clone();
        drop(map);

        if built {
            self.misses.fetch_add(1, Ordering::Relaxed);
        } else {
            self.hits.fetch_add(1, Ordering::Relaxed);
        }
        node
    }
}

impl Default for NodeCache<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for NodeCache<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeCache")
            .field("enabled", &self.is_enabled())
            .field("stats", &self.stats())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Key {
        Key::from(s)
    }

    #[test]
    fn test_disabled_cache_builds_fresh_nodes() {
        let cache = NodeCache::new();
        let input = b"abc";
        let a = cache.intern(&key("a"), input, 0, 1, Children::empty());
        let b = cache.intern(&key("a"), input, 0, 1, Children::empty());
        assert_eq!(a, b);
        assert!(!Arc::ptr_eq(&a, &b));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_identical_nodes_are_shared() {
        let cache = NodeCache::new();
        cache.enable(64);
        let input = b"abc";

        let a = cache.intern(&key("a"), input, 0, 1, Children::empty());
        let b = cache.intern(&key("a"), input, 0, 1, Children::empty());
        assert!(Arc::ptr_eq(&a, &b));

        let stats = cache.stats();
        assert_eq!(stats.entries, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn test_structure_distinguishes_entries() {
        let cache = NodeCache::new();
        cache.enable(0);
        let input = b"aa";

        let a0 = cache.intern(&key("a"), input, 0, 1, Children::empty());
        let a1 = cache.intern(&key("a"), input, 1, 1, Children::empty());
        let b0 = cache.intern(&key("b"), input, 0, 1, Children::empty());
        let a00 = cache.intern(&key("a"), input, 0, 0, Children::empty());
        assert!(!Arc::ptr_eq(&a0, &a1));
        assert!(!Arc::ptr_eq(&a0, &b0));
        assert!(!Arc::ptr_eq(&a0, &a00));

        let p1 = cache.intern(&key("p"), input, 0, 2, vec![a0.clone(), a1.clone()]);
        let p2 = cache.intern(&key("p"), input, 0, 2, vec![a0.clone(), a1.clone()]);
        let p3 = cache.intern(&key("p"), input, 0, 2, vec![a0.clone()]);
        assert!(Arc::ptr_eq(&p1, &p2));
        assert!(!Arc::ptr_eq(&p1, &p3));
        assert_eq!(p1.children().len(), 2);
    }

    #[test]
    fn test_shared_view_and_copy_intern_alike() {
        let cache = NodeCache::new();
        cache.enable(0);
        let input = b"aa";

        let a0 = cache.intern(&key("a"), input, 0, 1, Children::empty());
        let a1 = cache.intern(&key("a"), input, 1, 1, Children::empty());
        let items: Arc<[NodeRef<'_>]> = vec![a0.clone(), a1.clone()].into();

        let one = cache.intern(&key("p"), input, 0, 1, Children::prefix(items.clone(), 1));
        let two = cache.intern(&key("p"), input, 0, 2, Children::prefix(items, 2));
        assert!(!Arc::ptr_eq(&one, &two));
        assert_eq!(one.children().as_ptr(), two.children().as_ptr());

        let copied = cache.intern(&key("p"), input, 0, 2, vec![a0, a1]);
        assert!(Arc::ptr_eq(&copied, &two));
    }

    #[test]
    fn test_distinct_buffers_do_not_collide() {
        let first = b"xy".to_vec();
        let second = b"xy".to_vec();
        let cache = NodeCache::new();
        cache.enable(0);

        let a = cache.intern(&key("x"), &first, 0, 1, Children::empty());
        let b = cache.intern(&key("x"), &second, 0, 1, Children::empty());
        assert!(!Arc::ptr_eq(&a, &b));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_disable_drops_entries() {
        let cache = NodeCache::new();
        cache.enable(8);
        cache.enable(8);
        assert!(cache.is_enabled());

        cache.intern(&key("a"), b"a", 0, 1, Children::empty());
        assert_eq!(cache.len(), 1);

        cache.disable();
        assert!(!cache.is_enabled());
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), CacheStats::default());
    }
}
