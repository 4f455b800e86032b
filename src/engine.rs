//! Engine handle and match context
//!
//! An [`Engine`] owns the services every operator shares: the node cache,
//! the scratch pools and the terse/detailed error switch. It is `Sync`, so
//! one engine can serve parses on many threads at once.
//!
//! Operators never see the engine directly. Each call receives a
//! [`Context`] that pairs the engine with the input being matched.
//!
//! # Lifetimes
//!
//! Nodes borrow the input (`'i`), and the cache holds nodes, so the input
//! must outlive the engine that matched it:
//!
//! ```rust
//! use abnf_engine::{literal, Engine};
//!
//! let input = b"ABC".to_vec();
//! let engine = Engine::new();
//! let nodes = engine.parse(&literal("abc", b"abc"), &input).unwrap();
//! assert_eq!(nodes[0].value(), b"ABC");
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use hashbrown::HashMap;

use crate::cache::NodeCache;
use crate::config::EngineConfig;
use crate::error::{MatchError, MatchResult, ParseError};
use crate::node::{Children, Key, NodeRef, Nodes};
use crate::operators::Operator;
use crate::pool::{Pool, Pooled};

/// One matched element of a partial match, linked to the elements before it
///
/// Partials that grow from the same prefix share its links.
struct Link<'i> {
    node: NodeRef<'i>,
    depth: usize,
    prev: Option<Arc<Link<'i>>>,
}

impl Drop for Link<'_> {
    // Iterative: chains are as long as the longest repetition
    fn drop(&mut self) {
        let mut prev = self.prev.take();
        while let Some(link) = prev {
            match Arc::try_unwrap(link) {
                Ok(mut link) => prev = link.prev.take(),
                Err(_) => break,
            }
        }
    }
}

/// A match in progress: where it ends and what it has matched so far
#[derive(Clone)]
pub(crate) struct Partial<'i> {
    pub(crate) end: usize,
    tail: Option<Arc<Link<'i>>>,
}

impl<'i> Partial<'i> {
    pub(crate) fn empty(pos: usize) -> Self {
        Self {
            end: pos,
            tail: None,
        }
    }

    /// Number of matched elements
    pub(crate) fn len(&self) -> usize {
        self.tail.as_ref().map_or(0, |link| link.depth)
    }

    /// Matched elements, copied out of the links
    pub(crate) fn children(&self) -> Children<'i> {
        self.tail.as_deref().map_or_else(Children::empty, materialize)
    }

    /// This match followed by `node`
    pub(crate) fn then(&self, node: NodeRef<'i>) -> Self {
        let end = node.end();
        Self {
            end,
            tail: Some(Arc::new(Link {
                depth: self.len() + 1,
                node,
                prev: self.tail.clone(),
            })),
        }
    }
}

impl std::fmt::Debug for Partial<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Partial")
            .field("end", &self.end)
            .field("len", &self.len())
            .finish()
    }
}

/// Child lists for finished partials, in the same order
///
/// Each chain of links is copied out once. A partial that is a prefix of a
/// longer one gets a view into the longer one's buffer.
pub(crate) fn children_of<'i>(partials: &[Partial<'i>]) -> Vec<Children<'i>> {
    let mut out = vec![Children::empty(); partials.len()];
    if let [single] = partials {
        out[0] = single.children();
        return out;
    }

    let mut order: Vec<usize> = (0..partials.len()).collect();
    order.sort_by_key(|&i| std::cmp::Reverse(partials[i].len()));

    let mut buffers: HashMap<usize, Arc<[NodeRef<'i>]>, ahash::RandomState> =
        HashMap::with_hasher(ahash::RandomState::new());
    for i in order {
        let Some(tail) = partials[i].tail.as_deref() else {
            continue;
        };
        let id = tail as *const Link<'i> as usize;
        if let Some(items) = buffers.get(&id) {
            out[i] = Children::prefix(items.clone(), tail.depth);
            continue;
        }

        let view = materialize(tail);
        if let Some(items) = view.shared() {
            let mut link = Some(tail);
            while let Some(l) = link {
                let id = l as *const Link<'i> as usize;
                if buffers.contains_key(&id) {
                    break;
                }
                buffers.insert(id, items.clone());
                link = l.prev.as_deref();
            }
        }
        out[i] = view;
    }
    out
}

fn materialize<'i>(tail: &Link<'i>) -> Children<'i> {
    let mut items = Vec::with_capacity(tail.depth);
    let mut link = Some(tail);
    while let Some(l) = link {
        items.push(l.node.clone());
        link = l.prev.as_deref();
    }
    items.reverse();
    Children::from(items)
}

/// Shared matching services for inputs living at least `'i`
pub struct Engine<'i> {
    config: EngineConfig,
    detailed: AtomicBool,
    cache: NodeCache<'i>,
    nodes: Pool<Nodes<'i>>,
    frontiers: Pool<Vec<Partial<'i>>>,
    errors: Pool<Vec<MatchError>>,
}

impl<'i> Engine<'i> {
    /// Create an engine with default settings: terse errors, no cache
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    /// Create an engine from a config
    pub fn with_config(config: EngineConfig) -> Self {
        let engine = Self {
            detailed: AtomicBool::new(config.detailed_errors),
            cache: NodeCache::new(),
            nodes: Pool::with_limits(config.pool_idle_limit, config.pool_max_capacity),
            frontiers: Pool::with_limits(config.pool_idle_limit, config.pool_max_capacity),
            errors: Pool::with_limits(config.pool_idle_limit, config.pool_max_capacity),
            config,
        };
        if engine.config.cache_enabled {
            engine.cache.enable(engine.config.cache_size_hint);
        }
        engine
    }

    /// Config the engine was created from
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Whether failures keep their full chain
    #[inline]
    pub fn detailed(&self) -> bool {
        self.detailed.load(Ordering::Relaxed)
    }

    /// Keep full error chains
    pub fn enable_detailed_errors(&self) {
        self.detailed.store(true, Ordering::Relaxed);
    }

    /// Collapse every failure to [`MatchError::NotMatched`]
    pub fn disable_detailed_errors(&self) {
        self.detailed.store(false, Ordering::Relaxed);
    }

    /// Turn the node cache on
    pub fn enable_cache(&self, size_hint: usize) {
        self.cache.enable(size_hint);
    }

    /// Turn the node cache off, dropping its entries
    pub fn disable_cache(&self) {
        self.cache.disable();
    }

    /// The node cache
    pub fn cache(&self) -> &NodeCache<'i> {
        &self.cache
    }

    /// Match context for `input`
    pub fn context<'e>(&'e self, input: &'i [u8]) -> Context<'e, 'i> {
        Context {
            engine: self,
            input,
        }
    }

    /// Apply `op` to `input` at `pos`, appending matches to `out`
    pub fn apply(
        &self,
        op: &dyn Operator,
        input: &'i [u8],
        pos: usize,
        out: &mut Nodes<'i>,
    ) -> MatchResult {
        op.apply(&self.context(input), pos, out)
    }

    /// Every match of `op` at the start of `input`, best first
    pub fn parse(&self, op: &dyn Operator, input: &'i [u8]) -> Result<Nodes<'i>, MatchError> {
        log_debug!("parse: {:?} on {} bytes", op.key(), input.len());
        let mut out = Nodes::new();
        match self.apply(op, input, 0, &mut out) {
            Ok(()) => {
                log_debug!("parse: {:?} produced {} matches", op.key(), out.len());
                Ok(out)
            }
            Err(err) => {
                log_debug!("parse: {:?} failed", op.key());
                Err(err)
            }
        }
    }

    /// Best match of `op` at the start of `input`
    pub fn parse_best(&self, op: &dyn Operator, input: &'i [u8]) -> Result<NodeRef<'i>, MatchError> {
        let nodes = self.parse(op, input)?;
        nodes.best().cloned().ok_or(MatchError::NotMatched)
    }

    /// Best match of `op`, required to span all of `input`
    pub fn parse_complete(
        &self,
        op: &dyn Operator,
        input: &'i [u8],
    ) -> Result<NodeRef<'i>, ParseError> {
        let best = self.parse_best(op, input)?;
        if best.len() != input.len() {
            return Err(ParseError::Incomplete {
                expected: input.len(),
                actual: best.len(),
            });
        }
        Ok(best)
    }
}

impl Default for Engine<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for Engine<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("detailed", &self.detailed())
            .field("cache", &self.cache)
            .field("config", &self.config)
            .finish()
    }
}

/// What an operator sees while matching: the input and the engine services
#[derive(Clone, Copy)]
pub struct Context<'e, 'i> {
    engine: &'e Engine<'i>,
    input: &'i [u8],
}

impl<'e, 'i> Context<'e, 'i> {
    /// Bytes being matched
    #[inline]
    pub fn input(&self) -> &'i [u8] {
        self.input
    }

    /// Engine behind this context
    #[inline]
    pub fn engine(&self) -> &'e Engine<'i> {
        self.engine
    }

    /// Whether failures keep their full chain
    #[inline]
    pub fn detailed(&self) -> bool {
        self.engine.detailed()
    }

    /// Build (or reuse) a node spanning `input[pos..pos + len]`
    pub fn node(
        &self,
        key: &Key,
        pos: usize,
        len: usize,
        children: impl Into<Children<'i>>,
    ) -> NodeRef<'i> {
        self.engine.cache.intern(key, self.input, pos, len, children)
    }

    /// Build (or reuse) a node without children
    pub fn leaf(&self, key: &Key, pos: usize, len: usize) -> NodeRef<'i> {
        self.node(key, pos, len, Children::empty())
    }

    /// Failure of `key` at `pos` with no further cause
    pub fn not_matched(&self, key: &Key, pos: usize) -> MatchError {
        self.wrap(key, pos, MatchError::NotMatched)
    }

    /// Attribute `err` to `key` at `pos`
    ///
    /// In terse mode anything that bottoms out in not-matched collapses to
    /// the bare sentinel.
    pub fn wrap(&self, key: &Key, pos: usize, err: MatchError) -> MatchError {
        if self.detailed() {
            MatchError::operator(key, pos, err)
        } else if err.is_not_matched() {
            MatchError::NotMatched
        } else {
            err
        }
    }

    /// Pooled node collection for sub-results
    pub fn scratch(&self, hint: usize) -> Pooled<'e, Nodes<'i>> {
        self.engine.nodes.acquire(hint)
    }

    pub(crate) fn frontier(&self, hint: usize) -> Pooled<'e, Vec<Partial<'i>>> {
        self.engine.frontiers.acquire(hint)
    }

    /// Accumulator for sibling failures
    pub fn failures(&self) -> Failures<'e> {
        Failures {
            detailed: self.detailed(),
            not_matched: false,
            errors: None,
            pool: &self.engine.errors,
        }
    }
}

impl std::fmt::Debug for Context<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("input_len", &self.input.len())
            .field("detailed", &self.detailed())
            .finish()
    }
}

/// Failures collected from sibling branches
///
/// Terse mode only remembers that something failed; detailed mode keeps
/// every error in a pooled list.
pub struct Failures<'e> {
    detailed: bool,
    not_matched: bool,
    errors: Option<Pooled<'e, Vec<MatchError>>>,
    pool: &'e Pool<Vec<MatchError>>,
}

impl Failures<'_> {
    /// Record a failure
    pub fn push(&mut self, err: MatchError) {
        if !self.detailed && err.is_not_matched() {
            self.not_matched = true;
            return;
        }
        let pool = self.pool;
        self.errors.get_or_insert_with(|| pool.acquire(4)).push(err);
    }

    /// Forget every recorded failure
    pub fn clear(&mut self) {
        self.not_matched = false;
        if let Some(errors) = self.errors.as_mut() {
            errors.clear();
        }
    }

    /// True when nothing was recorded
    pub fn is_empty(&self) -> bool {
        !self.not_matched && self.errors.as_ref().map_or(true, |e| e.is_empty())
    }

    /// Join the recorded failures and attribute them to `key` at `pos`
    pub fn into_error(self, key: &Key, pos: usize) -> MatchError {
        let errors = self.errors.map(Pooled::take).unwrap_or_default();
        if !self.detailed {
            // join() of nothing is the bare sentinel
            return MatchError::join(errors);
        }
        MatchError::operator(key, pos, MatchError::join(errors))
    }
}
