//! Alternation operators (`a / b`)

use std::sync::Arc;

use super::{Op, Operator};
use crate::engine::Context;
use crate::error::MatchResult;
use crate::node::{Key, Nodes};

/// Ordered alternatives
///
/// Every match of an alternative is wrapped in a node named after the
/// alternation, with the alternative's match as its only child.
pub struct Alt {
    key: Key,
    ops: Vec<Op>,
    first_match: bool,
}

impl Alt {
    /// Create an alternation; with `first_match` it stops at the first
    /// alternative that matches
    pub fn new(key: impl Into<Key>, ops: Vec<Op>, first_match: bool) -> Self {
        Self {
            key: key.into(),
            ops,
            first_match,
        }
    }

    /// Alternatives in order
    pub fn alternatives(&self) -> &[Op] {
        &self.ops
    }
}

impl Operator for Alt {
    fn key(&self) -> &str {
        &self.key
    }

    fn apply<'i>(&self, cx: &Context<'_, 'i>, pos: usize, out: &mut Nodes<'i>) -> MatchResult {
        let mut matched = cx.scratch(self.ops.len());
        let mut sub = cx.scratch(4);
        let mut failures = cx.failures();

        for op in &self.ops {
            sub.clear();
            match op.apply(cx, pos, &mut sub) {
                Ok(()) => {
                    for sn in sub.drain() {
                        let len = sn.len();
                        matched.push(cx.node(&self.key, pos, len, vec![sn]));
                    }
                    if self.first_match {
                        break;
                    }
                }
                Err(err) => failures.push(err),
            }
        }

        if matched.is_empty() {
            return Err(failures.into_error(&self.key, pos));
        }

        matched.sort();
        out.extend(matched.drain());
        Ok(())
    }
}

impl std::fmt::Debug for Alt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Alt")
            .field("key", &&*self.key)
            .field("alternatives", &self.ops.len())
            .field("first_match", &self.first_match)
            .finish()
    }
}

/// Alternation keeping the matches of every alternative
pub fn alt(key: impl Into<Key>, ops: Vec<Op>) -> Op {
    Arc::new(Alt::new(key, ops, false))
}

/// Alternation keeping only the matches of the first matching alternative
pub fn alt_first(key: impl Into<Key>, ops: Vec<Op>) -> Op {
    Arc::new(Alt::new(key, ops, true))
}
