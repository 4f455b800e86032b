//! Concatenation operators (`a b c`)
//!
//! Matching keeps a frontier of partial matches. Each element is applied at
//! the end of every frontier entry, and every (entry, match) pair becomes an
//! entry of the next frontier. An element that extends no entry fails the
//! whole concatenation.

use std::sync::Arc;

use super::{Op, Operator};
use crate::engine::{children_of, Context, Failures, Partial};
use crate::error::MatchResult;
use crate::node::{Key, Nodes};
use crate::pool::Pooled;

/// Ordered sequence of elements
pub struct Concat {
    key: Key,
    ops: Vec<Op>,
    all: bool,
}

impl Concat {
    /// Create a concatenation; with `all` every surviving match is returned,
    /// otherwise only the best one
    pub fn new(key: impl Into<Key>, ops: Vec<Op>, all: bool) -> Self {
        Self {
            key: key.into(),
            ops,
            all,
        }
    }

    /// Elements in order
    pub fn elements(&self) -> &[Op] {
        &self.ops
    }
}

impl Operator for Concat {
    fn key(&self) -> &str {
        &self.key
    }

    fn apply<'i>(&self, cx: &Context<'_, 'i>, pos: usize, out: &mut Nodes<'i>) -> MatchResult {
        let mut frontier = match sequence(cx, &self.ops, pos) {
            Ok(frontier) => frontier,
            Err(failures) => return Err(failures.into_error(&self.key, pos)),
        };

        if self.all {
            let children = children_of(&frontier);
            for (p, children) in frontier.drain(..).zip(children) {
                out.push(cx.node(&self.key, pos, p.end - pos, children));
            }
            return Ok(());
        }

        let best = frontier
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| b.end.cmp(&a.end).then_with(|| b.len().cmp(&a.len())))
            .map(|(i, _)| i);
        if let Some(i) = best {
            let p = &frontier[i];
            out.push(cx.node(&self.key, pos, p.end - pos, p.children()));
        }
        Ok(())
    }
}

impl std::fmt::Debug for Concat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Concat")
            .field("key", &&*self.key)
            .field("elements", &self.ops.len())
            .field("all", &self.all)
            .finish()
    }
}

/// Extend `base` by every match of `op` at its end
///
/// Extensions share `base`'s matched prefix.
pub(crate) fn advance<'i>(
    cx: &Context<'_, 'i>,
    op: &dyn Operator,
    base: &Partial<'i>,
    sub: &mut Nodes<'i>,
    into: &mut Vec<Partial<'i>>,
    failures: &mut Failures<'_>,
) {
    sub.clear();
    if let Err(err) = op.apply(cx, base.end, sub) {
        failures.push(err);
        return;
    }
    into.extend(sub.drain().map(|sn| base.then(sn)));
}

/// Match `ops` one after another starting at `pos`
///
/// Returns the final frontier, or the failures of the first element that
/// extended nothing.
pub(crate) fn sequence<'e, 'i, 'o>(
    cx: &Context<'e, 'i>,
    ops: impl IntoIterator<Item = &'o Op>,
    pos: usize,
) -> Result<Pooled<'e, Vec<Partial<'i>>>, Failures<'e>> {
    let mut frontier = cx.frontier(4);
    let mut next = cx.frontier(4);
    let mut sub = cx.scratch(4);
    frontier.push(Partial::empty(pos));

    for op in ops {
        let mut failures = cx.failures();
        for p in frontier.drain(..) {
            advance(cx, op.as_ref(), &p, &mut sub, &mut next, &mut failures);
        }
        if next.is_empty() {
            return Err(failures);
        }
        std::mem::swap(&mut *frontier, &mut *next);
    }

    Ok(frontier)
}

/// Concatenation returning only its best match
pub fn concat(key: impl Into<Key>, ops: Vec<Op>) -> Op {
    Arc::new(Concat::new(key, ops, false))
}

/// Concatenation returning every surviving match, in discovery order
pub fn concat_all(key: impl Into<Key>, ops: Vec<Op>) -> Op {
    Arc::new(Concat::new(key, ops, true))
}
