//! Repetition operators (`n*m element`, `[ element ]`)
//!
//! A repetition first matches its mandatory `min` occurrences, then grows
//! greedily one occurrence per generation. A generation is kept only while
//! it reaches further than the one it grew from, which also stops elements
//! that can match the empty string.
//!
//! Every generation contributes its matches, so `*("a")` on `"aaa"` yields
//! `"aaa"`, `"aa"`, `"a"` and `""`, best first.

use std::sync::Arc;

use super::concat::{advance, sequence};
use super::{Op, Operator};
use crate::engine::{children_of, Context, Partial};
use crate::error::MatchResult;
use crate::node::{Key, Nodes};

/// Between `min` and `max` occurrences of an element; `max == 0` is
/// unbounded
pub struct Repeat {
    key: Key,
    min: usize,
    max: usize,
    op: Op,
}

impl Repeat {
    /// Create a repetition
    ///
    /// A bounded `max` below `min` is raised to `min`.
    pub fn new(key: impl Into<Key>, min: usize, max: usize, op: Op) -> Self {
        let max = if max > 0 && max < min { min } else { max };
        Self {
            key: key.into(),
            min,
            max,
            op,
        }
    }

    /// Mandatory occurrences
    pub fn min(&self) -> usize {
        self.min
    }

    /// Maximum occurrences, 0 when unbounded
    pub fn max(&self) -> usize {
        self.max
    }
}

impl Operator for Repeat {
    fn key(&self) -> &str {
        &self.key
    }

    fn apply<'i>(&self, cx: &Context<'_, 'i>, pos: usize, out: &mut Nodes<'i>) -> MatchResult {
        let mut all = if self.min == 0 {
            let mut all = cx.frontier(4);
            all.push(Partial::empty(pos));
            all
        } else {
            match sequence(cx, std::iter::repeat(&self.op).take(self.min), pos) {
                Ok(frontier) => frontier,
                Err(failures) => return Err(failures.into_error(&self.key, pos)),
            }
        };

        let mut next = cx.frontier(4);
        let mut sub = cx.scratch(4);
        let mut discarded = cx.failures();
        let mut start = 0;
        let mut count = self.min;

        while self.max == 0 || count < self.max {
            let end = all.len();
            for p in &all[start..end] {
                advance(cx, self.op.as_ref(), p, &mut sub, &mut next, &mut discarded);
            }
            discarded.clear();

            let reached = all[start..end].iter().map(|p| p.end).max();
            let extended = next.iter().map(|p| p.end).max();
            if extended <= reached {
                next.clear();
                break;
            }

            all.append(&mut next);
            start = end;
            count += 1;
        }

        let mut results = cx.scratch(all.len());
        let children = children_of(&all);
        for (p, children) in all.drain(..).zip(children) {
            results.push(cx.node(&self.key, pos, p.end - pos, children));
        }
        results.sort();
        out.extend(results.drain());
        Ok(())
    }
}

impl std::fmt::Debug for Repeat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repeat")
            .field("key", &&*self.key)
            .field("min", &self.min)
            .field("max", &self.max)
            .field("element", &self.op.key())
            .finish()
    }
}

/// `min*max element`; `max == 0` is unbounded
pub fn repeat(key: impl Into<Key>, min: usize, max: usize, op: Op) -> Op {
    Arc::new(Repeat::new(key, min, max, op))
}

/// `n element`: exactly `n` occurrences
pub fn repeat_n(key: impl Into<Key>, n: usize, op: Op) -> Op {
    repeat(key, n, n, op)
}

/// `*element`
pub fn repeat_0_inf(key: impl Into<Key>, op: Op) -> Op {
    repeat(key, 0, 0, op)
}

/// `1*element`
pub fn repeat_1_inf(key: impl Into<Key>, op: Op) -> Op {
    repeat(key, 1, 0, op)
}

/// `[ element ]`
pub fn optional(key: impl Into<Key>, op: Op) -> Op {
    repeat(key, 0, 1, op)
}
