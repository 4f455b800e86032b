//! Forward references
//!
//! ABNF rules refer to each other recursively (`group` contains an
//! `alternation` that contains `group`s). A [`Forward`] is created first,
//! used wherever the rule is referenced, and bound to the real operator once
//! it exists.
//!
//! The binding is weak: whoever owns the rule set keeps the target alive,
//! and reference cycles through forwards never leak.
//!
//! ```rust
//! use abnf_engine::prelude::*;
//!
//! // list = "(" [ list ] ")"
//! let list_ref = forward("list");
//! let list = concat(
//!     "list",
//!     vec![
//!         literal("(", b"("),
//!         optional("[ list ]", list_ref.clone()),
//!         literal(")", b")"),
//!     ],
//! );
//! list_ref.define(&list);
//!
//! let engine = Engine::new();
//! assert_eq!(engine.parse_best(&list, b"(())").unwrap().len(), 4);
//! ```

use std::sync::{Arc, OnceLock, Weak};

use super::{Op, Operator};
use crate::engine::Context;
use crate::error::{MatchError, MatchResult};
use crate::node::{Key, Nodes};

/// Named placeholder bound to an operator after construction
pub struct Forward {
    key: Key,
    target: OnceLock<Weak<dyn Operator>>,
}

impl Forward {
    /// Create an unbound reference
    pub fn new(key: impl Into<Key>) -> Self {
        Self {
            key: key.into(),
            target: OnceLock::new(),
        }
    }

    /// Bind to `op`; returns false if already bound
    pub fn define(&self, op: &Op) -> bool {
        self.target.set(Arc::downgrade(op)).is_ok()
    }

    /// Whether the reference is bound to a live operator
    pub fn is_defined(&self) -> bool {
        self.target
            .get()
            .is_some_and(|target| target.strong_count() > 0)
    }
}

impl Operator for Forward {
    fn key(&self) -> &str {
        &self.key
    }

    fn apply<'i>(&self, cx: &Context<'_, 'i>, pos: usize, out: &mut Nodes<'i>) -> MatchResult {
        match self.target.get().and_then(Weak::upgrade) {
            Some(op) => op.apply(cx, pos, out),
            None => Err(MatchError::Unresolved {
                key: self.key.clone(),
            }),
        }
    }
}

impl std::fmt::Debug for Forward {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Forward")
            .field("key", &&*self.key)
            .field("defined", &self.is_defined())
            .finish()
    }
}

/// Unbound forward reference; coerces to [`Op`] with `.clone()`
pub fn forward(key: impl Into<Key>) -> Arc<Forward> {
    Arc::new(Forward::new(key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::operators::{alt, literal};

    #[test]
    fn test_unbound_forward_is_unresolved() {
        let engine = Engine::new();
        let fwd = forward("rule");
        assert!(!fwd.is_defined());
        assert_eq!(
            engine.parse(fwd.as_ref(), b"x"),
            Err(MatchError::Unresolved { key: Key::from("rule") })
        );
    }

    #[test]
    fn test_forward_delegates_without_a_node() {
        let engine = Engine::new();
        let fwd = forward("x-ref");
        let target = literal("x", b"x");
        assert!(fwd.define(&target));
        assert!(!fwd.define(&target));
        assert!(fwd.is_defined());

        let ns = engine.parse(fwd.as_ref(), b"x").unwrap();
        assert_eq!(ns.len(), 1);
        assert_eq!(ns[0].key(), "x");
    }

    #[test]
    fn test_dropped_target_is_unresolved() {
        let engine = Engine::new();
        let fwd = forward("gone");
        {
            let target = literal("x", b"x");
            fwd.define(&target);
        }
        assert!(!fwd.is_defined());
        assert!(matches!(
            engine.parse(fwd.as_ref(), b"x"),
            Err(MatchError::Unresolved { .. })
        ));
    }

    #[test]
    fn test_recursive_rule() {
        let engine = Engine::new();
        let nested_ref = forward("nested");
        let inner: Op = nested_ref.clone();
        let nested = alt(
            "nested",
            vec![
                crate::operators::concat(
                    "\"[\" nested \"]\"",
                    vec![literal("[", b"["), inner, literal("]", b"]")],
                ),
                literal("x", b"x"),
            ],
        );
        nested_ref.define(&nested);

        let best = engine.parse_best(nested.as_ref(), b"[[x]]").unwrap();
        assert_eq!(best.len(), 5);
        assert_eq!(best.get_all("nested").len(), 3);
    }
}
