//! ABNF operators
//!
//! Every grammar element is an [`Operator`]. Applying one at a position
//! appends zero or more matches to an output collection, or fails.
//!
//! ## Primitives
//! - [`literal`] / [`literal_cs`] - quoted strings (RFC 5234 / RFC 7405 `%s`)
//! - [`range`] - numeric value ranges such as `%x41-5A`
//!
//! ## Combinators
//! - [`alt`] / [`alt_first`] - alternation (`a / b`)
//! - [`concat`] / [`concat_all`] - concatenation (`a b`)
//! - [`repeat`] and its shorthands - repetition (`n*m a`, `[a]`)
//!
//! ## Recursion
//! - [`forward`] - named reference bound after construction
//!
//! Combinators keep ambiguity: an alternation returns every alternative that
//! matched, and repetition returns every generation it reached. Only
//! [`concat`] narrows the result down to its single best match.
//!
//! # Example
//!
//! ```rust
//! use abnf_engine::prelude::*;
//!
//! // 1*DIGIT ["." 1*DIGIT]
//! let digit = range("DIGIT", b"0", b"9");
//! let number = concat(
//!     "number",
//!     vec![
//!         repeat_1_inf("1*DIGIT", digit.clone()),
//!         optional(
//!             "[\".\" 1*DIGIT]",
//!             concat("\".\" 1*DIGIT", vec![literal_cs(".", b"."), repeat_1_inf("1*DIGIT", digit)]),
//!         ),
//!     ],
//! );
//!
//! let engine = Engine::new();
//! let best = engine.parse_best(&number, b"3.14 rad").unwrap();
//! assert_eq!(best.value(), b"3.14");
//! ```

// ============================================================================
// Module Declarations
// ============================================================================

pub mod alt;
pub mod concat;
pub mod forward;
pub mod literal;
pub mod range;
pub mod repeat;

// ============================================================================
// Re-exports
// ============================================================================

pub use alt::{alt, alt_first, Alt};
pub use concat::{concat, concat_all, Concat};
pub use forward::{forward, Forward};
pub use literal::{literal, literal_cs, Literal};
pub use range::{range, Range};
pub use repeat::{optional, repeat, repeat_0_inf, repeat_1_inf, repeat_n, Repeat};

use std::sync::Arc;

use crate::engine::Context;
use crate::error::MatchResult;
use crate::node::Nodes;

/// A grammar element that can be matched against input
///
/// `apply` either appends at least one match starting at `pos` to `out` and
/// returns `Ok(())`, or appends nothing and returns the failure. Operators
/// hold no per-input state and may be applied concurrently.
pub trait Operator: Send + Sync {
    /// Name used for produced nodes and in error messages
    fn key(&self) -> &str;

    /// Match at `pos`, appending results to `out`
    fn apply<'i>(&self, cx: &Context<'_, 'i>, pos: usize, out: &mut Nodes<'i>) -> MatchResult;
}

/// Shared operator handle
pub type Op = Arc<dyn Operator>;

impl<O: Operator + ?Sized> Operator for Arc<O> {
    fn key(&self) -> &str {
        (**self).key()
    }

    fn apply<'i>(&self, cx: &Context<'_, 'i>, pos: usize, out: &mut Nodes<'i>) -> MatchResult {
        (**self).apply(cx, pos, out)
    }
}
