//! Ready-made rule sets
//!
//! - [`core`] - the RFC 5234 Appendix B core rules (`ALPHA`, `DIGIT`, ...)
//! - [`definition`] - ABNF itself (RFC 5234 §4 with the RFC 7405
//!   case-sensitive strings), able to parse grammar files
//!
//! Both sets are built once per process and shared.
//!
//! ```rust
//! use abnf_engine::{rules, Engine};
//!
//! let engine = Engine::new();
//! let rule = engine
//!     .parse_best(&rules::definition::rules().rule, b"BIT = \"0\" / \"1\"\r\n")
//!     .unwrap();
//! assert_eq!(rule.get("rulename").unwrap().value(), b"BIT");
//! ```

pub mod core;
pub mod definition;

use crate::operators::Op;

/// Look up `name` among `(name, rule)` pairs, ignoring ASCII case as ABNF
/// rule names do
fn find<'a>(rules: impl IntoIterator<Item = (&'static str, &'a Op)>, name: &str) -> Option<&'a Op> {
    rules
        .into_iter()
        .find(|(n, _)| n.eq_ignore_ascii_case(name))
        .map(|(_, op)| op)
}
