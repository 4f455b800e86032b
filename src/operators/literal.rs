//! Literal operators
//!
//! ABNF quoted strings are case-insensitive (RFC 5234 §2.3); RFC 7405 adds
//! `%s"..."` for case-sensitive strings.

use std::sync::Arc;

use super::{Op, Operator};
use crate::engine::Context;
use crate::error::MatchResult;
use crate::node::{Key, Nodes};

/// Exact byte sequence, optionally ignoring case
#[derive(Debug, Clone)]
pub struct Literal {
    key: Key,
    bytes: Box<[u8]>,
    case_sensitive: bool,
}

impl Literal {
    /// Create a literal operator
    pub fn new(key: impl Into<Key>, bytes: &[u8], case_sensitive: bool) -> Self {
        Self {
            key: key.into(),
            bytes: bytes.into(),
            case_sensitive,
        }
    }

    /// Bytes this literal matches
    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Whether case must match exactly
    pub fn is_case_sensitive(&self) -> bool {
        self.case_sensitive
    }

    fn matches(&self, got: &[u8]) -> bool {
        if got == &*self.bytes {
            return true;
        }
        if self.case_sensitive {
            return false;
        }
        if got.eq_ignore_ascii_case(&self.bytes) {
            return true;
        }
        if got.is_ascii() && self.bytes.is_ascii() {
            return false;
        }
        eq_ignore_unicode_case(got, &self.bytes)
    }
}

/// Compare two UTF-8 spans after lower-casing; invalid UTF-8 never matches
fn eq_ignore_unicode_case(a: &[u8], b: &[u8]) -> bool {
    match (std::str::from_utf8(a), std::str::from_utf8(b)) {
        (Ok(a), Ok(b)) => a
            .chars()
            .flat_map(char::to_lowercase)
            .eq(b.chars().flat_map(char::to_lowercase)),
        _ => false,
    }
}

impl Operator for Literal {
    fn key(&self) -> &str {
        &self.key
    }

    fn apply<'i>(&self, cx: &Context<'_, 'i>, pos: usize, out: &mut Nodes<'i>) -> MatchResult {
        let input = cx.input();
        let end = pos + self.bytes.len();
        if end > input.len() || !self.matches(&input[pos..end]) {
            return Err(cx.not_matched(&self.key, pos));
        }

        out.push(cx.leaf(&self.key, pos, self.bytes.len()));
        Ok(())
    }
}

/// Case-insensitive literal
pub fn literal(key: impl Into<Key>, bytes: &[u8]) -> Op {
    Arc::new(Literal::new(key, bytes, false))
}

/// Case-sensitive literal
pub fn literal_cs(key: impl Into<Key>, bytes: &[u8]) -> Op {
    Arc::new(Literal::new(key, bytes, true))
}
