//! Numeric value range operator (`%x41-5A`, `%d48-57`, `%b0-1`)
//!
//! Bounds are the encoded bytes of the lowest and highest value. A value
//! above `%x7F` is written as its UTF-8 bytes, so `%x5D-10FFFF` becomes the
//! bounds `[0x5D]` and `[0x10, 0xFF, 0xFF]`.

use std::sync::Arc;

use super::{Op, Operator};
use crate::engine::Context;
use crate::error::MatchResult;
use crate::node::{Key, Nodes};

/// Single encoded value between two byte bounds
#[derive(Debug, Clone)]
pub struct Range {
    key: Key,
    low: Box<[u8]>,
    high: Box<[u8]>,
}

impl Range {
    /// Create a range operator
    pub fn new(key: impl Into<Key>, low: &[u8], high: &[u8]) -> Self {
        Self {
            key: key.into(),
            low: low.into(),
            high: high.into(),
        }
    }

    /// Lower bound
    pub fn low(&self) -> &[u8] {
        &self.low
    }

    /// Upper bound
    pub fn high(&self) -> &[u8] {
        &self.high
    }

    /// Number of bytes matched at `pos`, zero when out of range
    fn span(&self, input: &[u8], pos: usize) -> usize {
        let rest = &input[pos..];
        if rest.len() < self.low.len() || &rest[..self.low.len()] < &*self.low {
            return 0;
        }

        let size = encoded_len(rest);
        self.high
            .iter()
            .rev()
            .zip(rest)
            .take(size)
            .take_while(|(hi, got)| got <= hi)
            .count()
    }
}

/// Length of the UTF-8 sequence at the start of `bytes`; 1 for invalid input
fn encoded_len(bytes: &[u8]) -> usize {
    let width = match bytes.first() {
        None => return 0,
        Some(&b) if b < 0x80 => return 1,
        Some(&b) if b >= 0xF0 => 4,
        Some(&b) if b >= 0xE0 => 3,
        Some(&b) if b >= 0xC0 => 2,
        Some(_) => return 1,
    };
    match bytes.get(..width).map(std::str::from_utf8) {
        Some(Ok(_)) => width,
        _ => 1,
    }
}

impl Operator for Range {
    fn key(&self) -> &str {
        &self.key
    }

    fn apply<'i>(&self, cx: &Context<'_, 'i>, pos: usize, out: &mut Nodes<'i>) -> MatchResult {
        let input = cx.input();
        if pos > input.len() {
            return Err(cx.not_matched(&self.key, pos));
        }

        let len = self.span(input, pos);
        if len == 0 {
            return Err(cx.not_matched(&self.key, pos));
        }

        out.push(cx.leaf(&self.key, pos, len));
        Ok(())
    }
}

/// Range of values between `low` and `high`
pub fn range(key: impl Into<Key>, low: &[u8], high: &[u8]) -> Op {
    Arc::new(Range::new(key, low, high))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::Engine;
    use crate::error::MatchError;

    fn run<'i>(engine: &Engine<'i>, op: &Op, input: &'i [u8]) -> Result<Nodes<'i>, MatchError> {
        engine.parse(op.as_ref(), input)
    }

    #[test]
    fn test_encoded_len() {
        assert_eq!(encoded_len(b""), 0);
        assert_eq!(encoded_len(b"a"), 1);
        assert_eq!(encoded_len("ж".as_bytes()), 2);
        assert_eq!(encoded_len("€".as_bytes()), 3);
        assert_eq!(encoded_len("😀".as_bytes()), 4);
        assert_eq!(encoded_len(&[0xFF, 0x41]), 1);
        assert_eq!(encoded_len(&[0xE2, 0x41]), 1);
    }

    #[test]
    fn test_range_single_byte() {
        let engine = Engine::new();
        let ns = run(&engine, &range("%x61-7A", &[0x61], &[0x7A]), b"qwe").unwrap();
        assert_eq!(ns.len(), 1);
        assert_eq!(ns[0].value(), b"q");
    }

    #[test]
    fn test_range_below_low() {
        let engine = Engine::new();
        let op = range("%x41-5A", &[0x41], &[0x5A]);
        assert_eq!(run(&engine, &op, b"abc"), Err(MatchError::NotMatched));
    }

    #[test]
    fn test_range_above_high() {
        let engine = Engine::new();
        let op = range("DIGIT", b"0", b"9");
        assert_eq!(run(&engine, &op, b"a"), Err(MatchError::NotMatched));
        assert_eq!(run(&engine, &op, b""), Err(MatchError::NotMatched));
    }

    #[test]
    fn test_range_short_input() {
        let engine = Engine::new();
        let op = range("%x6121-7A21", &[0x61, 0x21], &[0x7A, 0x21]);
        assert_eq!(run(&engine, &op, b"a"), Err(MatchError::NotMatched));
    }

    #[test]
    fn test_range_wide_high_bound() {
        let engine = Engine::new();
        let op = range("%x5D-10FFFF", &[0x5D], &[0x10, 0xFF, 0xFF]);
        let ns = run(&engine, &op, b"xxx").unwrap();
        assert_eq!(ns[0].value(), b"x");
    }

    #[test]
    fn test_range_multibyte_value() {
        let engine = Engine::new();
        let op = range("%x5D-10FFFF", &[0x5D], &[0x10, 0xFF, 0xFF]);
        let input = "жx".as_bytes();
        let ns = run(&engine, &op, input).unwrap();
        assert_eq!(ns[0].text(), Some("ж"));
    }

    #[test]
    fn test_range_at_offset_decodes_local_value() {
        let engine = Engine::new();
        let op = range("%x5D-10FFFF", &[0x5D], &[0x10, 0xFF, 0xFF]);
        let input = "aж".as_bytes();
        let mut out = Nodes::new();
        engine.apply(op.as_ref(), input, 1, &mut out).unwrap();
        assert_eq!(out[0].pos(), 1);
        assert_eq!(out[0].len(), 2);
    }
}
