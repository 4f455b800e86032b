//! Batch matching
//!
//! Matches one operator against many independent inputs, e.g. a directory
//! of grammar files. With the `parallel` feature the batch runs on the
//! `rayon` thread pool; without it the same functions iterate sequentially.
//!
//! ```toml
//! [dependencies]
//! abnf-engine = { version = "0.1", features = ["parallel"] }
//! ```
//!
//! All inputs share the engine, so with the cache enabled identical
//! sub-derivations are shared across the batch.
//!
//! # Example
//!
//! ```rust
//! use abnf_engine::{parse_batch_parallel, rules, Engine};
//!
//! let inputs: [&[u8]; 3] = [b"BIT = \"0\" / \"1\"\n", b"oops\n", b"SP = %x20\n"];
//! let engine = Engine::new();
//! let results = parse_batch_parallel(&engine, &rules::definition::rules().rule, &inputs);
//!
//! // Results are in the same order as inputs
//! assert!(results[0].is_ok());
//! assert!(results[1].is_err());
//! assert!(results[2].is_ok());
//! ```

use crate::engine::Engine;
use crate::error::{MatchError, ParseError};
use crate::node::{NodeRef, Nodes};
use crate::operators::Operator;

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Every match of `op` at the start of each input, in input order
#[cfg(feature = "rayon")]
pub fn parse_batch_parallel<'i>(
    engine: &Engine<'i>,
    op: &dyn Operator,
    inputs: &[&'i [u8]],
) -> Vec<Result<Nodes<'i>, MatchError>> {
    log_debug!("batch: {:?} over {} inputs (parallel)", op.key(), inputs.len());
    inputs.par_iter().map(|input| engine.parse(op, input)).collect()
}

/// Every match of `op` at the start of each input (sequential fallback)
#[cfg(not(feature = "rayon"))]
pub fn parse_batch_parallel<'i>(
    engine: &Engine<'i>,
    op: &dyn Operator,
    inputs: &[&'i [u8]],
) -> Vec<Result<Nodes<'i>, MatchError>> {
    log_debug!("batch: {:?} over {} inputs", op.key(), inputs.len());
    inputs.iter().map(|input| engine.parse(op, input)).collect()
}

/// Best match of `op` spanning each whole input, in input order
#[cfg(feature = "rayon")]
pub fn parse_batch_complete<'i>(
    engine: &Engine<'i>,
    op: &dyn Operator,
    inputs: &[&'i [u8]],
) -> Vec<Result<NodeRef<'i>, ParseError>> {
    inputs
        .par_iter()
        .map(|input| engine.parse_complete(op, input))
        .collect()
}

/// Best match of `op` spanning each whole input (sequential fallback)
#[cfg(not(feature = "rayon"))]
pub fn parse_batch_complete<'i>(
    engine: &Engine<'i>,
    op: &dyn Operator,
    inputs: &[&'i [u8]],
) -> Vec<Result<NodeRef<'i>, ParseError>> {
    inputs
        .iter()
        .map(|input| engine.parse_complete(op, input))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operators::{literal, repeat_1_inf};

    #[test]
    fn test_batch_keeps_order() {
        let engine = Engine::new();
        let op = repeat_1_inf("1*\"a\"", literal("a", b"a"));
        let inputs: [&[u8]; 4] = [b"a", b"b", b"aaa", b"aa"];

        let results = parse_batch_parallel(&engine, &op, &inputs);
        assert_eq!(results.len(), 4);
        assert_eq!(results[0].as_ref().map(|ns| ns[0].len()), Ok(1));
        assert_eq!(results[1].as_ref().err(), Some(&MatchError::NotMatched));
        assert_eq!(results[2].as_ref().map(|ns| ns[0].len()), Ok(3));
        assert_eq!(results[3].as_ref().map(|ns| ns[0].len()), Ok(2));
    }

    #[test]
    fn test_batch_complete() {
        let engine = Engine::new();
        let op = repeat_1_inf("1*\"a\"", literal("a", b"a"));
        let inputs: [&[u8]; 3] = [b"aa", b"aab", b"b"];

        let results = parse_batch_complete(&engine, &op, &inputs);
        assert!(results[0].is_ok());
        assert_eq!(
            results[1].as_ref().err(),
            Some(&ParseError::Incomplete {
                expected: 3,
                actual: 2
            })
        );
        assert!(matches!(results[2], Err(ParseError::NoMatch(_))));
    }

    #[test]
    fn test_empty_batch() {
        let engine = Engine::new();
        let op = literal("a", b"a");
        assert!(parse_batch_parallel(&engine, &op, &[]).is_empty());
    }

    #[test]
    fn test_batch_with_cache_matches_uncached() {
        let inputs: [&[u8]; 3] = [b"aaaa", b"aa", b"aaaa"];
        let op = repeat_1_inf("1*\"a\"", literal("a", b"a"));

        let plain = Engine::new();
        let cached = Engine::new();
        cached.enable_cache(64);

        let expected = parse_batch_parallel(&plain, &op, &inputs);
        let actual = parse_batch_parallel(&cached, &op, &inputs);
        assert_eq!(expected, actual);
        assert!(!cached.cache().is_empty());
    }
}
