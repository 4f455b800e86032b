//! abnf-engine - ABNF operator engine for ambiguous grammars
//!
//! This crate turns ABNF rules (RFC 5234 / RFC 7405) into executable
//! operators over byte input. It provides:
//! - Primitive operators: case-insensitive and case-sensitive literals,
//!   numeric value ranges
//! - Combinators: alternation, concatenation and bounded/unbounded repetition
//!   that keep every ambiguous parse until asked to pick the best one
//! - A structural node cache that collapses identical re-derivations into one
//!   shared node
//! - Pooled scratch buffers for the recursive hot path
//! - Nestable match errors with a terse/detailed toggle
//! - Ready-made RFC 5234 core rules and the ABNF definition rule set
//!
//! ## Quick Start
//!
//! ```rust
//! use abnf_engine::prelude::*;
//!
//! let greeting = concat(
//!     "greeting",
//!     vec![literal("hello", b"hello"), literal("sp", b" "), literal("world", b"world")],
//! );
//!
//! let engine = Engine::new();
//! let nodes = engine.parse(&greeting, b"Hello World").unwrap();
//! let best = nodes.best().unwrap();
//! assert_eq!(best.value(), b"Hello World");
//! assert_eq!(best.get("world").unwrap().pos(), 6);
//! ```
//!
//! ## Feature Flags
//!
//! - `logging` - Enable debug logging using the `log` crate
//! - `parallel` - Match batches of inputs on the `rayon` thread pool

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![warn(clippy::all)]
#![allow(clippy::new_without_default)]
#![allow(clippy::module_inception)]

/// Logging macros - no-op when logging feature is disabled
#[cfg(not(feature = "logging"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {};
}

/// Logging macros - use log crate when logging feature is enabled
#[cfg(feature = "logging")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "logging"))]
macro_rules! log_trace {
    ($($arg:tt)*) => {};
}

#[cfg(feature = "logging")]
macro_rules! log_trace {
    ($($arg:tt)*) => { log::trace!($($arg)*) };
}

pub mod cache;
pub mod config;
pub mod debug;
pub mod engine;
pub mod error;
pub mod node;
pub mod operators;
pub mod parallel;
pub mod pool;
pub mod prelude;
pub mod rules;

pub use cache::{CacheStats, NodeCache};
pub use config::EngineConfig;
pub use debug::TreePrinter;
pub use engine::{Context, Engine, Failures};
pub use error::{MatchError, MatchResult, ParseError};
pub use node::{Children, Key, Node, NodeRef, Nodes};
pub use operators::{
    alt, alt_first, concat, concat_all, forward, literal, literal_cs, optional, range, repeat,
    repeat_0_inf, repeat_1_inf, repeat_n, Forward, Op, Operator,
};
pub use parallel::{parse_batch_complete, parse_batch_parallel};
pub use pool::{Pool, Pooled, Recycle};
