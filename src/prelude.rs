//! Prelude module for convenient imports
//!
//! ```
//! use abnf_engine::prelude::*;
//! ```
//!
//! # Re-exported Items
//!
//! ## Core Types
//! - [`Engine`] - Shared matching services (cache, pools, error mode)
//! - [`EngineConfig`] - Engine settings
//! - [`Node`] / [`NodeRef`] / [`Nodes`] / [`Children`] - Match results
//! - [`Operator`] / [`Op`] - Grammar elements
//!
//! ## Operators
//! - [`literal()`], [`literal_cs()`], [`range()`]
//! - [`alt()`], [`alt_first()`], [`concat()`], [`concat_all()`]
//! - [`repeat()`], [`repeat_n()`], [`repeat_0_inf()`], [`repeat_1_inf()`],
//!   [`optional()`]
//! - [`forward()`] - Recursive rule references
//!
//! ## Error Handling
//! - [`MatchError`] - Structured match failure
//! - [`ParseError`] - Failure of a whole-input parse

// ============================================================================
// Core Types
// ============================================================================

pub use crate::config::EngineConfig;
pub use crate::engine::{Context, Engine};
pub use crate::node::{Children, Key, Node, NodeRef, Nodes};
pub use crate::operators::{Op, Operator};

// ============================================================================
// Operators
// ============================================================================

pub use crate::operators::{
    alt, alt_first, concat, concat_all, forward, literal, literal_cs, optional, range, repeat,
    repeat_0_inf, repeat_1_inf, repeat_n,
};

// ============================================================================
// Rule Sets
// ============================================================================

pub use crate::rules;

// ============================================================================
// Error Handling
// ============================================================================

pub use crate::error::{MatchError, MatchResult, ParseError};
