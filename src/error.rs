//! Match errors
//!
//! Failing to match is not a program error: it is the normal outcome of
//! backtracking. Primitives report [`MatchError::NotMatched`]; combinators
//! either swallow sub-failures (some branch succeeded) or aggregate them and
//! wrap the aggregate with their own key and position.
//!
//! In terse mode (the default) every failure collapses to the bare sentinel
//! and nothing is collected. In detailed mode the chain is kept and renders
//! as an indented tree:
//!
//! ```text
//! operator "\"a\" / \"b\"" failed at position 0:
//!   - operator "a" failed at position 0: not matched
//!   - operator "b" failed at position 0: not matched
//! ```

use std::fmt;

use crate::node::Key;

/// Result of applying an operator
pub type MatchResult = Result<(), MatchError>;

/// Why an operator produced no match
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchError {
    /// Input does not match at this position
    NotMatched,

    /// Failure of a named operator at a position
    Operator {
        /// Key of the failing operator
        key: Key,
        /// Position the operator was applied at
        pos: usize,
        /// Underlying failure
        cause: Box<MatchError>,
    },

    /// Failures of sibling branches, one per branch
    Multi(Vec<MatchError>),

    /// A forward reference was applied before being bound
    Unresolved {
        /// Key of the forward reference
        key: Key,
    },
}

impl MatchError {
    /// Wrap `cause` with an operator key and position
    ///
    /// An error that already names the same operator at the same position
    /// is returned unchanged.
    pub fn operator(key: &Key, pos: usize, cause: MatchError) -> Self {
        if let MatchError::Operator { key: k, pos: p, .. } = &cause {
            if *p == pos && **k == **key {
                return cause;
            }
        }
        MatchError::Operator {
            key: key.clone(),
            pos,
            cause: Box::new(cause),
        }
    }

    /// Join sibling failures
    ///
    /// No failures yields the bare sentinel, a single failure is returned
    /// as is.
    pub fn join(mut errs: Vec<MatchError>) -> Self {
        match errs.len() {
            0 => MatchError::NotMatched,
            1 => errs.pop().unwrap_or(MatchError::NotMatched),
            _ => MatchError::Multi(errs),
        }
    }

    /// True when the chain bottoms out in [`MatchError::NotMatched`]
    pub fn is_not_matched(&self) -> bool {
        match self {
            MatchError::NotMatched => true,
            MatchError::Operator { cause, .. } => cause.is_not_matched(),
            MatchError::Multi(errs) => errs.iter().any(|e| e.is_not_matched()),
            MatchError::Unresolved { .. } => false,
        }
    }

    /// Furthest input offset named anywhere in the chain
    ///
    /// This is usually where malformed input starts. `None` for terse
    /// errors, which carry no position.
    pub fn deepest_position(&self) -> Option<usize> {
        match self {
            MatchError::NotMatched | MatchError::Unresolved { .. } => None,
            MatchError::Operator { pos, cause, .. } => {
                Some(cause.deepest_position().map_or(*pos, |p| p.max(*pos)))
            }
            MatchError::Multi(errs) => errs.iter().filter_map(|e| e.deepest_position()).max(),
        }
    }

    /// Direct sub-failures of this error
    pub fn causes(&self) -> &[MatchError] {
        match self {
            MatchError::Operator { cause, .. } => std::slice::from_ref(cause),
            MatchError::Multi(errs) => errs,
            _ => &[],
        }
    }

    fn write_operator(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        if let MatchError::Operator { key, pos, cause } = self {
            write!(f, "operator {:?} failed at position {}:", &**key, pos)?;
            match cause.as_ref() {
                MatchError::Multi(errs) => write_multi(f, errs, depth),
                other => write!(f, " {}", other),
            }
        } else {
            write!(f, "{}", self)
        }
    }
}

fn write_multi(f: &mut fmt::Formatter<'_>, errs: &[MatchError], depth: usize) -> fmt::Result {
    f.write_str("\n")?;
    let indent = "  ".repeat(depth + 1);
    for (i, err) in errs.iter().enumerate() {
        if i > 0 {
            f.write_str("\n")?;
        }
        match err {
            MatchError::Operator { .. } => {
                write!(f, "{}- ", indent)?;
                err.write_operator(f, depth + 1)?;
            }
            MatchError::Multi(nested) => write_multi(f, nested, depth + 1)?,
            other => write!(f, "{}- {}", indent, other)?,
        }
    }
    Ok(())
}

impl fmt::Display for MatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MatchError::NotMatched => f.write_str("not matched"),
            MatchError::Operator { .. } => self.write_operator(f, 0),
            MatchError::Multi(errs) => write_multi(f, errs, 0),
            MatchError::Unresolved { key } => write!(f, "rule {:?} is not defined", &**key),
        }
    }
}

impl std::error::Error for MatchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MatchError::Operator { cause, .. } => Some(cause.as_ref()),
            _ => None,
        }
    }
}

/// Error returned by whole-input parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// The root operator did not match
    NoMatch(MatchError),

    /// The best match did not consume the entire input
    Incomplete {
        /// Number of bytes in the input
        expected: usize,
        /// Number of bytes consumed by the best match
        actual: usize,
    },
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::NoMatch(err) => write!(f, "no match: {}", err),
            ParseError::Incomplete { expected, actual } => write!(
                f,
                "incomplete match: consumed {} of {} bytes",
                actual, expected
            ),
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::NoMatch(err) => Some(err),
            ParseError::Incomplete { .. } => None,
        }
    }
}

impl From<MatchError> for ParseError {
    fn from(err: MatchError) -> Self {
        ParseError::NoMatch(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(s: &str) -> Key {
        Key::from(s)
    }

    #[test]
    fn test_operator_wrap_is_idempotent() {
        let inner = MatchError::operator(&key("a"), 3, MatchError::NotMatched);
        let again = MatchError::operator(&key("a"), 3, inner.clone());
        assert_eq!(inner, again);

        let outer = MatchError::operator(&key("b"), 3, inner.clone());
        assert_ne!(outer, inner);
        assert!(outer.is_not_matched());
    }

    #[test]
    fn test_join() {
        assert_eq!(MatchError::join(vec![]), MatchError::NotMatched);
        let one = MatchError::operator(&key("a"), 0, MatchError::NotMatched);
        assert_eq!(MatchError::join(vec![one.clone()]), one);
        assert!(matches!(
            MatchError::join(vec![one.clone(), one]),
            MatchError::Multi(ref v) if v.len() == 2
        ));
    }

    #[test]
    fn test_display_tree() {
        let err = MatchError::operator(
            &key("\"a\" / \"b\""),
            0,
            MatchError::join(vec![
                MatchError::operator(&key("a"), 0, MatchError::NotMatched),
                MatchError::operator(&key("b"), 0, MatchError::NotMatched),
            ]),
        );

        let expected = "operator \"\\\"a\\\" / \\\"b\\\"\" failed at position 0:\n  \
                        - operator \"a\" failed at position 0: not matched\n  \
                        - operator \"b\" failed at position 0: not matched";
        assert_eq!(err.to_string(), expected);
    }

    #[test]
    fn test_display_nested_tree() {
        let err = MatchError::operator(
            &key("rule"),
            0,
            MatchError::join(vec![
                MatchError::operator(
                    &key("x"),
                    2,
                    MatchError::join(vec![
                        MatchError::operator(&key("y"), 2, MatchError::NotMatched),
                        MatchError::operator(&key("z"), 4, MatchError::NotMatched),
                    ]),
                ),
                MatchError::NotMatched,
            ]),
        );

        let rendered = err.to_string();
        assert!(rendered.contains("\n  - operator \"x\" failed at position 2:"));
        assert!(rendered.contains("\n    - operator \"z\" failed at position 4: not matched"));
        assert!(rendered.ends_with("\n  - not matched"));
    }

    #[test]
    fn test_deepest_position() {
        let err = MatchError::operator(
            &key("rule"),
            0,
            MatchError::join(vec![
                MatchError::operator(&key("a"), 5, MatchError::NotMatched),
                MatchError::operator(&key("b"), 9, MatchError::NotMatched),
            ]),
        );
        assert_eq!(err.deepest_position(), Some(9));
        assert_eq!(MatchError::NotMatched.deepest_position(), None);
    }

    #[test]
    fn test_unresolved_is_not_a_mismatch() {
        let err = MatchError::Unresolved { key: key("rule") };
        assert!(!err.is_not_matched());
        assert_eq!(err.to_string(), "rule \"rule\" is not defined");
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::Incomplete {
            expected: 10,
            actual: 4,
        };
        assert_eq!(err.to_string(), "incomplete match: consumed 4 of 10 bytes");
        let err: ParseError = MatchError::NotMatched.into();
        assert_eq!(err.to_string(), "no match: not matched");
    }
}
