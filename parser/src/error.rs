//! Parse errors used as backtracking control flow.
//!
//! A [`ParseError`] is almost never fatal: every grammar alternative that
//! fails returns one, the caller restores its checkpoint and tries the next
//! alternative, and a text where nothing matches simply yields an empty
//! result. The variants exist so failure sites read like the grammar rule
//! that rejected the input.

use thiserror::Error;

/// A non-fatal grammar mismatch.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The current column is not deeper than the enclosing indent level.
    #[error("not a subentry")]
    NotASubentry,

    /// The current column is deeper than its peers where only a peer line
    /// is allowed.
    #[error("illegal nesting")]
    IllegalNesting,

    /// The current column does not match the enclosing indent level.
    #[error("not a peer entry")]
    NotAPeer,

    /// A dedent landed on a column that was never an indent level.
    #[error("not an unindent")]
    NotAnUnindent,

    /// A token-level rule did not match at the current position.
    #[error("expected {0}")]
    Expected(&'static str),

    /// A structurally valid match was rejected by a content heuristic
    /// (numeric-only text, tabular whitespace, missing description, or an
    /// undersized colon block).
    #[error("{0}")]
    Rejected(&'static str),
}

/// Convenience alias for grammar rule results.
pub type ParseResult<T> = Result<T, ParseError>;
