//! The indentation stack shared by both grammars.
//!
//! Help text is two-dimensional: a flag's description continues on deeper
//! lines, and a new flag appears back at a shallower column. The stack
//! records the column of every open indentation level so a one-dimensional
//! token stream can ask layout questions ("is this line a subentry? a peer?
//! an unindent?").
//!
//! Backtracking grammars partially mutate the stack before failing, so every
//! alternative must be wrapped in [`snapshot`](IndentStack::snapshot) /
//! [`restore`](IndentStack::restore). One stack belongs to exactly one parse
//! invocation; concurrent parses each construct their own.

use crate::error::{ParseError, ParseResult};

/// A checkpoint of the full stack contents, taken before a backtracking
/// alternative and restored verbatim if it fails.
#[derive(Debug, Clone)]
pub struct IndentSnapshot(Vec<usize>);

/// Stack of 1-based column positions. Starts at `[1]`, the left margin.
#[derive(Debug, Clone)]
pub struct IndentStack {
    levels: Vec<usize>,
}

impl Default for IndentStack {
    fn default() -> Self {
        Self::new()
    }
}

impl IndentStack {
    pub fn new() -> Self {
        Self { levels: vec![1] }
    }

    /// The column of the innermost open level.
    pub fn top(&self) -> usize {
        *self.levels.last().unwrap_or(&1)
    }

    pub fn snapshot(&self) -> IndentSnapshot {
        IndentSnapshot(self.levels.clone())
    }

    pub fn restore(&mut self, snapshot: IndentSnapshot) {
        self.levels = snapshot.0;
    }

    /// Unconditionally records `col` as a new level.
    pub fn push_indent(&mut self, col: usize) {
        self.levels.push(col);
    }

    /// Unconditionally discards the innermost level, used when moving on to
    /// a new flag regardless of the previous flag's description indentation.
    pub fn pop_indent(&mut self) {
        self.levels.pop();
    }

    /// Succeeds and pushes only when `col` is deeper than the current level.
    pub fn indent(&mut self, col: usize) -> ParseResult<()> {
        if col > self.top() {
            self.push_indent(col);
            Ok(())
        } else {
            Err(ParseError::NotASubentry)
        }
    }

    /// Succeeds when `col` sits exactly at the current level. With
    /// `allow_greater`, deeper columns also pass (without pushing), which is
    /// the lax rule used for description continuation lines.
    pub fn peer_indent(&self, col: usize, allow_greater: bool) -> ParseResult<()> {
        if allow_greater && col >= self.top() {
            return Ok(());
        }
        if col == self.top() {
            Ok(())
        } else if col > self.top() {
            Err(ParseError::IllegalNesting)
        } else {
            Err(ParseError::NotAPeer)
        }
    }

    /// Pops one level when `col` is shallower than the current level. With
    /// `precise`, the new column must already exist somewhere in the stack,
    /// which stops the grammar from drifting to indentation it never saw.
    pub fn dedent(&mut self, col: usize, precise: bool) -> ParseResult<()> {
        if precise && !self.levels.contains(&col) {
            return Err(ParseError::NotAnUnindent);
        }
        if col < self.top() {
            self.levels.pop();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indent_requires_deeper_column() {
        let mut stack = IndentStack::new();
        assert!(stack.indent(1).is_err());
        assert!(stack.indent(5).is_ok());
        assert_eq!(stack.top(), 5);
        assert!(stack.indent(3).is_err());
    }

    #[test]
    fn test_peer_indent_modes() {
        let mut stack = IndentStack::new();
        stack.indent(5).unwrap();
        assert!(stack.peer_indent(5, false).is_ok());
        assert_eq!(stack.peer_indent(7, false), Err(ParseError::IllegalNesting));
        assert_eq!(stack.peer_indent(3, false), Err(ParseError::NotAPeer));
        assert!(stack.peer_indent(7, true).is_ok());
        assert_eq!(stack.top(), 5);
    }

    #[test]
    fn test_dedent_precise_rejects_unknown_columns() {
        let mut stack = IndentStack::new();
        stack.indent(5).unwrap();
        stack.indent(9).unwrap();
        assert_eq!(stack.dedent(3, true), Err(ParseError::NotAnUnindent));
        assert!(stack.dedent(5, true).is_ok());
        assert_eq!(stack.top(), 5);
        // Lax dedent pops even on unseen columns.
        assert!(stack.dedent(2, false).is_ok());
        assert_eq!(stack.top(), 1);
    }

    #[test]
    fn test_snapshot_restores_after_failed_alternative() {
        let mut stack = IndentStack::new();
        stack.indent(5).unwrap();
        let checkpoint = stack.snapshot();
        stack.indent(9).unwrap();
        stack.pop_indent();
        stack.pop_indent();
        stack.restore(checkpoint);
        assert_eq!(stack.top(), 5);
    }
}
