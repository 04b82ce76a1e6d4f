//! The indented description block shared by both grammars.
//!
//! A description block is a run of lines indented deeper than the enclosing
//! entry: the continuation text under a flag, or the explanation under one
//! usage example. The first line sets the block's column; further lines at
//! that column or deeper continue it, and a shallower line ends it. Blank
//! lines inside the block are skipped rather than terminating it.

use crate::cursor::Cursor;
use crate::error::{ParseError, ParseResult};
use crate::indent::IndentStack;

/// Parses one indented description block, joining its trimmed lines with
/// newlines. `accept` vets the joined text; rejection backtracks the whole
/// block, so the lines stay available to other rules.
pub(crate) fn description_block(
    cursor: &mut Cursor,
    stack: &mut IndentStack,
    accept: impl Fn(&str) -> bool,
) -> ParseResult<String> {
    let snapshot = stack.snapshot();
    let mark = cursor.mark();
    match block_body(cursor, stack, accept) {
        Ok(text) => Ok(text),
        Err(err) => {
            stack.restore(snapshot);
            cursor.reset(mark);
            Err(err)
        }
    }
}

fn block_body(
    cursor: &mut Cursor,
    stack: &mut IndentStack,
    accept: impl Fn(&str) -> bool,
) -> ParseResult<String> {
    cursor.skip_ws();
    if cursor.is_eof() {
        return Err(ParseError::Expected("description line"));
    }
    stack.indent(cursor.col())?;

    let mut lines = vec![cursor.take_line().to_string()];
    loop {
        let mark = cursor.mark();
        cursor.skip_ws();
        if cursor.is_eof() {
            break;
        }
        if stack.peer_indent(cursor.col(), true).is_err() {
            cursor.reset(mark);
            break;
        }
        lines.push(cursor.take_line().to_string());
    }

    // A shallower line closed the block; at EOF the level stays open, which
    // the enclosing rule's cleanup pop takes care of.
    if !cursor.is_eof() {
        stack.dedent(cursor.col(), false)?;
    }

    let text = lines.join("\n");
    if accept(&text) {
        Ok(text)
    } else {
        Err(ParseError::Rejected("not a prose description"))
    }
}
