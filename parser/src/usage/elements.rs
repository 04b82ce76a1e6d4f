//! Token-level grammar for usage lines.
//!
//! A usage example such as
//!
//! ```text
//! Usage: samtools merge [-nurlf] [-h inh.sam] <out.bam> <in1.bam> [<in2.bam> ... <inN.bam>]
//! ```
//!
//! is a flat run of elements: bare words, `<variable>` placeholders, flags,
//! `[...]` optional sections, `X ... Y` repeated lists, and the word
//! `options` standing in for the flag section (which is parsed elsewhere and
//! therefore suppressed here). All rules are line-local.

use cli_model_core::Flag;

use crate::cursor::{is_argument_body, is_delimited_body, is_element_start, Cursor};
use crate::error::{ParseError, ParseResult};
use crate::flags::elements::flag_with_arg;

/// One non-flag element of a usage line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UsageElement {
    /// The element text without any delimiters, e.g. `out.bam`.
    pub text: String,
    /// True when the element sat inside an optional `[...]` section.
    pub optional: bool,
    /// True for `<angle-delimited>` placeholders, false for bare words.
    pub variable: bool,
    /// True when the element was part of an `X ... Y` repetition.
    pub repeatable: bool,
}

impl UsageElement {
    fn new(text: &str, variable: bool) -> Self {
        Self {
            text: text.to_string(),
            optional: false,
            variable,
            repeatable: false,
        }
    }
}

/// One parsed item of a usage line.
#[derive(Debug, Clone)]
pub enum UsageItem {
    Element(UsageElement),
    Flag(Flag),
}

/// A variable, a bare word, or the suppressed `options` placeholder
/// (`Ok(None)`). Does not match flags or brackets.
fn atom(cursor: &mut Cursor) -> ParseResult<Option<UsageElement>> {
    let mark = cursor.mark();
    if cursor.eat('<') {
        if let Some(word) = cursor.take_word(is_element_start, is_delimited_body) {
            let text = word.trim_end().to_string();
            if cursor.eat('>') {
                return Ok(Some(UsageElement::new(&text, true)));
            }
        }
        cursor.reset(mark);
        return Err(ParseError::Expected("usage element"));
    }
    match cursor.take_word(is_element_start, is_argument_body) {
        Some(word) if word.eq_ignore_ascii_case("option") || word.eq_ignore_ascii_case("options") => {
            Ok(None)
        }
        Some(word) => Ok(Some(UsageElement::new(word, false))),
        None => Err(ParseError::Expected("usage element")),
    }
}

/// A repeated run such as `in1.bam in2.bam ... inN.bam` or
/// `FILE1 FILE2 .. FILEn`, collapsed into its last element marked
/// repeatable.
fn list_element(cursor: &mut Cursor) -> ParseResult<UsageItem> {
    let mark = cursor.mark();
    let result = (|| {
        let mut last: Option<UsageElement> = None;
        let mut parsed = 0usize;
        loop {
            let inner = cursor.mark();
            if parsed > 0 {
                cursor.skip_inline_ws();
            }
            match atom(cursor) {
                Ok(Some(element)) => {
                    last = Some(element);
                    parsed += 1;
                }
                Ok(None) => parsed += 1,
                Err(_) => {
                    cursor.reset(inner);
                    break;
                }
            }
        }
        if parsed == 0 {
            return Err(ParseError::Expected("list elements"));
        }

        cursor.skip_inline_ws();
        let mut dots = 0;
        while dots < 3 && cursor.eat('.') {
            dots += 1;
        }
        if dots < 2 {
            return Err(ParseError::Expected("ellipsis"));
        }

        let trailing = cursor.mark();
        cursor.skip_inline_ws();
        match atom(cursor) {
            Ok(Some(element)) => last = Some(element),
            Ok(None) => {}
            Err(_) => cursor.reset(trailing),
        }

        let mut element = last.ok_or(ParseError::Expected("list elements"))?;
        element.repeatable = true;
        Ok(UsageItem::Element(element))
    })();
    if result.is_err() {
        cursor.reset(mark);
    }
    result
}

/// A bracketed section; everything inside is marked optional.
fn optional_section(cursor: &mut Cursor) -> ParseResult<Vec<UsageItem>> {
    let mark = cursor.mark();
    let result = (|| {
        if !cursor.eat('[') {
            return Err(ParseError::Expected("optional section"));
        }
        let mut items: Vec<UsageItem> = Vec::new();
        let mut parsed = 0usize;
        loop {
            cursor.skip_inline_ws();
            if cursor.eat(']') {
                if parsed == 0 {
                    return Err(ParseError::Expected("usage element"));
                }
                for item in &mut items {
                    match item {
                        UsageItem::Element(element) => element.optional = true,
                        UsageItem::Flag(flag) => flag.optional = true,
                    }
                }
                return Ok(items);
            }
            if cursor.at_line_end() {
                return Err(ParseError::Expected("closing bracket"));
            }
            items.extend(usage_element(cursor)?);
            parsed += 1;
        }
    })();
    if result.is_err() {
        cursor.reset(mark);
    }
    result
}

/// One usage element at the cursor. May legitimately produce no items (the
/// `options` placeholder) or several (an optional section).
pub(crate) fn usage_element(cursor: &mut Cursor) -> ParseResult<Vec<UsageItem>> {
    if cursor.peek() == Some('[') {
        return optional_section(cursor);
    }
    if let Ok(item) = list_element(cursor) {
        return Ok(vec![item]);
    }
    if cursor.peek() == Some('-') {
        let mark = cursor.mark();
        match flag_with_arg(cursor) {
            Ok(synonym) => {
                let mut flag = Flag::from_synonyms(vec![synonym], "");
                // A usage flag is required unless brackets say otherwise.
                flag.optional = false;
                return Ok(vec![UsageItem::Flag(flag)]);
            }
            Err(_) => cursor.reset(mark),
        }
    }
    match atom(cursor)? {
        Some(element) => Ok(vec![UsageItem::Element(element)]),
        None => Ok(Vec::new()),
    }
}
