//! Token-level grammar for flags and their argument expressions.
//!
//! These rules are shared by the flag-block grammar and the usage-line
//! grammar. They are strictly line-oriented: no rule here ever crosses a
//! newline, so block structure stays the business of the indentation stack.
//!
//! Every rule either succeeds having consumed its match, or fails having
//! reset the cursor to where it started.

use cli_model_core::{FlagArg, FlagSynonym};

use crate::cursor::{
    is_argument_body, is_delimited_body, is_element_body, is_element_start, is_synonym_delim,
    Cursor,
};
use crate::error::{ParseError, ParseResult};

/// One argument placeholder token, e.g. `FILE` or `file.fa|file.fa.gz`.
fn arg_token<'a>(cursor: &mut Cursor<'a>) -> ParseResult<&'a str> {
    cursor
        .take_word(is_element_start, is_argument_body)
        .ok_or(ParseError::Expected("argument"))
}

/// The dashed part of a flag, e.g. `-m` or `--max-count`. Does not skip
/// leading whitespace.
pub(crate) fn any_flag(cursor: &mut Cursor) -> ParseResult<String> {
    let mark = cursor.mark();
    if !cursor.eat('-') {
        return Err(ParseError::Expected("flag"));
    }
    let long = cursor.eat('-');
    match cursor.take_word(is_element_start, is_element_body) {
        Some(word) => Ok(if long {
            format!("--{word}")
        } else {
            format!("-{word}")
        }),
        None => {
            cursor.reset(mark);
            Err(ParseError::Expected("flag"))
        }
    }
}

/// A repeated-list argument, e.g. `SAMOUTS [SAMOUTS ...]` or
/// `FILE1 FILE2 .. FILEn`. The last placeholder names the argument, which
/// prefers `FILEn` over `FILE2`.
fn repeat_arg(cursor: &mut Cursor) -> ParseResult<FlagArg> {
    let mark = cursor.mark();
    let first = arg_token(cursor)?.to_string();

    cursor.skip_inline_ws();
    let bracketed = cursor.eat('[');

    let mut last = if bracketed { None } else { Some(first) };
    loop {
        let inner = cursor.mark();
        cursor.skip_inline_ws();
        match arg_token(cursor) {
            Ok(token) => last = Some(token.to_string()),
            Err(_) => {
                cursor.reset(inner);
                break;
            }
        }
    }

    cursor.skip_inline_ws();
    let mut dots = 0;
    while dots < 3 && cursor.eat('.') {
        dots += 1;
    }
    if dots < 2 {
        cursor.reset(mark);
        return Err(ParseError::Expected("repeated argument"));
    }

    let trailing = cursor.mark();
    cursor.skip_inline_ws();
    match arg_token(cursor) {
        Ok(token) => last = Some(token.to_string()),
        Err(_) => cursor.reset(trailing),
    }

    if bracketed {
        cursor.skip_inline_ws();
        if !cursor.eat(']') {
            cursor.reset(mark);
            return Err(ParseError::Expected("repeated argument"));
        }
    }

    match last {
        Some(name) => Ok(FlagArg::Repeat { name }),
        None => {
            cursor.reset(mark);
            Err(ParseError::Expected("repeated argument"))
        }
    }
}

/// A brace-delimited choice set, e.g. `{sam,bam}`.
fn choice_arg(cursor: &mut Cursor) -> ParseResult<FlagArg> {
    let mark = cursor.mark();
    if !cursor.eat('{') {
        return Err(ParseError::Expected("choice set"));
    }

    let mut choices: Vec<String> = Vec::new();
    loop {
        cursor.skip_inline_ws();
        match cursor.take_word(is_element_start, is_element_body) {
            Some(word) => {
                if !choices.iter().any(|choice| choice == word) {
                    choices.push(word.to_string());
                }
            }
            None => {
                cursor.reset(mark);
                return Err(ParseError::Expected("choice set"));
            }
        }
        cursor.skip_inline_ws();
        if cursor.eat(',') {
            continue;
        }
        if cursor.eat('}') {
            return Ok(FlagArg::Choice { choices });
        }
        cursor.reset(mark);
        return Err(ParseError::Expected("choice set"));
    }
}

/// A progressively-optional argument list, e.g. `FLOAT[,FLOAT[,INT[,INT]]]`.
fn optional_args(cursor: &mut Cursor) -> ParseResult<FlagArg> {
    let mark = cursor.mark();
    let first = arg_token(cursor)?.to_string();

    cursor.skip_inline_ws();
    if !cursor.eat('[') {
        cursor.reset(mark);
        return Err(ParseError::Expected("optional arguments"));
    }
    cursor.skip_inline_ws();
    if !cursor.eat(',') {
        cursor.reset(mark);
        return Err(ParseError::Expected("optional arguments"));
    }
    cursor.skip_inline_ws();

    // The nested part is either a deeper optional list or a bare token.
    let mut names = vec![first];
    match optional_args(cursor) {
        Ok(FlagArg::Optional { names: rest, .. }) => names.extend(rest),
        Ok(_) | Err(_) => match arg_token(cursor) {
            Ok(token) => names.push(token.to_string()),
            Err(_) => {
                cursor.reset(mark);
                return Err(ParseError::Expected("optional arguments"));
            }
        },
    }

    cursor.skip_inline_ws();
    if !cursor.eat(']') {
        cursor.reset(mark);
        return Err(ParseError::Expected("optional arguments"));
    }

    Ok(FlagArg::Optional {
        names,
        separator: ",".to_string(),
    })
}

/// A single argument token, optionally angle-bracket-delimited to allow
/// embedded spaces (`-arg <argument with space>`). Does not skip leading
/// whitespace: a two-space gap after a flag means prose, not an argument.
fn simple_arg(cursor: &mut Cursor) -> ParseResult<FlagArg> {
    let mark = cursor.mark();
    if cursor.eat('<') {
        if let Some(word) = cursor.take_word(is_element_start, is_delimited_body) {
            let name = word.trim_end().to_string();
            if cursor.eat('>') {
                return Ok(FlagArg::Simple { name });
            }
        }
        cursor.reset(mark);
        return Err(ParseError::Expected("argument"));
    }
    match cursor.take_word(is_element_start, is_element_body) {
        Some(word) => Ok(FlagArg::Simple {
            name: word.to_string(),
        }),
        None => Err(ParseError::Expected("argument")),
    }
}

/// A separator plus argument shape, e.g. `=FILE` or ` INT[,INT]`.
///
/// The separator is `=` or exactly one space; alternatives are tried in
/// priority order so `X [X ...]` is a repeat, `{a,b}` a choice, `A[,B]` an
/// optional list, and only then a simple token.
pub(crate) fn arg_expression(cursor: &mut Cursor) -> ParseResult<FlagArg> {
    let mark = cursor.mark();
    if !cursor.eat('=') && !cursor.eat(' ') {
        return Err(ParseError::Expected("argument separator"));
    }

    for rule in [repeat_arg, choice_arg, optional_args, simple_arg] {
        let attempt = cursor.mark();
        match rule(cursor) {
            Ok(arg) => return Ok(arg),
            Err(_) => cursor.reset(attempt),
        }
    }

    cursor.reset(mark);
    Err(ParseError::Expected("argument expression"))
}

/// One flag spelling with its optional argument, e.g. `--max-count=NUM`.
pub(crate) fn flag_with_arg(cursor: &mut Cursor) -> ParseResult<FlagSynonym> {
    let name = any_flag(cursor)?;
    let mark = cursor.mark();
    let argtype = match arg_expression(cursor) {
        Ok(arg) => arg,
        Err(_) => {
            cursor.reset(mark);
            FlagArg::Empty
        }
    };
    Ok(FlagSynonym { name, argtype })
}

/// A run of synonyms for one flag, separated by comma, pipe, slash, or
/// plain spaces: `-n, --lines=NUM`.
pub(crate) fn flag_synonyms(cursor: &mut Cursor) -> ParseResult<Vec<FlagSynonym>> {
    let mut synonyms = vec![flag_with_arg(cursor)?];

    loop {
        let mark = cursor.mark();
        let mut separated = cursor.skip_inline_ws() > 0;
        if cursor.peek().is_some_and(is_synonym_delim) {
            cursor.bump();
            cursor.skip_inline_ws();
            separated = true;
        }
        if !separated {
            break;
        }
        match flag_with_arg(cursor) {
            Ok(synonym) => synonyms.push(synonym),
            Err(_) => {
                cursor.reset(mark);
                break;
            }
        }
    }

    Ok(synonyms)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse<T>(rule: fn(&mut Cursor) -> ParseResult<T>, text: &str) -> ParseResult<T> {
        let mut cursor = Cursor::new(text);
        rule(&mut cursor)
    }

    #[test]
    fn test_any_flag_short_and_long() {
        assert_eq!(parse(any_flag, "-m rest").unwrap(), "-m");
        assert_eq!(parse(any_flag, "--max-count").unwrap(), "--max-count");
        assert_eq!(parse(any_flag, "-@ INT").unwrap(), "-@");
        assert!(parse(any_flag, "word").is_err());
        assert!(parse(any_flag, "- ").is_err());
    }

    #[test]
    fn test_flag_with_simple_arg() {
        let synonym = parse(flag_with_arg, "-A INT").unwrap();
        assert_eq!(synonym.name, "-A");
        assert_eq!(synonym.argtype, FlagArg::Simple { name: "INT".into() });
    }

    #[test]
    fn test_flag_with_equals_arg() {
        let synonym = parse(flag_with_arg, "--lines=NUM").unwrap();
        assert_eq!(synonym.name, "--lines");
        assert_eq!(synonym.argtype, FlagArg::Simple { name: "NUM".into() });
    }

    #[test]
    fn test_two_spaces_mean_no_argument() {
        // `-v  Enable` is a flag plus prose, not a flag with argument "Enable".
        let synonym = parse(flag_with_arg, "-v  Enable verbose output").unwrap();
        assert_eq!(synonym.argtype, FlagArg::Empty);
    }

    #[test]
    fn test_angle_delimited_arg_allows_spaces() {
        let synonym = parse(flag_with_arg, "-bam <bam path>").unwrap();
        assert_eq!(
            synonym.argtype,
            FlagArg::Simple {
                name: "bam path".into()
            }
        );
    }

    #[test]
    fn test_optional_args_nested() {
        let synonym = parse(flag_with_arg, "-I FLOAT[,FLOAT[,INT[,INT]]]").unwrap();
        assert_eq!(
            synonym.argtype,
            FlagArg::Optional {
                names: vec!["FLOAT".into(), "FLOAT".into(), "INT".into(), "INT".into()],
                separator: ",".into()
            }
        );
    }

    #[test]
    fn test_repeat_arg_bracketed() {
        let synonym = parse(flag_with_arg, "--samout SAMOUTS [SAMOUTS ...]").unwrap();
        assert_eq!(
            synonym.argtype,
            FlagArg::Repeat {
                name: "SAMOUTS".into()
            }
        );
    }

    #[test]
    fn test_repeat_arg_numbered_keeps_last_name() {
        let synonym = parse(flag_with_arg, "-i FILE1 FILE2 .. FILEn").unwrap();
        assert_eq!(synonym.argtype, FlagArg::Repeat { name: "FILEn".into() });
    }

    #[test]
    fn test_choice_arg() {
        let synonym = parse(flag_with_arg, "--format {sam,bam}").unwrap();
        assert_eq!(
            synonym.argtype,
            FlagArg::Choice {
                choices: vec!["sam".into(), "bam".into()]
            }
        );
    }

    #[test]
    fn test_flag_synonyms_comma_separated() {
        let synonyms = parse(flag_synonyms, "-n, --lines=NUM  print NUM lines").unwrap();
        assert_eq!(synonyms.len(), 2);
        assert_eq!(synonyms[0].name, "-n");
        assert_eq!(synonyms[0].argtype, FlagArg::Empty);
        assert_eq!(synonyms[1].name, "--lines");
        assert_eq!(synonyms[1].argtype, FlagArg::Simple { name: "NUM".into() });
    }

    #[test]
    fn test_flag_synonyms_slash_and_pipe() {
        let synonyms = parse(flag_synonyms, "-t/--threads INT").unwrap();
        assert_eq!(synonyms.len(), 2);
        let synonyms = parse(flag_synonyms, "-q | --quiet").unwrap();
        assert_eq!(synonyms.len(), 2);
    }

    #[test]
    fn test_flag_synonyms_stop_at_prose() {
        let mut cursor = Cursor::new("-S            skip mate rescue");
        let synonyms = flag_synonyms(&mut cursor).unwrap();
        assert_eq!(synonyms.len(), 1);
        // The cursor must be reset to just after the flag, leaving the
        // description gap intact.
        assert_eq!(cursor.col(), 3);
    }
}
