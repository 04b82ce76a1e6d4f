//! The flag-block grammar: finds and parses indented option lists.
//!
//! Help texts describe their options in blocks shaped like
//!
//! ```text
//! Algorithm options:
//!
//!        -t INT        number of threads [1]
//!        -k INT        minimum seed length [19]
//! ```
//!
//! A block is introduced by a colon, by a newline followed by indentation,
//! or (rarely) by flags sitting flush at the left margin. Entries are flags
//! or positionals; lines indented deeper than an entry continue its
//! description. The parser scans the whole text for candidate positions and
//! pools every block it can match, then resolves collisions by dropping any
//! argument whose key was claimed more than once.

pub mod elements;

use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use cli_model_core::{Command, Flag, Positional};

use crate::cursor::{is_element_body, is_element_start, Cursor};
use crate::describe;
use crate::error::{ParseError, ParseResult};
use crate::indent::IndentStack;
use crate::sentence::{HeuristicClassifier, SentenceClassifier};

struct DescriptionPatterns {
    /// A single space with words on both sides.
    word_gap: Regex,
    /// A multi-space (or tab) run with words on both sides, the signature of
    /// tabular text.
    wide_gap: Regex,
}

static PATTERNS: LazyLock<DescriptionPatterns> = LazyLock::new(|| DescriptionPatterns {
    word_gap: Regex::new(r"\b \b").expect("static regex must compile"),
    wide_gap: Regex::new(r"\b\s{2,}\b").expect("static regex must compile"),
});

/// Vets a candidate description: all-symbolic text and text with more
/// tabular gaps than prose gaps are rejected, which backtracks the block.
fn looks_like_prose(text: &str) -> bool {
    let words: Vec<&str> = text.split_whitespace().collect();
    if !words.is_empty()
        && words
            .iter()
            .all(|word| !word.chars().any(char::is_alphabetic))
    {
        return false;
    }
    let wide = PATTERNS.wide_gap.find_iter(text).count();
    let narrow = PATTERNS.word_gap.find_iter(text).count();
    wide <= narrow
}

/// One entry of a flag block, before the named/positional split.
#[derive(Debug, Clone)]
pub(crate) enum BlockEntry {
    Flag(Flag),
    Positional(Positional),
}

impl BlockEntry {
    fn description(&self) -> &str {
        match self {
            BlockEntry::Flag(flag) => &flag.description,
            BlockEntry::Positional(positional) => &positional.description,
        }
    }

    fn description_mut(&mut self) -> &mut String {
        match self {
            BlockEntry::Flag(flag) => &mut flag.description,
            BlockEntry::Positional(positional) => &mut positional.description,
        }
    }
}

/// Parser for the flag blocks of one help text.
pub struct FlagParser {
    stack: IndentStack,
    classifier: Box<dyn SentenceClassifier>,
    parse_positionals: bool,
}

impl Default for FlagParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FlagParser {
    pub fn new() -> Self {
        Self {
            stack: IndentStack::new(),
            classifier: Box::new(HeuristicClassifier::default()),
            parse_positionals: true,
        }
    }

    /// Replaces the sentence classifier used to vet entry descriptions.
    pub fn with_classifier(mut self, classifier: Box<dyn SentenceClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Disables positional entries, leaving only dashed flags.
    pub fn without_positionals(mut self) -> Self {
        self.parse_positionals = false;
        self
    }

    /// Runs `rule`, restoring both the cursor and the indentation stack if
    /// it fails.
    fn attempt<T>(
        &mut self,
        cursor: &mut Cursor,
        rule: impl FnOnce(&mut Self, &mut Cursor) -> ParseResult<T>,
    ) -> ParseResult<T> {
        let snapshot = self.stack.snapshot();
        let mark = cursor.mark();
        match rule(self, cursor) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.stack.restore(snapshot);
                cursor.reset(mark);
                Err(err)
            }
        }
    }

    /// A flag entry: synonyms plus the rest of the line as description.
    fn flag_entry(&mut self, cursor: &mut Cursor) -> ParseResult<BlockEntry> {
        let mark = cursor.mark();
        match elements::flag_synonyms(cursor) {
            Ok(synonyms) => {
                let description = cursor.take_line();
                Ok(BlockEntry::Flag(Flag::from_synonyms(synonyms, description)))
            }
            Err(err) => {
                cursor.reset(mark);
                Err(err)
            }
        }
    }

    /// A positional entry: a bare name, at least two spaces, and a non-empty
    /// description. The two-space gap is what separates real positional rows
    /// from ordinary prose.
    fn positional_entry(&mut self, cursor: &mut Cursor) -> ParseResult<BlockEntry> {
        let mark = cursor.mark();
        let entry = (|| {
            let name = cursor
                .take_word(is_element_start, is_element_body)
                .ok_or(ParseError::Expected("positional name"))?;
            if name.chars().count() < 2 {
                return Err(ParseError::Expected("positional name"));
            }
            if cursor.skip_inline_ws() < 2 {
                return Err(ParseError::Expected("column gap"));
            }
            let description = cursor.take_line();
            if description.is_empty() {
                return Err(ParseError::Expected("positional description"));
            }
            Ok(BlockEntry::Positional(Positional::new(0, name, description)))
        })();
        if entry.is_err() {
            cursor.reset(mark);
        }
        entry
    }

    fn block_element(&mut self, cursor: &mut Cursor) -> ParseResult<BlockEntry> {
        match self.flag_entry(cursor) {
            Ok(entry) => Ok(entry),
            Err(err) if self.parse_positionals => self
                .positional_entry(cursor)
                .map_err(|_| err),
            Err(err) => Err(err),
        }
    }

    /// One block entry at a column deeper than the enclosing level.
    fn indented_entry(&mut self, cursor: &mut Cursor) -> ParseResult<BlockEntry> {
        self.attempt(cursor, |parser, cursor| {
            cursor.skip_ws();
            parser.stack.indent(cursor.col())?;
            parser.block_element(cursor)
        })
    }

    /// An indented entry followed by any mix of sibling entries and
    /// description blocks, with descriptions attached to the entry above.
    fn flag_block(&mut self, cursor: &mut Cursor) -> ParseResult<Vec<BlockEntry>> {
        self.attempt(cursor, |parser, cursor| {
            let mut entries = vec![parser.indented_entry(cursor)?];
            loop {
                let sibling = parser.attempt(cursor, |parser, cursor| {
                    parser.stack.pop_indent();
                    parser.indented_entry(cursor)
                });
                if let Ok(entry) = sibling {
                    entries.push(entry);
                    continue;
                }
                match describe::description_block(cursor, &mut parser.stack, looks_like_prose) {
                    Ok(text) => {
                        if let Some(last) = entries.last_mut() {
                            append_description(last.description_mut(), &text);
                        }
                    }
                    Err(_) => break,
                }
            }
            parser.stack.pop_indent();

            entries.retain(|entry| parser.classifier.is_sentence(entry.description()));
            Ok(entries)
        })
    }

    /// A block introduced by a colon, e.g. a section header. A single entry
    /// is rejected: real option sections list at least two, and one-entry
    /// matches are nearly always prose that happens to contain a dash.
    fn colon_block(&mut self, cursor: &mut Cursor) -> ParseResult<Vec<BlockEntry>> {
        self.attempt(cursor, |parser, cursor| {
            if !cursor.eat(':') {
                return Err(ParseError::Expected("colon"));
            }
            let entries = parser.flag_block(cursor)?;
            if entries.len() < 2 {
                return Err(ParseError::Rejected("undersized colon block"));
            }
            Ok(entries)
        })
    }

    /// A block introduced by nothing but a line break and indentation.
    fn newline_block(&mut self, cursor: &mut Cursor) -> ParseResult<Vec<BlockEntry>> {
        self.attempt(cursor, |parser, cursor| {
            if !cursor.at_line_start() {
                return Err(ParseError::Expected("line start"));
            }
            let before = cursor.pos();
            cursor.skip_ws();
            if cursor.pos() == before {
                return Err(ParseError::Expected("indentation"));
            }
            parser.flag_block(cursor)
        })
    }

    /// Flags sitting flush at the left margin, one per line, each optionally
    /// followed by an indented description block. Positionals are not
    /// allowed here: an unindented `name  text` line is almost always prose.
    fn unindented_block(&mut self, cursor: &mut Cursor) -> ParseResult<Vec<BlockEntry>> {
        self.attempt(cursor, |parser, cursor| {
            let mut entries: Vec<BlockEntry> = Vec::new();
            loop {
                if !cursor.at_line_start() || cursor.peek() != Some('-') {
                    break;
                }
                match parser.flag_entry(cursor) {
                    Ok(entry) => entries.push(entry),
                    Err(_) => break,
                }
                if let Ok(text) =
                    describe::description_block(cursor, &mut parser.stack, looks_like_prose)
                {
                    if let Some(last) = entries.last_mut() {
                        append_description(last.description_mut(), &text);
                    }
                }
            }
            if entries.is_empty() {
                return Err(ParseError::Expected("flag"));
            }
            entries.retain(|entry| parser.classifier.is_sentence(entry.description()));
            Ok(entries)
        })
    }

    /// Scans the whole text, attempting a block at every colon and every
    /// line start, and pools the entries of every match.
    fn scan(&mut self, text: &str) -> Vec<BlockEntry> {
        let mut entries = Vec::new();
        let mut cursor = Cursor::new(text);
        let bytes = text.as_bytes();
        let mut index = 0;

        while index < bytes.len() {
            let at_colon = bytes[index] == b':';
            let at_line_start = index == 0 || bytes[index - 1] == b'\n';
            if at_colon || at_line_start {
                self.stack = IndentStack::new();
                cursor.seek(index);

                let mut block = Err(ParseError::Expected("flag block"));
                if at_colon {
                    block = self.colon_block(&mut cursor);
                }
                if block.is_err() && at_line_start {
                    block = self
                        .newline_block(&mut cursor)
                        .or_else(|_| self.unindented_block(&mut cursor));
                }

                if let Ok(mut found) = block {
                    debug!(offset = index, entries = found.len(), "matched flag block");
                    entries.append(&mut found);
                    index = cursor.pos().max(index + 1);
                    continue;
                }
            }
            index += 1;
        }

        entries
    }

    /// Parses every flag block in `text` into a [`Command`] for `cmd`.
    ///
    /// Arguments whose key (longest synonym for flags, name for positionals)
    /// appears more than once across all blocks are dropped entirely: a
    /// repeated key means the scan matched the same text twice or the text
    /// is too ambiguous to trust.
    pub fn parse_command(&mut self, cmd: &[String], text: &str) -> Command {
        let entries = self.scan(text);

        let mut named: Vec<Flag> = Vec::new();
        let mut positional: Vec<Positional> = Vec::new();
        for entry in entries {
            match entry {
                BlockEntry::Flag(flag) => named.push(flag),
                BlockEntry::Positional(mut entry) => {
                    entry.position = positional.len();
                    positional.push(entry);
                }
            }
        }

        let mut command = Command::new(cmd.to_vec());
        command.named = drop_contested(named, |flag| flag.longest_synonym().to_string());
        command.positional = drop_contested(positional, |positional| positional.name.clone());
        command.extract_special_flags();
        command
    }
}

/// Appends a description block to an entry's existing description.
fn append_description(description: &mut String, text: &str) {
    if description.is_empty() {
        description.push_str(text);
    } else if !text.is_empty() {
        description.push('\n');
        description.push_str(text);
    }
}

/// Keeps only the items whose key occurs exactly once.
fn drop_contested<T>(items: Vec<T>, key: impl Fn(&T) -> String) -> Vec<T> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for item in &items {
        *counts.entry(key(item)).or_insert(0) += 1;
    }
    items
        .into_iter()
        .filter(|item| counts[&key(item)] == 1)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use cli_model_core::FlagArg;

    fn parse(text: &str) -> Command {
        FlagParser::new().parse_command(&[String::from("tool")], text)
    }

    #[test]
    fn test_unindented_flags() {
        let command = parse(
            "-A INT        score for a sequence match\n\
             -B INT        penalty for a mismatch\n",
        );
        assert_eq!(command.named.len(), 2);
        assert_eq!(command.named[0].synonyms, vec!["-A"]);
        assert_eq!(command.named[0].args, FlagArg::Simple { name: "INT".into() });
        assert_eq!(command.named[1].synonyms, vec!["-B"]);
    }

    #[test]
    fn test_newline_block_with_continuations() {
        let text = "\n       -x STR        read type. Setting -x changes multiple parameters\n                     pacbio: -k17 -W40 -r10 (PacBio reads to ref)\n       -S            skip mate rescue\n";
        let command = parse(text);
        assert_eq!(command.named.len(), 2);
        assert!(command.named[0].description.contains("read type"));
        assert!(command.named[0].description.contains("pacbio"));
        assert_eq!(command.named[1].synonyms, vec!["-S"]);
    }

    #[test]
    fn test_colon_block_requires_two_entries() {
        let text = "Options:\n    -o FILE   write output to FILE\n";
        let command = parse(text);
        // One entry is not enough for a colon block, but the line itself
        // still matches as a newline block.
        assert_eq!(command.named.len(), 1);

        let text = "The only real option here is -v: it controls verbosity of it\n";
        let command = parse(text);
        assert!(command.named.is_empty());
    }

    #[test]
    fn test_positional_rows_need_wide_gap() {
        let text = "Options:\n    in.bam    the input alignment file\n    out.bam   the output alignment file\n";
        let command = parse(text);
        assert_eq!(command.positional.len(), 2);
        assert_eq!(command.positional[0].name, "in.bam");
        assert_eq!(command.positional[0].position, 0);
        assert_eq!(command.positional[1].name, "out.bam");
        assert_eq!(command.positional[1].position, 1);
    }

    #[test]
    fn test_duplicate_flags_are_dropped() {
        let text = "Options:\n    -v   verbose output please\n    -o FILE   the output file name\n\nMore options:\n    -v   verbose output please\n    -q   quiet output please\n";
        let command = parse(text);
        let synonyms: Vec<&str> = command
            .named
            .iter()
            .map(|flag| flag.synonyms[0].as_str())
            .collect();
        assert_eq!(synonyms, vec!["-o", "-q"]);
    }

    #[test]
    fn test_numeric_descriptions_are_filtered() {
        let text = "Options:\n    -a   10 20 30 40 50\n    -b   1.5 2.5 [3,4]\n";
        let command = parse(text);
        assert!(command.named.is_empty());
    }

    #[test]
    fn test_help_flag_is_extracted() {
        let text = "Options:\n    -h, --help       show this help message and exit\n    --version        print the version number and exit\n    -v               be more verbose about progress\n";
        let command = parse(text);
        assert_eq!(command.named.len(), 1);
        assert_eq!(command.named[0].synonyms, vec!["-v"]);
        let help = command.help_flag.expect("help flag");
        assert_eq!(help.synonyms, vec!["-h", "--help"]);
        assert!(command.version_flag.is_some());
    }
}
