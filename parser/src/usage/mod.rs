//! The usage-section grammar: finds `usage:` lines and parses their
//! examples.
//!
//! A usage section is either inline (`Usage: samtools merge [-nurlf] ...`)
//! or a bare `Usage:` header followed by indented example lines, each
//! optionally explained by a deeper description block. Every example yields
//! flags and positional elements; the leading tokens that just restate the
//! command name are stripped, and when an example marks nothing as a
//! `<variable>` every element is promoted to one, since such lines spell
//! their placeholders without delimiters.

pub mod elements;

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use cli_model_core::{Command, Flag, Positional};

use crate::cursor::Cursor;
use crate::describe;
use crate::error::{ParseError, ParseResult};
use crate::indent::IndentStack;

use elements::{usage_element, UsageElement, UsageItem};

static USAGE_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?im)^[ \t]*usage:").expect("static regex must compile"));

/// Parser for the usage sections of one help text.
#[derive(Default)]
pub struct UsageParser {
    stack: IndentStack,
}

impl UsageParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses every usage section in `text` into a [`Command`] for `cmd`.
    pub fn parse_usage(&mut self, cmd: &[String], text: &str) -> Command {
        let mut positional: Vec<Positional> = Vec::new();
        let mut named: Vec<Flag> = Vec::new();

        for header in USAGE_HEADER.find_iter(text) {
            let mut cursor = Cursor::new(text);
            cursor.seek(header.end());
            self.stack = IndentStack::new();

            let examples = if cursor.at_line_end() {
                self.indented_examples(&mut cursor)
            } else {
                cursor.skip_inline_ws();
                match usage_example(&mut cursor) {
                    Ok(items) => vec![items],
                    Err(_) => Vec::new(),
                }
            };
            debug!(
                offset = header.start(),
                examples = examples.len(),
                "matched usage section"
            );

            for items in examples {
                collect_example(cmd, items, &mut positional, &mut named);
            }
        }

        let mut command = Command::new(cmd.to_vec());
        command.positional = Positional::deduplicate(positional);
        command.named = Flag::deduplicate(named);
        command.extract_special_flags();
        command
    }

    /// Examples on their own lines under a bare `Usage:` header, each at an
    /// indented column, each optionally followed by a deeper description
    /// block (which is consumed and discarded).
    fn indented_examples(&mut self, cursor: &mut Cursor) -> Vec<Vec<UsageItem>> {
        let mut examples = Vec::new();
        loop {
            let snapshot = self.stack.snapshot();
            let mark = cursor.mark();
            cursor.skip_ws();
            if cursor.is_eof() || self.stack.indent(cursor.col()).is_err() {
                self.stack.restore(snapshot);
                cursor.reset(mark);
                break;
            }
            match usage_example(cursor) {
                Ok(items) => {
                    let _ = describe::description_block(cursor, &mut self.stack, |_| true);
                    self.stack.pop_indent();
                    examples.push(items);
                }
                Err(_) => {
                    self.stack.restore(snapshot);
                    cursor.reset(mark);
                    break;
                }
            }
        }
        examples
    }
}

/// One usage example: elements until the end of the line. The terminating
/// newline is left unconsumed.
fn usage_example(cursor: &mut Cursor) -> ParseResult<Vec<UsageItem>> {
    let mut items = Vec::new();
    let mut parsed = 0usize;
    loop {
        cursor.skip_inline_ws();
        if cursor.at_line_end() {
            break;
        }
        match usage_element(cursor) {
            Ok(sub) => {
                parsed += 1;
                items.extend(sub);
            }
            Err(_) => break,
        }
    }
    if parsed == 0 {
        return Err(ParseError::Expected("usage element"));
    }
    Ok(items)
}

/// Splits one example into flags and positionals and appends them.
fn collect_example(
    cmd: &[String],
    items: Vec<UsageItem>,
    positional: &mut Vec<Positional>,
    named: &mut Vec<Flag>,
) {
    let mut usage_elements: Vec<UsageElement> = Vec::new();
    for item in items {
        match item {
            UsageItem::Element(element) => usage_elements.push(element),
            UsageItem::Flag(flag) => named.push(flag),
        }
    }

    strip_command_prefix(&mut usage_elements, cmd);

    // A line like `dotnet tool.dll input_vcf output_dir` has no delimited
    // variables at all; treat every leftover element as one.
    if !usage_elements.iter().any(|element| element.variable) {
        for element in &mut usage_elements {
            element.variable = true;
        }
    }

    for (index, element) in usage_elements.into_iter().enumerate() {
        let mut entry = Positional::new(index, &element.text, "");
        entry.optional = element.optional;
        positional.push(entry);
    }
}

/// Lowercases a token and reduces it to its file stem, so `Pisces.dll`
/// restates the command `pisces`.
fn normalize_token(token: &str) -> String {
    let lower = token.to_ascii_lowercase();
    let name = lower.rsplit('/').next().unwrap_or(&lower);
    match name.rfind('.') {
        Some(index) if index > 0 => name[..index].to_string(),
        _ => name.to_string(),
    }
}

/// Removes every run of elements that restates the command being parsed,
/// along with anything before it.
fn strip_command_prefix(elements: &mut Vec<UsageElement>, cmd: &[String]) {
    if cmd.is_empty() {
        return;
    }
    let target: Vec<String> = cmd.iter().map(|token| normalize_token(token)).collect();

    let mut index = 0;
    while index + target.len() <= elements.len() {
        let matched = elements[index..index + target.len()]
            .iter()
            .zip(&target)
            .all(|(element, want)| normalize_token(&element.text) == *want);
        if matched {
            elements.drain(..index + target.len());
            index = 0;
        } else {
            index += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cli_model_core::FlagArg;

    fn parse(cmd: &[&str], text: &str) -> Command {
        let cmd: Vec<String> = cmd.iter().map(|token| token.to_string()).collect();
        UsageParser::new().parse_usage(&cmd, text)
    }

    #[test]
    fn test_inline_usage_with_variables() {
        let command = parse(
            &["samtools", "merge"],
            "Usage: samtools merge [-nurlf] [-h inh.sam] [-b <bamlist.fofn>] <out.bam> <in1.bam> [<in2.bam> ... <inN.bam>]\n",
        );
        let names: Vec<&str> = command
            .positional
            .iter()
            .map(|positional| positional.name.as_str())
            .collect();
        assert_eq!(names, vec!["out.bam", "in1.bam", "inN.bam"]);
        let synonyms: Vec<&str> = command
            .named
            .iter()
            .map(|flag| flag.synonyms[0].as_str())
            .collect();
        assert_eq!(synonyms, vec!["-nurlf", "-h", "-b"]);
        // `-h` takes an argument here, so it must not become the help flag.
        assert!(command.help_flag.is_none());
    }

    #[test]
    fn test_bare_words_are_promoted_to_variables() {
        let command = parse(
            &["htseq-count"],
            "usage: htseq-count [options] alignment_file gff_file\n",
        );
        assert_eq!(command.positional.len(), 2);
        assert_eq!(command.positional[0].name, "alignment_file");
        assert_eq!(command.positional[1].name, "gff_file");
        assert!(command.named.is_empty());
    }

    #[test]
    fn test_command_restated_with_extension_is_stripped() {
        let command = parse(
            &["dotnet", "Pisces.dll"],
            "Usage: dotnet Pisces.dll -bam <bam path> -g <genome path>\n",
        );
        assert!(command.positional.is_empty());
        assert_eq!(command.named.len(), 2);
        assert_eq!(command.named[0].synonyms, vec!["-bam"]);
        assert_eq!(
            command.named[1].args,
            FlagArg::Simple {
                name: "genome path".into()
            }
        );
    }

    #[test]
    fn test_indented_examples_under_bare_header() {
        let text = "Usage:\n   bcftools index [options] <in.bcf>\n      index a BCF file\n   bcftools query [options] <in.bcf>\nNotes follow here.\n";
        let command = parse(&["bcftools"], text);
        // Two examples sharing `in.bcf`; the duplicate merges away and the
        // description line under the first example is consumed, not parsed.
        let names: Vec<&str> = command
            .positional
            .iter()
            .map(|positional| positional.name.as_str())
            .collect();
        assert_eq!(names, vec!["index", "query", "in.bcf"]);
    }

    #[test]
    fn test_duplicate_flags_across_examples_merge() {
        let text = "Usage:\n   tool align -t INT <ref.fa>\n   tool index -t INT <ref.fa>\n";
        let command = parse(&["tool"], text);
        let threads: Vec<&Flag> = command
            .named
            .iter()
            .filter(|flag| flag.has_synonym("-t"))
            .collect();
        assert_eq!(threads.len(), 1);
    }

    #[test]
    fn test_text_without_usage_yields_empty_command() {
        let command = parse(&["tool"], "no relevant content at all\n");
        assert!(command.is_empty());
    }
}
