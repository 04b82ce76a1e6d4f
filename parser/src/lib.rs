//! Parses captured `--help` text into a structured command model.
//!
//! Command-line tools describe themselves in loosely conventional help
//! text: a `usage:` synopsis line, and indented blocks listing flags and
//! positional arguments. This crate runs two independent grammars over the
//! raw text — a flag-block grammar and a usage-line grammar — and merges
//! their results into a [`Command`] from `cli-model-core`.
//!
//! # Examples
//!
//! ```
//! use cli_model_parser::parse_help;
//!
//! let text = "Options:\n  -o FILE   write output to FILE\n  -v        print progress messages\n";
//! let command = parse_help(&["tool".to_string()], text);
//! assert_eq!(command.named.len(), 2);
//! assert_eq!(command.named[0].synonyms, vec!["-o"]);
//! ```
//!
//! Parsing never hard-fails: text where nothing matches produces a
//! [`Command`] with no arguments, which callers treat as "this help flag
//! didn't work, try another".

pub mod error;
pub mod flags;
pub mod sentence;
pub mod usage;

mod cursor;
mod describe;
mod indent;

use tracing::debug;

use cli_model_core::{Command, Flag};

pub use error::{ParseError, ParseResult};
pub use flags::FlagParser;
pub use sentence::{HeuristicClassifier, SentenceClassifier, DEFAULT_SENTENCE_THRESHOLD};
pub use usage::UsageParser;

/// Knobs for [`parse_help_with`].
#[derive(Debug, Clone)]
pub struct ParseOptions {
    /// Texts with more lines than this are not parsed at all and yield an
    /// empty [`Command`]. Backtracking cost grows quickly with input size,
    /// and real help texts are short; anything huge is a log file or a man
    /// page. Zero disables the guard.
    pub max_lines: usize,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self { max_lines: 1000 }
    }
}

/// Parses one help text with default [`ParseOptions`].
pub fn parse_help(cmd: &[String], text: &str) -> Command {
    parse_help_with(cmd, text, &ParseOptions::default())
}

/// Parses one help text into a [`Command`] for the invocation `cmd`.
///
/// Both grammars run over the whole text and their results are merged
/// asymmetrically: the flag blocks' positionals win when they found any,
/// otherwise the usage line's are used; flags are combined with the flag
/// blocks' entries taking precedence, since they carry descriptions. This
/// policy is deliberately kept as-is — downstream fixtures encode exact
/// argument counts against it.
pub fn parse_help_with(cmd: &[String], text: &str, options: &ParseOptions) -> Command {
    if options.max_lines > 0 {
        let lines = text.lines().count();
        if lines > options.max_lines {
            debug!(lines, max = options.max_lines, "size guard tripped, skipping parse");
            let mut command = Command::new(cmd.to_vec());
            command.help_text = Some(text.to_string());
            return command;
        }
    }

    let flag_cmd = FlagParser::new().parse_command(cmd, text);
    let usage_cmd = UsageParser::new().parse_usage(cmd, text);
    debug!(
        flag_named = flag_cmd.named.len(),
        flag_positional = flag_cmd.positional.len(),
        usage_named = usage_cmd.named.len(),
        usage_positional = usage_cmd.positional.len(),
        "merging grammar results"
    );

    let mut command = Command::new(cmd.to_vec());
    command.positional = if flag_cmd.positional.is_empty() {
        usage_cmd.positional
    } else {
        flag_cmd.positional
    };
    command.named = Flag::combine([flag_cmd.named, usage_cmd.named]);
    command.help_flag = flag_cmd.help_flag.or(usage_cmd.help_flag);
    command.usage_flag = flag_cmd.usage_flag.or(usage_cmd.usage_flag);
    command.version_flag = flag_cmd.version_flag.or(usage_cmd.version_flag);
    command.help_text = Some(text.to_string());
    command
}

/// Re-parses a stored command tree from the help text captured on each node.
///
/// Nodes without stored help text are kept as they are. Acquisition
/// metadata (`generated_using`, `docker_image`) carries over, so a tree can
/// be re-analyzed after a parser improvement without re-running any tools.
pub fn reanalyse(command: &Command) -> Command {
    let mut fresh = match &command.help_text {
        Some(text) => parse_help(&command.command, text),
        None => {
            let mut kept = command.clone();
            kept.subcommands.clear();
            kept
        }
    };
    fresh.generated_using = command.generated_using.clone();
    fresh.docker_image = command.docker_image.clone();
    fresh.subcommands = command.subcommands.iter().map(reanalyse).collect();
    fresh
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cmd(tokens: &[&str]) -> Vec<String> {
        tokens.iter().map(|token| token.to_string()).collect()
    }

    #[test]
    fn test_usage_positionals_fill_in_when_blocks_have_none() {
        let text = "Usage: tool [options] <input> <output>\n\nOptions:\n  -o FILE    write results to FILE\n  -v         be verbose about progress\n";
        let command = parse_help(&cmd(&["tool"]), text);
        let names: Vec<&str> = command
            .positional
            .iter()
            .map(|positional| positional.name.as_str())
            .collect();
        assert_eq!(names, vec!["input", "output"]);
        assert_eq!(command.named.len(), 2);
        assert_eq!(command.help_text.as_deref(), Some(text));
    }

    #[test]
    fn test_block_positionals_beat_usage_positionals() {
        let text = "Usage: tool <in.sam>\n\nArguments:\n  in.bam    the input file to read\n  out.bam   the file to write out\n";
        let command = parse_help(&cmd(&["tool"]), text);
        let names: Vec<&str> = command
            .positional
            .iter()
            .map(|positional| positional.name.as_str())
            .collect();
        assert_eq!(names, vec!["in.bam", "out.bam"]);
    }

    #[test]
    fn test_combined_flags_keep_block_descriptions() {
        let text = "Usage: tool -o FILE <input>\n\nOptions:\n  -o FILE    write results to FILE\n  -q         suppress progress output\n";
        let command = parse_help(&cmd(&["tool"]), text);
        assert_eq!(command.named.len(), 2);
        let output = command
            .named
            .iter()
            .find(|flag| flag.has_synonym("-o"))
            .expect("-o flag");
        assert_eq!(output.description, "write results to FILE");
    }

    #[test]
    fn test_size_guard_returns_empty_command() {
        let text = "  -a   print all available results\n  -b   print the bare minimum\n  -c   count the matching entries\n  -d   show debug output as well\n  -e   explain every single step\n";
        let options = ParseOptions { max_lines: 3 };
        let command = parse_help_with(&cmd(&["tool"]), text, &options);
        assert!(command.is_empty());
        assert!(command.help_text.is_some());

        // The guard can be disabled entirely.
        let options = ParseOptions { max_lines: 0 };
        let command = parse_help_with(&cmd(&["tool"]), text, &options);
        assert_eq!(command.named.len(), 5);
    }

    #[test]
    fn test_reanalyse_rebuilds_tree_from_stored_text() {
        let mut root = Command::new(cmd(&["samtools"]));
        root.help_text =
            Some("Options:\n  -@ INT    number of threads to use\n  -q        be quiet during the run\n".to_string());
        root.generated_using = Some("--help".to_string());
        let mut sub = Command::new(cmd(&["samtools", "sort"]));
        sub.help_text =
            Some("Options:\n  -o FILE   write the output to FILE\n  -m INT    memory limit per thread\n".to_string());
        root.subcommands.push(sub);

        let fresh = reanalyse(&root);
        assert_eq!(fresh.named.len(), 2);
        assert_eq!(fresh.generated_using.as_deref(), Some("--help"));
        assert_eq!(fresh.subcommands.len(), 1);
        assert_eq!(fresh.subcommands[0].named.len(), 2);
        assert_eq!(fresh.subcommands[0].command, cmd(&["samtools", "sort"]));
    }
}
