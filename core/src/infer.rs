//! Heuristic argument-type inference from help-text fragments.
//!
//! Given a placeholder name (`FILE`, `INT`) or a free-text description
//! (`"output file to write"`), [`infer_type`] guesses a [`CliType`] by
//! keyword matching in a fixed priority order. A miss returns `None`; callers
//! substitute [`CliType::String`] as the universal fallback.

use regex::Regex;
use std::sync::LazyLock;

use crate::types::CliType;

static PATTERNS: LazyLock<InferencePatterns> = LazyLock::new(InferencePatterns::new);

struct InferencePatterns {
    boolean: Regex,
    float: Regex,
    integer: Regex,
    file: Regex,
    directory: Regex,
    string: Regex,
    input: Regex,
    output: Regex,
    float_literal: Regex,
    int_literal: Regex,
}

impl InferencePatterns {
    fn new() -> Self {
        // All regexes here are compile-time constants. An expect() failure
        // indicates a programmer error in the pattern, not a runtime condition.
        Self {
            boolean: Regex::new(r"(?i)\bbool(ean)?\b").expect("static regex must compile"),
            float: Regex::new(r"(?i)\b(float|decimal)\b").expect("static regex must compile"),
            integer: Regex::new(r"(?i)\b((int(eger)?)|size|length|max|min|(num(ber)?))\b")
                .expect("static regex must compile"),
            file: Regex::new(r"(?i)\b(file(name|path)?|path)\b")
                .expect("static regex must compile"),
            directory: Regex::new(r"(?i)\b(folder|director(y|ies))\b")
                .expect("static regex must compile"),
            string: Regex::new(r"(?i)\bstr(ing)?\b").expect("static regex must compile"),
            input: Regex::new(r"(?i)input").expect("static regex must compile"),
            output: Regex::new(r"(?i)\bout(put)?\b").expect("static regex must compile"),
            float_literal: Regex::new(
                r"[+-]?(([0-9]*\.[0-9]+)|((?:0|[1-9]\d*)(?:\.\d*)?(?:[eE][+-]?\d+)))",
            )
            .expect("static regex must compile"),
            int_literal: Regex::new(r"[+-]?[0-9]+").expect("static regex must compile"),
        }
    }
}

/// Splits input from output filesystem types. A mention of "out"/"output"
/// without a mention of "input" means the command writes the path; anything
/// else defaults to an input.
fn filesystem_type(text: &str, directory: bool) -> CliType {
    let output = PATTERNS.output.is_match(text) && !PATTERNS.input.is_match(text);
    if directory {
        CliType::Directory { output }
    } else {
        CliType::File { output }
    }
}

/// Guesses the [`CliType`] hinted at by a fragment of help text.
///
/// Keyword classes are tried in priority order: boolean, float, integer,
/// file (split into input/output), directory (same split), string. If no
/// keyword matches, a float-looking and then an integer-looking numeral
/// anywhere in the text is accepted as a weaker signal. Returns `None` when
/// nothing matches.
///
/// # Examples
///
/// ```
/// use cli_model_core::{infer_type, CliType};
///
/// assert_eq!(infer_type("output file"), Some(CliType::File { output: true }));
/// assert_eq!(infer_type("minimum seed length [19]"), Some(CliType::Integer));
/// assert_eq!(infer_type(""), None);
/// ```
pub fn infer_type(text: &str) -> Option<CliType> {
    let patterns = &*PATTERNS;
    if patterns.boolean.is_match(text) {
        Some(CliType::Boolean)
    } else if patterns.float.is_match(text) {
        Some(CliType::Float)
    } else if patterns.integer.is_match(text) {
        Some(CliType::Integer)
    } else if patterns.file.is_match(text) {
        Some(filesystem_type(text, false))
    } else if patterns.directory.is_match(text) {
        Some(filesystem_type(text, true))
    } else if patterns.string.is_match(text) {
        Some(CliType::String)
    } else if patterns.float_literal.is_match(text) {
        Some(CliType::Float)
    } else if patterns.int_literal.is_match(text) {
        Some(CliType::Integer)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_infer_output_file() {
        assert_eq!(
            infer_type("output file"),
            Some(CliType::File { output: true })
        );
    }

    #[test]
    fn test_infer_input_file() {
        assert_eq!(
            infer_type("input file"),
            Some(CliType::File { output: false })
        );
    }

    #[test]
    fn test_infer_bare_file_defaults_to_input() {
        assert_eq!(
            infer_type("FILE"),
            Some(CliType::File { output: false })
        );
    }

    #[test]
    fn test_infer_empty_is_unknown() {
        assert_eq!(infer_type(""), None);
    }

    #[test]
    fn test_infer_keyword_priority_over_numerals() {
        // "penalty for a mismatch [4]" has no keyword, so the numeral wins.
        assert_eq!(infer_type("penalty for a mismatch [4]"), Some(CliType::Integer));
        // "gap open penalties [6,6]" likewise.
        assert_eq!(infer_type("number of threads [1]"), Some(CliType::Integer));
    }

    #[test]
    fn test_infer_float_beats_integer() {
        assert_eq!(infer_type("FLOAT"), Some(CliType::Float));
        assert_eq!(infer_type("a decimal size"), Some(CliType::Float));
    }

    #[test]
    fn test_infer_boolean_keyword() {
        assert_eq!(infer_type("bool"), Some(CliType::Boolean));
        assert_eq!(infer_type("a boolean toggle"), Some(CliType::Boolean));
    }

    #[test]
    fn test_infer_directory() {
        assert_eq!(
            infer_type("output directory"),
            Some(CliType::Directory { output: true })
        );
        assert_eq!(
            infer_type("config folder"),
            Some(CliType::Directory { output: false })
        );
    }

    #[test]
    fn test_infer_float_literal() {
        assert_eq!(infer_type("defaults to 0.50"), Some(CliType::Float));
    }

    #[test]
    fn test_infer_string_keyword() {
        assert_eq!(infer_type("STR"), Some(CliType::String));
    }
}
