//! Sentence-likeness classification for flag descriptions.
//!
//! The flag-block grammar happily matches tabular or symbolic text that is
//! not really a flag list; the last line of defense is asking whether the
//! assembled description reads like prose. The check is behind a trait so a
//! real NLP tagger can be plugged in; the built-in classifier is a
//! token-ratio heuristic that needs no language model.

/// Decides whether a fragment of text reads like an English sentence.
pub trait SentenceClassifier {
    fn is_sentence(&self, text: &str) -> bool;
}

/// Ratio-based stand-in for a part-of-speech tagger.
///
/// Tokens containing no alphabetic character (numbers, punctuation runs,
/// bracketed defaults like `[6,6]`) count as non-words. Text is accepted as
/// a sentence when the non-word share stays below the threshold. Empty text
/// is accepted: a flag with no description is fine, just undocumented.
#[derive(Debug, Clone)]
pub struct HeuristicClassifier {
    threshold: f64,
}

/// The threshold is tuned against a corpus of real tool help texts; changing
/// it is a behavior change, not a refactor.
pub const DEFAULT_SENTENCE_THRESHOLD: f64 = 0.8;

impl Default for HeuristicClassifier {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_SENTENCE_THRESHOLD,
        }
    }
}

impl HeuristicClassifier {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl SentenceClassifier for HeuristicClassifier {
    fn is_sentence(&self, text: &str) -> bool {
        let mut words = 0usize;
        let mut non_words = 0usize;
        for token in text.split_whitespace() {
            if !token.chars().any(|ch| ch.is_alphabetic()) {
                non_words += 1;
            }
            words += 1;
        }
        words == 0 || (non_words as f64) / (words as f64) < self.threshold
    }
}
