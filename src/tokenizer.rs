//! Text normalization into token sequences.
//!
//! Scorers only depend on the [`Tokenizer`] trait. [`SimpleTokenizer`]
//! lowercases, splits, drops stop words and optionally reduces every token to
//! its Snowball stem, so inflected forms ("loves", "loved") compare equal.

use rust_stemmers::{Algorithm, Stemmer};
use std::fmt;
use std::sync::Arc;

/// Maps raw text to an ordered sequence of normalized tokens.
pub trait Tokenizer: Send + Sync {
    fn tokenize(&self, text: &str) -> Vec<String>;
}

/// Shared tokenizer handle used by scorers and corpus statistics.
pub type SharedTokenizer = Arc<dyn Tokenizer>;

/// Splits on anything that is not alphanumeric, optionally lowercasing,
/// dropping stop words and stemming.
#[derive(Clone)]
pub struct SimpleTokenizer {
    lowercase: bool,
    stop_words: Vec<String>,
    stemmer: Option<Arc<Stemmer>>,
}

impl SimpleTokenizer {
    /// Lowercasing tokenizer without stop words or stemming.
    pub fn new() -> Self {
        Self {
            lowercase: true,
            stop_words: Vec::new(),
            stemmer: None,
        }
    }

    /// Lowercasing tokenizer with English Snowball stemming.
    pub fn english() -> Self {
        Self::new().with_stemming(Algorithm::English)
    }

    /// Reduce every token to its stem with the given Snowball algorithm.
    ///
    /// Stop words are matched before stemming.
    pub fn with_stemming(mut self, algorithm: Algorithm) -> Self {
        self.stemmer = Some(Arc::new(Stemmer::create(algorithm)));
        self
    }

    /// Whether tokens are stemmed.
    pub fn is_stemming(&self) -> bool {
        self.stemmer.is_some()
    }

    /// Keep the original casing of tokens.
    pub fn case_sensitive(mut self) -> Self {
        self.lowercase = false;
        self
    }

    /// Drop the given words from every token stream.
    pub fn with_stop_words<I, S>(mut self, words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.stop_words = words.into_iter().map(Into::into).collect();
        if self.lowercase {
            for word in &mut self.stop_words {
                *word = word.to_lowercase();
            }
        }
        self
    }

    /// Wrap into a shared handle.
    pub fn shared(self) -> SharedTokenizer {
        Arc::new(self)
    }
}

impl fmt::Debug for SimpleTokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleTokenizer")
            .field("lowercase", &self.lowercase)
            .field("stop_words", &self.stop_words)
            .field("stemming", &self.is_stemming())
            .finish()
    }
}

impl Default for SimpleTokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Tokenizer for SimpleTokenizer {
    fn tokenize(&self, text: &str) -> Vec<String> {
        text.split(|c: char| !c.is_alphanumeric())
            .filter(|s| !s.is_empty())
            .map(|s| {
                if self.lowercase {
                    s.to_lowercase()
                } else {
                    s.to_string()
                }
            })
            .filter(|s| !self.stop_words.contains(s))
            .map(|s| match &self.stemmer {
                Some(stemmer) => stemmer.stem(&s).into_owned(),
                None => s,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_on_punctuation_and_lowercases() {
        let tokens = SimpleTokenizer::new().tokenize("John loves Mary, doesn't he?");
        assert_eq!(tokens, vec!["john", "loves", "mary", "doesn", "t", "he"]);
    }

    #[test]
    fn test_case_sensitive() {
        let tokens = SimpleTokenizer::new().case_sensitive().tokenize("Rust RUST rust");
        assert_eq!(tokens, vec!["Rust", "RUST", "rust"]);
    }

    #[test]
    fn test_stop_words() {
        let tokenizer = SimpleTokenizer::new().with_stop_words(["The", "a"]);
        assert_eq!(tokenizer.tokenize("The cat sat on a mat"), vec!["cat", "sat", "on", "mat"]);
    }

    #[test]
    fn test_stemming_merges_inflected_forms() {
        let tokenizer = SimpleTokenizer::english();
        assert!(tokenizer.is_stemming());
        assert_eq!(tokenizer.tokenize("loves"), tokenizer.tokenize("loved"));
        assert_eq!(
            tokenizer.tokenize("John loves Mary"),
            tokenizer.tokenize("john loved mary")
        );
        assert_ne!(
            SimpleTokenizer::new().tokenize("loves"),
            SimpleTokenizer::new().tokenize("loved")
        );
    }

    #[test]
    fn test_stop_words_match_before_stemming() {
        let tokenizer = SimpleTokenizer::english().with_stop_words(["running"]);
        assert_eq!(tokenizer.tokenize("running runs"), vec!["run"]);
    }

    #[test]
    fn test_empty_text() {
        assert!(SimpleTokenizer::new().tokenize("  ... !! ").is_empty());
    }
}
