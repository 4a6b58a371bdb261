//! N-gram overlap scorer.

use super::Scorer;
use crate::collection::{Passage, Question};
use crate::error::Result;
use crate::tokenizer::SharedTokenizer;

/// Default highest n-gram order.
pub const DEFAULT_MAX_NGRAM: usize = 3;

/// Scores a passage by how many of the question's n-grams it contains.
///
/// For each order `n = 1..=max_order` the fraction of question n-grams found
/// verbatim in the passage is computed, and the fractions are summed. A
/// question fully contained in a passage therefore scores up to `max_order`.
pub struct NgramScorer {
    name: String,
    tokenizer: SharedTokenizer,
    max_order: usize,
}

impl NgramScorer {
    /// Create a scorer summing orders `1..=max_order`.
    pub fn new(tokenizer: SharedTokenizer, max_order: usize) -> Self {
        Self {
            name: "ngram".to_string(),
            tokenizer,
            max_order,
        }
    }

    /// Override the report name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Highest n-gram order considered.
    pub fn max_order(&self) -> usize {
        self.max_order
    }

    /// Score pre-tokenized inputs.
    pub fn score_tokens(&self, question: &[String], passage: &[String]) -> f64 {
        (1..=self.max_order)
            .map(|n| ngram_overlap(question, passage, n))
            .sum()
    }
}

impl Scorer for NgramScorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, question: &Question, passage: &Passage) -> Result<f64> {
        let q_tokens = self.tokenizer.tokenize(&question.sentence);
        let p_tokens = self.tokenizer.tokenize(&passage.text);
        Ok(self.score_tokens(&q_tokens, &p_tokens))
    }
}

/// Fraction of the question's `n`-grams that occur anywhere in the passage.
///
/// Returns 0 when `n` is 0 or the question has fewer than `n` tokens.
pub fn ngram_overlap<T: PartialEq>(question: &[T], passage: &[T], n: usize) -> f64 {
    if n == 0 || question.len() < n {
        return 0.0;
    }

    let windows = question.len() - n + 1;
    let matched = question
        .windows(n)
        .filter(|q_gram| passage.windows(n).any(|p_gram| p_gram == *q_gram))
        .count();

    matched as f64 / windows as f64
}
