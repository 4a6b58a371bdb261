//! BM25 relevance scorer.

use super::Scorer;
use crate::collection::{Collection, Passage, Question};
use crate::error::{RankerError, Result};
use crate::stats::{CorpusStats, IdfFormula};
use crate::tokenizer::SharedTokenizer;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

/// BM25 tuning parameters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    /// Term frequency saturation.
    pub k1: f64,
    /// Length normalization strength in `[0, 1]`.
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self {
        Self { k1: 1.6, b: 0.75 }
    }
}

impl Bm25Params {
    /// Check that `k1` is a non-negative number and `b` lies in `[0, 1]`.
    ///
    /// Within these ranges the BM25 denominator stays positive for every
    /// matching term.
    pub fn validate(&self) -> Result<()> {
        if !self.k1.is_finite() || self.k1 < 0.0 {
            return Err(RankerError::InvalidConfig(format!(
                "BM25 k1 must be a non-negative number, got {}",
                self.k1
            )));
        }

        if !(0.0..=1.0).contains(&self.b) {
            return Err(RankerError::InvalidConfig(format!(
                "BM25 b must be within [0, 1], got {}",
                self.b
            )));
        }

        Ok(())
    }
}

/// Okapi BM25 over raw term frequencies.
///
/// Needs corpus statistics, so it can only be built once the collection is
/// known: either from prebuilt [`CorpusStats`] or directly from a
/// [`Collection`].
pub struct Bm25Scorer {
    name: String,
    stats: Arc<CorpusStats>,
    tokenizer: SharedTokenizer,
    params: Bm25Params,
}

impl Bm25Scorer {
    /// Create a scorer over existing statistics.
    ///
    /// Fails with [`RankerError::InvalidConfig`] if `params` are out of range.
    pub fn new(
        stats: Arc<CorpusStats>,
        tokenizer: SharedTokenizer,
        params: Bm25Params,
    ) -> Result<Self> {
        params.validate()?;
        Ok(Self {
            name: "bm25".to_string(),
            stats,
            tokenizer,
            params,
        })
    }

    /// Compute statistics over `collection` and create a scorer over them.
    pub fn build(
        collection: &Collection,
        tokenizer: SharedTokenizer,
        params: Bm25Params,
        formula: IdfFormula,
    ) -> Result<Self> {
        let stats = CorpusStats::build_with(collection, tokenizer.as_ref(), formula);
        Self::new(Arc::new(stats), tokenizer, params)
    }

    /// Override the report name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Statistics the scorer reads.
    pub fn stats(&self) -> &Arc<CorpusStats> {
        &self.stats
    }

    /// Tuning parameters.
    pub fn params(&self) -> Bm25Params {
        self.params
    }

    /// Score pre-tokenized inputs.
    ///
    /// Each distinct question term contributes once, in question order.
    pub fn score_tokens(&self, question: &[String], passage: &[String]) -> f64 {
        let mut tf: HashMap<&str, usize> = HashMap::new();
        for term in passage {
            *tf.entry(term.as_str()).or_insert(0) += 1;
        }

        let avg_len = self.stats.avg_passage_len();
        let length_ratio = if avg_len > 0.0 {
            passage.len() as f64 / avg_len
        } else {
            1.0
        };
        let Bm25Params { k1, b } = self.params;
        let norm = k1 * (1.0 - b + b * length_ratio);

        let mut seen = HashSet::new();
        let mut score = 0.0;
        for term in question {
            if !seen.insert(term.as_str()) {
                continue;
            }
            let Some(&count) = tf.get(term.as_str()) else {
                continue;
            };
            let tf = count as f64;
            score += self.stats.idf(term) * tf * (k1 + 1.0) / (tf + norm);
        }
        score
    }
}

impl Scorer for Bm25Scorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, question: &Question, passage: &Passage) -> Result<f64> {
        let q_tokens = self.tokenizer.tokenize(&question.sentence);
        let p_tokens = self.tokenizer.tokenize(&passage.text);
        Ok(self.score_tokens(&q_tokens, &p_tokens))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tokenizer::SimpleTokenizer;
    use proptest::prelude::*;

    fn collection() -> Collection {
        let mut collection = Collection::new("bm25");
        collection.add_question(
            Question::new("1", "rust borrow checker")
                .with_passage(Passage::relevant("the rust borrow checker prevents data races"))
                .with_passage(Passage::irrelevant("the python interpreter is dynamic"))
                .with_passage(Passage::irrelevant("the weather is nice")),
        );
        collection
    }

    fn scorer() -> Bm25Scorer {
        Bm25Scorer::build(
            &collection(),
            SimpleTokenizer::new().shared(),
            Bm25Params::default(),
            IdfFormula::Bm25,
        )
        .unwrap()
    }

    #[test]
    fn test_default_params() {
        let params = Bm25Params::default();
        assert_eq!(params.k1, 1.6);
        assert_eq!(params.b, 0.75);
    }

    #[test]
    fn test_matching_passage_outscores_others() {
        let scorer = scorer();
        let c = collection();
        let q = &c.questions[0];

        let relevant = scorer.score(q, &q.passages[0]).unwrap();
        let python = scorer.score(q, &q.passages[1]).unwrap();
        let weather = scorer.score(q, &q.passages[2]).unwrap();

        assert!(relevant > 0.0);
        assert_eq!(python, 0.0);
        assert_eq!(weather, 0.0);
    }

    #[test]
    fn test_single_term_matches_formula() {
        let scorer = scorer();
        let q = vec!["rust".to_string()];
        let p: Vec<String> = "the rust borrow checker prevents data races"
            .split_whitespace()
            .map(String::from)
            .collect();

        let stats = scorer.stats();
        // 7 + 5 + 4 tokens over 3 passages
        assert!((stats.avg_passage_len() - 16.0 / 3.0).abs() < 1e-12);

        let k1 = 1.6;
        let b = 0.75;
        let norm = k1 * (1.0 - b + b * 7.0 / (16.0 / 3.0));
        let expected = stats.idf("rust") * (k1 + 1.0) / (1.0 + norm);
        assert!((scorer.score_tokens(&q, &p) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_duplicate_question_terms_count_once() {
        let scorer = scorer();
        let p = vec!["rust".to_string(), "code".to_string()];
        let once = scorer.score_tokens(&["rust".to_string()], &p);
        let twice = scorer.score_tokens(&["rust".to_string(), "rust".to_string()], &p);
        assert_eq!(once, twice);
    }

    #[test]
    fn test_higher_tf_scores_higher_with_saturation() {
        let scorer = scorer();
        let q = vec!["rust".to_string()];
        let one_tf: Vec<String> = vec!["rust".to_string(), "x".to_string(), "y".to_string()];
        let two_tf: Vec<String> = vec!["rust".to_string(), "rust".to_string(), "y".to_string()];
        let one = scorer.score_tokens(&q, &one_tf);
        let two = scorer.score_tokens(&q, &two_tf);
        assert!(two > one);
        assert!(two < 2.0 * one);
    }

    #[test]
    fn test_deterministic() {
        let scorer = scorer();
        let c = collection();
        let q = &c.questions[0];
        let a = scorer.score(q, &q.passages[0]).unwrap();
        let b = scorer.score(q, &q.passages[0]).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_empty_collection_does_not_divide_by_zero() {
        let scorer = Bm25Scorer::build(
            &Collection::new("empty"),
            SimpleTokenizer::new().shared(),
            Bm25Params::default(),
            IdfFormula::Bm25,
        )
        .unwrap();
        let score = scorer.score_tokens(&["a".to_string()], &["a".to_string()]);
        assert!(score.is_finite());
        assert_eq!(score, 0.0);
    }

    #[test]
    fn test_invalid_params_are_rejected() {
        let stats = Arc::new(CorpusStats::build(&collection(), &SimpleTokenizer::new()));
        for params in [
            Bm25Params { k1: -1.0, b: 0.75 },
            Bm25Params { k1: f64::INFINITY, b: 0.75 },
            Bm25Params { k1: 1.2, b: 1.5 },
            Bm25Params { k1: 1.2, b: -0.1 },
        ] {
            let result = Bm25Scorer::new(stats.clone(), SimpleTokenizer::new().shared(), params);
            assert!(matches!(result, Err(RankerError::InvalidConfig(_))));
        }
    }

    proptest! {
        #[test]
        fn prop_score_is_finite_and_non_negative(
            q in proptest::collection::vec("[a-e]", 0..6),
            p in proptest::collection::vec("[a-e]", 0..12),
            k1 in 0.0f64..3.0,
            b in 0.0f64..=1.0,
        ) {
            let scorer = Bm25Scorer::build(
                &collection(),
                SimpleTokenizer::new().shared(),
                Bm25Params { k1, b },
                IdfFormula::Bm25,
            )
            .unwrap();

            let score = scorer.score_tokens(&q, &p);
            prop_assert!(score.is_finite());
            prop_assert!(score >= 0.0);
            prop_assert_eq!(score, scorer.score_tokens(&q, &p));
        }
    }
}
