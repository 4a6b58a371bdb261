//! Corpus-wide term statistics.
//!
//! [`CorpusStats`] is computed once per collection and shared read-only by the
//! scorers of a run. Rebuilding it mid-run would make MAP/MRR incomparable
//! across questions.

use crate::collection::{Collection, Passage};
use crate::tokenizer::Tokenizer;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Lower bound applied by [`IdfFormula::Floored`].
pub const IDF_FLOOR: f64 = 0.01;

/// Inverse document frequency formula.
///
/// `n` is the number of passages, `df` the number containing the term.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdfFormula {
    /// Robertson/Sparck Jones with +1 inside the log: `ln(1 + (n - df + 0.5) / (df + 0.5))`.
    #[default]
    Bm25,
    /// `ln(1 + n / df)`.
    Smoothed,
    /// `max(ln(n / df), IDF_FLOOR)`.
    Floored,
}

impl IdfFormula {
    /// Weight for a term seen in `df` of `n` passages. Zero when `df == 0`.
    pub fn weight(self, n: usize, df: usize) -> f64 {
        if df == 0 || n == 0 {
            return 0.0;
        }
        let n = n as f64;
        let df = df as f64;
        match self {
            IdfFormula::Bm25 => (1.0 + (n - df + 0.5) / (df + 0.5)).ln(),
            IdfFormula::Smoothed => (1.0 + n / df).ln(),
            IdfFormula::Floored => (n / df).ln().max(IDF_FLOOR),
        }
    }
}

/// Document frequencies, IDF weights and length statistics of a collection.
#[derive(Debug, Clone)]
pub struct CorpusStats {
    passage_count: usize,
    total_tokens: usize,
    avg_passage_len: f64,
    doc_freq: HashMap<String, usize>,
    idf: HashMap<String, f64>,
    formula: IdfFormula,
}

impl CorpusStats {
    /// Build statistics over every passage of `collection` with the default IDF.
    pub fn build(collection: &Collection, tokenizer: &dyn Tokenizer) -> Self {
        Self::from_passages(collection.passages(), tokenizer, IdfFormula::default())
    }

    /// Build statistics over every passage of `collection` with a chosen IDF.
    pub fn build_with(
        collection: &Collection,
        tokenizer: &dyn Tokenizer,
        formula: IdfFormula,
    ) -> Self {
        Self::from_passages(collection.passages(), tokenizer, formula)
    }

    /// Build statistics over an arbitrary passage set.
    pub fn from_passages<'a, I>(passages: I, tokenizer: &dyn Tokenizer, formula: IdfFormula) -> Self
    where
        I: IntoIterator<Item = &'a Passage>,
    {
        let mut passage_count = 0;
        let mut total_tokens = 0;
        let mut doc_freq: HashMap<String, usize> = HashMap::new();

        for passage in passages {
            let tokens = tokenizer.tokenize(&passage.text);
            passage_count += 1;
            total_tokens += tokens.len();

            let distinct: HashSet<String> = tokens.into_iter().collect();
            for term in distinct {
                *doc_freq.entry(term).or_insert(0) += 1;
            }
        }

        let idf = doc_freq
            .iter()
            .map(|(term, &df)| (term.clone(), formula.weight(passage_count, df)))
            .collect();

        let avg_passage_len = if passage_count > 0 {
            total_tokens as f64 / passage_count as f64
        } else {
            0.0
        };

        Self {
            passage_count,
            total_tokens,
            avg_passage_len,
            doc_freq,
            idf,
            formula,
        }
    }

    /// Number of passages the statistics were computed over.
    pub fn passage_count(&self) -> usize {
        self.passage_count
    }

    /// Total number of tokens across all passages.
    pub fn total_tokens(&self) -> usize {
        self.total_tokens
    }

    /// Mean passage length in tokens (0 for an empty collection).
    pub fn avg_passage_len(&self) -> f64 {
        self.avg_passage_len
    }

    /// Number of distinct terms.
    pub fn vocabulary_size(&self) -> usize {
        self.doc_freq.len()
    }

    /// Number of passages containing `term`.
    pub fn doc_freq(&self, term: &str) -> usize {
        self.doc_freq.get(term).copied().unwrap_or(0)
    }

    /// IDF weight of `term`; 0 for unseen terms.
    pub fn idf(&self, term: &str) -> f64 {
        self.idf.get(term).copied().unwrap_or(0.0)
    }

    /// Formula the IDF table was computed with.
    pub fn formula(&self) -> IdfFormula {
        self.formula
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Question;
    use crate::tokenizer::SimpleTokenizer;

    fn collection() -> Collection {
        let mut collection = Collection::new("stats");
        collection.add_question(
            Question::new("1", "q")
                .with_passage(Passage::relevant("the cat sat"))
                .with_passage(Passage::irrelevant("the dog dog ran")),
        );
        collection.add_question(
            Question::new("2", "q").with_passage(Passage::irrelevant("the bird")),
        );
        collection
    }

    #[test]
    fn test_document_frequency_counts_each_passage_once() {
        let stats = CorpusStats::build(&collection(), &SimpleTokenizer::new());

        assert_eq!(stats.passage_count(), 3);
        assert_eq!(stats.doc_freq("the"), 3);
        assert_eq!(stats.doc_freq("dog"), 1);
        assert_eq!(stats.doc_freq("fish"), 0);
        assert_eq!(stats.total_tokens(), 9);
        assert!((stats.avg_passage_len() - 3.0).abs() < 1e-12);
        assert_eq!(stats.vocabulary_size(), 6);
    }

    #[test]
    fn test_rare_terms_outweigh_common_terms() {
        let stats = CorpusStats::build(&collection(), &SimpleTokenizer::new());

        assert!(stats.idf("cat") > stats.idf("the"));
        assert!(stats.idf("the") > 0.0);
        assert_eq!(stats.idf("fish"), 0.0);
    }

    #[test]
    fn test_formulas_never_negative() {
        for formula in [IdfFormula::Bm25, IdfFormula::Smoothed, IdfFormula::Floored] {
            for df in 1..=10 {
                let w = formula.weight(10, df);
                assert!(w > 0.0, "{:?} df={} gave {}", formula, df, w);
                assert!(w.is_finite());
            }
            assert_eq!(formula.weight(10, 0), 0.0);
        }
        assert_eq!(IdfFormula::Floored.weight(10, 10), IDF_FLOOR);
    }

    #[test]
    fn test_bm25_idf_value() {
        // ln(1 + (4 - 1 + 0.5) / 1.5)
        let expected = (1.0_f64 + 3.5 / 1.5).ln();
        assert!((IdfFormula::Bm25.weight(4, 1) - expected).abs() < 1e-12);
    }

    #[test]
    fn test_empty_collection() {
        let stats = CorpusStats::build(&Collection::new("empty"), &SimpleTokenizer::new());
        assert_eq!(stats.passage_count(), 0);
        assert_eq!(stats.avg_passage_len(), 0.0);
    }

    #[test]
    fn test_build_with_formula() {
        let stats =
            CorpusStats::build_with(&collection(), &SimpleTokenizer::new(), IdfFormula::Smoothed);
        assert_eq!(stats.formula(), IdfFormula::Smoothed);
        assert!((stats.idf("cat") - (1.0_f64 + 3.0).ln()).abs() < 1e-12);
    }
}
