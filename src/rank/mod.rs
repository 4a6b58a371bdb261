//! Passage scoring and ranking.
//!
//! A [`Scorer`] computes a relevance score for a (question, passage) pair.
//! [`rank`] applies one scorer to a question's passages and returns a
//! [`RankedList`] that owns the scores, so several scorers can rank the same
//! passages without interfering with each other.

mod bm25;
mod composite;
mod ngram;

pub use bm25::{Bm25Params, Bm25Scorer};
pub use composite::{Aggregation, CompositeScorer};
pub use ngram::{DEFAULT_MAX_NGRAM, NgramScorer, ngram_overlap};

use crate::collection::{Passage, Question};
use crate::error::Result;
use serde::Serialize;
use std::sync::Arc;

/// Computes a real-valued relevance score for a passage given a question.
pub trait Scorer: Send + Sync {
    /// Short name used in reports and output file names.
    fn name(&self) -> &str;

    /// Score `passage` against `question`. Higher is more relevant.
    fn score(&self, question: &Question, passage: &Passage) -> Result<f64>;
}

impl<S: Scorer + ?Sized> Scorer for Arc<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn score(&self, question: &Question, passage: &Passage) -> Result<f64> {
        (**self).score(question, passage)
    }
}

/// One passage in a ranked list.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RankedPassage<'a> {
    /// The ranked passage, borrowed from its question.
    pub passage: &'a Passage,
    /// Score assigned by the ranking scorer.
    pub score: f64,
    /// Index of the passage in the input order.
    pub position: usize,
}

/// Passages of one question ordered by one scorer, best first.
#[derive(Debug, Clone, Serialize)]
pub struct RankedList<'a> {
    /// Name of the scorer that produced the ranking.
    pub scorer: String,
    /// Entries sorted by descending score.
    pub entries: Vec<RankedPassage<'a>>,
}

impl<'a> RankedList<'a> {
    /// Number of ranked passages.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the list is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Ground-truth labels in rank order.
    pub fn labels(&self) -> impl Iterator<Item = bool> + '_ {
        self.entries.iter().map(|e| e.passage.label)
    }

    /// Scores in rank order.
    pub fn scores(&self) -> Vec<f64> {
        self.entries.iter().map(|e| e.score).collect()
    }

    /// The `k` best entries.
    pub fn top(&self, k: usize) -> &[RankedPassage<'a>] {
        &self.entries[..k.min(self.entries.len())]
    }
}

/// Rank `passages` for `question` by descending score.
///
/// The sort is stable: passages with equal scores keep their input order.
pub fn rank<'a, S>(scorer: &S, question: &Question, passages: &'a [Passage]) -> Result<RankedList<'a>>
where
    S: Scorer + ?Sized,
{
    let mut entries = passages
        .iter()
        .enumerate()
        .map(|(position, passage)| {
            Ok(RankedPassage {
                passage,
                score: scorer.score(question, passage)?,
                position,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    entries.sort_by(|a, b| b.score.total_cmp(&a.score));

    Ok(RankedList {
        scorer: scorer.name().to_string(),
        entries,
    })
}

/// Rank a question's own passages.
pub fn rank_question<'a, S>(scorer: &S, question: &'a Question) -> Result<RankedList<'a>>
where
    S: Scorer + ?Sized,
{
    rank(scorer, question, &question.passages)
}


#[cfg(test)]
mod tests {
    use super::test_support::FixedScorer;
    use super::*;

    fn question() -> Question {
        Question::new("1", "q")
            .with_passage(Passage::irrelevant("a"))
            .with_passage(Passage::relevant("b"))
            .with_passage(Passage::relevant("c"))
    }

    #[test]
    fn test_rank_sorts_descending() {
        let scorer = FixedScorer::new("fixed", &[("a", 0.1), ("b", 0.7), ("c", 0.4)]);
        let q = question();
        let ranked = rank_question(&scorer, &q).unwrap();

        let texts: Vec<&str> = ranked.entries.iter().map(|e| e.passage.text.as_str()).collect();
        assert_eq!(texts, vec!["b", "c", "a"]);
        assert_eq!(ranked.scores(), vec![0.7, 0.4, 0.1]);
        assert_eq!(ranked.scorer, "fixed");
        assert_eq!(ranked.labels().collect::<Vec<_>>(), vec![true, true, false]);
    }

    #[test]
    fn test_rank_is_stable_for_ties() {
        let scorer = FixedScorer::new("fixed", &[("a", 0.5), ("b", 0.9), ("c", 0.5)]);
        let q = question();
        let ranked = rank_question(&scorer, &q).unwrap();

        let positions: Vec<usize> = ranked.entries.iter().map(|e| e.position).collect();
        assert_eq!(positions, vec![1, 0, 2]);
    }

    #[test]
    fn test_two_scorers_do_not_share_scores() {
        let q = question();
        let first = FixedScorer::new("first", &[("a", 1.0)]);
        let second = FixedScorer::new("second", &[("c", 1.0)]);

        let ranked_first = rank_question(&first, &q).unwrap();
        let ranked_second = rank_question(&second, &q).unwrap();

        assert_eq!(ranked_first.entries[0].passage.text, "a");
        assert_eq!(ranked_first.entries[0].score, 1.0);
        assert_eq!(ranked_second.entries[0].passage.text, "c");
        assert_eq!(ranked_second.entries[0].score, 1.0);
    }

    #[test]
    fn test_rank_empty_and_top() {
        let scorer = FixedScorer::new("fixed", &[]);
        let empty = Question::new("e", "q");
        assert!(rank_question(&scorer, &empty).unwrap().is_empty());

        let q = question();
        let ranked = rank_question(&scorer, &q).unwrap();
        assert_eq!(ranked.top(2).len(), 2);
        assert_eq!(ranked.top(10).len(), 3);
    }
}
