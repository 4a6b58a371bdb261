//! Retrieval quality metrics for ranked, labelled passage lists.
//!
//! Per-question metrics come from a single walk over the labels in rank order:
//! confusion counts at a rank cutoff (everything ranked above the cutoff is
//! predicted relevant), precision/recall/F1 derived from them, Average
//! Precision and Reciprocal Rank. [`MeanMetrics`] averages AP and RR over a
//! question sample into MAP and MRR.

use crate::error::{RankerError, Result};
use crate::rank::RankedList;
use serde::{Deserialize, Serialize};

/// Default rank cutoff for the confusion matrix.
pub const DEFAULT_CUTOFF: usize = 2;

/// Confusion matrix counts at one cutoff.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confusion {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
}

impl Confusion {
    /// tp / (tp + fp), or 0 when nothing was predicted relevant.
    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    /// tp / (tp + fn), or 0 when there is nothing relevant.
    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_negatives)
    }

    /// Total number of classified items.
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.false_negatives + self.true_negatives
    }
}

/// Metrics for one ranked list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct QueryMetrics {
    pub confusion: Confusion,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub average_precision: f64,
    pub reciprocal_rank: f64,
}

/// Evaluate a ranked list at `cutoff`.
pub fn evaluate(ranked: &RankedList<'_>, cutoff: usize) -> QueryMetrics {
    evaluate_labels(ranked.labels(), cutoff)
}

/// Evaluate ground-truth labels given in rank order.
pub fn evaluate_labels<I>(labels: I, cutoff: usize) -> QueryMetrics
where
    I: IntoIterator<Item = bool>,
{
    let mut confusion = Confusion::default();
    let mut relevant_seen = 0usize;
    let mut precision_sum = 0.0;
    let mut reciprocal_rank = 0.0;

    for (j, relevant) in labels.into_iter().enumerate() {
        let rank = (j + 1) as f64;
        if relevant {
            relevant_seen += 1;
            precision_sum += relevant_seen as f64 / rank;
            if relevant_seen == 1 {
                reciprocal_rank = 1.0 / rank;
            }
        }

        match (j < cutoff, relevant) {
            (true, true) => confusion.true_positives += 1,
            (true, false) => confusion.false_positives += 1,
            (false, true) => confusion.false_negatives += 1,
            (false, false) => confusion.true_negatives += 1,
        }
    }

    let precision = confusion.precision();
    let recall = confusion.recall();
    let f1 = if precision + recall > 0.0 {
        2.0 * precision * recall / (precision + recall)
    } else {
        0.0
    };
    let average_precision = if relevant_seen > 0 {
        precision_sum / relevant_seen as f64
    } else {
        0.0
    };

    QueryMetrics {
        confusion,
        precision,
        recall,
        f1,
        average_precision,
        reciprocal_rank,
    }
}

/// MAP and MRR over a question sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeanMetrics {
    /// Mean Average Precision.
    pub map: f64,
    /// Mean Reciprocal Rank.
    pub mrr: f64,
    /// Number of questions averaged.
    pub questions: usize,
}

impl MeanMetrics {
    /// Average per-question AP and RR. Fails on an empty sample.
    pub fn from_queries<'a, I>(queries: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a QueryMetrics>,
    {
        let mut ap_sum = 0.0;
        let mut rr_sum = 0.0;
        let mut count = 0usize;

        for q in queries {
            ap_sum += q.average_precision;
            rr_sum += q.reciprocal_rank;
            count += 1;
        }

        if count == 0 {
            return Err(RankerError::EmptySample);
        }

        Ok(Self {
            map: ap_sum / count as f64,
            mrr: rr_sum / count as f64,
            questions: count,
        })
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}
