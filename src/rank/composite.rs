//! Score aggregation over several scorers.

use super::Scorer;
use crate::collection::{Passage, Question};
use crate::error::{RankerError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// How constituent scores are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Aggregation {
    /// Unweighted arithmetic mean.
    #[default]
    Mean,
    /// Highest constituent score.
    Max,
    /// Lowest constituent score.
    Min,
}

impl Aggregation {
    /// Combine a non-empty slice of scores.
    fn combine(self, scores: &[f64]) -> f64 {
        match self {
            Aggregation::Mean => scores.iter().sum::<f64>() / scores.len() as f64,
            Aggregation::Max => scores.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            Aggregation::Min => scores.iter().copied().fold(f64::INFINITY, f64::min),
        }
    }
}

impl FromStr for Aggregation {
    type Err = RankerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mean" | "avg" | "average" => Ok(Aggregation::Mean),
            "max" => Ok(Aggregation::Max),
            "min" => Ok(Aggregation::Min),
            other => Err(RankerError::InvalidConfig(format!(
                "unknown aggregation '{}', expected mean, max or min",
                other
            ))),
        }
    }
}

impl fmt::Display for Aggregation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Aggregation::Mean => "mean",
            Aggregation::Max => "max",
            Aggregation::Min => "min",
        };
        f.write_str(s)
    }
}

/// Scores a passage with every constituent and aggregates the results.
pub struct CompositeScorer {
    name: String,
    scorers: Vec<Arc<dyn Scorer>>,
    aggregation: Aggregation,
}

impl CompositeScorer {
    /// Create an empty composite using the mean.
    pub fn new() -> Self {
        Self {
            name: "composite".to_string(),
            scorers: Vec::new(),
            aggregation: Aggregation::default(),
        }
    }

    /// Override the report name.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Use a different aggregation.
    pub fn with_aggregation(mut self, aggregation: Aggregation) -> Self {
        self.aggregation = aggregation;
        self
    }

    /// Append a constituent scorer.
    pub fn add(&mut self, scorer: Arc<dyn Scorer>) {
        self.scorers.push(scorer);
    }

    /// Builder-style [`add`](Self::add).
    pub fn with_scorer(mut self, scorer: Arc<dyn Scorer>) -> Self {
        self.add(scorer);
        self
    }

    /// Number of constituents.
    pub fn len(&self) -> usize {
        self.scorers.len()
    }

    /// Check if there are no constituents.
    pub fn is_empty(&self) -> bool {
        self.scorers.is_empty()
    }

    /// Combination function in use.
    pub fn aggregation(&self) -> Aggregation {
        self.aggregation
    }

    /// Aggregate already computed constituent scores.
    pub fn aggregate(&self, scores: &[f64]) -> Result<f64> {
        if scores.is_empty() {
            return Err(RankerError::NoScorers(self.name.clone()));
        }
        Ok(self.aggregation.combine(scores))
    }
}

impl Default for CompositeScorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer for CompositeScorer {
    fn name(&self) -> &str {
        &self.name
    }

    fn score(&self, question: &Question, passage: &Passage) -> Result<f64> {
        let scores = self
            .scorers
            .iter()
            .map(|s| s.score(question, passage))
            .collect::<Result<Vec<_>>>()?;
        self.aggregate(&scores)
    }
}
