//! Question/passage collection model.
//!
//! A collection is a set of questions, each carrying the candidate passages
//! that should be ranked for it together with a ground-truth relevance label.
//! Passages hold no score: scorers return their scores in a
//! [`RankedList`](crate::rank::RankedList) instead of writing them back.

use crate::error::{RankerError, Result};
use bincode::{Decode, Encode};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};

/// A candidate passage with its ground-truth relevance label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Passage {
    /// Raw passage text.
    pub text: String,
    /// Whether the passage answers its question.
    pub label: bool,
}

impl Passage {
    /// Create a new passage.
    pub fn new(text: impl Into<String>, label: bool) -> Self {
        Self {
            text: text.into(),
            label,
        }
    }

    /// Shorthand for a relevant passage.
    pub fn relevant(text: impl Into<String>) -> Self {
        Self::new(text, true)
    }

    /// Shorthand for a non-relevant passage.
    pub fn irrelevant(text: impl Into<String>) -> Self {
        Self::new(text, false)
    }
}

/// A question and the passages to rank for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Question {
    /// Identifier; questions are evaluated in ascending id order.
    pub id: String,
    /// The natural-language question.
    pub sentence: String,
    /// Candidate passages in their original order.
    #[serde(default)]
    pub passages: Vec<Passage>,
}

impl Question {
    /// Create a question without passages.
    pub fn new(id: impl Into<String>, sentence: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sentence: sentence.into(),
            passages: Vec::new(),
        }
    }

    /// Builder-style passage addition.
    pub fn with_passage(mut self, passage: Passage) -> Self {
        self.passages.push(passage);
        self
    }

    /// Number of passages labelled relevant.
    pub fn relevant_count(&self) -> usize {
        self.passages.iter().filter(|p| p.label).count()
    }
}

/// An in-memory collection of questions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Encode, Decode)]
pub struct Collection {
    /// Collection name.
    pub name: String,
    /// Questions in load order.
    #[serde(default)]
    pub questions: Vec<Question>,
}

impl Collection {
    /// Create a new empty collection.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            questions: Vec::new(),
        }
    }

    /// Add a question to the collection.
    pub fn add_question(&mut self, question: Question) {
        self.questions.push(question);
    }

    /// Number of questions.
    pub fn len(&self) -> usize {
        self.questions.len()
    }

    /// Check if the collection has no questions.
    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// Every passage reachable from every question.
    pub fn passages(&self) -> impl Iterator<Item = &Passage> {
        self.questions.iter().flat_map(|q| q.passages.iter())
    }

    /// Total passage count.
    pub fn passage_count(&self) -> usize {
        self.questions.iter().map(|q| q.passages.len()).sum()
    }

    /// Look up a question by id.
    pub fn question(&self, id: &str) -> Result<&Question> {
        self.questions
            .iter()
            .find(|q| q.id == id)
            .ok_or_else(|| RankerError::QuestionNotFound(id.to_string()))
    }

    /// Append all questions of another collection.
    pub fn merge(&mut self, other: Collection) {
        self.questions.extend(other.questions);
    }

    /// Draw a reproducible random subset of at most `size` questions.
    ///
    /// The same `seed` always selects the same questions. The returned sample
    /// is sorted by question id so metrics are computed in a stable order.
    pub fn sample(&self, size: usize, seed: u64) -> Vec<&Question> {
        let mut sample: Vec<&Question> = if size >= self.questions.len() {
            self.questions.iter().collect()
        } else {
            let mut rng = StdRng::seed_from_u64(seed);
            rand::seq::index::sample(&mut rng, self.questions.len(), size)
                .into_iter()
                .map(|idx| &self.questions[idx])
                .collect()
        };

        sample.sort_by(|a, b| a.id.cmp(&b.id));
        sample
    }
}

/// Create a small built-in collection for trying the ranker out.
pub fn create_sample_collection() -> Collection {
    let mut collection = Collection::new("sample");

    collection.add_question(
        Question::new("1", "John loves Mary.")
            .with_passage(Passage::relevant("John loves Mary with all his heart."))
            .with_passage(Passage::irrelevant("Mary doesn't love John."))
            .with_passage(Passage::relevant("Mary is loved by John, who loves her dearly."))
            .with_passage(Passage::irrelevant("John and Mary met at a coffee shop.")),
    );

    collection.add_question(
        Question::new("2", "Who designed the Rust programming language?")
            .with_passage(Passage::irrelevant(
                "Rust is a systems programming language focused on safety and speed.",
            ))
            .with_passage(Passage::relevant(
                "Rust was originally designed by Graydon Hoare at Mozilla Research.",
            ))
            .with_passage(Passage::irrelevant(
                "The first stable release of Rust was announced in May 2015.",
            )),
    );

    collection.add_question(
        Question::new("3", "When was Python first released?")
            .with_passage(Passage::irrelevant(
                "Python is a high-level language known for its clear syntax.",
            ))
            .with_passage(Passage::relevant(
                "Created by Guido van Rossum, Python was first released in 1991.",
            ))
            .with_passage(Passage::irrelevant(
                "The Python Package Index hosts thousands of third-party packages.",
            ))
            .with_passage(Passage::irrelevant(
                "Python is widely used in data science and web development.",
            )),
    );

    collection.add_question(
        Question::new("4", "What does supervised learning use to train models?")
            .with_passage(Passage::irrelevant(
                "Machine learning lets systems learn from data.",
            ))
            .with_passage(Passage::irrelevant(
                "Unsupervised learning finds patterns in unlabeled data.",
            ))
            .with_passage(Passage::relevant(
                "Supervised learning uses labeled data to train models.",
            )),
    );

    collection
}
