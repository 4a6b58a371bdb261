//! Passage Ranker - rank candidate passages for questions and measure how well
//! the rankings agree with ground-truth relevance labels.
//!
//! # Overview
//!
//! Each question in a [`Collection`] carries candidate passages labelled
//! relevant or not. Several scorers rank those passages independently:
//! 1. An n-gram overlap scorer
//! 2. A BM25 scorer over corpus-wide IDF statistics
//! 3. A composite scorer aggregating the two
//!
//! Every ranked list is then evaluated with precision/recall/F1 at a rank
//! cutoff, Average Precision and Reciprocal Rank, and summarized as MAP/MRR
//! over a reproducible question sample.
//!
//! # Quick Start
//!
//! ```no_run
//! use passage_ranker::{
//!     config::Config,
//!     eval::{Benchmark, BenchmarkConfig, CsvReport, ScorerSet},
//!     persistence::load_collection,
//!     tokenizer::SimpleTokenizer,
//! };
//! use std::path::Path;
//!
//! fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     config.validate()?;
//!
//!     let collection = load_collection(Path::new("questions.json"))?;
//!
//!     let benchmark = Benchmark::new(BenchmarkConfig::from_config(&config));
//!     let scorers = ScorerSet::build(
//!         &collection,
//!         SimpleTokenizer::english().shared(),
//!         benchmark.config(),
//!     )?;
//!
//!     let mut report = CsvReport::create(&config.output_dir, scorers.names())?;
//!     let results = benchmark.run_with(&collection, &scorers.scorers, &mut report)?;
//!     results.print_summary();
//!
//!     Ok(())
//! }
//! ```
//!
//! # Architecture
//!
//! - **Collection**: questions with labelled candidate passages
//! - **Tokenizer**: text normalization and Snowball stemming behind a trait
//! - **CorpusStats**: document frequencies and IDF, built once per collection
//! - **Scorer**: n-gram, BM25 and composite relevance scorers
//! - **rank / evaluate**: stable ranking and retrieval metrics
//! - **Benchmark**: runs all scorers over a question sample

pub mod collection;
pub mod config;
pub mod error;
pub mod eval;
pub mod persistence;
pub mod rank;
pub mod stats;
pub mod tokenizer;

// Re-export commonly used types
pub use collection::{Collection, Passage, Question, create_sample_collection};
pub use config::Config;
pub use error::{RankerError, Result};
pub use eval::{Benchmark, BenchmarkConfig, BenchmarkResults, MeanMetrics, QueryMetrics};
pub use persistence::{load_collection, load_collection_path, save_collection};
pub use rank::{
    Bm25Params, Bm25Scorer, CompositeScorer, NgramScorer, RankedList, Scorer, rank, rank_question,
};
pub use stats::{CorpusStats, IdfFormula};
pub use tokenizer::{SimpleTokenizer, Tokenizer};
