//! Benchmark runner comparing scorers on a question sample.

use super::metrics::{MeanMetrics, QueryMetrics, evaluate};
use super::report::ReportSink;
use crate::collection::Collection;
use crate::config::Config;
use crate::error::{RankerError, Result};
use crate::rank::{
    Aggregation, Bm25Params, Bm25Scorer, CompositeScorer, NgramScorer, Scorer, rank_question,
};
use crate::stats::{CorpusStats, IdfFormula};
use crate::tokenizer::{SharedTokenizer, SimpleTokenizer};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Configuration for the benchmark.
#[derive(Debug, Clone)]
pub struct BenchmarkConfig {
    /// Rank cutoff for the confusion matrix.
    pub cutoff: usize,
    /// Number of questions to sample.
    pub sample_size: usize,
    /// Seed for the question sample.
    pub seed: u64,
    /// Highest n-gram order.
    pub max_ngram: usize,
    /// BM25 parameters.
    pub bm25: Bm25Params,
    /// IDF formula for corpus statistics.
    pub idf: IdfFormula,
    /// Composite aggregation.
    pub aggregation: Aggregation,
    /// Stem tokens with the English Snowball stemmer.
    pub stem: bool,
}

impl Default for BenchmarkConfig {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl BenchmarkConfig {
    /// Take the ranking and evaluation sections of an application config.
    pub fn from_config(config: &Config) -> Self {
        Self {
            cutoff: config.evaluation.cutoff,
            sample_size: config.evaluation.sample_size,
            seed: config.evaluation.seed,
            max_ngram: config.ranking.max_ngram,
            bm25: config.ranking.bm25(),
            idf: config.ranking.idf,
            aggregation: config.ranking.aggregation,
            stem: config.ranking.stem,
        }
    }

    /// Tokenizer matching the `stem` setting.
    pub fn tokenizer(&self) -> SharedTokenizer {
        if self.stem {
            SimpleTokenizer::english().shared()
        } else {
            SimpleTokenizer::new().shared()
        }
    }
}

/// Scorers evaluated in one run, sharing one set of corpus statistics.
pub struct ScorerSet {
    /// Statistics over the whole collection.
    pub stats: Arc<CorpusStats>,
    /// N-gram, BM25 and composite scorers, in report order.
    pub scorers: Vec<Arc<dyn Scorer>>,
}

impl ScorerSet {
    /// Build statistics over `collection` and the standard scorers on top.
    ///
    /// Fails if the BM25 parameters are out of range.
    pub fn build(
        collection: &Collection,
        tokenizer: SharedTokenizer,
        config: &BenchmarkConfig,
    ) -> Result<Self> {
        let stats = Arc::new(CorpusStats::build_with(
            collection,
            tokenizer.as_ref(),
            config.idf,
        ));

        let ngram: Arc<dyn Scorer> =
            Arc::new(NgramScorer::new(tokenizer.clone(), config.max_ngram));
        let bm25: Arc<dyn Scorer> =
            Arc::new(Bm25Scorer::new(stats.clone(), tokenizer, config.bm25)?);
        let composite: Arc<dyn Scorer> = Arc::new(
            CompositeScorer::new()
                .with_aggregation(config.aggregation)
                .with_scorer(ngram.clone())
                .with_scorer(bm25.clone()),
        );

        Ok(Self {
            stats,
            scorers: vec![ngram, bm25, composite],
        })
    }

    /// Scorer names in report order.
    pub fn names(&self) -> Vec<String> {
        self.scorers.iter().map(|s| s.name().to_string()).collect()
    }

    /// Look up a scorer by name.
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Scorer>> {
        self.scorers.iter().find(|s| s.name() == name)
    }
}

/// Metrics of one scorer on one question.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuestionResult {
    /// Question id.
    pub question_id: String,
    /// Metrics of the ranked list.
    pub metrics: QueryMetrics,
}

/// All results of one scorer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScorerResults {
    /// Scorer name.
    pub scorer: String,
    /// MAP and MRR over the sample.
    pub mean: MeanMetrics,
    /// Per-question metrics in evaluation order.
    pub questions: Vec<QuestionResult>,
}

/// Aggregated benchmark results.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BenchmarkResults {
    /// Collection name.
    pub collection_name: String,
    /// Ids of the evaluated questions, ascending.
    pub sampled_questions: Vec<String>,
    /// Rank cutoff used for the confusion matrix.
    pub cutoff: usize,
    /// Results per scorer, in report order.
    pub scorers: Vec<ScorerResults>,
    /// Total benchmark time (seconds).
    pub total_time_secs: f64,
}

impl BenchmarkResults {
    /// Results of one scorer.
    pub fn scorer(&self, name: &str) -> Option<&ScorerResults> {
        self.scorers.iter().find(|s| s.scorer == name)
    }

    /// Print summary to stdout.
    pub fn print_summary(&self) {
        println!("\n========== Ranking Results ==========");
        println!("Collection: {}", self.collection_name);
        println!("Questions:  {}", self.sampled_questions.len());
        println!("Cutoff:     {}", self.cutoff);
        println!("--------------------------------------");
        for scorer in &self.scorers {
            println!(
                "{:<10} MAP {:.4}  MRR {:.4}",
                scorer.scorer, scorer.mean.map, scorer.mean.mrr
            );
        }
        println!("--------------------------------------");
        println!("Total time: {:.2}s", self.total_time_secs);
        println!("======================================\n");
    }
}

/// Benchmark runner.
pub struct Benchmark {
    config: BenchmarkConfig,
    tokenizer: SharedTokenizer,
}

impl Benchmark {
    /// Create a benchmark using the tokenizer selected by `config`.
    pub fn new(config: BenchmarkConfig) -> Self {
        let tokenizer = config.tokenizer();
        Self::with_tokenizer(config, tokenizer)
    }

    /// Create a benchmark with a custom tokenizer.
    pub fn with_tokenizer(config: BenchmarkConfig, tokenizer: SharedTokenizer) -> Self {
        Self { config, tokenizer }
    }

    /// Benchmark settings.
    pub fn config(&self) -> &BenchmarkConfig {
        &self.config
    }

    /// Run the standard scorers over a question sample of `collection`.
    pub fn run(&self, collection: &Collection, sink: &mut dyn ReportSink) -> Result<BenchmarkResults> {
        let scorers = ScorerSet::build(collection, self.tokenizer.clone(), &self.config)?;
        self.run_with(collection, &scorers.scorers, sink)
    }

    /// Run the given scorers over a question sample of `collection`.
    ///
    /// Every sampled question is ranked by every scorer before the next
    /// question starts; one row per (scorer, question) goes to `sink`.
    pub fn run_with(
        &self,
        collection: &Collection,
        scorers: &[Arc<dyn Scorer>],
        sink: &mut dyn ReportSink,
    ) -> Result<BenchmarkResults> {
        let start_time = Instant::now();

        let sample = collection.sample(self.config.sample_size, self.config.seed);
        if sample.is_empty() {
            return Err(RankerError::EmptySample);
        }

        info!(
            collection = %collection.name,
            questions = sample.len(),
            scorers = scorers.len(),
            "running benchmark"
        );

        let mut per_scorer: Vec<Vec<QuestionResult>> = vec![Vec::new(); scorers.len()];

        for &question in &sample {
            debug!(question = %question.id, passages = question.passages.len(), "evaluating question");

            for (scorer, results) in scorers.iter().zip(per_scorer.iter_mut()) {
                let ranked = rank_question(scorer, question)?;
                let metrics = evaluate(&ranked, self.config.cutoff);
                sink.record(scorer.name(), &question.id, &metrics)?;

                results.push(QuestionResult {
                    question_id: question.id.clone(),
                    metrics,
                });
            }
        }

        sink.finish()?;

        let scorer_results = scorers
            .iter()
            .zip(per_scorer)
            .map(|(scorer, questions)| {
                let mean = MeanMetrics::from_queries(questions.iter().map(|q| &q.metrics))?;
                info!(scorer = scorer.name(), map = mean.map, mrr = mean.mrr, "scorer finished");
                Ok(ScorerResults {
                    scorer: scorer.name().to_string(),
                    mean,
                    questions,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(BenchmarkResults {
            collection_name: collection.name.clone(),
            sampled_questions: sample.iter().map(|q| q.id.clone()).collect(),
            cutoff: self.config.cutoff,
            scorers: scorer_results,
            total_time_secs: start_time.elapsed().as_secs_f64(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::{Passage, Question, create_sample_collection};
    use crate::eval::report::{CsvReport, ReportRow};
    use crate::rank::test_support::FixedScorer;
    use crate::tokenizer::Tokenizer;
    use tempfile::TempDir;

    #[test]
    fn test_benchmark_config_default() {
        let config = BenchmarkConfig::default();
        assert_eq!(config.cutoff, 2);
        assert_eq!(config.sample_size, 10);
        assert_eq!(config.max_ngram, 3);
        assert_eq!(config.aggregation, Aggregation::Mean);
        assert!(config.stem);
    }

    #[test]
    fn test_scorer_set_names() {
        let collection = create_sample_collection();
        let set = ScorerSet::build(
            &collection,
            SimpleTokenizer::new().shared(),
            &BenchmarkConfig::default(),
        )
        .unwrap();

        assert_eq!(set.names(), vec!["ngram", "bm25", "composite"]);
        assert_eq!(set.stats.passage_count(), collection.passage_count());
        assert!(set.get("bm25").is_some());
        assert!(set.get("other").is_none());
    }

    #[test]
    fn test_scorer_set_rejects_invalid_bm25_params() {
        let mut config = BenchmarkConfig::default();
        config.bm25.k1 = -1.0;
        let result = ScorerSet::build(&create_sample_collection(), config.tokenizer(), &config);
        assert!(matches!(result, Err(RankerError::InvalidConfig(_))));
    }

    #[test]
    fn test_default_tokenizer_stems() {
        let mut config = BenchmarkConfig::default();
        assert_eq!(
            config.tokenizer().tokenize("loved"),
            config.tokenizer().tokenize("loves")
        );

        config.stem = false;
        assert_ne!(
            config.tokenizer().tokenize("loved"),
            config.tokenizer().tokenize("loves")
        );
    }

    #[test]
    fn test_run_on_sample_collection() {
        let collection = create_sample_collection();
        let benchmark = Benchmark::new(BenchmarkConfig::default());
        let mut rows: Vec<ReportRow> = Vec::new();

        let results = benchmark.run(&collection, &mut rows).unwrap();

        assert_eq!(results.sampled_questions, vec!["1", "2", "3", "4"]);
        assert_eq!(results.scorers.len(), 3);
        assert_eq!(rows.len(), 3 * 4);

        // Rows arrive question by question, every scorer per question.
        assert_eq!(rows[0].question_id, "1");
        assert_eq!(rows[1].question_id, "1");
        assert_eq!(rows[2].question_id, "1");
        assert_eq!(rows[3].question_id, "2");

        for scorer in &results.scorers {
            assert_eq!(scorer.mean.questions, 4);
            assert!((0.0..=1.0).contains(&scorer.mean.map));
            assert!((0.0..=1.0).contains(&scorer.mean.mrr));
        }
    }

    #[test]
    fn test_map_mrr_are_means_and_reproducible() {
        let collection = create_sample_collection();
        let benchmark = Benchmark::new(BenchmarkConfig::default());

        let first = benchmark.run(&collection, &mut Vec::<ReportRow>::new()).unwrap();
        let second = benchmark.run(&collection, &mut Vec::<ReportRow>::new()).unwrap();

        for (a, b) in first.scorers.iter().zip(&second.scorers) {
            assert_eq!(a.mean, b.mean);

            let n = a.questions.len() as f64;
            let map: f64 = a.questions.iter().map(|q| q.metrics.average_precision).sum::<f64>() / n;
            let mrr: f64 = a.questions.iter().map(|q| q.metrics.reciprocal_rank).sum::<f64>() / n;
            assert!((a.mean.map - map).abs() < 1e-12);
            assert!((a.mean.mrr - mrr).abs() < 1e-12);
        }
    }

    #[test]
    fn test_run_with_fixed_scorers() {
        let mut collection = Collection::new("fixed");
        collection.add_question(
            Question::new("b", "q")
                .with_passage(Passage::irrelevant("x"))
                .with_passage(Passage::relevant("y")),
        );
        collection.add_question(
            Question::new("a", "q")
                .with_passage(Passage::relevant("x"))
                .with_passage(Passage::irrelevant("z")),
        );

        let prefers_y: Arc<dyn Scorer> =
            Arc::new(FixedScorer::new("prefers_y", &[("y", 1.0), ("x", 0.5)]));
        let benchmark = Benchmark::new(BenchmarkConfig::default());
        let mut rows: Vec<ReportRow> = Vec::new();

        let results = benchmark
            .run_with(&collection, &[prefers_y], &mut rows)
            .unwrap();

        let scorer = results.scorer("prefers_y").unwrap();
        // question "a": x ranked first and relevant; question "b": y ranked first and relevant
        assert_eq!(scorer.questions[0].question_id, "a");
        assert_eq!(scorer.mean.map, 1.0);
        assert_eq!(scorer.mean.mrr, 1.0);
    }

    #[test]
    fn test_empty_collection_fails() {
        let benchmark = Benchmark::new(BenchmarkConfig::default());
        let result = benchmark.run(&Collection::new("empty"), &mut Vec::<ReportRow>::new());
        assert!(matches!(result, Err(RankerError::EmptySample)));
    }

    #[test]
    fn test_run_writes_csv_tables() {
        let dir = TempDir::new().unwrap();
        let collection = create_sample_collection();
        let benchmark = Benchmark::new(BenchmarkConfig::default());
        let set = ScorerSet::build(&collection, benchmark.config().tokenizer(), benchmark.config())
            .unwrap();

        let mut report = CsvReport::create(dir.path(), set.names()).unwrap();
        benchmark
            .run_with(&collection, &set.scorers, &mut report)
            .unwrap();
        drop(report);

        for name in ["ngram", "bm25", "composite"] {
            let content =
                std::fs::read_to_string(dir.path().join(CsvReport::file_name(name))).unwrap();
            assert_eq!(content.lines().count(), 1 + collection.len());
        }
    }
}
