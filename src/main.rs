//! Passage Ranker CLI
//!
//! Ranks candidate passages per question with several scorers and reports
//! retrieval metrics against ground-truth labels.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use passage_ranker::{
    collection::{Collection, create_sample_collection},
    config::Config,
    eval::{Benchmark, BenchmarkConfig, CsvReport, ScorerSet, evaluate},
    persistence::{collection_size, load_collection_path, save_collection},
    rank::{Aggregation, rank_question},
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Passage Ranker - rank passages and evaluate rankings against labels
#[derive(Parser)]
#[command(name = "passage-ranker")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Highest n-gram order for the n-gram scorer
    #[arg(long, global = true)]
    max_ngram: Option<usize>,

    /// BM25 term frequency saturation
    #[arg(long, global = true)]
    k1: Option<f64>,

    /// BM25 length normalization
    #[arg(long, global = true)]
    b: Option<f64>,

    /// Composite aggregation (mean, max, min)
    #[arg(long, global = true)]
    aggregation: Option<Aggregation>,

    /// Compare surface forms instead of English stems
    #[arg(long, global = true)]
    no_stem: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate all scorers on a question sample
    Evaluate {
        /// Collection file or directory (uses the built-in sample if omitted)
        collection: Option<PathBuf>,

        /// Directory for the per-scorer CSV tables
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// Rank cutoff for precision/recall/F1
        #[arg(long)]
        cutoff: Option<usize>,

        /// Number of questions to sample
        #[arg(long)]
        sample_size: Option<usize>,

        /// Seed for the question sample
        #[arg(long)]
        seed: Option<u64>,

        /// Save full results to a JSON file
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Show how every scorer ranks the passages of one question
    Rank {
        /// Collection file or directory
        collection: PathBuf,

        /// Question id
        question_id: String,

        /// Number of passages to show per scorer
        #[arg(short = 'k', long, default_value_t = 5)]
        top_k: usize,
    },

    /// Show information about a collection
    Info {
        /// Collection file or directory
        collection: PathBuf,
    },

    /// Convert a collection between JSON and bincode (by file extension)
    Convert {
        /// Input collection file or directory
        input: PathBuf,

        /// Output collection file
        output: PathBuf,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "passage_ranker=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let mut config = load_config(&cli)?;

    match cli.command {
        Commands::Evaluate {
            collection,
            output_dir,
            cutoff,
            sample_size,
            seed,
            json,
        } => {
            if let Some(dir) = output_dir {
                config.output_dir = dir;
            }
            if let Some(cutoff) = cutoff {
                config.evaluation.cutoff = cutoff;
            }
            if let Some(size) = sample_size {
                config.evaluation.sample_size = size;
            }
            if let Some(seed) = seed {
                config.evaluation.seed = seed;
            }
            cmd_evaluate(config, collection, json)
        }
        Commands::Rank {
            collection,
            question_id,
            top_k,
        } => cmd_rank(config, collection, question_id, top_k),
        Commands::Info { collection } => cmd_info(config, collection),
        Commands::Convert { input, output } => cmd_convert(input, output),
    }
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = Config::load_from_file(path)
                .with_context(|| format!("Failed to load configuration from {}", path.display()))?;
            config.apply_overrides(|key| std::env::var(key).ok());
            config
        }
        None => Config::load().context("Failed to load configuration")?,
    };

    if let Some(max_ngram) = cli.max_ngram {
        config.ranking.max_ngram = max_ngram;
    }
    if let Some(k1) = cli.k1 {
        config.ranking.k1 = k1;
    }
    if let Some(b) = cli.b {
        config.ranking.b = b;
    }
    if let Some(aggregation) = cli.aggregation {
        config.ranking.aggregation = aggregation;
    }
    if cli.no_stem {
        config.ranking.stem = false;
    }

    Ok(config)
}

fn load_input(path: Option<&PathBuf>) -> Result<Collection> {
    match path {
        Some(path) => load_collection_path(path)
            .with_context(|| format!("Failed to load collection from {}", path.display())),
        None => {
            println!("Using built-in sample collection...");
            Ok(create_sample_collection())
        }
    }
}

fn cmd_evaluate(config: Config, collection_path: Option<PathBuf>, json: Option<PathBuf>) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let collection = load_input(collection_path.as_ref())?;
    println!(
        "Collection: {} ({} questions, {} passages)",
        collection.name,
        collection.len(),
        collection.passage_count()
    );

    let benchmark = Benchmark::new(BenchmarkConfig::from_config(&config));
    let scorers = ScorerSet::build(&collection, benchmark.config().tokenizer(), benchmark.config())
        .context("Failed to build scorers")?;

    let mut report = CsvReport::create(&config.output_dir, scorers.names())
        .context("Failed to open report tables")?;

    let results = benchmark
        .run_with(&collection, &scorers.scorers, &mut report)
        .context("Evaluation failed")?;

    results.print_summary();
    println!("Report tables written to: {}", config.output_dir.display());

    if let Some(json_path) = json {
        let content = serde_json::to_string_pretty(&results)?;
        std::fs::write(&json_path, content)
            .with_context(|| format!("Failed to write {}", json_path.display()))?;
        println!("Results saved to {}", json_path.display());
    }

    Ok(())
}

fn cmd_rank(config: Config, collection_path: PathBuf, question_id: String, top_k: usize) -> Result<()> {
    config.validate().context("Invalid configuration")?;

    let collection = load_input(Some(&collection_path))?;
    let question = collection
        .question(&question_id)
        .with_context(|| format!("Cannot rank passages in {}", collection_path.display()))?;

    let benchmark_config = BenchmarkConfig::from_config(&config);
    let scorers = ScorerSet::build(&collection, benchmark_config.tokenizer(), &benchmark_config)
        .context("Failed to build scorers")?;

    println!("Question {}: {}", question.id, question.sentence);

    for scorer in &scorers.scorers {
        let ranked = rank_question(scorer, question)
            .with_context(|| format!("Scorer '{}' failed", scorer.name()))?;
        let metrics = evaluate(&ranked, benchmark_config.cutoff);

        println!();
        println!(
            "{} (AP {:.3}, RR {:.3}, F1@{} {:.3})",
            ranked.scorer,
            metrics.average_precision,
            metrics.reciprocal_rank,
            benchmark_config.cutoff,
            metrics.f1
        );
        println!("{}", "─".repeat(60));

        for (i, entry) in ranked.top(top_k).iter().enumerate() {
            let marker = if entry.passage.label { "+" } else { " " };
            let preview: String = entry.passage.text.chars().take(70).collect();
            println!("{:>2}. [{}] {:>8.4}  {}", i + 1, marker, entry.score, preview);
        }
    }

    Ok(())
}

fn cmd_info(config: Config, collection_path: PathBuf) -> Result<()> {
    let collection = load_input(Some(&collection_path))?;
    let tokenizer = BenchmarkConfig::from_config(&config).tokenizer();
    let stats = passage_ranker::stats::CorpusStats::build(&collection, tokenizer.as_ref());
    let relevant: usize = collection.questions.iter().map(|q| q.relevant_count()).sum();

    println!("Collection Information");
    println!("{}", "─".repeat(40));
    println!("  Name:              {}", collection.name);
    println!("  Questions:         {}", collection.len());
    println!("  Passages:          {}", collection.passage_count());
    println!("  Relevant passages: {}", relevant);
    println!("  Vocabulary:        {}", stats.vocabulary_size());
    println!("  Avg passage len:   {:.1} tokens", stats.avg_passage_len());
    println!("  Stemming:          {}", if config.ranking.stem { "english" } else { "off" });
    if collection_path.is_file() {
        let size = collection_size(&collection_path)?;
        println!("  File size:         {:.1} KB", size as f64 / 1024.0);
    }
    println!("  Path:              {}", collection_path.display());

    Ok(())
}

fn cmd_convert(input: PathBuf, output: PathBuf) -> Result<()> {
    let collection = load_input(Some(&input))?;
    save_collection(&collection, &output)
        .with_context(|| format!("Failed to save collection to {}", output.display()))?;

    println!(
        "Converted {} ({} questions) to {}",
        collection.name,
        collection.len(),
        output.display()
    );
    Ok(())
}
