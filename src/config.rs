//! Configuration for ranking and evaluation runs.
//!
//! Supports both environment variables and YAML config file.
//! Environment variables take precedence over config file values.

use crate::error::{RankerError, Result};
use crate::eval::metrics::DEFAULT_CUTOFF;
use crate::rank::{Aggregation, Bm25Params};
use crate::stats::IdfFormula;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Scorer settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingConfig {
    /// Highest n-gram order for the n-gram scorer.
    #[serde(default = "default_max_ngram")]
    pub max_ngram: usize,

    /// BM25 term frequency saturation.
    #[serde(default = "default_k1")]
    pub k1: f64,

    /// BM25 length normalization.
    #[serde(default = "default_b")]
    pub b: f64,

    /// IDF formula used by corpus statistics.
    #[serde(default)]
    pub idf: IdfFormula,

    /// How the composite scorer combines its constituents.
    #[serde(default)]
    pub aggregation: Aggregation,

    /// Reduce tokens to their English Snowball stems.
    #[serde(default = "default_stem")]
    pub stem: bool,
}

fn default_max_ngram() -> usize {
    crate::rank::DEFAULT_MAX_NGRAM
}

fn default_k1() -> f64 {
    Bm25Params::default().k1
}

fn default_b() -> f64 {
    Bm25Params::default().b
}

fn default_stem() -> bool {
    true
}

impl RankingConfig {
    /// BM25 parameters.
    pub fn bm25(&self) -> Bm25Params {
        Bm25Params {
            k1: self.k1,
            b: self.b,
        }
    }
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_ngram: default_max_ngram(),
            k1: default_k1(),
            b: default_b(),
            idf: IdfFormula::default(),
            aggregation: Aggregation::default(),
            stem: default_stem(),
        }
    }
}

/// Evaluation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationConfig {
    /// Rank positions above this cutoff count as predicted relevant.
    #[serde(default = "default_cutoff")]
    pub cutoff: usize,

    /// Number of questions sampled per run.
    #[serde(default = "default_sample_size")]
    pub sample_size: usize,

    /// Seed for the question sample.
    #[serde(default = "default_seed")]
    pub seed: u64,
}

fn default_cutoff() -> usize {
    DEFAULT_CUTOFF
}

fn default_sample_size() -> usize {
    10
}

fn default_seed() -> u64 {
    42
}

impl Default for EvaluationConfig {
    fn default() -> Self {
        Self {
            cutoff: default_cutoff(),
            sample_size: default_sample_size(),
            seed: default_seed(),
        }
    }
}

/// Full application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory receiving the per-scorer report tables.
    pub output_dir: PathBuf,
    /// Scorer settings.
    pub ranking: RankingConfig,
    /// Evaluation settings.
    pub evaluation: EvaluationConfig,
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            ranking: RankingConfig::default(),
            evaluation: EvaluationConfig::default(),
        }
    }
}

/// Configuration file structure (YAML format).
#[derive(Debug, Deserialize)]
struct ConfigFile {
    output_dir: Option<PathBuf>,
    ranking: Option<RankingConfig>,
    evaluation: Option<EvaluationConfig>,
}

impl Config {
    /// Load configuration from environment variables and optional config file.
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (RANKER_OUTPUT_DIR, RANKER_CUTOFF, ...)
    /// 2. Config file (~/.config/passage-ranker/config.yaml)
    /// 3. Default values
    pub fn load() -> Result<Self> {
        let mut config = Config::default();

        if let Some(config_path) = Self::config_file_path() {
            if config_path.exists() {
                config = Self::load_from_file(&config_path)?;
            }
        }

        config.apply_overrides(|key| env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file path.
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RankerError::io(path, e))?;
        Self::from_yaml(&content)
    }

    /// Parse a YAML document; missing sections keep their defaults.
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file_config: ConfigFile = serde_yaml::from_str(content)
            .map_err(|e| RankerError::Config(format!("Failed to parse config file: {}", e)))?;

        let mut config = Config::default();
        if let Some(output_dir) = file_config.output_dir {
            config.output_dir = output_dir;
        }
        if let Some(ranking) = file_config.ranking {
            config.ranking = ranking;
        }
        if let Some(evaluation) = file_config.evaluation {
            config.evaluation = evaluation;
        }
        Ok(config)
    }

    /// Apply `RANKER_*` overrides read through `var`.
    ///
    /// Values that do not parse are ignored with a warning.
    pub fn apply_overrides<F>(&mut self, var: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(dir) = var("RANKER_OUTPUT_DIR") {
            self.output_dir = PathBuf::from(dir);
        }
        override_parsed(&var, "RANKER_CUTOFF", &mut self.evaluation.cutoff);
        override_parsed(&var, "RANKER_SAMPLE_SIZE", &mut self.evaluation.sample_size);
        override_parsed(&var, "RANKER_SEED", &mut self.evaluation.seed);
        override_parsed(&var, "RANKER_MAX_NGRAM", &mut self.ranking.max_ngram);
        override_parsed(&var, "RANKER_BM25_K1", &mut self.ranking.k1);
        override_parsed(&var, "RANKER_BM25_B", &mut self.ranking.b);
        override_parsed(&var, "RANKER_AGGREGATION", &mut self.ranking.aggregation);
        override_parsed(&var, "RANKER_STEM", &mut self.ranking.stem);
    }

    /// Get the default config file path.
    pub fn config_file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "passage-ranker")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Validate parameter ranges.
    pub fn validate(&self) -> Result<()> {
        if self.ranking.max_ngram == 0 {
            return Err(RankerError::InvalidConfig(
                "max_ngram must be at least 1".to_string(),
            ));
        }

        self.ranking.bm25().validate()?;

        if self.evaluation.sample_size == 0 {
            return Err(RankerError::InvalidConfig(
                "sample_size must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn override_parsed<F, T>(var: &F, key: &str, target: &mut T)
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    if let Some(raw) = var(key) {
        match raw.trim().parse() {
            Ok(value) => *target = value,
            Err(_) => warn!(key, value = %raw, "ignoring unparsable override"),
        }
    }
}
