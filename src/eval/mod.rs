//! Evaluation of rankings against ground-truth labels.
//!
//! This module provides:
//! - Per-question metrics (confusion counts, precision/recall/F1, AP, RR)
//! - MAP/MRR aggregation over a question sample
//! - Report sinks writing one CSV table per scorer
//! - A benchmark runner driving scorers over a collection

pub mod benchmark;
pub mod metrics;
pub mod report;

pub use benchmark::{Benchmark, BenchmarkConfig, BenchmarkResults, ScorerResults, ScorerSet};
pub use metrics::{Confusion, MeanMetrics, QueryMetrics, evaluate, evaluate_labels};
pub use report::{CsvReport, ReportRow, ReportSink};
