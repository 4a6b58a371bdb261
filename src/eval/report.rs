//! Per-question report output.
//!
//! [`CsvReport`] writes one error-analysis table per scorer. All files are
//! opened up front; if any of them cannot be created the ones already opened
//! are closed when the partially built report is dropped.

use super::metrics::QueryMetrics;
use crate::error::{RankerError, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

/// Header row of every error-analysis table.
pub const REPORT_HEADER: [&str; 7] = ["question_id", "tp", "fn", "fp", "precision", "recall", "f1"];

/// Receives one row per (scorer, question) pair.
pub trait ReportSink {
    /// Record the metrics of `scorer` for `question_id`.
    fn record(&mut self, scorer: &str, question_id: &str, metrics: &QueryMetrics) -> Result<()>;

    /// Flush buffered output. Called once after the last row.
    fn finish(&mut self) -> Result<()> {
        Ok(())
    }
}

/// A recorded report row.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    pub scorer: String,
    pub question_id: String,
    pub metrics: QueryMetrics,
}

impl ReportSink for Vec<ReportRow> {
    fn record(&mut self, scorer: &str, question_id: &str, metrics: &QueryMetrics) -> Result<()> {
        self.push(ReportRow {
            scorer: scorer.to_string(),
            question_id: question_id.to_string(),
            metrics: *metrics,
        });
        Ok(())
    }
}

/// Format a row the way it appears in the CSV table.
pub fn format_row(question_id: &str, metrics: &QueryMetrics) -> [String; 7] {
    let c = &metrics.confusion;
    [
        question_id.to_string(),
        c.true_positives.to_string(),
        c.false_negatives.to_string(),
        c.false_positives.to_string(),
        format!("{:.3}", metrics.precision),
        format!("{:.3}", metrics.recall),
        format!("{:.3}", metrics.f1),
    ]
}

struct ScorerTable {
    scorer: String,
    path: PathBuf,
    writer: csv::Writer<File>,
}

/// CSV tables in an output directory, one per scorer.
pub struct CsvReport {
    dir: PathBuf,
    tables: Vec<ScorerTable>,
}

impl CsvReport {
    /// File name used for a scorer's table.
    pub fn file_name(scorer: &str) -> String {
        format!("{}_error_analysis.csv", scorer)
    }

    /// Create `dir` if needed and open a table with a header row per scorer.
    ///
    /// Scorer names must be unique; a repeated name is rejected before any
    /// file is touched.
    pub fn create<I, S>(dir: &Path, scorers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut names: Vec<String> = Vec::new();
        for scorer in scorers {
            let scorer = scorer.as_ref();
            if names.iter().any(|n| n == scorer) {
                return Err(RankerError::Report(format!(
                    "duplicate scorer name '{}'",
                    scorer
                )));
            }
            names.push(scorer.to_string());
        }

        fs::create_dir_all(dir).map_err(|e| {
            error!(path = %dir.display(), "output directory could not be created");
            RankerError::io(dir, e)
        })?;

        let mut tables = Vec::new();
        for scorer in names {
            let path = dir.join(Self::file_name(&scorer));
            let file = File::create(&path).map_err(|e| {
                error!(path = %path.display(), "output file could not be written");
                RankerError::io(&path, e)
            })?;

            let mut writer = WriterBuilder::new().from_writer(file);
            writer.write_record(REPORT_HEADER)?;
            debug!(scorer = %scorer, path = %path.display(), "opened report table");

            tables.push(ScorerTable {
                scorer,
                path,
                writer,
            });
        }

        Ok(Self {
            dir: dir.to_path_buf(),
            tables,
        })
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Paths of the open tables in scorer order.
    pub fn paths(&self) -> Vec<&Path> {
        self.tables.iter().map(|t| t.path.as_path()).collect()
    }
}

impl ReportSink for CsvReport {
    fn record(&mut self, scorer: &str, question_id: &str, metrics: &QueryMetrics) -> Result<()> {
        let table = self
            .tables
            .iter_mut()
            .find(|t| t.scorer == scorer)
            .ok_or_else(|| RankerError::Report(format!("no report table for scorer '{}'", scorer)))?;
        table.writer.write_record(format_row(question_id, metrics))?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        for table in &mut self.tables {
            table
                .writer
                .flush()
                .map_err(|e| RankerError::io(&table.path, e))?;
        }
        Ok(())
    }
}
