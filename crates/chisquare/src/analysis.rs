//! Stateless entry points that run the whole pipeline.

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::contingency::{build_contingency_with, ContingencyTable, MissingPolicy};
use crate::engine::{compute_chi_square, ChiSquareOutcome, Significance};
use crate::error::Result;
use crate::input::{Dataset, Parser, ParserConfig, SourceMetadata};
use crate::report::ResultRecord;

/// Configuration for a test run.
#[derive(Debug, Clone, Default)]
pub struct AnalysisConfig {
    /// Parser configuration for file and byte input.
    pub parser: ParserConfig,
    /// Treatment of missing cells in the selected columns.
    pub missing: MissingPolicy,
}

impl AnalysisConfig {
    pub fn with_missing_policy(mut self, policy: MissingPolicy) -> Self {
        self.missing = policy;
        self
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.parser.delimiter = Some(delimiter);
        self
    }
}

/// Everything a presentation layer needs from one run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndependenceReport {
    /// Metadata of the source file, when the data came from one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceMetadata>,
    pub contingency: ContingencyTable,
    pub outcome: ChiSquareOutcome,
    /// Two-row record for display and export.
    pub record: ResultRecord,
    pub significance: Significance,
    /// Interpretation sentence for the verdict.
    pub interpretation: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl IndependenceReport {
    fn new(contingency: ContingencyTable, outcome: ChiSquareOutcome) -> Self {
        let significance = outcome.significance();
        Self {
            source: None,
            record: ResultRecord::from_result(&outcome.result),
            interpretation: significance.interpretation().to_string(),
            warning: outcome.validity_warning().map(str::to_string),
            significance,
            contingency,
            outcome,
        }
    }

    /// Result record as downloadable CSV bytes.
    pub fn export_csv(&self) -> Result<Vec<u8>> {
        self.record.to_csv()
    }
}

/// Runs the test of independence with a fixed configuration.
pub struct IndependenceTest {
    config: AnalysisConfig,
    parser: Parser,
}

impl IndependenceTest {
    pub fn new() -> Self {
        Self::with_config(AnalysisConfig::default())
    }

    pub fn with_config(config: AnalysisConfig) -> Self {
        let parser = Parser::with_config(config.parser.clone());
        Self { config, parser }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Test `col1` against `col2` in an in-memory dataset.
    pub fn run(&self, dataset: &Dataset, col1: &str, col2: &str) -> Result<IndependenceReport> {
        dataset.ensure_testable()?;

        let contingency = build_contingency_with(dataset, col1, col2, self.config.missing)?;
        let outcome = compute_chi_square(&contingency)?;

        debug!(
            col1,
            col2,
            verdict = %outcome.significance(),
            "test of independence complete"
        );

        Ok(IndependenceReport::new(contingency, outcome))
    }

    /// Parse delimited bytes and run the test.
    pub fn run_bytes(&self, bytes: &[u8], col1: &str, col2: &str) -> Result<IndependenceReport> {
        let dataset = self.parser.parse_bytes(bytes)?;
        self.run(&dataset, col1, col2)
    }

    /// Read a CSV/TSV file and run the test.
    pub fn run_file(
        &self,
        path: impl AsRef<Path>,
        col1: &str,
        col2: &str,
    ) -> Result<IndependenceReport> {
        let (dataset, source) = self.parser.parse_file(path)?;
        let mut report = self.run(&dataset, col1, col2)?;
        report.source = Some(source);
        Ok(report)
    }

    /// Parse delimited bytes with this runner's parser settings.
    pub fn parse_bytes(&self, bytes: &[u8]) -> Result<Dataset> {
        self.parser.parse_bytes(bytes)
    }

    /// Read a file with this runner's parser settings.
    pub fn parse_file(&self, path: impl AsRef<Path>) -> Result<(Dataset, SourceMetadata)> {
        self.parser.parse_file(path)
    }
}

impl Default for IndependenceTest {
    fn default() -> Self {
        Self::new()
    }
}

/// Test `col1` against `col2` with the default configuration.
pub fn compute_independence_test(
    dataset: &Dataset,
    col1: &str,
    col2: &str,
) -> Result<IndependenceReport> {
    IndependenceTest::new().run(dataset, col1, col2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChiSquareError;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_test_file(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_run_file() {
        let file = create_test_file("Gender,Result\nM,Pass\nF,Pass\nM,Fail\nF,Fail\n");

        let report = IndependenceTest::new()
            .run_file(file.path(), "Gender", "Result")
            .unwrap();

        let source = report.source.as_ref().unwrap();
        assert_eq!(source.row_count, 4);
        assert_eq!(source.format, "csv");
        assert_eq!(report.significance, Significance::NotSignificant);
        assert_eq!(report.outcome.result.valid_case_count, 4);
        assert!(report.warning.is_some());
    }

    #[test]
    fn test_single_column_rejected() {
        let ds = Dataset::from_columns(vec![("only", vec!["a", "b"])]).unwrap();
        let err = compute_independence_test(&ds, "only", "other").unwrap_err();
        assert!(matches!(err, ChiSquareError::TooFewColumns { found: 1 }));
    }

    #[test]
    fn test_missing_policy_config() {
        let bytes = b"a,b\nx,1\ny,2\nNA,1\nx,2\n";

        let excluded = IndependenceTest::new().run_bytes(bytes, "a", "b").unwrap();
        assert_eq!(excluded.outcome.result.valid_case_count, 3);
        assert_eq!(excluded.contingency.excluded_rows(), 1);

        let kept = IndependenceTest::with_config(
            AnalysisConfig::default().with_missing_policy(MissingPolicy::AsCategory),
        )
        .run_bytes(bytes, "a", "b")
        .unwrap();
        assert_eq!(kept.outcome.result.valid_case_count, 4);
        assert_eq!(kept.contingency.n_rows(), 3);
    }

    #[test]
    fn test_report_serializes_to_json() {
        let ds = Dataset::from_columns(vec![
            ("g", vec!["a", "b", "a", "b"]),
            ("h", vec!["x", "x", "y", "y"]),
        ])
        .unwrap();
        let report = compute_independence_test(&ds, "g", "h").unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["significance"], "not_significant");
        assert_eq!(json["outcome"]["result"]["degrees_of_freedom"], 1);
        assert!(json.get("source").is_none());
    }
}
