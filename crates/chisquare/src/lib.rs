//! chisquare: Chi-Square test of independence for tabular data.
//!
//! Give it a dataset and two categorical columns and it returns the
//! contingency table, the Pearson Chi-Square statistic with its p-value and
//! degrees of freedom, the expected frequencies, a significance verdict and a
//! warning when expected frequencies are too small for the test to be
//! trusted.
//!
//! # Example
//!
//! ```
//! use chisquare::{compute_independence_test, Dataset, Significance};
//!
//! let dataset = Dataset::from_columns(vec![
//!     ("Gender", vec!["M", "F", "M", "F"]),
//!     ("Result", vec!["Pass", "Pass", "Fail", "Fail"]),
//! ])
//! .unwrap();
//!
//! let report = compute_independence_test(&dataset, "Gender", "Result").unwrap();
//! assert_eq!(report.outcome.result.statistic, 0.0);
//! assert_eq!(report.significance, Significance::NotSignificant);
//! ```

pub mod contingency;
pub mod engine;
pub mod error;
pub mod input;
pub mod report;

mod analysis;

pub use crate::analysis::{
    compute_independence_test, AnalysisConfig, IndependenceReport, IndependenceTest,
};
pub use contingency::{build_contingency, build_contingency_with, ContingencyTable, MissingPolicy};
pub use engine::{
    chi_square_sf, compute_chi_square, ChiSquareOutcome, ExpectedFrequencies, Significance,
    TestResult, LOW_EXPECTED_WARNING, SIGNIFICANCE_LEVEL,
};
pub use error::{Axis, ChiSquareError, Result};
pub use input::{Dataset, Parser, ParserConfig, SourceMetadata};
pub use report::{ParsedRecord, ReportRow, ResultRecord, EXPORT_FILE_NAME, EXPORT_MIME_TYPE};
