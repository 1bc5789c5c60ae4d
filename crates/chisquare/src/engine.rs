//! Pearson Chi-Square test of independence on a contingency table.
//!
//! The statistic is the plain Pearson sum over all cells. No continuity
//! correction is applied, including for 2x2 tables.

use serde::{Deserialize, Serialize};
use statrs::distribution::{ChiSquared, ContinuousCDF};
use tracing::{debug, warn};

use crate::contingency::ContingencyTable;
use crate::error::{Axis, ChiSquareError, Result};

/// Fixed significance level of the test.
pub const SIGNIFICANCE_LEVEL: f64 = 0.05;

/// Expected cell frequency below which the asymptotic test may be invalid.
pub const MIN_EXPECTED_FREQUENCY: f64 = 5.0;

/// Decimal places used for displayed statistics.
pub const DISPLAY_DECIMALS: i32 = 3;

/// Warning attached to results with sparse expected frequencies.
pub const LOW_EXPECTED_WARNING: &str =
    "Some expected frequencies are less than 5. Chi-Square test may not be valid.";

/// Statistic, p-value and sample size of one test run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TestResult {
    /// Pearson Chi-Square statistic, unrounded.
    pub statistic: f64,
    /// Upper-tail probability at `statistic`, unrounded.
    pub p_value: f64,
    /// `(rows - 1) * (cols - 1)`.
    pub degrees_of_freedom: usize,
    /// Number of rows tabulated (the table's grand total).
    pub valid_case_count: u64,
}

impl TestResult {
    pub fn rounded_statistic(&self) -> f64 {
        round_to(self.statistic, DISPLAY_DECIMALS)
    }

    pub fn rounded_p_value(&self) -> f64 {
        round_to(self.p_value, DISPLAY_DECIMALS)
    }

    /// Verdict at the fixed 0.05 level, taken from the unrounded p-value.
    pub fn significance(&self) -> Significance {
        Significance::from_p_value(self.p_value)
    }
}

/// Outcome of comparing the p-value with [`SIGNIFICANCE_LEVEL`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Significance {
    /// p < 0.05: reject the null hypothesis of independence.
    Significant,
    /// p ≥ 0.05: fail to reject the null hypothesis.
    NotSignificant,
}

impl Significance {
    pub fn from_p_value(p_value: f64) -> Self {
        if p_value < SIGNIFICANCE_LEVEL {
            Significance::Significant
        } else {
            Significance::NotSignificant
        }
    }

    pub fn is_significant(&self) -> bool {
        matches!(self, Significance::Significant)
    }

    /// Short label: "Significant" or "Not Significant".
    pub fn label(&self) -> &'static str {
        match self {
            Significance::Significant => "Significant",
            Significance::NotSignificant => "Not Significant",
        }
    }

    /// Label with the hypothesis decision spelled out.
    pub fn interpretation(&self) -> &'static str {
        match self {
            Significance::Significant => "Significant (Reject Null Hypothesis)",
            Significance::NotSignificant => "Not Significant (Fail to Reject Null Hypothesis)",
        }
    }
}

impl std::fmt::Display for Significance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Frequencies expected under independence, aligned with the observed table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpectedFrequencies {
    row_labels: Vec<String>,
    column_labels: Vec<String>,
    values: Vec<Vec<f64>>,
}

impl ExpectedFrequencies {
    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    /// Expected values, row-major, in the observed table's label order.
    pub fn values(&self) -> &[Vec<f64>] {
        &self.values
    }

    pub fn get(&self, row_label: &str, column_label: &str) -> Option<f64> {
        let r = self.row_labels.iter().position(|l| l == row_label)?;
        let c = self.column_labels.iter().position(|l| l == column_label)?;
        Some(self.values[r][c])
    }

    pub fn total(&self) -> f64 {
        self.values.iter().flatten().sum()
    }

    pub fn min(&self) -> f64 {
        self.values
            .iter()
            .flatten()
            .copied()
            .fold(f64::INFINITY, f64::min)
    }

    /// Number of cells strictly below `threshold`.
    pub fn count_below(&self, threshold: f64) -> usize {
        self.values
            .iter()
            .flatten()
            .filter(|&&v| v < threshold)
            .count()
    }
}

/// Everything one run of the engine produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChiSquareOutcome {
    pub result: TestResult,
    pub expected: ExpectedFrequencies,
    /// Cells whose expected frequency is below [`MIN_EXPECTED_FREQUENCY`].
    pub low_expected_cells: usize,
}

impl ChiSquareOutcome {
    pub fn has_low_expected_frequencies(&self) -> bool {
        self.low_expected_cells > 0
    }

    pub fn significance(&self) -> Significance {
        self.result.significance()
    }

    /// The sample-size caveat, if it applies.
    pub fn validity_warning(&self) -> Option<&'static str> {
        self.has_low_expected_frequencies()
            .then_some(LOW_EXPECTED_WARNING)
    }
}

/// Run the Pearson Chi-Square test of independence on `table`.
pub fn compute_chi_square(table: &ContingencyTable) -> Result<ChiSquareOutcome> {
    if table.n_rows() < 2 {
        return Err(ChiSquareError::InsufficientCategories {
            variable: table.row_variable().to_string(),
            found: table.n_rows(),
        });
    }
    if table.n_cols() < 2 {
        return Err(ChiSquareError::InsufficientCategories {
            variable: table.column_variable().to_string(),
            found: table.n_cols(),
        });
    }

    let row_totals = table.row_totals();
    let col_totals = table.column_totals();

    if let Some(i) = row_totals.iter().position(|&t| t == 0) {
        return Err(ChiSquareError::DegenerateMarginal {
            axis: Axis::Row,
            label: table.row_labels()[i].clone(),
        });
    }
    if let Some(j) = col_totals.iter().position(|&t| t == 0) {
        return Err(ChiSquareError::DegenerateMarginal {
            axis: Axis::Column,
            label: table.column_labels()[j].clone(),
        });
    }

    let n = table.grand_total();
    let total = n as f64;

    let mut expected = Vec::with_capacity(table.n_rows());
    let mut statistic = 0.0;
    for (observed_row, &r) in table.counts().iter().zip(&row_totals) {
        let mut expected_row = Vec::with_capacity(table.n_cols());
        for (&o, &c) in observed_row.iter().zip(&col_totals) {
            let e = r as f64 * c as f64 / total;
            let d = o as f64 - e;
            statistic += d * d / e;
            expected_row.push(e);
        }
        expected.push(expected_row);
    }

    let degrees_of_freedom = (table.n_rows() - 1) * (table.n_cols() - 1);
    let p_value = chi_square_sf(statistic, degrees_of_freedom)?;

    let expected = ExpectedFrequencies {
        row_labels: table.row_labels().to_vec(),
        column_labels: table.column_labels().to_vec(),
        values: expected,
    };
    let low_expected_cells = expected.count_below(MIN_EXPECTED_FREQUENCY);

    debug!(statistic, p_value, degrees_of_freedom, n, "computed Pearson Chi-Square");
    if low_expected_cells > 0 {
        warn!(
            low_expected_cells,
            min_expected = expected.min(),
            "expected frequencies below {}",
            MIN_EXPECTED_FREQUENCY
        );
    }

    Ok(ChiSquareOutcome {
        result: TestResult {
            statistic,
            p_value,
            degrees_of_freedom,
            valid_case_count: n,
        },
        expected,
        low_expected_cells,
    })
}

/// Upper-tail probability of the Chi-Square distribution with `df` degrees
/// of freedom, evaluated at `statistic`.
pub fn chi_square_sf(statistic: f64, df: usize) -> Result<f64> {
    if df == 0 {
        return Err(ChiSquareError::Distribution(
            "degrees of freedom must be at least 1".to_string(),
        ));
    }
    if statistic <= 0.0 {
        return Ok(1.0);
    }
    let dist = ChiSquared::new(df as f64)
        .map_err(|e| ChiSquareError::Distribution(e.to_string()))?;
    Ok(dist.sf(statistic).clamp(0.0, 1.0))
}

/// Round half to even at `decimals` places.
pub fn round_to(value: f64, decimals: i32) -> f64 {
    let scale = 10f64.powi(decimals);
    (value * scale).round_ties_even() / scale
}
