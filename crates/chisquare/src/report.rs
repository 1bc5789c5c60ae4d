//! Flat result record and its CSV export.
//!
//! The record has two rows. "Pearson Chi-Square" carries the rounded
//! statistic, the degrees of freedom and the rounded p-value. "No. of Valid
//! Cases" carries only the case count. The CSV has a header row and no index
//! column.

use serde::{Deserialize, Serialize};

use crate::engine::TestResult;
use crate::error::{ChiSquareError, Result};

/// File name offered for the downloadable result record.
pub const EXPORT_FILE_NAME: &str = "chi_square_results.csv";

/// MIME type of the result record.
pub const EXPORT_MIME_TYPE: &str = "text/csv";

pub const PEARSON_ROW: &str = "Pearson Chi-Square";
pub const VALID_CASES_ROW: &str = "No. of Valid Cases";

/// One line of the result record. Empty strings are blank cells.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    #[serde(rename = "Particulars")]
    pub particulars: String,
    #[serde(rename = "Value")]
    pub value: String,
    #[serde(rename = "df")]
    pub df: String,
    #[serde(rename = "Asymptotic Significance (2-sided)")]
    pub significance: String,
}

/// The two-row result record shown to users and exported as CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub rows: Vec<ReportRow>,
}

/// Values recovered from an exported record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParsedRecord {
    pub statistic: f64,
    pub degrees_of_freedom: usize,
    pub p_value: f64,
    pub valid_case_count: u64,
}

impl ResultRecord {
    pub fn from_result(result: &TestResult) -> Self {
        Self {
            rows: vec![
                ReportRow {
                    particulars: PEARSON_ROW.to_string(),
                    value: format_decimal(result.rounded_statistic()),
                    df: result.degrees_of_freedom.to_string(),
                    significance: format_decimal(result.rounded_p_value()),
                },
                ReportRow {
                    particulars: VALID_CASES_ROW.to_string(),
                    value: result.valid_case_count.to_string(),
                    df: String::new(),
                    significance: String::new(),
                },
            ],
        }
    }

    /// UTF-8 CSV bytes with a header row.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for row in &self.rows {
            writer.serialize(row)?;
        }
        writer.into_inner().map_err(|e| ChiSquareError::Io {
            path: EXPORT_FILE_NAME.into(),
            source: e.into_error(),
        })
    }

    /// Read back a record written by [`ResultRecord::to_csv`].
    pub fn from_csv(bytes: &[u8]) -> Result<ParsedRecord> {
        let mut reader = csv::Reader::from_reader(bytes);
        let rows: Vec<ReportRow> = reader
            .deserialize()
            .collect::<std::result::Result<_, csv::Error>>()?;

        let pearson = find_row(&rows, PEARSON_ROW)?;
        let cases = find_row(&rows, VALID_CASES_ROW)?;

        Ok(ParsedRecord {
            statistic: parse_cell(pearson, 1, &pearson.value)?,
            degrees_of_freedom: parse_cell(pearson, 2, &pearson.df)?,
            p_value: parse_cell(pearson, 3, &pearson.significance)?,
            valid_case_count: parse_cell(cases, 1, &cases.value)?,
        })
    }
}

/// Whole numbers keep one decimal place (`1.0`), others print as-is.
pub fn format_decimal(value: f64) -> String {
    if value.fract() == 0.0 && value.is_finite() {
        format!("{:.1}", value)
    } else {
        value.to_string()
    }
}

fn find_row<'a>(rows: &'a [ReportRow], particulars: &str) -> Result<&'a ReportRow> {
    rows.iter()
        .find(|r| r.particulars == particulars)
        .ok_or_else(|| ChiSquareError::Parse {
            row: 0,
            column: 0,
            message: format!("missing '{}' row", particulars),
        })
}

fn parse_cell<T: std::str::FromStr>(row: &ReportRow, column: usize, cell: &str) -> Result<T> {
    cell.trim().parse().map_err(|_| ChiSquareError::Parse {
        row: if row.particulars == PEARSON_ROW { 1 } else { 2 },
        column,
        message: format!("cannot parse '{}' in '{}' row", cell, row.particulars),
    })
}
