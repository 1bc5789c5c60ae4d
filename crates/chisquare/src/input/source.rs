//! Dataset abstraction and source metadata.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{ChiSquareError, Result};

/// Cell values treated as missing. Matched exactly: no trimming, case-sensitive.
const MISSING_MARKERS: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND",
    "1.#QNAN", "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// Metadata about the source data file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceMetadata {
    /// File name without path.
    pub file: String,
    /// Full path to the file.
    pub path: PathBuf,
    /// SHA-256 hash of the file contents.
    pub hash: String,
    /// File size in bytes.
    pub size_bytes: u64,
    /// Detected format (csv, tsv, etc.).
    pub format: String,
    /// Number of data rows (excluding header).
    pub row_count: usize,
    /// Number of columns.
    pub column_count: usize,
    /// When the file was read.
    pub read_at: DateTime<Utc>,
}

impl SourceMetadata {
    /// Create metadata for a file that has been read.
    pub fn new(
        path: PathBuf,
        hash: String,
        size_bytes: u64,
        format: String,
        row_count: usize,
        column_count: usize,
    ) -> Self {
        let file = path
            .file_name()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();

        Self {
            file,
            path,
            hash,
            size_bytes,
            format,
            row_count,
            column_count,
            read_at: Utc::now(),
        }
    }
}

/// Rectangular tabular data: named columns of textual cell values.
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Column headers.
    pub headers: Vec<String>,
    /// Row data as strings (row-major order).
    pub rows: Vec<Vec<String>>,
    /// The delimiter the data was read with.
    pub delimiter: u8,
}

impl Dataset {
    /// Create a dataset from headers and rows.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>, delimiter: u8) -> Self {
        Self {
            headers,
            rows,
            delimiter,
        }
    }

    /// Build a dataset from named columns of equal length.
    pub fn from_columns<N, V>(columns: Vec<(N, Vec<V>)>) -> Result<Self>
    where
        N: Into<String>,
        V: Into<String>,
    {
        let mut headers = Vec::with_capacity(columns.len());
        let mut values: Vec<Vec<String>> = Vec::with_capacity(columns.len());
        for (name, column) in columns {
            headers.push(name.into());
            values.push(column.into_iter().map(Into::into).collect());
        }

        let row_count = values.first().map(Vec::len).unwrap_or(0);
        if let Some((idx, column)) = values
            .iter()
            .enumerate()
            .find(|(_, c)| c.len() != row_count)
        {
            return Err(ChiSquareError::ShapeMismatch(format!(
                "column '{}' has {} values, expected {}",
                headers[idx],
                column.len(),
                row_count
            )));
        }

        let rows = (0..row_count)
            .map(|r| values.iter().map(|c| c[r].clone()).collect())
            .collect();

        Ok(Self::new(headers, rows, b','))
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.headers.len()
    }

    /// Get the number of rows (excluding header).
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a column by name.
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Get all values for a column by index.
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .map(move |row| row.get(index).map(|s| s.as_str()).unwrap_or(""))
    }

    /// Get a column by name.
    pub fn column_by_name(&self, name: &str) -> Option<Vec<&str>> {
        let index = self.column_index(name)?;
        Some(self.column_values(index).collect())
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, col: usize) -> Option<&str> {
        self.rows.get(row).and_then(|r| r.get(col).map(|s| s.as_str()))
    }

    /// Number of distinct non-missing values in a column.
    pub fn distinct_count(&self, index: usize) -> usize {
        let mut seen: Vec<&str> = self
            .column_values(index)
            .filter(|v| !Self::is_null_value(v))
            .collect();
        seen.sort_unstable();
        seen.dedup();
        seen.len()
    }

    /// Column names a second selection can be drawn from once `first` is taken.
    pub fn partner_columns(&self, first: &str) -> Vec<&str> {
        self.headers
            .iter()
            .map(|h| h.as_str())
            .filter(|h| *h != first)
            .collect()
    }

    /// Check the shape preconditions of a test: at least one row and two columns.
    pub fn ensure_testable(&self) -> Result<()> {
        if self.column_count() < 2 {
            return Err(ChiSquareError::TooFewColumns {
                found: self.column_count(),
            });
        }
        if self.row_count() == 0 {
            return Err(ChiSquareError::EmptyDataset(
                "No data rows found".to_string(),
            ));
        }
        Ok(())
    }

    /// Check if a value is one of the missing markers.
    pub fn is_null_value(value: &str) -> bool {
        MISSING_MARKERS.contains(&value)
    }
}
