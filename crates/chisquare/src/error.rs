//! Error types for the chisquare library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for chisquare operations.
#[derive(Debug, Error)]
pub enum ChiSquareError {
    /// The selected columns are missing from the dataset or identical.
    #[error("Invalid column selection: {0}")]
    InvalidSelection(String),

    /// No data rows to tabulate.
    #[error("Empty dataset: {0}")]
    EmptyDataset(String),

    /// The dataset has fewer than two columns.
    #[error("The dataset must have at least 2 columns (found {found})")]
    TooFewColumns { found: usize },

    /// A selected variable has fewer than two distinct values.
    #[error("Column '{variable}' has {found} distinct value(s); at least 2 are required")]
    InsufficientCategories { variable: String, found: usize },

    /// A row or column total is zero, so expected frequencies are undefined.
    #[error("{axis} total for '{label}' is zero; expected frequencies are undefined")]
    DegenerateMarginal { axis: Axis, label: String },

    /// Columns or count matrices that are not rectangular.
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),

    /// The Chi-Square distribution could not be constructed.
    #[error("Distribution error: {0}")]
    Distribution(String),

    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error interpreting a delimited record.
    #[error("Parse error at row {row}, column {column}: {message}")]
    Parse {
        row: usize,
        column: usize,
        message: String,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Which margin of a contingency table an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Row,
    Column,
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::Row => write!(f, "Row"),
            Axis::Column => write!(f, "Column"),
        }
    }
}

/// Result type alias for chisquare operations.
pub type Result<T> = std::result::Result<T, ChiSquareError>;
