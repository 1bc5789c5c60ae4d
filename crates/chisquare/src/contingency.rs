//! Cross-tabulation of two categorical columns.
//!
//! Row labels are the distinct values of the first column and column labels
//! the distinct values of the second. Both axes are ordered by
//! [`order_labels`]: numerically when every label parses as a number,
//! lexicographically otherwise. The same ordering is used by the expected
//! frequency matrix and by every export, so cells never drift from their
//! labels. In an all-numeric column, `1` and `1.0` are the same category.

use std::cmp::Ordering;

use indexmap::{IndexMap, IndexSet};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ChiSquareError, Result};
use crate::input::Dataset;
use crate::report::format_decimal;

/// How rows with a missing value in either selected column are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingPolicy {
    /// Drop the row and count it in [`ContingencyTable::excluded_rows`].
    #[default]
    Exclude,
    /// Keep the raw missing marker as a category of its own.
    AsCategory,
}

/// Observed frequencies for every pair of categories.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContingencyTable {
    row_variable: String,
    column_variable: String,
    row_labels: Vec<String>,
    column_labels: Vec<String>,
    counts: Vec<Vec<u64>>,
    excluded_rows: usize,
}

impl ContingencyTable {
    /// Build a table from an explicit count matrix.
    ///
    /// Labels are kept in the order given. `counts` must have one row per row
    /// label and one entry per column label in every row.
    pub fn from_counts(
        row_variable: impl Into<String>,
        column_variable: impl Into<String>,
        row_labels: Vec<String>,
        column_labels: Vec<String>,
        counts: Vec<Vec<u64>>,
    ) -> Result<Self> {
        if counts.len() != row_labels.len() {
            return Err(ChiSquareError::ShapeMismatch(format!(
                "{} count rows for {} row labels",
                counts.len(),
                row_labels.len()
            )));
        }
        if let Some((i, row)) = counts
            .iter()
            .enumerate()
            .find(|(_, row)| row.len() != column_labels.len())
        {
            return Err(ChiSquareError::ShapeMismatch(format!(
                "count row {} has {} cells for {} column labels",
                i,
                row.len(),
                column_labels.len()
            )));
        }
        ensure_unique(&row_labels, "row")?;
        ensure_unique(&column_labels, "column")?;

        Ok(Self {
            row_variable: row_variable.into(),
            column_variable: column_variable.into(),
            row_labels,
            column_labels,
            counts,
            excluded_rows: 0,
        })
    }

    /// Name of the variable labelling the rows.
    pub fn row_variable(&self) -> &str {
        &self.row_variable
    }

    /// Name of the variable labelling the columns.
    pub fn column_variable(&self) -> &str {
        &self.column_variable
    }

    pub fn row_labels(&self) -> &[String] {
        &self.row_labels
    }

    pub fn column_labels(&self) -> &[String] {
        &self.column_labels
    }

    /// Observed counts, row-major.
    pub fn counts(&self) -> &[Vec<u64>] {
        &self.counts
    }

    pub fn n_rows(&self) -> usize {
        self.row_labels.len()
    }

    pub fn n_cols(&self) -> usize {
        self.column_labels.len()
    }

    /// Rows left out of the table by [`MissingPolicy::Exclude`].
    pub fn excluded_rows(&self) -> usize {
        self.excluded_rows
    }

    /// Count for a pair of labels.
    pub fn get(&self, row_label: &str, column_label: &str) -> Option<u64> {
        let r = self.row_labels.iter().position(|l| l == row_label)?;
        let c = self.column_labels.iter().position(|l| l == column_label)?;
        Some(self.counts[r][c])
    }

    pub fn row_totals(&self) -> Vec<u64> {
        self.counts.iter().map(|row| row.iter().sum()).collect()
    }

    pub fn column_totals(&self) -> Vec<u64> {
        let mut totals = vec![0u64; self.n_cols()];
        for row in &self.counts {
            for (total, &count) in totals.iter_mut().zip(row) {
                *total += count;
            }
        }
        totals
    }

    /// Sum of all cells.
    pub fn grand_total(&self) -> u64 {
        self.counts.iter().flatten().sum()
    }

    /// Serialize as CSV: the row variable heads the label column, followed
    /// by one column per column label.
    pub fn to_csv(&self) -> Result<Vec<u8>> {
        let mut writer = csv::Writer::from_writer(Vec::new());

        let mut header = Vec::with_capacity(self.n_cols() + 1);
        header.push(self.row_variable.clone());
        header.extend(self.column_labels.iter().cloned());
        writer.write_record(&header)?;

        for (label, row) in self.row_labels.iter().zip(&self.counts) {
            let mut record = Vec::with_capacity(row.len() + 1);
            record.push(label.clone());
            record.extend(row.iter().map(|c| c.to_string()));
            writer.write_record(&record)?;
        }

        writer.into_inner().map_err(|e| ChiSquareError::Io {
            path: "<contingency table>".into(),
            source: e.into_error(),
        })
    }
}

/// Cross-tabulate `col1` against `col2`, excluding rows with missing values.
pub fn build_contingency(dataset: &Dataset, col1: &str, col2: &str) -> Result<ContingencyTable> {
    build_contingency_with(dataset, col1, col2, MissingPolicy::default())
}

/// Cross-tabulate `col1` against `col2` with an explicit missing-value policy.
pub fn build_contingency_with(
    dataset: &Dataset,
    col1: &str,
    col2: &str,
    policy: MissingPolicy,
) -> Result<ContingencyTable> {
    if col1 == col2 {
        return Err(ChiSquareError::InvalidSelection(format!(
            "both selections are '{}'; choose two different columns",
            col1
        )));
    }
    let idx1 = column_position(dataset, col1)?;
    let idx2 = column_position(dataset, col2)?;

    if dataset.row_count() == 0 {
        return Err(ChiSquareError::EmptyDataset(
            "No data rows found".to_string(),
        ));
    }

    let mut pair_counts: IndexMap<(&str, &str), u64> = IndexMap::new();
    let mut row_seen: IndexSet<&str> = IndexSet::new();
    let mut col_seen: IndexSet<&str> = IndexSet::new();
    let mut excluded_rows = 0;

    for row in &dataset.rows {
        let a = row.get(idx1).map(String::as_str).unwrap_or("");
        let b = row.get(idx2).map(String::as_str).unwrap_or("");

        if policy == MissingPolicy::Exclude
            && (Dataset::is_null_value(a) || Dataset::is_null_value(b))
        {
            excluded_rows += 1;
            continue;
        }

        row_seen.insert(a);
        col_seen.insert(b);
        *pair_counts.entry((a, b)).or_insert(0) += 1;
    }

    if pair_counts.is_empty() {
        return Err(ChiSquareError::EmptyDataset(format!(
            "all {} rows have a missing value in '{}' or '{}'",
            excluded_rows, col1, col2
        )));
    }

    let row_canonical = canonical_labels(&row_seen);
    let col_canonical = canonical_labels(&col_seen);
    let row_labels = axis_labels(&row_canonical);
    let column_labels = axis_labels(&col_canonical);

    let row_index: IndexMap<&str, usize> = row_labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();
    let col_index: IndexMap<&str, usize> = column_labels
        .iter()
        .enumerate()
        .map(|(i, l)| (l.as_str(), i))
        .collect();

    let mut counts = vec![vec![0u64; column_labels.len()]; row_labels.len()];
    for ((a, b), count) in &pair_counts {
        let r = row_index[row_canonical[a].as_str()];
        let c = col_index[col_canonical[b].as_str()];
        counts[r][c] += *count;
    }

    debug!(
        rows = row_labels.len(),
        cols = column_labels.len(),
        excluded_rows,
        "built contingency table for '{}' x '{}'",
        col1,
        col2
    );

    Ok(ContingencyTable {
        row_variable: col1.to_string(),
        column_variable: col2.to_string(),
        row_labels,
        column_labels,
        counts,
        excluded_rows,
    })
}

/// Sort labels numerically when all of them are numbers, else lexicographically.
pub fn order_labels<'a>(labels: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut labels: Vec<String> = labels.map(str::to_string).collect();

    let numeric: Option<Vec<f64>> = labels.iter().map(|l| parse_number(l)).collect();

    match numeric {
        Some(values) => {
            let mut keyed: Vec<(f64, String)> = values.into_iter().zip(labels).collect();
            keyed.sort_by(|(x, a), (y, b)| match x.total_cmp(y) {
                Ordering::Equal => a.cmp(b),
                other => other,
            });
            keyed.into_iter().map(|(_, l)| l).collect()
        }
        None => {
            labels.sort();
            labels
        }
    }
}

/// Map each raw value of an axis to the label it is counted under.
///
/// When every value is a number, spellings of the same number share one
/// label: the integer form if all values are integers, else the decimal form.
/// Otherwise each value is its own label.
fn canonical_labels<'a>(values: &IndexSet<&'a str>) -> IndexMap<&'a str, String> {
    let integers: Option<Vec<i64>> = values.iter().map(|v| v.trim().parse().ok()).collect();
    if let Some(integers) = integers {
        return values
            .iter()
            .zip(integers)
            .map(|(v, i)| (*v, i.to_string()))
            .collect();
    }

    let numbers: Option<Vec<f64>> = values.iter().map(|v| parse_number(v)).collect();
    match numbers {
        Some(numbers) => values
            .iter()
            .zip(numbers)
            .map(|(v, x)| {
                // -0 and 0 are the same category
                let x = if x == 0.0 { 0.0 } else { x };
                (*v, format_decimal(x))
            })
            .collect(),
        None => values.iter().map(|v| (*v, v.to_string())).collect(),
    }
}

/// Distinct labels of an axis in display order.
fn axis_labels(canonical: &IndexMap<&str, String>) -> Vec<String> {
    let distinct: IndexSet<&str> = canonical.values().map(String::as_str).collect();
    order_labels(distinct.into_iter())
}

fn parse_number(label: &str) -> Option<f64> {
    label.trim().parse::<f64>().ok().filter(|v| !v.is_nan())
}

fn column_position(dataset: &Dataset, name: &str) -> Result<usize> {
    dataset.column_index(name).ok_or_else(|| {
        ChiSquareError::InvalidSelection(format!("column '{}' not found in dataset", name))
    })
}

fn ensure_unique(labels: &[String], axis: &str) -> Result<()> {
    let unique: IndexSet<&str> = labels.iter().map(String::as_str).collect();
    if unique.len() != labels.len() {
        return Err(ChiSquareError::ShapeMismatch(format!(
            "duplicate {} labels",
            axis
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gender_result() -> Dataset {
        Dataset::from_columns(vec![
            ("Gender", vec!["M", "F", "M", "F"]),
            ("Result", vec!["Pass", "Pass", "Fail", "Fail"]),
        ])
        .unwrap()
    }

    #[test]
    fn test_build_all_ones() {
        let table = build_contingency(&gender_result(), "Gender", "Result").unwrap();

        assert_eq!(table.row_labels(), ["F", "M"]);
        assert_eq!(table.column_labels(), ["Fail", "Pass"]);
        assert_eq!(table.counts(), [vec![1, 1], vec![1, 1]]);
        assert_eq!(table.grand_total(), 4);
        assert_eq!(table.excluded_rows(), 0);
    }

    #[test]
    fn test_cell_lookup_by_label() {
        let ds = Dataset::from_columns(vec![
            ("smoker", vec!["yes", "yes", "no", "yes", "no"]),
            ("disease", vec!["y", "y", "n", "n", "n"]),
        ])
        .unwrap();
        let table = build_contingency(&ds, "smoker", "disease").unwrap();

        assert_eq!(table.get("yes", "y"), Some(2));
        assert_eq!(table.get("yes", "n"), Some(1));
        assert_eq!(table.get("no", "y"), Some(0));
        assert_eq!(table.get("no", "n"), Some(2));
        assert_eq!(table.get("maybe", "n"), None);
        assert_eq!(table.row_totals(), vec![2, 3]);
        assert_eq!(table.column_totals(), vec![3, 2]);
    }

    #[test]
    fn test_same_column_rejected() {
        let err = build_contingency(&gender_result(), "Gender", "Gender").unwrap_err();
        assert!(matches!(err, ChiSquareError::InvalidSelection(_)));
    }

    #[test]
    fn test_unknown_column_rejected() {
        let err = build_contingency(&gender_result(), "Gender", "Age").unwrap_err();
        assert!(matches!(err, ChiSquareError::InvalidSelection(msg) if msg.contains("Age")));
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let ds = Dataset::new(vec!["a".into(), "b".into()], Vec::new(), b',');
        let err = build_contingency(&ds, "a", "b").unwrap_err();
        assert!(matches!(err, ChiSquareError::EmptyDataset(_)));
    }

    #[test]
    fn test_missing_rows_excluded() {
        let ds = Dataset::from_columns(vec![
            ("a", vec!["x", "y", "", "x", "NA"]),
            ("b", vec!["1", "2", "1", "N/A", "2"]),
        ])
        .unwrap();
        let table = build_contingency(&ds, "a", "b").unwrap();

        assert_eq!(table.grand_total(), 2);
        assert_eq!(table.excluded_rows(), 3);
    }

    #[test]
    fn test_missing_as_category() {
        let ds = Dataset::from_columns(vec![
            ("a", vec!["x", "y", "NA"]),
            ("b", vec!["1", "2", "1"]),
        ])
        .unwrap();
        let table = build_contingency_with(&ds, "a", "b", MissingPolicy::AsCategory).unwrap();

        assert_eq!(table.row_labels(), ["NA", "x", "y"]);
        assert_eq!(table.grand_total(), 3);
        assert_eq!(table.excluded_rows(), 0);
    }

    #[test]
    fn test_all_missing_is_empty() {
        let ds = Dataset::from_columns(vec![("a", vec!["", "NA"]), ("b", vec!["1", "2"])]).unwrap();
        let err = build_contingency(&ds, "a", "b").unwrap_err();
        assert!(matches!(err, ChiSquareError::EmptyDataset(_)));
    }

    #[test]
    fn test_numeric_labels_sort_numerically() {
        let ordered = order_labels(["10", "2", "1", "-3.5"].into_iter());
        assert_eq!(ordered, vec!["-3.5", "1", "2", "10"]);

        let mixed = order_labels(["10", "b", "2"].into_iter());
        assert_eq!(mixed, vec!["10", "2", "b"]);
    }

    #[test]
    fn test_numeric_spellings_merge() {
        let ds = Dataset::from_columns(vec![
            ("dose", vec!["1", "1.0", "2", "01", "2.0", "1"]),
            ("score", vec!["3", "03", "4", "4", "+3", "4"]),
        ])
        .unwrap();
        let table = build_contingency(&ds, "dose", "score").unwrap();

        assert_eq!(table.row_labels(), ["1.0", "2.0"]);
        assert_eq!(table.column_labels(), ["3", "4"]);
        assert_eq!(table.get("1.0", "3"), Some(2));
        assert_eq!(table.get("1.0", "4"), Some(2));
        assert_eq!(table.get("2.0", "3"), Some(1));
        assert_eq!(table.get("2.0", "4"), Some(1));
        assert_eq!(table.grand_total(), 6);
    }

    #[test]
    fn test_text_labels_not_merged() {
        let ds = Dataset::from_columns(vec![
            ("a", vec!["1", "1.0", "x"]),
            ("b", vec!["p", "q", "p"]),
        ])
        .unwrap();
        let table = build_contingency(&ds, "a", "b").unwrap();
        assert_eq!(table.row_labels(), ["1", "1.0", "x"]);
    }

    #[test]
    fn test_marker_lookalikes_kept() {
        let ds = Dataset::from_columns(vec![
            ("Ion", vec!["Na", "K", "Na", "K", "none", " NA"]),
            ("Charge", vec!["pos", "pos", "neg", "neg", "pos", "neg"]),
        ])
        .unwrap();
        let table = build_contingency(&ds, "Ion", "Charge").unwrap();

        assert_eq!(table.row_labels(), [" NA", "K", "Na", "none"]);
        assert_eq!(table.excluded_rows(), 0);
        assert_eq!(table.grand_total(), 6);
    }

    #[test]
    fn test_from_counts_shape_checked() {
        let err = ContingencyTable::from_counts(
            "r",
            "c",
            vec!["a".into(), "b".into()],
            vec!["x".into(), "y".into()],
            vec![vec![1, 2], vec![3]],
        )
        .unwrap_err();
        assert!(matches!(err, ChiSquareError::ShapeMismatch(_)));

        let err = ContingencyTable::from_counts(
            "r",
            "c",
            vec!["a".into(), "a".into()],
            vec!["x".into()],
            vec![vec![1], vec![2]],
        )
        .unwrap_err();
        assert!(matches!(err, ChiSquareError::ShapeMismatch(_)));
    }

    #[test]
    fn test_to_csv() {
        let table = build_contingency(&gender_result(), "Gender", "Result").unwrap();
        let csv = String::from_utf8(table.to_csv().unwrap()).unwrap();
        assert_eq!(csv, "Gender,Fail,Pass\nF,1,1\nM,1,1\n");
    }
}
