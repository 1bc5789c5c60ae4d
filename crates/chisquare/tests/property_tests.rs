//! Property-based tests for the contingency builder and Chi-Square engine.
//!
//! These tests use proptest to generate random count matrices and datasets
//! and verify that the engine's invariants hold for all of them.
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p chisquare --test property_tests
//!
//! # More cases (slower but more thorough)
//! PROPTEST_CASES=10000 cargo test -p chisquare --test property_tests
//! ```

use proptest::prelude::*;

use chisquare::{
    build_contingency, chi_square_sf, compute_chi_square, ContingencyTable, Dataset,
    ResultRecord,
};

// =============================================================================
// Test Strategies
// =============================================================================

/// Count matrices of 2..6 rows by 2..6 columns with every cell at least 1,
/// so no margin is ever zero.
fn count_matrix() -> impl Strategy<Value = Vec<Vec<u64>>> {
    (2usize..6, 2usize..6).prop_flat_map(|(rows, cols)| {
        prop::collection::vec(prop::collection::vec(1u64..200, cols), rows)
    })
}

/// A count matrix together with a row and a column permutation.
fn permuted_matrix() -> impl Strategy<Value = (Vec<Vec<u64>>, Vec<usize>, Vec<usize>)> {
    count_matrix().prop_flat_map(|counts| {
        let rows: Vec<usize> = (0..counts.len()).collect();
        let cols: Vec<usize> = (0..counts[0].len()).collect();
        (
            Just(counts),
            Just(rows).prop_shuffle(),
            Just(cols).prop_shuffle(),
        )
    })
}

/// Paired categorical columns of equal length.
fn categorical_pairs() -> impl Strategy<Value = Vec<(String, String)>> {
    prop::collection::vec(("[a-d]", "[w-z]"), 1..80)
}

fn labelled(counts: Vec<Vec<u64>>) -> ContingencyTable {
    let rows = (0..counts.len()).map(|i| format!("r{}", i)).collect();
    let cols = (0..counts[0].len()).map(|j| format!("c{}", j)).collect();
    ContingencyTable::from_counts("row", "col", rows, cols, counts).unwrap()
}

// =============================================================================
// Engine Properties
// =============================================================================

proptest! {
    /// Observed and expected cells both sum to the grand total.
    #[test]
    fn expected_preserves_total(counts in count_matrix()) {
        let table = labelled(counts);
        let outcome = compute_chi_square(&table).unwrap();
        let n = table.grand_total() as f64;

        prop_assert_eq!(outcome.result.valid_case_count, table.grand_total());
        prop_assert!((outcome.expected.total() - n).abs() < 1e-6 * n.max(1.0));
    }

    /// Degrees of freedom are (rows - 1) * (cols - 1) and at least 1.
    #[test]
    fn degrees_of_freedom_formula(counts in count_matrix()) {
        let rows = counts.len();
        let cols = counts[0].len();
        let outcome = compute_chi_square(&labelled(counts)).unwrap();

        prop_assert_eq!(outcome.result.degrees_of_freedom, (rows - 1) * (cols - 1));
        prop_assert!(outcome.result.degrees_of_freedom >= 1);
    }

    /// Statistic is non-negative and the p-value is a probability.
    #[test]
    fn output_ranges(counts in count_matrix()) {
        let outcome = compute_chi_square(&labelled(counts)).unwrap();

        prop_assert!(outcome.result.statistic >= 0.0);
        prop_assert!((0.0..=1.0).contains(&outcome.result.p_value));
    }

    /// Relabelling categories does not change the statistic.
    #[test]
    fn statistic_permutation_invariant((counts, row_perm, col_perm) in permuted_matrix()) {
        let permuted: Vec<Vec<u64>> = row_perm
            .iter()
            .map(|&r| col_perm.iter().map(|&c| counts[r][c]).collect())
            .collect();

        let original = compute_chi_square(&labelled(counts)).unwrap();
        let shuffled = compute_chi_square(&labelled(permuted)).unwrap();

        let tol = 1e-9 * original.result.statistic.max(1.0);
        prop_assert!((original.result.statistic - shuffled.result.statistic).abs() < tol);
        prop_assert_eq!(original.result.degrees_of_freedom, shuffled.result.degrees_of_freedom);
    }

    /// The p-value never increases as the statistic grows.
    #[test]
    fn p_value_monotone(df in 1usize..30, a in 0.0f64..100.0, b in 0.0f64..100.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        let p_lo = chi_square_sf(lo, df).unwrap();
        let p_hi = chi_square_sf(hi, df).unwrap();

        prop_assert!(p_hi <= p_lo + 1e-12);
    }

    /// Exporting to CSV and reading it back keeps the rounded values.
    #[test]
    fn export_round_trip(counts in count_matrix()) {
        let outcome = compute_chi_square(&labelled(counts)).unwrap();
        let record = ResultRecord::from_result(&outcome.result);
        let parsed = ResultRecord::from_csv(&record.to_csv().unwrap()).unwrap();

        prop_assert_eq!(parsed.statistic, outcome.result.rounded_statistic());
        prop_assert_eq!(parsed.p_value, outcome.result.rounded_p_value());
        prop_assert_eq!(parsed.degrees_of_freedom, outcome.result.degrees_of_freedom);
        prop_assert_eq!(parsed.valid_case_count, outcome.result.valid_case_count);
    }
}

// =============================================================================
// Builder Properties
// =============================================================================

proptest! {
    /// Every row lands in exactly one cell.
    #[test]
    fn builder_counts_every_row(pairs in categorical_pairs()) {
        let (a, b): (Vec<String>, Vec<String>) = pairs.into_iter().unzip();
        let n = a.len();
        let ds = Dataset::from_columns(vec![("a", a), ("b", b)]).unwrap();

        let table = build_contingency(&ds, "a", "b").unwrap();
        prop_assert_eq!(table.grand_total(), n as u64);
        prop_assert_eq!(table.row_totals().iter().sum::<u64>(), n as u64);
        prop_assert_eq!(table.column_totals().iter().sum::<u64>(), n as u64);
    }

    /// Building twice from the same data gives identical labels and cells.
    #[test]
    fn builder_is_deterministic(pairs in categorical_pairs()) {
        let (a, b): (Vec<String>, Vec<String>) = pairs.into_iter().unzip();
        let ds = Dataset::from_columns(vec![("a", a), ("b", b)]).unwrap();

        let first = build_contingency(&ds, "a", "b").unwrap();
        let second = build_contingency(&ds, "a", "b").unwrap();
        prop_assert_eq!(first, second);
    }

    /// Shuffling the rows of a dataset does not change the table.
    #[test]
    fn builder_ignores_row_order(pairs in categorical_pairs().prop_flat_map(|p| {
        let shuffled = Just(p.clone()).prop_shuffle();
        (Just(p), shuffled)
    })) {
        let (original, shuffled) = pairs;
        let build = |rows: Vec<(String, String)>| {
            let (a, b): (Vec<String>, Vec<String>) = rows.into_iter().unzip();
            let ds = Dataset::from_columns(vec![("a", a), ("b", b)]).unwrap();
            build_contingency(&ds, "a", "b").unwrap()
        };

        prop_assert_eq!(build(original), build(shuffled));
    }
}
