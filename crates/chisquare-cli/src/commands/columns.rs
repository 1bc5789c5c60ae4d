//! Columns command - list the columns available for a test.

use std::path::PathBuf;

use chisquare::{ChiSquareError, IndependenceTest};
use colored::Colorize;

use super::analysis_config;

pub fn run(
    file: PathBuf,
    after: Option<String>,
    delimiter: Option<u8>,
    verbose: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    if !file.exists() {
        return Err(format!("File not found: {}", file.display()).into());
    }

    let runner = IndependenceTest::with_config(analysis_config(false, delimiter));
    let (dataset, source) = runner.parse_file(&file)?;

    if dataset.column_count() < 2 {
        return Err(ChiSquareError::TooFewColumns {
            found: dataset.column_count(),
        }
        .into());
    }

    if verbose {
        println!(
            "{} {} ({}, {} rows, {})",
            "Read".cyan().bold(),
            source.file.white(),
            source.format,
            source.row_count,
            source.hash
        );
        println!();
    }

    match after {
        Some(first) => {
            if dataset.column_index(&first).is_none() {
                return Err(ChiSquareError::InvalidSelection(format!(
                    "column '{}' not found in dataset",
                    first
                ))
                .into());
            }
            println!(
                "{} {}",
                "Columns to pair with".cyan().bold(),
                first.white().bold()
            );
            for name in dataset.partner_columns(&first) {
                println!("  {}", name);
            }
        }
        None => {
            println!(
                "{} {} columns, {} rows",
                "Found".cyan().bold(),
                dataset.column_count().to_string().white().bold(),
                dataset.row_count().to_string().white().bold()
            );
            println!();
            println!("  {:>3}  {:30} {}", "#", "Column", "Distinct values");
            for (i, name) in dataset.headers.iter().enumerate() {
                let distinct = dataset.distinct_count(i);
                let count = if distinct < 2 {
                    distinct.to_string().yellow()
                } else {
                    distinct.to_string().normal()
                };
                println!("  {:>3}  {:30} {}", i + 1, name, count);
            }
        }
    }

    Ok(())
}
