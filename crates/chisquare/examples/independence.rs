//! Example: test two columns of a CSV/TSV file for independence.
//!
//! Usage:
//!   cargo run --example independence -- <file_path> <column1> <column2>

use std::env;
use std::path::Path;

use chisquare::IndependenceTest;

fn main() -> chisquare::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 4 {
        eprintln!("Usage: cargo run --example independence -- <file_path> <column1> <column2>");
        std::process::exit(1);
    }

    let path = Path::new(&args[1]);
    if !path.exists() {
        eprintln!("Error: File not found: {}", args[1]);
        std::process::exit(1);
    }

    let report = IndependenceTest::new().run_file(path, &args[2], &args[3])?;
    let table = &report.contingency;

    let separator = "=".repeat(60);
    println!("{}", separator);
    println!("{} vs {}", table.row_variable(), table.column_variable());
    println!("{}", separator);
    println!();

    println!("## Contingency Table");
    print!("  {:12}", "");
    for label in table.column_labels() {
        print!("{:>10}", label);
    }
    println!();
    for (label, row) in table.row_labels().iter().zip(table.counts()) {
        print!("  {:12}", label);
        for count in row {
            print!("{:>10}", count);
        }
        println!();
    }
    println!();

    println!("## Chi-Square Results");
    for row in &report.record.rows {
        println!(
            "  {:20} {:>10} {:>4} {:>8}",
            row.particulars, row.value, row.df, row.significance
        );
    }
    println!();

    println!("## Interpretation");
    println!("  {}", report.interpretation);
    if let Some(warning) = &report.warning {
        println!("  Warning: {}", warning);
    }
    println!();
    println!("{}", separator);

    Ok(())
}
