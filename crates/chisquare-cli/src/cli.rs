//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use chisquare::EXPORT_FILE_NAME;

/// chisq: Chi-Square test of independence for two columns of a CSV file
#[derive(Parser)]
#[command(name = "chisq")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the columns of a data file that can be tested
    Columns {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Show the columns that can be paired with this one
        #[arg(long, value_name = "COLUMN")]
        after: Option<String>,

        /// Field delimiter (default: auto-detect)
        #[arg(short, long, value_parser = parse_delimiter)]
        delimiter: Option<u8>,
    },

    /// Run the Chi-Square test of independence on two columns
    Test {
        /// Path to the data file (CSV/TSV)
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// First categorical column (table rows)
        #[arg(long)]
        col1: String,

        /// Second categorical column (table columns)
        #[arg(long)]
        col2: String,

        /// Write the results record as CSV (default: chi_square_results.csv)
        #[arg(long, value_name = "PATH", num_args = 0..=1, default_missing_value = EXPORT_FILE_NAME)]
        export: Option<PathBuf>,

        /// Print the full report as JSON
        #[arg(long)]
        json: bool,

        /// Count missing values as a category instead of dropping the row
        #[arg(long)]
        keep_missing: bool,

        /// Field delimiter (default: auto-detect)
        #[arg(short, long, value_parser = parse_delimiter)]
        delimiter: Option<u8>,
    },

    /// Serve the test over a local HTTP API
    Serve {
        /// Port for web server
        #[arg(short, long, default_value = "3141")]
        port: u16,

        /// Count missing values as a category instead of dropping the row
        #[arg(long)]
        keep_missing: bool,
    },
}

/// Parse a delimiter argument: a single ASCII character, or `tab`/`\t`.
pub fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(format!(
            "Invalid delimiter: {}. Use a single ASCII character or 'tab'.",
            s
        )),
    }
}
