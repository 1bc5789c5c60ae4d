//! chisq CLI - Chi-Square test of independence.

mod cli;
mod commands;
mod logging;
mod server;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Columns {
            file,
            after,
            delimiter,
        } => commands::columns::run(file, after, delimiter, cli.verbose),

        Commands::Test {
            file,
            col1,
            col2,
            export,
            json,
            keep_missing,
            delimiter,
        } => commands::test::run(
            commands::test::TestArgs {
                file,
                col1,
                col2,
                export,
                json,
                keep_missing,
                delimiter,
            },
            cli.verbose,
        ),

        Commands::Serve { port, keep_missing } => {
            commands::serve::run(port, keep_missing, cli.verbose)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
