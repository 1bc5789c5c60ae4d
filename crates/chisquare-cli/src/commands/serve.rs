//! Serve command - run the test behind a local HTTP API.

use colored::Colorize;
use tracing::info;

use super::analysis_config;
use crate::server::{app, state::AppState};

pub fn run(port: u16, keep_missing: bool, verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let config = analysis_config(keep_missing, None);
    if verbose {
        println!("Missing values: {:?}", config.missing);
    }
    let state = AppState::new(config);

    let url = format!("http://localhost:{}", port);
    println!();
    println!(
        "{} {}",
        "Starting Chi-Square server at".cyan().bold(),
        url.white().bold()
    );
    println!();
    println!("  POST {}/api/columns", url);
    println!("  POST {}/api/test?col1=<A>&col2=<B>", url);
    println!("  POST {}/api/test/export?col1=<A>&col2=<B>", url);
    println!();
    println!("Press {} to stop the server", "Ctrl+C".yellow().bold());
    println!();

    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(async {
        let shutdown = async {
            tokio::signal::ctrl_c().await.ok();
            println!();
            println!("{}", "Shutting down...".yellow());
            info!("shutdown requested");
        };

        app::run_server(state, port, shutdown).await
    })
}
