// Main entry point for the CLI application

use clap::Parser;
use csvloader::logging::{TracingSink, init_tracing};
use csvloader::{Cli, CsvProcessor, Orchestrator, SqliteProvider, dispatch};
use std::process::ExitCode;
use std::sync::Arc;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let orchestrator = Orchestrator::new(
        Box::new(SqliteProvider::new()),
        Box::new(CsvProcessor::new()),
        Arc::new(TracingSink),
    );

    match dispatch(&cli, &orchestrator, &mut std::io::stdout(), &mut std::io::stderr()) {
        Ok(outcome) => {
            tracing::debug!(?outcome, "finished");
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::debug!(kind = ?e.kind(), "workflow aborted");
            eprintln!("fatal {}: {}", e.category(), e);
            ExitCode::FAILURE
        }
    }
}
