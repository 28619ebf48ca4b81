//! flatmirror: incremental mirror for Flatcar release channels.
//!
//! Thin glue over `flatmirror-engine`: flag parsing, log routing, the
//! interactive status stream, and exit-status mapping. Everything with
//! behavior lives in the library crates.

use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing::info;

use flatmirror_engine::{RunCoordinator, RunOutcome};
use flatmirror_fetch::ReqwestClient;

mod cli;
mod logging;
mod report;

use cli::Cli;
use report::ConsoleReporter;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(RunOutcome::Completed | RunOutcome::AlreadyRunning) => ExitCode::SUCCESS,
        Ok(RunOutcome::Failed) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("flatmirror: {e:#}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> anyhow::Result<RunOutcome> {
    let settings = Cli::parse().into_settings()?;
    let _guard = logging::init(settings.log_file.as_deref())?;

    info!(
        "mirroring {} channel(s) into {}",
        settings.mirror.channels.len(),
        settings.mirror.root.display()
    );

    let reporter = Arc::new(ConsoleReporter::new(settings.quiet));
    let client = Arc::new(ReqwestClient::new()?);
    let coordinator = RunCoordinator::new(settings.mirror, reporter.clone());

    let outcome = coordinator.run(client).await?;
    match outcome {
        RunOutcome::Completed => println!("mirror complete: {}", reporter.summary()),
        RunOutcome::Failed => println!("mirror failed: {}", reporter.summary()),
        RunOutcome::AlreadyRunning => {}
    }
    Ok(outcome)
}
