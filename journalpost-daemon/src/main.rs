use anyhow::Result;
use clap::Parser;

use journalpost_daemon::cli::DaemonCli;
use journalpost_daemon::logging;
use journalpost_daemon::orchestrator::Orchestrator;

fn main() -> Result<()> {
    let cli = DaemonCli::parse();

    // Configuration errors are reported before tracing exists
    let orchestrator = Orchestrator::build(&cli)?;

    if cli.validate {
        println!("{}", orchestrator.summary()?);
        return Ok(());
    }

    logging::init_tracing(&orchestrator.config().general)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "journalpost-daemon starting");

    if let Err(e) = orchestrator.run() {
        tracing::error!(error = %format!("{e:#}"), "journalpost-daemon exiting");
        return Err(e);
    }
    Ok(())
}
