//! `cmdtree` console adapter.

use clap::Parser;

use cmdtree::cli::args::Cli;
use cmdtree::cli::commands;
use cmdtree::error::ExitCode;
use cmdtree::observability::{init_logging, init_metrics};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if !cli.quiet {
        init_logging(cli.log_format.into(), cli.verbose, cli.color);
    }

    if let Some(port) = cli.metrics_port
        && let Err(e) = init_metrics(Some(port))
    {
        eprintln!("error: {e}");
        std::process::exit(e.exit_code());
    }

    tokio::spawn(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!();
            std::process::exit(ExitCode::INTERRUPTED);
        }
    });

    match commands::dispatch(cli).await {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}
