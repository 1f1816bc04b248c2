use anyhow::Context;
use clap::{error::ErrorKind, CommandFactory, Parser};
use netcat_part::cli::Cli;
use netcat_part::common::{NcError, Role, Settings};
use netcat_part::transfer::ProgressTracker;
use netcat_part::{receive, send};
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// Single-threaded runtime, every step is awaited in order
#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::from(1),
            };
        }
    };

    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("ERROR: {:#}", err);
            let is_config = err
                .downcast_ref::<NcError>()
                .is_some_and(NcError::is_config);
            if is_config {
                eprintln!("\n{}", Cli::command().render_help());
            }
            ExitCode::from(1)
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "warn,netcat_part=debug"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let settings = Settings::load().map_err(NcError::from)?;
    let session = cli
        .into_session(&settings)
        .await
        .map_err(NcError::from)?;
    tracing::debug!(?session, ?settings, "session configured");

    match &session.role {
        Role::Listen(request) => {
            let mut progress = ProgressTracker::new("receiving", session.verbose);
            let report = receive::run_server(session.peer, request, &settings, &mut progress)
                .await
                .with_context(|| format!("receiving on {}", session.peer))?;
            println!("{}", report);
        }
        Role::Send(request) => {
            let mut progress = ProgressTracker::new("sending", session.verbose);
            let report = send::run_client(session.peer, request, &settings, &mut progress)
                .await
                .with_context(|| format!("sending to {}", session.peer))?;
            tracing::info!(bytes = report.bytes_written, peer = %report.peer, "done");
        }
    }

    Ok(())
}
