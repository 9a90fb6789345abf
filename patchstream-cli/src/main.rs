//! patchstream CLI - synchronize a game install against its content origin.

mod ui;

use std::path::PathBuf;
use std::process;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use patchstream::{Patcher, PatcherConfig};

#[derive(Parser)]
#[command(name = "patchstream")]
#[command(about = "Synchronize the install tree in the current directory", long_about = None)]
struct Args {
    /// Origin base URL; repeat to probe multiple mirrors in order
    #[arg(long = "origin", value_name = "URL", required = true)]
    origins: Vec<String>,

    /// Install root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    install_dir: Option<PathBuf>,

    /// Download worker count (defaults to the logical CPU count)
    #[arg(long)]
    workers: Option<usize>,

    /// Disable the progress bars
    #[arg(long)]
    quiet: bool,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    let install_dir = match args.install_dir {
        Some(dir) => dir,
        None => match std::env::current_dir() {
            Ok(dir) => dir,
            Err(e) => {
                eprintln!("Error resolving working directory: {}", e);
                process::exit(1);
            }
        },
    };

    let mut config = PatcherConfig::new(install_dir);
    for origin in args.origins {
        config = config.with_origin(origin);
    }
    if let Some(workers) = args.workers {
        config = config.with_workers(workers);
    }

    let mut patcher = Patcher::new(config);
    if !args.quiet {
        patcher = patcher.with_progress(ui::TerminalSink::new());
    }

    match patcher.run() {
        Ok(summary) => {
            info!(
                transfers = summary.transfers,
                passes = summary.passes,
                "installation is up to date"
            );
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}
