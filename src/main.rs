//! cbfs-restore - Restore a cbfs store from a backup archive
//!
//! Entry point for the CLI application.

use anyhow::{Context, Result};
use cbfs_restore::config::{CliArgs, RestoreConfig};
use cbfs_restore::progress::{print_header, print_summary, ProgressReporter};
use cbfs_restore::restore::Supervisor;
use clap::Parser;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> Result<()> {
    // Parse CLI arguments
    let args = CliArgs::parse();

    // Setup logging
    setup_logging(args.verbose)?;

    // Validate and create config
    let config = RestoreConfig::from_args(args).context("Invalid configuration")?;

    let dry_run = config.dry_run;

    // Print header
    if config.show_progress {
        print_header(
            &config.archive_path.display().to_string(),
            config.base_url.as_str(),
            config.worker_count,
            config.filter.as_str(),
            dry_run,
        );
    }

    // Create progress reporter
    let progress = if config.show_progress {
        Some(ProgressReporter::new())
    } else {
        None
    };

    let mut supervisor = Supervisor::new(config);
    if let Some(ref p) = progress {
        p.set_status("Opening archive...");
        let reporter = p.clone();
        supervisor = supervisor.on_progress(move |summary| reporter.update(summary));
    }

    // Run the restore
    let summary = match supervisor.run() {
        Ok(summary) => summary,
        Err(e) => {
            if let Some(ref p) = progress {
                p.finish_and_clear();
            }
            return Err(e).context("Restore failed");
        }
    };

    // Finish progress and print summary
    if let Some(ref p) = progress {
        p.finish("Restore completed");
        print_summary(&summary, dry_run);
    }

    Ok(())
}

fn setup_logging(verbose: bool) -> Result<()> {
    let default_filter = if verbose {
        "cbfs_restore=debug,warn"
    } else {
        "cbfs_restore=info,warn"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    Ok(())
}
