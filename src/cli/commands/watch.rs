//! `jobflow watch` command - poll a spool directory for new orders

use std::path::{Path, PathBuf};
use std::time::Duration;

use console::style;
use miette::Result;
use tracing::{debug, info, warn};

use crate::cli::commands::process::{ensure_active, print_report, process_files};
use crate::cli::helpers::load_config;
use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::intake::{archive, pending_orders};
use crate::core::processor::ProcessOptions;

#[derive(clap::Args, Debug)]
pub struct WatchArgs {
    /// Spool directory receiving order JSON files
    pub dir: PathBuf,

    /// Seconds between polls
    #[arg(long, default_value_t = 30)]
    pub interval: u64,

    /// Process what is pending and exit
    #[arg(long)]
    pub once: bool,
}

pub fn run(args: WatchArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    ensure_active(&config, false)?;

    if !args.dir.is_dir() {
        return Err(miette::miette!(
            "Spool directory {} does not exist",
            args.dir.display()
        ));
    }

    info!(dir = %args.dir.display(), interval = args.interval, "watching for orders");
    loop {
        let handled = poll(&config, &args.dir)?;
        if args.once {
            if handled == 0 {
                println!("No pending orders in {}", args.dir.display());
            }
            return Ok(());
        }
        std::thread::sleep(Duration::from_secs(args.interval.max(1)));
    }
}

/// Process every pending file once; returns how many were handled
fn poll(config: &Config, dir: &Path) -> Result<usize> {
    let pending = pending_orders(dir);
    if pending.is_empty() {
        debug!(dir = %dir.display(), "no pending orders");
        return Ok(0);
    }

    // directory is reloaded each poll so newly imported records are picked up
    let reports = process_files(config, &pending, ProcessOptions::default())?;
    for (path, report) in pending.iter().zip(&reports) {
        print_report(report);
        match archive(path, report.is_success()) {
            Ok(target) => debug!(to = %target.display(), "archived"),
            Err(e) => {
                warn!(file = %path.display(), error = %e, "could not archive order file");
                println!("{} could not archive {}: {}", style("!").yellow(), path.display(), e);
            }
        }
    }
    Ok(reports.len())
}
