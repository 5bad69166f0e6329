//! `jobflow report` command - CSV exports for routing setup

use std::path::PathBuf;

use console::style;
use miette::Result;

use crate::cli::helpers::{load_config, open_store, store_report};
use crate::cli::output::print_structured;
use crate::cli::GlobalOpts;
use crate::core::report::write_reports;

#[derive(clap::Args, Debug)]
pub struct ReportArgs {
    /// Directory to write the report files into
    #[arg(long, default_value = "reports")]
    pub out: PathBuf,
}

pub fn run(args: ReportArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let store = open_store(&config)?;
    let summary = write_reports(&store, &args.out).map_err(store_report)?;

    if print_structured(&summary, global.output)? {
        return Ok(());
    }

    for file in &summary.files {
        println!("{} Wrote {}", style("✓").green(), file.display());
    }
    println!(
        "{} work centers, {} operations, {} vendors, {} jobs",
        summary.work_centers, summary.operations, summary.vendors, summary.jobs
    );
    Ok(())
}
