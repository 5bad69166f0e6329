//! `jobflow check` command - configuration and database connectivity

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{config_report, load_config, load_directory, open_store, store_report};
use crate::cli::output::print_structured;
use crate::cli::GlobalOpts;

#[derive(Debug, Serialize)]
struct CheckReport {
    config: Option<String>,
    database: String,
    jobs: usize,
    next_job_number: u64,
    processed_orders: usize,
    work_centers: usize,
    vendors: usize,
    operations: usize,
    active: bool,
}

pub fn run(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let db_path = config.database_path().map_err(config_report)?;
    let store = open_store(&config)?;
    let directory = load_directory(&store, &config)?;

    let report = CheckReport {
        config: config.source.as_ref().map(|p| p.display().to_string()),
        database: db_path.display().to_string(),
        jobs: store.job_count().map_err(store_report)?,
        next_job_number: store.next_job_number().map_err(store_report)?,
        processed_orders: store.processed_orders().map_err(store_report)?.len(),
        work_centers: directory.work_center_count(),
        vendors: directory.vendor_count(),
        operations: directory.operation_count(),
        active: config.connector.active,
    };

    if print_structured(&report, global.output)? {
        return Ok(());
    }

    println!(
        "{} Connected to {}",
        style("✓").green(),
        style(&report.database).cyan()
    );
    match &report.config {
        Some(path) => println!("  config:           {}", path),
        None => println!("  config:           (defaults)"),
    }
    println!("  jobs:             {}", report.jobs);
    println!("  next job number:  {}", report.next_job_number);
    println!("  processed orders: {}", report.processed_orders);
    println!(
        "  directory:        {} work centers, {} vendors, {} operations",
        report.work_centers, report.vendors, report.operations
    );
    if !report.active {
        println!(
            "{} connector is inactive (connector.active = false)",
            style("!").yellow()
        );
    }
    Ok(())
}
