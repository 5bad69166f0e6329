//! `jobflow init` command - write a configuration template and create the database

use std::fs;
use std::path::PathBuf;

use console::style;
use miette::{IntoDiagnostic, Result};

use crate::cli::helpers::{config_report, open_store, store_report};
use crate::cli::GlobalOpts;
use crate::core::config::{Config, CONFIG_FILE, TEMPLATE};

#[derive(clap::Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: InitArgs, global: &GlobalOpts) -> Result<()> {
    let path = global
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(CONFIG_FILE));

    if path.exists() && !args.force {
        println!(
            "{} {} already exists (use --force to overwrite)",
            style("!").yellow(),
            path.display()
        );
    } else {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).into_diagnostic()?;
            }
        }
        fs::write(&path, TEMPLATE).into_diagnostic()?;
        println!("{} Created {}", style("✓").green(), style(path.display()).cyan());
    }

    let config = Config::load(&path).map_err(config_report)?;
    let db_path = config.database_path().map_err(config_report)?;
    let store = open_store(&config)?;
    let next = store.next_job_number().map_err(store_report)?;

    println!(
        "{} Database ready at {} (next job {})",
        style("✓").green(),
        style(db_path.display()).cyan(),
        next
    );
    println!();
    println!("Next steps:");
    println!("  jobflow directory import --work-centers work_centers.csv --vendors vendors.csv");
    println!("  jobflow process order.json --dry-run");

    Ok(())
}
