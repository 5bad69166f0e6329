//! `jobflow directory` command - reference data management

use std::path::PathBuf;

use clap::{ArgGroup, Subcommand, ValueEnum};
use console::style;
use miette::Result;

use crate::cli::helpers::{load_config, open_store, or_dash, store_report};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::table::Table;
use crate::cli::GlobalOpts;

#[derive(Subcommand, Debug)]
pub enum DirectoryCommands {
    /// Import work centers, vendors and operation codes from CSV files
    Import(ImportArgs),

    /// List reference data
    List(ListArgs),
}

#[derive(clap::Args, Debug)]
#[command(group(
    ArgGroup::new("source")
        .required(true)
        .multiple(true)
        .args(["work_centers", "vendors", "operations"])
))]
pub struct ImportArgs {
    /// CSV with columns work_center[,queue_hrs]
    #[arg(long)]
    pub work_centers: Option<PathBuf>,

    /// CSV with columns vendor[,description]
    #[arg(long)]
    pub vendors: Option<PathBuf>,

    /// CSV with columns operation[,work_center,note_text]
    #[arg(long)]
    pub operations: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListKind {
    WorkCenters,
    Vendors,
    Operations,
}

#[derive(clap::Args, Debug)]
pub struct ListArgs {
    /// Which records to list
    pub kind: ListKind,
}

pub fn run(cmd: DirectoryCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        DirectoryCommands::Import(args) => run_import(args, global),
        DirectoryCommands::List(args) => run_list(args, global),
    }
}

fn run_import(args: ImportArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let store = open_store(&config)?;

    if let Some(path) = &args.work_centers {
        let count = store.import_work_centers(path).map_err(store_report)?;
        println!("{} Imported {} work centers", style("✓").green(), count);
    }
    if let Some(path) = &args.vendors {
        let count = store.import_vendors(path).map_err(store_report)?;
        println!("{} Imported {} vendors", style("✓").green(), count);
    }
    if let Some(path) = &args.operations {
        let count = store.import_operations(path).map_err(store_report)?;
        println!("{} Imported {} operations", style("✓").green(), count);
    }
    Ok(())
}

fn run_list(args: ListArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let store = open_store(&config)?;
    let format = effective_format(global.output, true);

    let table = match args.kind {
        ListKind::WorkCenters => {
            let records = store.work_centers().map_err(store_report)?;
            if print_structured(&records, format)? {
                return Ok(());
            }
            let mut table = Table::new(["name", "queue_hrs"]);
            for wc in &records {
                table.row([wc.name.clone(), wc.queue_hrs.to_string()]);
            }
            table
        }
        ListKind::Vendors => {
            let records = store.vendors().map_err(store_report)?;
            if print_structured(&records, format)? {
                return Ok(());
            }
            let mut table = Table::new(["name", "description"]);
            for vendor in &records {
                table.row([vendor.name.clone(), or_dash(vendor.description.as_deref())]);
            }
            table
        }
        ListKind::Operations => {
            let records = store.operations().map_err(store_report)?;
            if print_structured(&records, format)? {
                return Ok(());
            }
            let mut table = Table::new(["code", "work_center", "note_text"]);
            for op in &records {
                table.row([
                    op.code.clone(),
                    or_dash(op.work_center.as_deref()),
                    or_dash(op.note_text.as_deref()),
                ]);
            }
            table
        }
    };

    if table.is_empty() {
        println!("No records found.");
        return Ok(());
    }
    table.print(format);
    Ok(())
}
