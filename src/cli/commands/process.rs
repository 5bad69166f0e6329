//! `jobflow process` command - flatten order files and commit the jobs

use std::path::{Path, PathBuf};

use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{load_config, load_directory, open_store, or_dash};
use crate::cli::output::print_structured;
use crate::cli::table::Table;
use crate::cli::{GlobalOpts, OutputFormat};
use crate::core::config::Config;
use crate::core::flatten::{Flattener, OrderPlan};
use crate::core::intake::read_order;
use crate::core::processor::{OrderProcessor, Outcome, ProcessOptions};
use crate::core::routing::RoutingResolver;

#[derive(clap::Args, Debug)]
pub struct ProcessArgs {
    /// Order JSON files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Print the plan without writing to the database
    #[arg(long)]
    pub dry_run: bool,

    /// Process orders that were already committed
    #[arg(long)]
    pub force: bool,
}

/// Result for one input file
#[derive(Debug, Serialize)]
pub struct FileReport {
    pub file: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<Outcome>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl FileReport {
    pub fn is_success(&self) -> bool {
        self.error.is_none() && self.outcome.as_ref().is_some_and(Outcome::is_success)
    }
}

pub fn run(args: ProcessArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    ensure_active(&config, args.dry_run)?;

    let options = ProcessOptions {
        dry_run: args.dry_run,
        force: args.force,
    };
    let reports = process_files(&config, &args.files, options)?;

    if !print_structured(&reports, global.output)? {
        for report in &reports {
            print_report(report);
            if args.dry_run {
                if let Some(plan) = report.outcome.as_ref().and_then(Outcome::plan) {
                    print_plan(plan, global.output);
                }
            }
        }
    }

    let failed = reports.iter().filter(|r| !r.is_success()).count();
    if failed > 0 {
        return Err(miette::miette!(
            "{} of {} order file(s) failed",
            failed,
            reports.len()
        ));
    }
    Ok(())
}

/// Refuse to write when the connector is switched off
pub fn ensure_active(config: &Config, dry_run: bool) -> Result<()> {
    if !config.connector.active && !dry_run {
        return Err(miette::miette!(
            help = "set connector.active to true, or use --dry-run",
            "Connector is inactive"
        ));
    }
    Ok(())
}

/// Process a batch of files against one load of the reference directory
pub fn process_files(config: &Config, files: &[PathBuf], options: ProcessOptions) -> Result<Vec<FileReport>> {
    let mut store = open_store(config)?;
    let directory = load_directory(&store, config)?;
    let flattener = Flattener::new(
        RoutingResolver::new(&directory, &config.routing),
        config.flatten_options(),
    );
    let mut processor = OrderProcessor::new(&mut store, flattener, &config.connector, options);

    Ok(files
        .iter()
        .map(|path| process_file(&mut processor, path))
        .collect())
}

fn process_file(processor: &mut OrderProcessor<'_>, path: &Path) -> FileReport {
    let file = path.display().to_string();
    let result = read_order(path)
        .map_err(|e| e.to_string())
        .and_then(|order| processor.process(&order).map_err(|e| e.to_string()));
    match result {
        Ok(outcome) => FileReport {
            file,
            outcome: Some(outcome),
            error: None,
        },
        Err(error) => {
            tracing::error!(file = file.as_str(), error = error.as_str(), "order file failed");
            FileReport {
                file,
                outcome: None,
                error: Some(error),
            }
        }
    }
}

/// One status line per file, followed by its diagnostics
pub fn print_report(report: &FileReport) {
    let name = Path::new(&report.file)
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| report.file.clone());

    let Some(outcome) = &report.outcome else {
        println!(
            "{} {}: {}",
            style("✗").red(),
            name,
            report.error.as_deref().unwrap_or("failed")
        );
        return;
    };

    match outcome {
        Outcome::Committed { order_number, plan, summary } => println!(
            "{} {}: order {} -> {} ({} jobs, {} links, {} operations)",
            style("✓").green(),
            name,
            order_number,
            style(top_level_jobs(plan)).cyan(),
            summary.jobs,
            summary.bill_of_jobs + summary.material_reqs,
            summary.operations
        ),
        Outcome::Planned { order_number, plan } => println!(
            "{} {}: order {} would create {} ({} jobs, {} operations)",
            style("~").cyan(),
            name,
            order_number,
            top_level_jobs(plan),
            plan.job_count(),
            plan.operations().count()
        ),
        Outcome::Rejected { order_number, .. } => println!(
            "{} {}: order {} has no line item that could be flattened",
            style("✗").red(),
            name,
            order_number
        ),
        Outcome::Cancelled { order_number } => println!(
            "{} {}: order {} is cancelled, skipped",
            style("-").dim(),
            name,
            order_number
        ),
        Outcome::Duplicate { order_number } => println!(
            "{} {}: order {} was already processed, skipped (use --force to reprocess)",
            style("-").dim(),
            name,
            order_number
        ),
    }

    if let Some(plan) = outcome.plan() {
        for failure in &plan.failures {
            println!(
                "    {} item {} aborted: {}",
                style("✗").red(),
                failure.line_item + 1,
                failure.reason
            );
        }
        for diag in plan.diagnostics() {
            println!("    {} {}", style("!").yellow(), diag);
        }
    }
}

fn top_level_jobs(plan: &OrderPlan) -> String {
    let jobs: Vec<&str> = plan.items.iter().map(|i| i.top_level_job.as_str()).collect();
    if jobs.is_empty() {
        "no jobs".to_string()
    } else {
        format!("jobs {}", jobs.join(", "))
    }
}

/// Job and operation tables of a plan
fn print_plan(plan: &OrderPlan, format: OutputFormat) {
    let format = match format {
        OutputFormat::Auto => OutputFormat::Table,
        other => other,
    };

    let mut jobs = Table::new(["job", "level", "type", "part", "rev", "make", "scrap", "scrap_pct"]);
    for job in plan.jobs() {
        jobs.row([
            job.job_number.clone(),
            job.assembly_level.to_string(),
            job.job_type.to_string(),
            or_dash(job.part_number.as_deref()),
            or_dash(job.revision.as_deref()),
            job.make_quantity.to_string(),
            job.scrap.quantity.to_string(),
            format!("{:.1}", job.scrap.percent),
        ]);
    }
    jobs.print(format);

    let mut ops = Table::new(["job", "seq", "operation", "kind", "resource", "code"]);
    for op in plan.operations() {
        ops.row([
            op.job_number.clone(),
            op.sequence.to_string(),
            op.routing.description.clone(),
            if op.routing.is_inside() { "inside" } else { "outside" }.to_string(),
            op.routing.resource_name().to_string(),
            or_dash(op.routing.code()),
        ]);
    }
    if !ops.is_empty() {
        ops.print(format);
    }
}
