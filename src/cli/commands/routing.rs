//! `jobflow routing` command - inspect how operation names resolve

use std::collections::BTreeMap;

use clap::Subcommand;
use console::style;
use miette::Result;
use serde::Serialize;

use crate::cli::helpers::{load_config, load_directory, open_store, or_dash};
use crate::cli::output::{effective_format, print_structured};
use crate::cli::table::Table;
use crate::cli::GlobalOpts;
use crate::core::config::Config;
use crate::core::directory::ReferenceDirectory;
use crate::core::routing::RoutingResolver;
use crate::entities::resource::RoutingEntry;

#[derive(Subcommand, Debug)]
pub enum RoutingCommands {
    /// Show the routing entries quoted operation names resolve to
    Resolve(ResolveArgs),

    /// Verify every configured mapping target exists
    Check,
}

#[derive(clap::Args, Debug)]
pub struct ResolveArgs {
    /// Quoted operation names (exact, case-sensitive)
    #[arg(required = true)]
    pub names: Vec<String>,
}

/// A mapping target missing from the reference directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RoutingProblem {
    pub operation: String,
    pub message: String,
}

pub fn run(cmd: RoutingCommands, global: &GlobalOpts) -> Result<()> {
    match cmd {
        RoutingCommands::Resolve(args) => run_resolve(args, global),
        RoutingCommands::Check => run_check(global),
    }
}

fn run_resolve(args: ResolveArgs, global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let store = open_store(&config)?;
    let directory = load_directory(&store, &config)?;
    let mut resolver = RoutingResolver::new(&directory, &config.routing);

    let resolved: BTreeMap<String, Vec<RoutingEntry>> = args
        .names
        .iter()
        .map(|name| (name.clone(), resolver.resolve(name)))
        .collect();

    let format = effective_format(global.output, true);
    if print_structured(&resolved, format)? {
        return Ok(());
    }

    let mut table = Table::new(["name", "step", "kind", "resource", "code", "matched"]);
    for name in &args.names {
        let entries = &resolved[name];
        if entries.is_empty() {
            table.row([name.as_str(), "-", "none", "-", "-", "-"]);
            continue;
        }
        for (step, entry) in entries.iter().enumerate() {
            table.row([
                name.clone(),
                step.to_string(),
                if entry.is_inside() { "inside" } else { "outside" }.to_string(),
                entry.resource_name().to_string(),
                or_dash(entry.code()),
                if entry.matched { "yes" } else { "no" }.to_string(),
            ]);
        }
    }
    table.print(format);
    Ok(())
}

fn run_check(global: &GlobalOpts) -> Result<()> {
    let config = load_config(global)?;
    let store = open_store(&config)?;
    let directory = load_directory(&store, &config)?;

    let problems = check_routing(&config, &directory);
    let format = effective_format(global.output, true);
    if print_structured(&problems, format)? {
        return finish(problems.len());
    }

    if problems.is_empty() {
        println!(
            "{} {} inside and {} outside mappings resolve",
            style("✓").green(),
            config.routing.inside.len(),
            config.routing.outside.len()
        );
        return Ok(());
    }

    for problem in &problems {
        println!(
            "{} {}: {}",
            style("✗").red(),
            style(&problem.operation).yellow(),
            problem.message
        );
    }
    finish(problems.len())
}

fn finish(problems: usize) -> Result<()> {
    if problems == 0 {
        Ok(())
    } else {
        Err(miette::miette!(
            help = "import the missing records or fix the routing section",
            "{} routing problem(s) found",
            problems
        ))
    }
}

/// Every configured target that does not exist in `directory`
pub fn check_routing(config: &Config, directory: &ReferenceDirectory) -> Vec<RoutingProblem> {
    let mut problems = Vec::new();

    for (name, targets) in &config.routing.inside {
        for target in targets {
            if !directory.has_work_center(&target.work_center) {
                problems.push(RoutingProblem {
                    operation: name.clone(),
                    message: format!("work center '{}' does not exist", target.work_center),
                });
            }
            if let Some(code) = &target.operation {
                if !directory.has_operation(code) {
                    problems.push(RoutingProblem {
                        operation: name.clone(),
                        message: format!("operation code '{}' does not exist", code),
                    });
                }
            }
        }
    }

    for (name, targets) in &config.routing.outside {
        for target in targets {
            if !directory.has_vendor(&target.vendor) {
                problems.push(RoutingProblem {
                    operation: name.clone(),
                    message: format!("vendor '{}' does not exist", target.vendor),
                });
            }
        }
    }

    problems
}
