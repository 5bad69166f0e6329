use clap::Parser;
use miette::Result;
use jobflow::cli::{Cli, Commands};

fn main() -> Result<()> {
    // Install miette's fancy error handler for source-annotated diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let _log_guard = jobflow::cli::helpers::init_logging(&cli.global);
    let global = &cli.global;

    match cli.command {
        Commands::Init(args) => jobflow::cli::commands::init::run(args, global),
        Commands::Process(args) => jobflow::cli::commands::process::run(args, global),
        Commands::Watch(args) => jobflow::cli::commands::watch::run(args, global),
        Commands::Routing(cmd) => jobflow::cli::commands::routing::run(cmd, global),
        Commands::Directory(cmd) => jobflow::cli::commands::directory::run(cmd, global),
        Commands::Report(args) => jobflow::cli::commands::report::run(args, global),
        Commands::Check => jobflow::cli::commands::check::run(global),
        Commands::Completions(args) => jobflow::cli::commands::completions::run(args),
    }
}
