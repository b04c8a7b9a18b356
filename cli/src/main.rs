//! jsongraph - turn nested JSON documents into entity-relationship graphs.

mod cli;
mod commands;

use clap::Parser;

fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();

    let default_filter = if args.verbose {
        "debug"
    } else if args.quiet {
        "error"
    } else {
        "info"
    };
    jsongraph_core::init_tracing(default_filter, args.log_format.into());

    match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args),
        cli::Command::Entities(entities_args) => commands::entities_execute(entities_args),
    }
}
