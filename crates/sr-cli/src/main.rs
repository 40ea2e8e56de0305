//! sqlreg - track raw SQL call sites and their Query Builder conversions

use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;
mod context;
mod style;

use cli::{Cli, Commands};
use commands::{list, prune, report, scan, show};
use context::CommandContext;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_filter = if cli.global.verbose { "debug" } else { "warn" };
    env_logger::init_from_env(env_logger::Env::default().default_filter_or(default_filter));

    let ctx = CommandContext::new(&cli.global)?;
    match &cli.command {
        Commands::Scan => scan::execute(&ctx),
        Commands::Report(args) => report::execute(args, &ctx),
        Commands::List(args) => list::execute(args, &ctx),
        Commands::Show(args) => show::execute(args, &ctx),
        Commands::Orm => list::execute_orm(&ctx),
        Commands::Todos => list::execute_todos(&ctx),
        Commands::Manual => list::execute_manual(&ctx),
        Commands::Prune => prune::execute(&ctx),
    }
}
