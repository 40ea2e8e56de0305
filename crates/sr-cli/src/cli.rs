//! CLI argument definitions using clap derive API

use clap::{Args, Parser, Subcommand};

/// sqlreg - registry of raw SQL call sites and their Query Builder conversions
#[derive(Parser, Debug)]
#[command(name = "sqlreg")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Global options
    #[command(flatten)]
    pub global: GlobalArgs,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Global arguments available to all commands
#[derive(Args, Debug, Clone)]
pub struct GlobalArgs {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Directory to scan
    #[arg(short, long, global = true, default_value = ".")]
    pub directory: String,

    /// Override registry file path
    #[arg(short, long, global = true, env = "SQLREG_REGISTRY")]
    pub registry: Option<String>,

    /// Override config file path
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Disable coloured output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Scan the directory and register every raw SQL call
    Scan,

    /// Generate the Markdown status report
    Report(ReportArgs),

    /// List registered calls
    List(ListArgs),

    /// Show one call in full
    Show(ShowArgs),

    /// List calls convertible to a plain ORM lookup
    Orm,

    /// List conversions that still carry TODO notes
    Todos,

    /// List calls that need manual conversion
    Manual,

    /// Remove calls whose source file no longer exists
    Prune,
}

/// Arguments for the report command
#[derive(Args, Debug)]
pub struct ReportArgs {
    /// Write the report to a file instead of stdout
    #[arg(short, long)]
    pub output: Option<String>,
}

/// Arguments for the list command
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only show calls whose file path contains this text
    #[arg(short, long)]
    pub file_filter: Option<String>,
}

/// Arguments for the show command
#[derive(Args, Debug)]
pub struct ShowArgs {
    /// Call id or unique prefix of one
    pub call_id: String,
}

#[cfg(test)]
#[path = "cli_test.rs"]
mod tests;
