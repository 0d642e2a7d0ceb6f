//! Definition of the Clap command line.
use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(
    name = "codegen_integration_matrix",
    about = "Generate and run the codegen integration test matrix"
)]
pub struct CliArgs {
    /// YAML file overriding entries of the default parameter table.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate test projects.
    Generate(GenerateArgs),

    /// Run previously generated test projects.
    Execute(ExecuteArgs),

    /// List the tests the matrix expands to.
    List(ListArgs),

    /// Print the resolved parameter table as YAML.
    ShowConfig,
}

#[derive(Debug, Parser)]
pub struct FilterArgs {
    /// If specified, only tests whose names match this glob pattern.
    pub pattern: Option<String>,
}

#[derive(Debug, Parser)]
pub struct GenerateArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Report failures and continue with the remaining tests instead of stopping at the first.
    #[arg(long)]
    pub keep_going: bool,

    /// Number of tests to generate at once.
    #[arg(long, short, default_value_t = 1)]
    pub jobs: usize,

    /// Don't expand the solution template afterwards.
    #[arg(long)]
    pub skip_solution: bool,
}

#[derive(Debug, Parser)]
pub struct ExecuteArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Report failures and continue with the remaining tests instead of stopping at the first.
    #[arg(long)]
    pub keep_going: bool,
}

#[derive(Debug, Parser)]
pub struct ListArgs {
    #[command(flatten)]
    pub filter: FilterArgs,

    /// Also print each test's namespace and output directory.
    #[arg(long, short)]
    pub verbose: bool,
}
