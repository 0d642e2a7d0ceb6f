mod execute;
mod generate;
mod list;
mod show_config;

use anyhow::{Context, Result};

use codegen_integration_matrix::filtering::TestFilter;
use codegen_integration_matrix::matrix::{self, MatrixEntry};
use codegen_integration_matrix::reporter;
use codegen_integration_matrix::summary::BatchSummary;
use codegen_integration_matrix::{BatchAborted, Parameters};

use crate::cli_args;

/// Figure out what command to run, then run it.
pub fn dispatch_command(args: cli_args::CliArgs) -> Result<()> {
    match &args.command {
        cli_args::Command::Generate(g) => generate::generate(&args, g),
        cli_args::Command::Execute(e) => execute::execute(&args, e),
        cli_args::Command::List(l) => list::list(&args, l),
        cli_args::Command::ShowConfig => show_config::show_config(&args),
    }
}

fn load_parameters(top_args: &cli_args::CliArgs) -> Result<Parameters> {
    let params = Parameters::load(top_args.config.as_deref())?;
    if let Some(c) = &top_args.config {
        log::debug!("Loaded parameters from {}", c.display());
    }
    Ok(params)
}

/// Build the matrix and narrow it down to what the filter on the command line selects.
fn selected_entries(
    params: &Parameters,
    filter: &cli_args::FilterArgs,
) -> Result<Vec<MatrixEntry>> {
    let filter = TestFilter::new(filter.pattern.as_deref())?;
    let all = matrix::build_matrix(params).context("While building the test matrix")?;
    let selected = filter.apply(&all).cloned().collect::<Vec<_>>();

    log::info!(
        "{} of {} tests selected ({} templates x {} formats x {} topic variants)",
        selected.len(),
        all.len(),
        all.len() / (params.formats.len() * params.topic_variants.len()),
        params.formats.len(),
        params.topic_variants.len()
    );
    Ok(selected)
}

/// Print the outcome of a driver.  Anything but a clean batch becomes an error, and so a nonzero exit.
fn finish(outcome: Result<BatchSummary, BatchAborted>) -> Result<()> {
    match outcome {
        Err(aborted) => {
            eprintln!("{}", reporter::report_aborted(&aborted));
            anyhow::bail!(
                "Stopped at {} ({} failed)",
                aborted.error.test_name,
                aborted.error.stage
            );
        }
        Ok(summary) => {
            println!("{}", reporter::report_summary(&summary));
            if !summary.all_passed() {
                anyhow::bail!(
                    "{} of {} tests failed{}",
                    summary.failed_count(),
                    summary.test_count(),
                    if summary.solution_failure.is_some() {
                        ", and so did the solution"
                    } else {
                        ""
                    }
                );
            }
            Ok(())
        }
    }
}
