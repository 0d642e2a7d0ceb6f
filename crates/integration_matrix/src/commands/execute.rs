use anyhow::Result;

use codegen_integration_matrix::execution;
use codegen_integration_matrix::toolchain::{ExternalToolchain, ProcessRunner};

use crate::cli_args::{CliArgs, ExecuteArgs};

pub fn execute(top_args: &CliArgs, exec_args: &ExecuteArgs) -> Result<()> {
    let params = super::load_parameters(top_args)?;
    let entries = super::selected_entries(&params, &exec_args.filter)?;
    let tools = ExternalToolchain::new(&params, ProcessRunner);

    super::finish(execution::run_execution(
        &tools,
        &entries,
        exec_args.keep_going,
    ))
}
