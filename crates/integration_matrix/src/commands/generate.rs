use anyhow::{Context, Result};

use codegen_integration_matrix::generation::{self, GenerationOptions};
use codegen_integration_matrix::toolchain::{ExternalToolchain, ProcessRunner};

use crate::cli_args::{CliArgs, GenerateArgs};

pub fn generate(top_args: &CliArgs, gen_args: &GenerateArgs) -> Result<()> {
    let params = super::load_parameters(top_args)?;
    let entries = super::selected_entries(&params, &gen_args.filter)?;
    let tools = ExternalToolchain::new(&params, ProcessRunner);

    let jobs = gen_args.jobs.max(1);
    let options = GenerationOptions {
        keep_going: gen_args.keep_going,
        parallel: jobs > 1,
        skip_solution: gen_args.skip_solution,
    };

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(jobs)
        .thread_name(|i| format!("generate-{i}"))
        .build()
        .context("While starting the generation thread pool")?;

    let outcome =
        pool.install(|| generation::run_generation(&params, &tools, &entries, &options));
    super::finish(outcome)
}
