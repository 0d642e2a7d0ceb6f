//! The execution driver: runs the projects the generation driver produced.
//!
//! Entries come from the same matrix as generation, so the paths line up by construction.  Runs are sequential; the
//! test runner's console output is the result, and interleaving it would make it useless.
use std::time::Instant;

use crate::errors::{BatchAborted, FailureKind, PipelineError, Stage, StageContext};
use crate::matrix::MatrixEntry;
use crate::summary::BatchSummary;
use crate::toolchain::Toolchain;

/// Run the generated standalone project of one entry.
pub fn execute_service_test(
    tools: &dyn Toolchain,
    entry: &MatrixEntry,
) -> Result<(), PipelineError> {
    let name = entry.identity.test_name.as_str();
    let standalone = &entry.layout.standalone_path;

    if !standalone.is_dir() {
        return Err(PipelineError::new(
            name,
            Stage::RunTests,
            FailureKind::NotGenerated {
                path: standalone.clone(),
            },
        ));
    }

    log::info!("Executing {entry}");
    tools.run_tests(standalone).at_stage(name, Stage::RunTests)
}

/// Execute every entry.  Stops at the first failure unless `keep_going` is set, in which case failures are collected
/// into the summary.
pub fn run_execution(
    tools: &dyn Toolchain,
    entries: &[MatrixEntry],
    keep_going: bool,
) -> Result<BatchSummary, BatchAborted> {
    let start = Instant::now();
    let mut outcomes = vec![];

    for entry in entries {
        let res = execute_service_test(tools, entry).map(|()| entry.identity.test_name.clone());
        let failed = res.is_err();
        if let Err(e) = &res {
            log::error!("{e}");
        }
        outcomes.push(res);

        if failed && !keep_going {
            break;
        }
    }

    let mut summary = BatchSummary::from_outcomes("Executed", outcomes);
    summary.elapsed = start.elapsed();
    if keep_going {
        Ok(summary)
    } else {
        summary.stop_at_first_failure()
    }
}
