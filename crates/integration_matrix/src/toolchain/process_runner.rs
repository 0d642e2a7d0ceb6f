use std::process as proc;

use crate::errors::ToolError;

use super::{CommandRunner, OutputMode, ToolInvocation};

/// How much of a failing tool's stderr we keep for the report.
const STDERR_TAIL_LINES: usize = 40;

/// Runs invocations as child processes, one at a time per call, waiting for each to exit.
///
/// Stdin is always closed: none of the tools are interactive, and one waiting on input would hang the batch.  There is
/// no timeout.
#[derive(Debug, Default)]
pub struct ProcessRunner;

fn tail(text: &str, lines: usize) -> String {
    let all = text.lines().collect::<Vec<_>>();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}

impl CommandRunner for ProcessRunner {
    fn run(&self, invocation: &ToolInvocation) -> Result<(), ToolError> {
        let program = invocation.program.display().to_string();

        let mut command = proc::Command::new(&invocation.program);
        command.args(&invocation.args).stdin(proc::Stdio::null());

        let spawn_failed = |source| ToolError::Spawn {
            tool: invocation.tool,
            program: program.clone(),
            source,
        };

        let (status, stderr) = match invocation.output {
            OutputMode::Inherited => {
                let status = command.status().map_err(spawn_failed)?;
                (status, String::new())
            }
            OutputMode::Captured => {
                let output = command.output().map_err(spawn_failed)?;
                let stdout = String::from_utf8_lossy(&output.stdout);
                for line in stdout.lines() {
                    log::debug!("[{}] {line}", invocation.tool);
                }
                let stderr = String::from_utf8_lossy(&output.stderr);
                for line in stderr.lines() {
                    log::debug!("[{} stderr] {line}", invocation.tool);
                }
                (output.status, tail(&stderr, STDERR_TAIL_LINES))
            }
        };

        if status.success() {
            return Ok(());
        }

        Err(ToolError::Failed {
            tool: invocation.tool,
            program,
            exit_code: status.code(),
            stderr,
        })
    }
}
