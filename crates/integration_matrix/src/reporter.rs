//! Infrastructure to report the outcome of a batch.
//!
//! Called by the commands once a driver returns.  Failures get a nested report naming the test, the stage, the tool
//! and whatever the tool said on stderr.
use std::fmt::{Result, Write};
use std::time::Duration;

use indenter::indented;

use crate::errors::{BatchAborted, FailureKind, PipelineError};
use crate::summary::BatchSummary;

// Formatting here is to strings and so cannot fail, but unwrap is annoying so we put that behind a function and unwrap
// once at the top.  The output strings never end in a newline, which lets the fallible halves use writeln everywhere.

/// Format a duration as `H:MM:SS.mmm`.
pub fn format_elapsed(elapsed: Duration) -> String {
    let Ok(delta) = chrono::TimeDelta::from_std(elapsed) else {
        // Out of range for chrono; we'll never get here short of a run lasting millennia.
        return format!("{elapsed:?}");
    };
    let hours = delta.num_hours();
    let minutes = delta.num_minutes() % 60;
    let seconds = delta.num_seconds() % 60;
    let millis = elapsed.subsec_millis();
    format!("{hours}:{minutes:02}:{seconds:02}.{millis:03}")
}

fn strip_newline(mut dest: String) -> String {
    if dest.ends_with('\n') {
        dest.pop();
    }
    dest
}

/// Report one failure.  Returns a string without a trailing newline.
pub fn report_failure(error: &PipelineError) -> String {
    let mut dest = String::new();
    report_failure_fallible(&mut dest, error)
        .expect("This is formatting to strings and should never fail");
    strip_newline(dest)
}

fn report_failure_fallible(mut dest: &mut dyn Write, error: &PipelineError) -> Result {
    writeln!(dest, "{} failed during {}", error.test_name, error.stage)?;
    let mut dest = indented(&mut dest).with_str("  ");

    match &error.kind {
        FailureKind::Tool(t) => {
            writeln!(dest, "Tool: {}", t.tool())?;
            writeln!(dest, "Error: {t}")?;
            if let Some(code) = t.exit_code() {
                writeln!(dest, "Exit code: {code}")?;
            }
            if let Some(stderr) = t.stderr() {
                writeln!(dest, "Stderr:")?;
                writeln!(indented(&mut dest).with_str("  "), "{stderr}")?;
            }
        }
        FailureKind::Fs(f) => {
            writeln!(dest, "Filesystem error: {f}")?;
        }
        FailureKind::NotGenerated { .. } => {
            writeln!(dest, "{}", error.kind)?;
        }
    }

    Ok(())
}

fn write_totals(
    dest: &mut dyn Write,
    lead: &str,
    tests: usize,
    elapsed: Duration,
    passed: usize,
    failed: usize,
) -> Result {
    writeln!(
        dest,
        "{lead} {tests} tests in {}: {passed} passed, {failed} failed",
        format_elapsed(elapsed)
    )
}

fn write_failure_list<'a>(
    mut dest: &mut dyn Write,
    failures: impl IntoIterator<Item = &'a PipelineError>,
) -> Result {
    for f in failures {
        writeln!(indented(&mut dest).with_str("  "), "{}", report_failure(f))?;
    }
    Ok(())
}

/// Report the totals of a batch, and list anything that failed.  Returns a string without a trailing newline.
pub fn report_summary(summary: &BatchSummary) -> String {
    let mut dest = String::new();
    report_summary_fallible(&mut dest, summary)
        .expect("This is formatting to strings and should never fail");
    strip_newline(dest)
}

fn report_summary_fallible(dest: &mut dyn Write, summary: &BatchSummary) -> Result {
    write_totals(
        dest,
        summary.verb,
        summary.test_count(),
        summary.elapsed,
        summary.passed_count(),
        summary.failed_count(),
    )?;
    write_failure_list(
        dest,
        summary.failures.iter().chain(summary.solution_failure.iter()),
    )
}

/// Report a batch which stopped at a failure: the failure, then what was done before it.  Returns a string without a
/// trailing newline.
pub fn report_aborted(aborted: &BatchAborted) -> String {
    let mut dest = String::new();
    report_aborted_fallible(&mut dest, aborted)
        .expect("This is formatting to strings and should never fail");
    strip_newline(dest)
}

fn report_aborted_fallible(dest: &mut dyn Write, aborted: &BatchAborted) -> Result {
    let partial = &aborted.partial;
    let stopping_test = usize::from(aborted.stopped_in_test());

    writeln!(dest, "{}", report_failure(&aborted.error))?;
    write_totals(
        dest,
        "Stopped after",
        partial.test_count() + stopping_test,
        partial.elapsed,
        partial.passed_count(),
        partial.failed_count() + stopping_test,
    )?;
    write_failure_list(dest, partial.failures.iter())
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;

    use crate::errors::{FsError, Stage, ToolError};
    use crate::toolchain::Tool;

    #[test]
    fn test_format_elapsed() {
        assert_eq!(format_elapsed(Duration::from_millis(1_234)), "0:00:01.234");
        assert_eq!(
            format_elapsed(Duration::from_secs(3 * 3600 + 25 * 60 + 7)),
            "3:25:07.000"
        );
    }

    #[test]
    fn test_tool_failure_report() {
        let err = PipelineError::new(
            "FooTogetherAsProto3",
            Stage::GenerateTypes,
            ToolError::Failed {
                tool: Tool::ProtobufCompiler,
                program: "protoc".to_string(),
                exit_code: Some(1),
                stderr: "Foo.proto:3:1: Expected \"syntax\".\nsecond line".to_string(),
            },
        );

        assert_eq!(
            report_failure(&err),
            "FooTogetherAsProto3 failed during type generation
  Tool: protocol buffer compiler
  Error: protocol buffer compiler (protoc) exited with exit code 1
  Exit code: 1
  Stderr:
    Foo.proto:3:1: Expected \"syntax\".
    second line"
        );
    }

    fn copy_failure(name: &str) -> PipelineError {
        PipelineError::new(
            name,
            Stage::CopySerializers,
            FsError::new(
                "copy files from",
                "serializers/AVRO",
                std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
            ),
        )
    }

    #[test]
    fn test_summary_report() {
        let summary = BatchSummary {
            verb: "Generated",
            succeeded: vec!["FooTogetherAsAvro".to_string()],
            failures: vec![copy_failure("BarSeparateAsAvro")],
            solution_failure: None,
            elapsed: Duration::from_secs(61),
        };

        assert_eq!(
            report_summary(&summary),
            "Generated 2 tests in 0:01:01.000: 1 passed, 1 failed
  BarSeparateAsAvro failed during serializer copy
    Filesystem error: While trying to copy files from serializers/AVRO: missing"
        );
    }

    #[test]
    fn test_clean_summary_report() {
        let summary = BatchSummary::from_outcomes(
            "Executed",
            vec![Ok("FooTogetherAsJson".to_string()), Ok("FooSeparateAsJson".to_string())],
        );

        assert_eq!(
            report_summary(&summary),
            "Executed 2 tests in 0:00:00.000: 2 passed, 0 failed"
        );
    }

    #[test]
    fn test_aborted_report_counts_the_stopping_test() {
        let mut partial = BatchSummary::from_outcomes(
            "Generated",
            vec![
                Ok("BarTogetherAsAvro".to_string()),
                Ok("BarSeparateAsAvro".to_string()),
            ],
        );
        partial.elapsed = Duration::from_millis(2_500);
        let aborted = BatchAborted {
            error: copy_failure("FooTogetherAsAvro"),
            partial,
        };

        assert_eq!(
            report_aborted(&aborted),
            "FooTogetherAsAvro failed during serializer copy
  Filesystem error: While trying to copy files from serializers/AVRO: missing
Stopped after 3 tests in 0:00:02.500: 2 passed, 1 failed"
        );
    }
}
