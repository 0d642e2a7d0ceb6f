use std::time::Duration;

use crate::errors::{BatchAborted, PipelineError};

/// What a driver did over a whole batch.
#[derive(Debug)]
pub struct BatchSummary {
    /// Past tense of what the driver does, for the report: "Generated", "Executed".
    pub verb: &'static str,

    /// Test names which went through, in order.
    pub succeeded: Vec<String>,

    /// Tests which were attempted and failed.  More than one only when the batch was told to keep going, or when
    /// parallel entries failed at the same time.
    pub failures: Vec<PipelineError>,

    /// Expanding the solution, which runs after the tests and is not one of them.
    pub solution_failure: Option<PipelineError>,

    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn from_outcomes(
        verb: &'static str,
        outcomes: impl IntoIterator<Item = Result<String, PipelineError>>,
    ) -> BatchSummary {
        let mut succeeded = vec![];
        let mut failures = vec![];
        for o in outcomes {
            match o {
                Ok(name) => succeeded.push(name),
                Err(e) => failures.push(e),
            }
        }

        BatchSummary {
            verb,
            succeeded,
            failures,
            solution_failure: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Every test attempted, whether it passed or not.
    pub fn test_count(&self) -> usize {
        self.succeeded.len() + self.failures.len()
    }

    pub fn passed_count(&self) -> usize {
        self.succeeded.len()
    }

    pub fn failed_count(&self) -> usize {
        self.failures.len()
    }

    pub fn all_passed(&self) -> bool {
        self.failures.is_empty() && self.solution_failure.is_none()
    }

    /// Split off the first failure as the reason the batch stopped, keeping everything else as partial totals.
    ///
    /// Test failures come before the solution's, which can only have happened once every test was through.
    pub fn stop_at_first_failure(mut self) -> Result<BatchSummary, BatchAborted> {
        let error = if self.failures.is_empty() {
            match self.solution_failure.take() {
                Some(e) => e,
                None => return Ok(self),
            }
        } else {
            self.failures.remove(0)
        };

        Err(BatchAborted {
            error,
            partial: self,
        })
    }
}
