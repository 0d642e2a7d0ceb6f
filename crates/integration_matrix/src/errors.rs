use std::path::PathBuf;

use crate::summary::BatchSummary;
use crate::toolchain::Tool;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Unable to read configuration file {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Malformed configuration file {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: serde_yaml::Error,
    },

    #[error("Unknown serialization format {0:?}")]
    UnknownFormat(String),

    #[error("Topic lists are not index-aligned: {topic_types} topic types, {cmd_topics} command topics, {telem_topics} telemetry topics")]
    MisalignedTopics {
        topic_types: usize,
        cmd_topics: usize,
        telem_topics: usize,
    },

    #[error("At least one {0} must be configured")]
    EmptyAxis(&'static str),

    #[error("{axis} {value:?} is configured more than once")]
    DuplicateAxisValue { axis: &'static str, value: String },

    #[error("cases_per_test must be at least 1")]
    ZeroCases,

    #[error("Invalid glob pattern {pattern:?}: {source}")]
    InvalidGlob {
        pattern: String,
        source: globset::Error,
    },
}

/// A filesystem operation which failed, with enough context to say what we were doing.
#[derive(Debug, thiserror::Error)]
#[error("While trying to {action} {}: {source}", .path.display())]
pub struct FsError {
    pub action: &'static str,
    pub path: PathBuf,
    pub source: std::io::Error,
}

impl FsError {
    pub fn new(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        FsError {
            action,
            path: path.into(),
            source,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ToolError {
    #[error("Unable to launch {tool} ({program}): {source}")]
    Spawn {
        tool: Tool,
        program: String,
        source: std::io::Error,
    },

    #[error("{tool} ({program}) exited with {}", describe_exit(.exit_code))]
    Failed {
        tool: Tool,
        program: String,
        /// `None` if the process was killed by a signal.
        exit_code: Option<i32>,
        /// Tail of the captured stderr.
        stderr: String,
    },
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(c) => format!("exit code {c}"),
        None => "no exit code (terminated by a signal)".to_string(),
    }
}

impl ToolError {
    pub fn tool(&self) -> Tool {
        match self {
            ToolError::Spawn { tool, .. } | ToolError::Failed { tool, .. } => *tool,
        }
    }

    pub fn exit_code(&self) -> Option<i32> {
        match self {
            ToolError::Spawn { .. } => None,
            ToolError::Failed { exit_code, .. } => *exit_code,
        }
    }

    /// Captured stderr, if the tool got far enough to write any.
    pub fn stderr(&self) -> Option<&str> {
        match self {
            ToolError::Failed { stderr, .. } if !stderr.is_empty() => Some(stderr.as_str()),
            _ => None,
        }
    }
}

/// The step of a pipeline that was running when something went wrong.
#[derive(Copy, Clone, Debug, Eq, PartialEq, derive_more::Display)]
pub enum Stage {
    #[display(fmt = "workspace reset")]
    ResetWorkspace,
    #[display(fmt = "model expansion")]
    ExpandModel,
    #[display(fmt = "schema generation")]
    GenerateSchemas,
    #[display(fmt = "type generation")]
    GenerateTypes,
    #[display(fmt = "envoy generation")]
    GenerateEnvoy,
    #[display(fmt = "serializer copy")]
    CopySerializers,
    #[display(fmt = "case generation")]
    GenerateCases,
    #[display(fmt = "test code generation")]
    GenerateTestCode,
    #[display(fmt = "solution expansion")]
    ExpandSolution,
    #[display(fmt = "test execution")]
    RunTests,
}

#[derive(Debug, thiserror::Error, derive_more::IsVariant)]
pub enum FailureKind {
    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Fs(#[from] FsError),

    #[error("No generated project at {}; run the generate command first", .path.display())]
    NotGenerated { path: PathBuf },
}

/// One triple (or the trailing solution step) failed.
#[derive(Debug, thiserror::Error)]
#[error("{test_name}: {stage} failed: {kind}")]
pub struct PipelineError {
    pub test_name: String,
    pub stage: Stage,
    pub kind: FailureKind,
}

impl PipelineError {
    pub fn new(test_name: &str, stage: Stage, kind: impl Into<FailureKind>) -> Self {
        PipelineError {
            test_name: test_name.to_string(),
            stage,
            kind: kind.into(),
        }
    }
}

/// A batch which stopped at its first failure, with the totals reached before it did.
#[derive(Debug, thiserror::Error)]
#[error("{error}")]
pub struct BatchAborted {
    pub error: PipelineError,

    /// Everything else the batch finished; never contains `error` itself.
    pub partial: BatchSummary,
}

impl BatchAborted {
    /// Whether the stopping failure was one of the tests, as opposed to the solution after them.
    pub fn stopped_in_test(&self) -> bool {
        self.error.stage != Stage::ExpandSolution
    }
}

/// Attributes a failure to the test and stage it happened in, in the manner of `anyhow::Context`.
pub trait StageContext<T> {
    fn at_stage(self, test_name: &str, stage: Stage) -> Result<T, PipelineError>;
}

impl<T, E: Into<FailureKind>> StageContext<T> for Result<T, E> {
    fn at_stage(self, test_name: &str, stage: Stage) -> Result<T, PipelineError> {
        self.map_err(|e| PipelineError::new(test_name, stage, e))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum MatrixError {
    #[error(transparent)]
    Templates(#[from] FsError),

    #[error("Found duplicate test names. Every (template, format, topic variant) triple must be unique: {}", .0.join(", "))]
    DuplicateTests(Vec<String>),
}
